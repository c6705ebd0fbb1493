// erfc_app/src/main.rs

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;

use std::sync::mpsc::{self, Receiver};

#[derive(Clone, Copy)]
enum WorkerJob {
    Encrypt,
    Decrypt,
}

struct WorkerResult {
    output: String,
    digest: Option<String>,
    status: String,
}

struct AppState {
    input: String,
    output: String,

    key: String,
    digest: String,

    status: String,

    // async-ish UI
    busy: bool,
    rx: Option<Receiver<WorkerResult>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: "Hello123".to_string(),
            output: String::new(),
            key: "mySecretKey".to_string(),
            digest: String::new(),
            status: "Tip: Encrypt fills Output and Digest. Decrypt reads Input and Digest."
                .to_string(),

            busy: false,
            rx: None,
        }
    }
}

impl AppState {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn start_job(&mut self, job: WorkerJob) {
        if self.busy {
            return;
        }
        self.busy = true;
        self.status = "Working…".to_string();

        // Snapshot state (do NOT read &mut self in the worker)
        let key = self.key.clone();
        let inp = self.input.clone();
        let digest = self.digest.clone();

        let (tx, rx) = mpsc::channel::<WorkerResult>();
        self.rx = Some(rx);

        std::thread::spawn(move || {
            let res = std::panic::catch_unwind(|| match job {
                WorkerJob::Encrypt => match erfc::encrypt(&inp, &key) {
                    Ok(out) => WorkerResult {
                        output: out.ciphertext,
                        digest: Some(out.digest),
                        status: "Encrypted. Share the ciphertext and the digest.".to_string(),
                    },
                    Err(e) => WorkerResult {
                        output: String::new(),
                        digest: None,
                        status: format!("Error: {e}"),
                    },
                },
                WorkerJob::Decrypt => match erfc::decrypt(&inp, &key, digest.trim()) {
                    Ok(plain) => WorkerResult {
                        output: plain,
                        digest: None,
                        status: "Decrypted. Integrity verified.".to_string(),
                    },
                    Err(e) => WorkerResult {
                        output: String::new(),
                        digest: None,
                        status: format!("Error: {e}"),
                    },
                },
            });

            let msg = match res {
                Ok(v) => v,
                Err(_) => WorkerResult {
                    output: String::new(),
                    digest: None,
                    status: "PANIC in worker thread (run debug build in a terminal with RUST_BACKTRACE=1)."
                        .to_string(),
                },
            };

            let _ = tx.send(msg);
        });
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.input, &mut self.output);
        self.status = "Swapped.".to_string();
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // poll worker completion
        if let Some(rx) = &self.rx {
            if let Ok(done) = rx.try_recv() {
                self.output = done.output;
                if let Some(d) = done.digest {
                    self.digest = d;
                }
                self.status = done.status;
                self.busy = false;
                self.rx = None;
            }
        }

        // keep repainting while busy so spinner animates
        if self.busy {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("ERFC — Emoji Rail Fence Cipher");

            ui.add_space(6.0);
            ui.label(
                "Key-derived emoji substitution plus padded-grid placement. \
                 Plaintext must be a-z, A-Z, 0-9 only.",
            );

            ui.add_space(10.0);

            ui.label("Input (plaintext or ciphertext):");
            ui.add(
                egui::TextEdit::multiline(&mut self.input)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(8.0);

            // Params
            ui.horizontal(|ui| {
                ui.label("Key:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.key)
                        .password(true)
                        .desired_width(260.0),
                );
            });

            ui.add_space(6.0);

            ui.horizontal(|ui| {
                ui.label("Digest:");
                ui.add(egui::TextEdit::singleline(&mut self.digest).desired_width(f32::INFINITY));
            });

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.add_enabled_ui(!self.busy, |ui| {
                    if ui.button("Encrypt").clicked() {
                        self.start_job(WorkerJob::Encrypt);
                    }
                    if ui.button("Decrypt").clicked() {
                        self.start_job(WorkerJob::Decrypt);
                    }
                    if ui.button("Swap ↔").clicked() {
                        self.swap();
                    }
                });

                if self.busy {
                    ui.add_space(10.0);
                    ui.spinner();
                    ui.label("Working…");
                }
            });

            ui.add_space(10.0);

            ui.label("Output:");
            ui.add(
                egui::TextEdit::multiline(&mut self.output)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.label(&self.status);
        });
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ERFC — Emoji Rail Fence Cipher")
            .with_inner_size([900.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ERFC",
        options,
        Box::new(|cc| Ok(Box::new(AppState::new(cc)))),
    )
}
