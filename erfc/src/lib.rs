//! erfc — Emoji Rail Fence Cipher core library.
//!
//! Reversible, key-dependent obfuscation of alphanumeric text:
//!  1) Substitution: each plaintext character maps 1:1 onto a fixed
//!     62-emoji alphabet, shuffled by a generator seeded from SHA-256(key)
//!  2) Grid: the mapped symbols land at pseudo-random positions inside a
//!     larger R x C grid whose remaining cells hold random decoy emojis;
//!     the placement order is a permutation seeded from the char-code sum
//!     of the key
//!  3) Trailer: a 20-char suffix carries the plaintext length as a 4-digit
//!     decimal, XOR-keystreamed against SHA-256(key) and hex-encoded
//!     (8 chars), followed by 12 random alphanumeric salt chars
//!  4) Digest: SHA-256(key || trailer || plaintext), lowercase hex, is
//!     returned alongside the ciphertext for tamper detection
//!
//! Wire format:
//!   <GRID_BODY (R*C emoji chars)><TRAILER (8 hex + 12 alnum chars)>
//!
//! The same key reproduces the substitution mapping, the grid shape, and
//! the placement order, so decryption needs nothing beyond the ciphertext,
//! the key, and the digest. This is an obfuscation scheme, not a hardened
//! cipher: every "random" choice the decoder must reproduce is a pure
//! function of the key.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

// ============================================================
// Errors
// ============================================================

/// Failures surfaced by [`encrypt`] and [`decrypt`]. Each aborts only the
/// current operation; none are fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErfcError {
    /// Plaintext is empty or contains a character outside `[A-Za-z0-9]`.
    NotAlphanumeric,
    /// The emoji alphabet does not contain exactly 62 distinct entries.
    AlphabetCorrupted { distinct: usize },
    /// A plaintext character has no emoji assigned in the forward map.
    UnmappedChar(char),
    /// An extracted symbol is not a recognized alphabet entry.
    UnmappedSymbol(char),
    /// The grid cannot hold the payload.
    GridTooSmall { cells: usize, needed: usize },
    /// Serialized grid body length does not match the computed dimensions.
    BodyLengthMismatch { expected: usize, actual: usize },
    /// Ciphertext is shorter than the 20-char trailer.
    CiphertextTooShort { chars: usize },
    /// Trailer prefix is not valid hex or does not decode to a 4-digit number.
    TrailerMalformed,
    /// Plaintext length cannot be encoded in the 4-digit trailer field.
    PlaintextTooLong { chars: usize },
    /// Recomputed digest does not equal the supplied digest.
    DigestMismatch,
}

impl fmt::Display for ErfcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErfcError::NotAlphanumeric => {
                write!(f, "plaintext must be non-empty and contain only a-z, A-Z, 0-9")
            }
            ErfcError::AlphabetCorrupted { distinct } => {
                write!(
                    f,
                    "emoji alphabet must contain {} distinct entries, found {}",
                    ALPHABET_LEN, distinct
                )
            }
            ErfcError::UnmappedChar(c) => {
                write!(f, "character {:?} is not in the substitution mapping", c)
            }
            ErfcError::UnmappedSymbol(s) => {
                write!(f, "symbol {:?} is not in the reverse substitution mapping", s)
            }
            ErfcError::GridTooSmall { cells, needed } => {
                write!(f, "grid of {} cells cannot hold {} payload symbols", cells, needed)
            }
            ErfcError::BodyLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "cipher body length does not match grid dimensions: expected {}, got {}",
                    expected, actual
                )
            }
            ErfcError::CiphertextTooShort { chars } => {
                write!(
                    f,
                    "ciphertext of {} chars is too short to contain the {}-char trailer",
                    chars, TRAILER_LEN
                )
            }
            ErfcError::TrailerMalformed => {
                write!(f, "trailer does not decode to a 4-digit plaintext length")
            }
            ErfcError::PlaintextTooLong { chars } => {
                write!(
                    f,
                    "plaintext of {} chars is too large to encode its length in {} digits",
                    chars, LENGTH_DIGITS
                )
            }
            ErfcError::DigestMismatch => {
                write!(f, "integrity check failed: the message was altered or the key is wrong")
            }
        }
    }
}

impl std::error::Error for ErfcError {}

// ============================================================
// Symbol alphabet
// ============================================================

pub const ALPHABET_LEN: usize = 62;

// Substitution targets and decoy pool. Every entry is a single Unicode
// scalar so one grid cell is always exactly one char.
const EMOJI_ALPHABET: [char; ALPHABET_LEN] = [
    '😀', '😁', '😂', '😃', '😄', '😅', '😆', '😇', '😉', '😊',
    '🗝', '🔐', '🔓', '😏', '😐', '😒', '😔', '😕', '😖', '🔑',
    '🔏', '😛', '😜', '😝', '😞', '😟', '😠', '💣', '😢', '😭',
    '😮', '😯', '🥎', '😳', '😴', '😵', '😷', '🙈', '🙉', '🙊',
    '🙋', '🙌', '🙏', '👐', '👑', '👒', '👓', '👔', '👕', '👖',
    '🥇', '😶', '🧑', '👜', '👞', '👟', '👻', '☠', '🤖', '👽',
    '🐬', '👦',
];

/// Plaintext characters eligible for substitution, in canonical order:
/// `a..z`, `A..Z`, `0..9`.
fn plain_charset() -> impl Iterator<Item = char> {
    ('a'..='z').chain('A'..='Z').chain('0'..='9')
}

/// Verifies the 62-distinct-entries invariant before any operation runs.
/// The alphabet is a compile-time constant; the check guards against an
/// incorrect edit of the table.
fn alphabet_check() -> Result<(), ErfcError> {
    let distinct: HashSet<char> = EMOJI_ALPHABET.iter().copied().collect();
    if distinct.len() != ALPHABET_LEN {
        return Err(ErfcError::AlphabetCorrupted {
            distinct: distinct.len(),
        });
    }
    Ok(())
}

// ============================================================
// Keyed deterministic generators
// ============================================================

// Two independent seed derivations feed two independent generator
// instances. Conflating them, or sharing one instance across operations,
// would break reproducibility of the placement order.
struct KeyedRng(ChaCha20Rng);

impl KeyedRng {
    /// Derivation A: the 256-bit SHA-256 digest of the key, taken whole as
    /// the generator seed. Drives the substitution shuffle.
    fn from_key_digest(key: &str) -> Self {
        let seed: [u8; 32] = Sha256::digest(key.as_bytes()).into();
        KeyedRng(ChaCha20Rng::from_seed(seed))
    }

    /// Derivation B: the sum of the key's char codes. A deliberately weak,
    /// low-entropy seed kept for wire compatibility. Drives the grid
    /// placement order.
    fn from_key_sum(key: &str) -> Self {
        KeyedRng(ChaCha20Rng::seed_from_u64(char_code_sum(key)))
    }

    fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.0);
    }
}

fn char_code_sum(key: &str) -> u64 {
    key.chars().map(|c| c as u64).sum()
}

// ============================================================
// Substitution mapping
// ============================================================

/// Key-derived bijection between the plain charset and the emoji alphabet.
/// Built fresh per operation; both directions are total by construction
/// since a shuffle of 62 symbols zipped against 62 characters is a
/// permutation.
struct SubstitutionMap {
    forward: HashMap<char, char>,
    reverse: HashMap<char, char>,
}

impl SubstitutionMap {
    fn for_key(key: &str) -> Self {
        let mut symbols = EMOJI_ALPHABET.to_vec();
        KeyedRng::from_key_digest(key).shuffle(&mut symbols);

        let mut forward = HashMap::with_capacity(ALPHABET_LEN);
        let mut reverse = HashMap::with_capacity(ALPHABET_LEN);
        for (ch, sym) in plain_charset().zip(symbols) {
            forward.insert(ch, sym);
            reverse.insert(sym, ch);
        }
        SubstitutionMap { forward, reverse }
    }

    fn apply(&self, text: &str) -> Result<Vec<char>, ErfcError> {
        text.chars()
            .map(|c| self.forward.get(&c).copied().ok_or(ErfcError::UnmappedChar(c)))
            .collect()
    }

    fn invert(&self, symbols: &[char]) -> Result<String, ErfcError> {
        symbols
            .iter()
            .map(|s| self.reverse.get(s).copied().ok_or(ErfcError::UnmappedSymbol(*s)))
            .collect()
    }
}

// ============================================================
// Grid codec
// ============================================================

const GRID_EXPANSION: usize = 5;

/// R x C grid of emoji cells, stored row-major.
#[derive(Debug)]
struct EmojiGrid {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

/// Grid shape for a payload of `symbol_count` symbols. Both dimensions are
/// pure functions of the key, so decryption recomputes the identical shape
/// from the decoded plaintext length instead of storing it in the wire
/// format. Guarantees `rows in 10..=19` and `rows * cols >= 5 * count`.
fn grid_dims(key: &str, symbol_count: usize) -> (usize, usize) {
    let a = char_code_sum(key) as usize;
    let target = GRID_EXPANSION * symbol_count;
    let rows = (a % 10) + 10;
    let mut cols = (target / rows + 1).max((a % 50) + 20);
    while rows * cols < target {
        cols += 1;
    }
    (rows, cols)
}

/// The key-shuffled visit order over all cells. Placement and extraction
/// both call this; they must observe the identical permutation, which holds
/// because the generator is a pure function of its seed.
fn shuffled_cell_order(key: &str, total_cells: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..total_cells).collect();
    KeyedRng::from_key_sum(key).shuffle(&mut order);
    order
}

impl EmojiGrid {
    /// Places `symbols` at the first positions of the key-shuffled cell
    /// order, then fills every remaining cell with a decoy drawn from the
    /// full alphabet. Decoys come from a non-deterministic source; nothing
    /// on the decode side depends on them.
    fn place(symbols: &[char], rows: usize, cols: usize, key: &str) -> Result<Self, ErfcError> {
        let total = rows * cols;
        if symbols.len() > total {
            return Err(ErfcError::GridTooSmall {
                cells: total,
                needed: symbols.len(),
            });
        }

        let order = shuffled_cell_order(key, total);
        let mut cells = vec!['\0'; total];
        for (sym, &cell) in symbols.iter().zip(order.iter()) {
            cells[cell] = *sym;
        }

        let mut decoy_rng = rand::thread_rng();
        for &cell in &order[symbols.len()..] {
            cells[cell] = EMOJI_ALPHABET[decoy_rng.gen_range(0..ALPHABET_LEN)];
        }

        Ok(EmojiGrid { rows, cols, cells })
    }

    /// Reads back the first `real_count` positions of the same shuffled
    /// order, in order.
    fn extract(&self, real_count: usize, key: &str) -> Result<Vec<char>, ErfcError> {
        let total = self.rows * self.cols;
        if real_count > total {
            return Err(ErfcError::GridTooSmall {
                cells: total,
                needed: real_count,
            });
        }

        let order = shuffled_cell_order(key, total);
        Ok(order[..real_count].iter().map(|&cell| self.cells[cell]).collect())
    }

    fn serialize(&self) -> String {
        self.cells.iter().collect()
    }

    fn deserialize(body: &str, rows: usize, cols: usize) -> Result<Self, ErfcError> {
        let cells: Vec<char> = body.chars().collect();
        if cells.len() != rows * cols {
            return Err(ErfcError::BodyLengthMismatch {
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Ok(EmojiGrid { rows, cols, cells })
    }
}

// ============================================================
// Length trailer
// ============================================================

const LENGTH_DIGITS: usize = 4;
const LENGTH_HEX_LEN: usize = 2 * LENGTH_DIGITS;
const SALT_BODY_LEN: usize = 12;
/// Total trailer length, always appended verbatim to the grid body.
pub const TRAILER_LEN: usize = LENGTH_HEX_LEN + SALT_BODY_LEN;

const MAX_PLAINTEXT_LEN: usize = 9999;

/// Encodes the plaintext length as 4 zero-padded decimal digits, XORed
/// byte-wise against the cyclic SHA-256(key) keystream and hex-encoded,
/// then appends 12 random alphanumeric salt chars. The salt carries no
/// meaning; it only varies the ciphertext tail.
fn encode_trailer(plain_len: usize, key: &str) -> Result<String, ErfcError> {
    if plain_len > MAX_PLAINTEXT_LEN {
        return Err(ErfcError::PlaintextTooLong { chars: plain_len });
    }

    let ks: [u8; 32] = Sha256::digest(key.as_bytes()).into();
    let masked: Vec<u8> = format!("{:04}", plain_len)
        .bytes()
        .enumerate()
        .map(|(i, b)| b ^ ks[i % ks.len()])
        .collect();

    let salt_body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_BODY_LEN)
        .map(char::from)
        .collect();

    Ok(format!("{}{}", hex::encode(masked), salt_body))
}

/// Inverts [`encode_trailer`]: hex-decodes the 8-char prefix, removes the
/// keystream, and parses the 4 recovered digits. The salt body is ignored.
fn decode_trailer(trailer: &str, key: &str) -> Result<usize, ErfcError> {
    let prefix: String = trailer.chars().take(LENGTH_HEX_LEN).collect();
    let masked = hex::decode(&prefix).map_err(|_| ErfcError::TrailerMalformed)?;

    let ks: [u8; 32] = Sha256::digest(key.as_bytes()).into();
    let digits: Vec<u8> = masked
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ ks[i % ks.len()])
        .collect();

    if digits.len() != LENGTH_DIGITS || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ErfcError::TrailerMalformed);
    }
    let mut value = 0usize;
    for d in digits {
        value = value * 10 + (d - b'0') as usize;
    }
    Ok(value)
}

// ============================================================
// Integrity digest
// ============================================================

/// SHA-256 over key || trailer || plaintext, lowercase hex. Computed by the
/// sender and recomputed by the receiver over the recovered plaintext.
fn message_digest(key: &str, trailer: &str, plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(trailer.as_bytes());
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================
// Public pipeline
// ============================================================

/// Output of [`encrypt`]: the ciphertext and the digest that [`decrypt`]
/// verifies against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted {
    pub ciphertext: String,
    pub digest: String,
}

/// Obfuscates `plaintext` under `key`.
///
/// Accepts only non-empty `[A-Za-z0-9]` input of at most 9999 chars.
/// Returns the grid-plus-trailer ciphertext and its integrity digest, or a
/// typed error; no partial output is ever produced.
pub fn encrypt(plaintext: &str, key: &str) -> Result<Encrypted, ErfcError> {
    alphabet_check()?;
    if plaintext.is_empty() || !plaintext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ErfcError::NotAlphanumeric);
    }

    let mapping = SubstitutionMap::for_key(key);
    let symbols = mapping.apply(plaintext)?;
    debug!("substituted {} characters", symbols.len());

    let (rows, cols) = grid_dims(key, symbols.len());
    debug!("grid dimensions: {} rows x {} cols", rows, cols);

    let grid = EmojiGrid::place(&symbols, rows, cols, key)?;
    let body = grid.serialize();
    debug!("serialized cipher body of {} cells", rows * cols);

    // Trailer encodes the original plaintext length (equal to the symbol
    // count under a 1:1 mapping, but the contract is on plaintext length).
    let trailer = encode_trailer(plaintext.len(), key)?;
    let digest = message_digest(key, &trailer, plaintext);
    debug!("trailer and digest ready");

    Ok(Encrypted {
        ciphertext: format!("{}{}", body, trailer),
        digest,
    })
}

/// Recovers the plaintext from `ciphertext` under `key` and verifies it
/// against `expected_digest`.
///
/// The grid shape is recomputed from the decoded length with the identical
/// expansion factor used at encryption; nothing about the shape is stored
/// in the wire format.
pub fn decrypt(ciphertext: &str, key: &str, expected_digest: &str) -> Result<String, ErfcError> {
    alphabet_check()?;

    let chars: Vec<char> = ciphertext.chars().collect();
    if chars.len() < TRAILER_LEN {
        return Err(ErfcError::CiphertextTooShort { chars: chars.len() });
    }
    let split = chars.len() - TRAILER_LEN;
    let body: String = chars[..split].iter().collect();
    let trailer: String = chars[split..].iter().collect();

    let plain_len = decode_trailer(&trailer, key)?;
    debug!("recovered plaintext length {}", plain_len);

    let (rows, cols) = grid_dims(key, plain_len);
    debug!("grid dimensions: {} rows x {} cols", rows, cols);

    let grid = EmojiGrid::deserialize(&body, rows, cols)?;
    let symbols = grid.extract(plain_len, key)?;

    let mapping = SubstitutionMap::for_key(key);
    let plaintext = mapping.invert(&symbols)?;
    debug!("recovered {} characters", plaintext.len());

    if message_digest(key, &trailer, &plaintext) != expected_digest {
        return Err(ErfcError::DigestMismatch);
    }

    Ok(plaintext)
}

// ============================================================
// Tests
// ============================================================
