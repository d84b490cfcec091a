//! Random password generation.

use crate::error::{Result, VaultError};
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_LENGTH: usize = 16;
/// One character from each required class.
pub const MIN_LENGTH: usize = 4;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Generate a password containing at least one lowercase letter,
/// uppercase letter, digit and symbol.
pub fn generate_password(length: usize) -> Result<String> {
    if length < MIN_LENGTH {
        return Err(VaultError::InvalidLength { minimum: MIN_LENGTH });
    }

    let mut rng = rand::thread_rng();
    let pool: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS].concat();

    let mut chars: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS]
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    chars.extend((MIN_LENGTH..length).map(|_| pool[rng.gen_range(0..pool.len())]));
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}
