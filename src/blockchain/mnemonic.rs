//! 25-word account mnemonics.
//!
//! The first 24 words carry the 32-byte Ed25519 seed packed as 11-bit
//! little-endian groups over the BIP-39 English word list. The last word is a
//! checksum: the first 11 bits of the seed's SHA-512/256 digest.

use sha2::{Digest, Sha512_256};
use thiserror::Error;

const SEED_LEN: usize = 32;
const DATA_WORDS: usize = 24;
const MNEMONIC_WORDS: usize = DATA_WORDS + 1;
const WORD_MASK: u32 = 0x7ff;

/// Errors produced while decoding a mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    #[error("expected 25 words, got {0}")]
    WordCount(usize),

    /// Position (1-based) of a word missing from the word list.
    #[error("word {0} is not in the word list")]
    UnknownWord(usize),

    #[error("mnemonic does not encode a valid seed")]
    Malformed,

    #[error("checksum word mismatch")]
    Checksum,
}

fn word_list() -> &'static [&'static str; 2048] {
    bip39::Language::English.word_list()
}

fn to_u11(bytes: &[u8]) -> Vec<u32> {
    let mut buffer = 0u32;
    let mut bits = 0u32;
    let mut out = Vec::with_capacity(bytes.len() * 8 / 11 + 1);
    for &b in bytes {
        buffer |= u32::from(b) << bits;
        bits += 8;
        if bits >= 11 {
            out.push(buffer & WORD_MASK);
            buffer >>= 11;
            bits -= 11;
        }
    }
    if bits != 0 {
        out.push(buffer & WORD_MASK);
    }
    out
}

fn to_bytes(groups: &[u32]) -> Vec<u8> {
    let mut buffer = 0u32;
    let mut bits = 0u32;
    let mut out = Vec::with_capacity(groups.len() * 11 / 8 + 1);
    for &g in groups {
        buffer |= g << bits;
        bits += 11;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits != 0 {
        out.push((buffer & 0xff) as u8);
    }
    out
}

fn checksum_word(seed: &[u8; SEED_LEN]) -> &'static str {
    let digest = Sha512_256::digest(seed);
    let index = to_u11(&digest[..2])[0];
    word_list()[index as usize]
}

/// Encode a 32-byte seed as a 25-word mnemonic.
pub fn from_seed(seed: &[u8; SEED_LEN]) -> String {
    let words = word_list();
    let mut phrase: Vec<&str> = to_u11(seed)
        .into_iter()
        .map(|i| words[i as usize])
        .collect();
    phrase.push(checksum_word(seed));
    phrase.join(" ")
}

/// Decode a 25-word mnemonic into its 32-byte seed.
///
/// Words are matched case-insensitively and may be separated by any
/// whitespace.
pub fn to_seed(mnemonic: &str) -> Result<[u8; SEED_LEN], MnemonicError> {
    let words: Vec<String> = mnemonic
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::WordCount(words.len()));
    }

    let list = word_list();
    let mut groups = Vec::with_capacity(DATA_WORDS);
    for (pos, word) in words[..DATA_WORDS].iter().enumerate() {
        let index = list
            .binary_search(&word.as_str())
            .map_err(|_| MnemonicError::UnknownWord(pos + 1))?;
        groups.push(index as u32);
    }

    // 24 groups of 11 bits leave one trailing byte that must be empty.
    let bytes = to_bytes(&groups);
    if bytes.len() != SEED_LEN + 1 || bytes[SEED_LEN] != 0 {
        return Err(MnemonicError::Malformed);
    }
    let mut seed = [0u8; SEED_LEN];
    seed.copy_from_slice(&bytes[..SEED_LEN]);

    if checksum_word(&seed) != words[DATA_WORDS] {
        return Err(MnemonicError::Checksum);
    }
    Ok(seed)
}
