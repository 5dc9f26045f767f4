use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MAX_ITEM_LEN: usize = 16;
pub const CODE_LEN: usize = 7;
pub const EMPTY_ITEM: &str = "EMPTY";
pub const EMPTY_CODE: &str = "0000000";

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;
const CODE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("item name must not be empty")]
    EmptyItem,
    #[error("item name `{0}` is longer than 16 characters")]
    ItemTooLong(String),
}

/// A captured item or an empty slot. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    item: String,
    code: String,
    in_use: bool,
}

impl Card {
    pub fn new(item: &str) -> Result<Self, CardError> {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            return Err(CardError::EmptyItem);
        }
        // Upper-casing can lengthen a name (`ß` becomes `SS`).
        let item = trimmed.to_uppercase();
        if item.chars().count() > MAX_ITEM_LEN {
            return Err(CardError::ItemTooLong(trimmed.to_string()));
        }
        let code = captcha_code(&item);
        Ok(Self {
            item,
            code,
            in_use: true,
        })
    }

    pub fn empty() -> Self {
        Self {
            item: EMPTY_ITEM.to_string(),
            code: EMPTY_CODE.to_string(),
            in_use: false,
        }
    }

    /// Rebuild a card verbatim. Callers decoding untrusted data check `is_valid`.
    pub fn from_parts(item: impl Into<String>, code: impl Into<String>, in_use: bool) -> Self {
        Self {
            item: item.into(),
            code: code.into(),
            in_use,
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn is_valid(&self) -> bool {
        self.item.chars().count() <= MAX_ITEM_LEN
            && self.code.len() <= CODE_LEN
            && self.code.chars().all(|ch| ch.is_ascii_alphanumeric())
    }
}

impl Default for Card {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_use {
            write!(f, "{} [{}]", self.item, self.code)
        } else {
            f.write_str(EMPTY_ITEM)
        }
    }
}

/// Seven base-36 digits of an FNV-1a digest over the item name.
pub fn captcha_code(item: &str) -> String {
    let mut hash = FNV_OFFSET;
    for byte in item.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    let mut digits = [b'0'; CODE_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = CODE_ALPHABET[(hash % 36) as usize];
        hash /= 36;
    }
    digits.iter().map(|byte| *byte as char).collect()
}
