//! Binary deck files: an `i32` record count, that many card records, then a
//! `0x00` terminator.

use crate::{Card, SharedDeck};
use bincode::Options;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

pub const DECK_TERMINATOR: u8 = 0x00;
const RECORD_LIMIT: u64 = 4096;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt deck file: {0}")]
    Corrupt(String),
}

fn record_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(RECORD_LIMIT)
}

pub fn write_deck<W: Write>(cards: &[Card], writer: &mut W) -> Result<(), PersistenceError> {
    let count = i32::try_from(cards.len())
        .map_err(|_| PersistenceError::Corrupt(format!("{} records do not fit", cards.len())))?;
    writer.write_all(&count.to_le_bytes())?;
    for card in cards {
        record_options()
            .serialize_into(&mut *writer, card)
            .map_err(|err| match *err {
                bincode::ErrorKind::Io(io) => PersistenceError::Io(io),
                other => PersistenceError::Corrupt(other.to_string()),
            })?;
    }
    writer.write_all(&[DECK_TERMINATOR])?;
    Ok(())
}

/// Reads a deck. A stream that ends early yields the records read so far.
pub fn read_deck<R: Read>(reader: &mut R) -> Result<Vec<Card>, PersistenceError> {
    let mut count_bytes = [0u8; 4];
    if let Err(err) = reader.read_exact(&mut count_bytes) {
        return match err.kind() {
            io::ErrorKind::UnexpectedEof => Ok(Vec::new()),
            _ => Err(err.into()),
        };
    }
    let count = i32::from_le_bytes(count_bytes);
    if count < 0 {
        return Err(PersistenceError::Corrupt(format!(
            "negative record count {count}"
        )));
    }
    let mut cards = Vec::with_capacity((count as usize).min(1024));
    for idx in 0..count {
        let card: Card = match record_options().deserialize_from(&mut *reader) {
            Ok(card) => card,
            Err(err) => match *err {
                bincode::ErrorKind::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
                    tracing::warn!(read = idx, declared = count, "deck file truncated");
                    return Ok(cards);
                }
                bincode::ErrorKind::Io(io) => return Err(io.into()),
                other => {
                    return Err(PersistenceError::Corrupt(format!(
                        "record {idx}: {other}"
                    )))
                }
            },
        };
        if !card.is_valid() {
            return Err(PersistenceError::Corrupt(format!(
                "record {idx} is not a valid card"
            )));
        }
        cards.push(card);
    }
    let mut terminator = [0u8; 1];
    match reader.read_exact(&mut terminator) {
        Ok(()) if terminator[0] == DECK_TERMINATOR => {}
        Ok(()) => {
            return Err(PersistenceError::Corrupt(format!(
                "unexpected terminator byte {:#04x}",
                terminator[0]
            )))
        }
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            tracing::warn!("deck file is missing its terminator");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(cards)
}

/// Snapshots `deck` under its lock and writes it to `path`.
pub fn write_deck_to_file(deck: &SharedDeck, path: &Path) -> Result<usize, PersistenceError> {
    let cards = deck.snapshot();
    let mut writer = BufWriter::new(File::create(path)?);
    write_deck(&cards, &mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), cards = cards.len(), "deck saved");
    Ok(cards.len())
}

pub fn read_deck_from_file(path: &Path) -> Result<Vec<Card>, PersistenceError> {
    let mut reader = BufReader::new(File::open(path)?);
    let cards = read_deck(&mut reader)?;
    tracing::info!(path = %path.display(), cards = cards.len(), "deck loaded");
    Ok(cards)
}
