//! Fetch modi that ship with the sylladex.

pub mod penta_file;
pub mod rng;
pub mod session;
pub mod tarot_deck;
pub mod true_sight;

mod common;

pub use penta_file::*;
pub use rng::*;
pub use session::*;
pub use tarot_deck::*;
pub use true_sight::*;

use sylladex_core::{ConfigError, ModusRegistry};

/// Registers every built-in modus, runnable or not.
pub fn register_builtin_modi(registry: &mut ModusRegistry) -> Result<(), ConfigError> {
    registry.register::<PentaFile>()?;
    registry.register::<TarotDeck>()?;
    registry.register::<TrueSightDeck>()?;
    Ok(())
}
