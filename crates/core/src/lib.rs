//! Fetch-modus runtime: cards, the shared buffer, the modus registry and the
//! container that routes every command to the active modus.

pub mod buffer;
pub mod card;
pub mod codec;
pub mod command_map;
pub mod config;
pub mod container;
pub mod deck;
pub mod error;
pub mod fuzzy;
pub mod modus;
pub mod registry;
pub mod surface;
pub mod view;

pub use buffer::*;
pub use card::*;
pub use codec::*;
pub use command_map::*;
pub use config::*;
pub use container::*;
pub use deck::*;
pub use error::*;
pub use fuzzy::*;
pub use modus::*;
pub use registry::*;
pub use surface::*;
pub use view::*;
