use crate::{DisplaySurface, InventoryView, OpenHand, SharedDeck, TextOutput};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work the active modus expects to finish with the next submitted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    /// Run the modus' load routine with the line as its mode.
    Load,
    /// Re-run `name` with `args` followed by the trimmed line.
    Command { name: String, args: Vec<String> },
    /// Modus-specific resumption point.
    Step { step: String, data: Vec<String> },
}

/// Context handed to every command handler and continuation.
///
/// Only the command thread writes `modus_input` and the continuation slot.
/// The deck and open hand are shared handles and may be read by the host
/// between commands.
pub struct ModusBuffer {
    display: Box<dyn DisplaySurface>,
    output: Box<dyn TextOutput>,
    deck: SharedDeck,
    open_hand: OpenHand,
    modus_input: String,
    redirector: Option<Continuation>,
    storage_changed: bool,
}

impl ModusBuffer {
    pub fn new(
        display: impl DisplaySurface + 'static,
        output: impl TextOutput + 'static,
    ) -> Self {
        Self::with_collections(display, output, SharedDeck::new(), OpenHand::new())
    }

    pub fn with_collections(
        display: impl DisplaySurface + 'static,
        output: impl TextOutput + 'static,
        deck: SharedDeck,
        open_hand: OpenHand,
    ) -> Self {
        Self {
            display: Box::new(display),
            output: Box::new(output),
            deck,
            open_hand,
            modus_input: String::new(),
            redirector: None,
            storage_changed: false,
        }
    }

    pub fn write(&mut self, text: &str) {
        self.output.append_text(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.output.append_text(text);
        self.output.append_text("\n");
    }

    pub fn show(&mut self, view: InventoryView) {
        self.display.show(view);
    }

    pub fn clear_display(&mut self) {
        self.display.clear();
    }

    pub fn deck(&self) -> &SharedDeck {
        &self.deck
    }

    pub fn open_hand(&self) -> &OpenHand {
        &self.open_hand
    }

    pub fn modus_input(&self) -> &str {
        &self.modus_input
    }

    pub fn set_modus_input(&mut self, input: impl Into<String>) {
        self.modus_input = input.into();
    }

    pub fn take_modus_input(&mut self) -> String {
        std::mem::take(&mut self.modus_input)
    }

    /// Installs `next` as the only pending continuation, returning the one it displaced.
    pub fn set_redirector(&mut self, next: Continuation) -> Option<Continuation> {
        self.redirector.replace(next)
    }

    pub fn take_redirector(&mut self) -> Option<Continuation> {
        self.redirector.take()
    }

    pub fn clear_redirector(&mut self) {
        self.redirector = None;
    }

    pub fn pending(&self) -> Option<&Continuation> {
        self.redirector.as_ref()
    }

    /// Flags that the modus' storage changed, so the deck and display are
    /// refreshed once the command finishes.
    pub fn mark_changed(&mut self) {
        self.storage_changed = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.storage_changed)
    }
}

impl fmt::Debug for ModusBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModusBuffer")
            .field("deck", &self.deck.len())
            .field("open_hand", &self.open_hand.len())
            .field("modus_input", &self.modus_input)
            .field("redirector", &self.redirector)
            .field("storage_changed", &self.storage_changed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DisplayBuffer, TextLog};

    #[test]
    fn redirector_is_single_slot() {
        let mut buffer = ModusBuffer::new(DisplayBuffer::new(), TextLog::new());
        assert!(buffer.set_redirector(Continuation::Load).is_none());
        let displaced = buffer.set_redirector(Continuation::Step {
            step: "manualLoad".to_string(),
            data: vec!["0".to_string()],
        });
        assert_eq!(displaced, Some(Continuation::Load));
        assert!(matches!(buffer.take_redirector(), Some(Continuation::Step { .. })));
        assert!(buffer.take_redirector().is_none());
    }

    #[test]
    fn writes_reach_the_shared_log() {
        let log = TextLog::new();
        let mut buffer = ModusBuffer::new(DisplayBuffer::new(), log.clone());
        buffer.write("a");
        buffer.writeln("b");
        assert_eq!(log.contents(), "ab\n");
    }

    #[test]
    fn change_flag_is_taken_once() {
        let mut buffer = ModusBuffer::new(DisplayBuffer::new(), TextLog::new());
        assert!(!buffer.take_changed());
        buffer.mark_changed();
        buffer.mark_changed();
        assert!(buffer.take_changed());
        assert!(!buffer.take_changed());
    }
}
