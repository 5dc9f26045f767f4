//! Host-side collaborators the core writes to.

use crate::InventoryView;
use std::sync::{Arc, Mutex, PoisonError};

pub trait TextOutput: Send {
    fn append_text(&mut self, text: &str);
}

pub trait DisplaySurface: Send {
    fn clear(&mut self);
    fn show(&mut self, view: InventoryView);
}

/// Accumulated output text, shared with whoever renders it.
#[derive(Debug, Clone, Default)]
pub struct TextLog {
    text: Arc<Mutex<String>>,
}

impl TextLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns everything written since the last call and empties the log.
    pub fn drain(&self) -> String {
        std::mem::take(&mut *self.text.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TextOutput for TextLog {
    fn append_text(&mut self, text: &str) {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub view: Option<InventoryView>,
    pub draws: usize,
}

/// Last view shown plus a redraw counter.
#[derive(Debug, Clone, Default)]
pub struct DisplayBuffer {
    state: Arc<Mutex<DisplayState>>,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<InventoryView> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .view
            .clone()
    }

    pub fn draws(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .draws
    }
}

impl DisplaySurface for DisplayBuffer {
    fn clear(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .view = None;
    }

    fn show(&mut self, view: InventoryView) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.view = Some(view);
        state.draws += 1;
    }
}
