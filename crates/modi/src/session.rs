use crate::register_builtin_modi;
use sylladex_core::{
    CandidateSource, ConfigError, Dispatch, DisplayBuffer, ModusBuffer, ModusContainer,
    ModusRegistry, SylladexConfig, TextLog,
};
use sylladex_modding::NamespaceListing;

/// A container wired to in-memory text and display sinks, ready for a host
/// to feed lines into.
pub struct Session {
    pub container: ModusContainer,
    pub log: TextLog,
    pub display: DisplayBuffer,
}

impl Session {
    pub fn open(config: &SylladexConfig) -> Result<Self, ConfigError> {
        let mut registry = ModusRegistry::new();
        register_builtin_modi(&mut registry)?;
        let candidates = match &config.modi_source {
            Some(path) => {
                let listing = NamespaceListing::locate(path)?;
                tracing::info!(source = %path.display(), "restricting modi to namespace");
                registry.candidates(Some(&listing as &dyn CandidateSource))?
            }
            None => registry.candidates(None)?,
        };
        let log = TextLog::new();
        let display = DisplayBuffer::new();
        let buffer = ModusBuffer::new(display.clone(), log.clone());
        let mut container =
            ModusContainer::new(buffer, candidates)?.with_save_file(&config.save_file);
        if let Some(name) = config.default_modus.as_deref() {
            match container.select_modus(name) {
                Ok(()) => {
                    let _ = container.request_draw();
                }
                Err(err) => tracing::warn!(modus = name, error = %err, "default modus not selected"),
            }
        }
        Ok(Self {
            container,
            log,
            display,
        })
    }

    /// Feeds one line and returns the dispatch outcome with the text it produced.
    pub fn submit(&mut self, line: &str) -> (Dispatch, String) {
        let dispatch = self.container.handle_input(line);
        (dispatch, self.log.drain())
    }

    /// Plain-text rendering of whatever the modus last drew.
    pub fn render(&self) -> Option<String> {
        self.display.current().map(|view| view.render_text())
    }
}
