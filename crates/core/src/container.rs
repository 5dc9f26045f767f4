use crate::{
    ActiveModus, Candidate, Card, CommandMap, ConfigError, ModusBuffer, RequestError,
    DEFAULT_SAVE_FILE,
};
use std::path::{Path, PathBuf};

mod builtins;
mod dispatch;

pub use builtins::HostHandler;

/// Prefix addressing the active modus' commands.
pub const MODUS_PREFIX: &str = "modus.";
/// Prefix addressing the container's own commands.
pub const SYLL_PREFIX: &str = "syll.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Unloaded,
    Active,
    Recovering,
}

/// Outcome of one `handle_input` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not addressed to this container.
    Ignored,
    /// Addressed to a modus but none is selected, or input is disabled.
    Rejected,
    Executed,
    /// A pending continuation consumed the input.
    Resumed,
    Failed(crate::ErrorKind),
    /// A fatal failure was handled by resetting the modus.
    Recovered,
    /// The reset failed too; the modus was unloaded.
    Catastrophic,
}

/// Owns the active modus and routes every submitted line.
pub struct ModusContainer {
    active: Option<Box<dyn ActiveModus>>,
    active_candidate: Option<Candidate>,
    candidates: Vec<Candidate>,
    buffer: ModusBuffer,
    state: ContainerState,
    input_enabled: bool,
    host_commands: CommandMap<HostHandler>,
    save_file: PathBuf,
}

impl ModusContainer {
    pub fn new(buffer: ModusBuffer, candidates: Vec<Candidate>) -> Result<Self, ConfigError> {
        Ok(Self {
            active: None,
            active_candidate: None,
            candidates,
            buffer,
            state: ContainerState::Unloaded,
            input_enabled: true,
            host_commands: builtins::host_command_map()?,
            save_file: PathBuf::from(DEFAULT_SAVE_FILE),
        })
    }

    pub fn with_save_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_file = crate::normalize_save_path(path);
        self
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn buffer(&self) -> &ModusBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ModusBuffer {
        &mut self.buffer
    }

    pub fn save_file(&self) -> &Path {
        &self.save_file
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|modus| modus.name())
    }

    pub fn active_commands(&self) -> Vec<String> {
        self.active
            .as_ref()
            .map(|modus| modus.command_names())
            .unwrap_or_default()
    }

    pub fn host_command_names(&self) -> Vec<String> {
        self.host_commands.names().map(str::to_string).collect()
    }

    pub fn candidate_ids(&self) -> Vec<&'static str> {
        self.candidates.iter().map(Candidate::id).collect()
    }

    fn find_candidate(&self, id: &str) -> Option<Candidate> {
        self.candidates
            .iter()
            .find(|candidate| candidate.id() == id)
            .or_else(|| {
                self.candidates
                    .iter()
                    .find(|candidate| candidate.id().eq_ignore_ascii_case(id))
            })
            .copied()
    }

    /// Makes `id` the active modus. On failure the previous modus, if any,
    /// stays active. Any pending continuation is dropped either way.
    pub fn select_modus(&mut self, id: &str) -> Result<(), ConfigError> {
        let result = self.try_select(id);
        self.buffer.clear_redirector();
        self.buffer.take_modus_input();
        result
    }

    fn try_select(&mut self, id: &str) -> Result<(), ConfigError> {
        let candidate = self
            .find_candidate(id)
            .ok_or_else(|| ConfigError::UnknownModus(id.to_string()))?;
        if !candidate.runnable() {
            return Err(ConfigError::NotRunnable(candidate.id().to_string()));
        }
        let modus = candidate.instantiate().map_err(|err| {
            tracing::error!(id = candidate.id(), error = %err, "modus selection failed");
            err
        })?;
        tracing::info!(id = candidate.id(), "modus selected");
        self.active = Some(modus);
        self.active_candidate = Some(candidate);
        self.state = ContainerState::Active;
        self.input_enabled = true;
        Ok(())
    }

    /// Replaces the active modus with a freshly constructed one of the same type.
    pub fn reset_modus(&mut self) -> Result<(), ConfigError> {
        let result = self.try_reset();
        self.buffer.clear_redirector();
        self.buffer.take_modus_input();
        result
    }

    fn try_reset(&mut self) -> Result<(), ConfigError> {
        let candidate = self
            .active_candidate
            .ok_or(ConfigError::Request(RequestError::NoModusSelected))?;
        let modus = candidate.instantiate()?;
        tracing::info!(id = candidate.id(), "modus reset");
        self.active = Some(modus);
        Ok(())
    }

    pub fn request_save(&mut self) -> Result<Vec<Card>, RequestError> {
        let modus = self.active.as_mut().ok_or(RequestError::NoModusSelected)?;
        Ok(modus.save(&mut self.buffer))
    }

    /// Runs the modus' load routine inside the usual error handling.
    pub fn request_load(&mut self) -> Result<Dispatch, RequestError> {
        let modus = self.active.as_mut().ok_or(RequestError::NoModusSelected)?;
        let result = modus.load(&mut self.buffer);
        if result.is_ok() {
            self.sync();
        }
        Ok(self.settle(result, Dispatch::Executed, None))
    }

    pub fn request_draw(&mut self) -> Result<(), RequestError> {
        let modus = self.active.as_mut().ok_or(RequestError::NoModusSelected)?;
        modus.draw(&mut self.buffer);
        Ok(())
    }

    pub fn request_description(&self) -> Result<String, RequestError> {
        self.active
            .as_ref()
            .map(|modus| modus.description())
            .ok_or(RequestError::NoModusSelected)
    }

    /// The host's surface changed size; only a redraw is needed.
    pub fn on_display_resized(&mut self, width: u16, height: u16) {
        tracing::trace!(width, height, "display resized");
        let _ = self.request_draw();
    }
}
