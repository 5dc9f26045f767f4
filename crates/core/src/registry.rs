use crate::modus::{type_identity, ActiveModus, Metadata, Modus};
use crate::ConfigError;
use std::collections::BTreeMap;
use std::fmt;

/// Entries in a namespace listing that name a modus end with this extension.
pub const MODUS_ENTRY_EXTENSION: &str = "modus";

pub type Constructor = fn() -> Result<Box<dyn ActiveModus>, ConfigError>;

/// One registered modus type: its identity, runnable flag and constructor.
#[derive(Clone, Copy)]
pub struct Candidate {
    id: &'static str,
    runnable: bool,
    construct: Constructor,
}

impl Candidate {
    pub fn of<M: Modus>() -> Self {
        Self {
            id: type_identity::<M>(),
            runnable: M::RUNNABLE,
            construct: instantiate_boxed::<M>,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn runnable(&self) -> bool {
        self.runnable
    }

    pub fn instantiate(&self) -> Result<Box<dyn ActiveModus>, ConfigError> {
        (self.construct)()
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("id", &self.id)
            .field("runnable", &self.runnable)
            .finish()
    }
}

/// Builds a fresh instance of `M` and checks what it reports about itself.
pub fn instantiate<M: Modus>() -> Result<Metadata<M>, ConfigError> {
    let actual = type_identity::<M>();
    let reference = M::create().map_err(|err| match err {
        ConfigError::Construction { .. } => err,
        other => ConfigError::Construction {
            name: actual.to_string(),
            reason: other.to_string(),
        },
    })?;
    let descriptor = reference.descriptor()?;
    if descriptor.name.trim().is_empty() || descriptor.name != actual {
        return Err(ConfigError::NameMismatch {
            declared: descriptor.name,
            actual: actual.to_string(),
        });
    }
    if !descriptor.commands.is_valid() {
        return Err(ConfigError::InvalidCommandMap(descriptor.name));
    }
    Ok(Metadata::new(descriptor.name, reference, descriptor.commands))
}

fn instantiate_boxed<M: Modus>() -> Result<Box<dyn ActiveModus>, ConfigError> {
    Ok(Box::new(instantiate::<M>()?))
}

/// A listing of entry names, e.g. a directory or an archive.
pub trait CandidateSource {
    fn entries(&self) -> Result<Vec<String>, ConfigError>;
}

/// Registration table replacing runtime type scanning.
#[derive(Debug, Default, Clone)]
pub struct ModusRegistry {
    table: BTreeMap<String, Candidate>,
}

impl ModusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Modus>(&mut self) -> Result<(), ConfigError> {
        self.register_candidate(Candidate::of::<M>())
    }

    pub fn register_candidate(&mut self, candidate: Candidate) -> Result<(), ConfigError> {
        if self.table.contains_key(candidate.id) {
            return Err(ConfigError::DuplicateModus(candidate.id.to_string()));
        }
        tracing::debug!(id = candidate.id, runnable = candidate.runnable, "registered modus");
        self.table.insert(candidate.id.to_string(), candidate);
        Ok(())
    }

    /// Every registered identifier in lexicographic order.
    pub fn discover(&self) -> Vec<String> {
        self.table.keys().cloned().collect()
    }

    /// Identifiers named by `<Name>.modus` entries of `source`, sorted and
    /// deduplicated. Other entries are ignored.
    pub fn discover_from(&self, source: &dyn CandidateSource) -> Result<Vec<String>, ConfigError> {
        let mut ids: Vec<String> = source
            .entries()?
            .iter()
            .filter_map(|entry| entry_identifier(entry))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Looks up an identifier. Unknown names are logged and skipped.
    pub fn resolve(&self, id: &str) -> Option<Candidate> {
        if let Some(candidate) = self.table.get(id) {
            return Some(*candidate);
        }
        let found = self
            .table
            .values()
            .find(|candidate| candidate.id.eq_ignore_ascii_case(id))
            .copied();
        if found.is_none() {
            tracing::warn!(id, "skipping unknown modus candidate");
        }
        found
    }

    pub fn validate(&self, candidate: &Candidate) -> bool {
        if !candidate.runnable {
            tracing::info!(id = candidate.id, "modus is not flagged runnable; skipping");
        }
        candidate.runnable
    }

    /// Resolves and validates `ids`, keeping the runnable ones in order.
    pub fn runnable(&self, ids: &[String]) -> Vec<Candidate> {
        ids.iter()
            .filter_map(|id| self.resolve(id))
            .filter(|candidate| self.validate(candidate))
            .collect()
    }

    /// Runnable candidates from `source`, or from the whole table when absent.
    pub fn candidates(
        &self,
        source: Option<&dyn CandidateSource>,
    ) -> Result<Vec<Candidate>, ConfigError> {
        let ids = match source {
            Some(source) => self.discover_from(source)?,
            None => self.discover(),
        };
        let runnable = self.runnable(&ids);
        if runnable.is_empty() {
            return Err(ConfigError::NoRunnableModi);
        }
        Ok(runnable)
    }
}

/// `modi/PentaFile.modus` -> `PentaFile`.
fn entry_identifier(entry: &str) -> Option<String> {
    let name = entry.rsplit(['/', '\\']).next().unwrap_or(entry);
    let (stem, extension) = name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case(MODUS_ENTRY_EXTENSION) || stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}
