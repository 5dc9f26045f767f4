use crate::fuzzy::find_closest;
use crate::ConfigError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CommandEntry<V> {
    pub handler: V,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    Fuzzy,
    Default,
}

#[derive(Debug)]
pub struct Resolved<'a, V> {
    /// Registered spelling of the command, `None` for the default entry.
    pub key: Option<&'a str>,
    pub entry: &'a CommandEntry<V>,
    pub lookup: Lookup,
}

/// Insertion-ordered command table with case-insensitive keys and an
/// optional catch-all entry.
#[derive(Debug, Clone)]
pub struct CommandMap<V> {
    entries: Vec<(String, CommandEntry<V>)>,
    folded: HashMap<String, usize>,
    default: Option<CommandEntry<V>>,
}

impl<V> Default for CommandMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            folded: HashMap::new(),
            default: None,
        }
    }
}

impl<V> CommandMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Re-registering the identical spelling overwrites and
    /// returns the previous entry; a different spelling of an existing key fails.
    pub fn put(
        &mut self,
        name: &str,
        handler: V,
        description: &str,
    ) -> Result<Option<CommandEntry<V>>, ConfigError> {
        let entry = CommandEntry {
            handler,
            description: description.to_string(),
        };
        let key = name.to_lowercase();
        if let Some(&pos) = self.folded.get(&key) {
            let existing = &self.entries[pos].0;
            if existing != name {
                return Err(ConfigError::DuplicateCommand {
                    existing: existing.clone(),
                    new: name.to_string(),
                });
            }
            let previous = std::mem::replace(&mut self.entries[pos].1, entry);
            return Ok(Some(previous));
        }
        self.folded.insert(key, self.entries.len());
        self.entries.push((name.to_string(), entry));
        Ok(None)
    }

    pub fn set_default(&mut self, handler: V, description: &str) -> Option<CommandEntry<V>> {
        self.default.replace(CommandEntry {
            handler,
            description: description.to_string(),
        })
    }

    pub fn default_entry(&self) -> Option<&CommandEntry<V>> {
        self.default.as_ref()
    }

    /// Registered key and entry for `name`, ignoring case. Does not fall back.
    pub fn lookup(&self, name: &str) -> Option<(&str, &CommandEntry<V>)> {
        let pos = *self.folded.get(&name.to_lowercase())?;
        let (key, entry) = &self.entries[pos];
        Some((key.as_str(), entry))
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry<V>> {
        self.lookup(name)
            .map(|(_, entry)| entry)
            .or(self.default.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.folded.contains_key(&name.to_lowercase())
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.get(name).map(|entry| entry.description.as_str())
    }

    /// Exact key, then nearest key by edit distance, then the default entry.
    pub fn resolve(&self, name: &str) -> Option<Resolved<'_, V>> {
        if let Some((key, entry)) = self.lookup(name) {
            return Some(Resolved {
                key: Some(key),
                entry,
                lookup: Lookup::Exact,
            });
        }
        let names: Vec<&str> = self.names().collect();
        if let Some(hit) = find_closest(&names, name) {
            let (key, entry) = &self.entries[hit.index];
            return Some(Resolved {
                key: Some(key.as_str()),
                entry,
                lookup: Lookup::Fuzzy,
            });
        }
        self.default.as_ref().map(|entry| Resolved {
            key: None,
            entry,
            lookup: Lookup::Default,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandEntry<V>)> + '_ {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        let named_ok = self.entries.iter().all(|(name, entry)| {
            !name.trim().is_empty() && !entry.description.trim().is_empty()
        });
        let default_ok = self
            .default
            .as_ref()
            .map_or(true, |entry| !entry.description.trim().is_empty());
        named_ok && default_ok
    }
}
