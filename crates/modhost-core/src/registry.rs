//! Loader-owned registry of currently enabled units.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::ModuleDescriptor;

/// Identity handle for a loaded unit.
///
/// Identity, not descriptor equality: two units with identical name and
/// author are still distinct entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ModuleId(u64);

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// What the registry knows about one loaded unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// The unit's descriptor.
    pub descriptor: ModuleDescriptor,

    /// Path of the originating archive.
    pub archive: PathBuf,

    /// When the unit was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// Mapping from loaded unit to its descriptor.
///
/// Mutated only by the loader; every entry was produced by a successful
/// load, and `unload_modules` clears the whole registry rather than
/// removing individual entries. Read accessors hand out copies so callers
/// cannot corrupt loader state.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: HashMap<ModuleId, ModuleRecord>,
    next_id: u64,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the identity for a unit about to be registered.
    pub(crate) fn allocate(&mut self) -> ModuleId {
        self.next_id += 1;
        ModuleId(self.next_id)
    }

    pub(crate) fn insert(&mut self, id: ModuleId, descriptor: ModuleDescriptor, archive: PathBuf) {
        self.entries.insert(
            id,
            ModuleRecord {
                descriptor,
                archive,
                loaded_at: Utc::now(),
            },
        );
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no units are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the given unit is registered.
    pub fn contains(&self, id: ModuleId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Copy of the descriptor for a unit.
    pub fn descriptor(&self, id: ModuleId) -> Option<ModuleDescriptor> {
        self.entries.get(&id).map(|record| record.descriptor.clone())
    }

    /// Originating archive path for a unit.
    pub fn archive(&self, id: ModuleId) -> Option<PathBuf> {
        self.entries.get(&id).map(|record| record.archive.clone())
    }

    /// Snapshot of all descriptors, keyed by unit identity.
    pub fn snapshot(&self) -> HashMap<ModuleId, ModuleDescriptor> {
        self.entries
            .iter()
            .map(|(id, record)| (*id, record.descriptor.clone()))
            .collect()
    }

    /// Snapshot of all records, keyed by unit identity.
    pub fn records(&self) -> HashMap<ModuleId, ModuleRecord> {
        self.entries.clone()
    }
}
