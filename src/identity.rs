//! Identity index: the arena of accepted entries plus the id -> owner map.
//!
//! Every id token is owned by exactly one entry. When two records claim the
//! same token the conflict is resolved as follows:
//!
//! - a genuine primary id beats any secondary claim on it, and the losing
//!   entry has the alias removed from its identity list;
//! - between two secondary claims the earlier-loaded entry keeps the token;
//! - a second record with an already-loaded primary id is a hard duplicate
//!   and is rejected.

use crate::entry::CatalogEntry;
use rustc_hash::FxHashMap;

/// Stable handle of an entry inside an [`IdentityIndex`]: its arena position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHandle(usize);

impl EntryHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outcome of registering an entry's identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The entry was stored under the returned handle.
    Accepted(EntryHandle),
    /// The entry's primary id already belongs to another entry's primary id;
    /// nothing was stored.
    Duplicate(String),
}

impl Registration {
    /// The colliding id of a hard duplicate, if any.
    pub fn collision(&self) -> Option<&str> {
        match self {
            Registration::Accepted(_) => None,
            Registration::Duplicate(id) => Some(id),
        }
    }
}

/// How an id collided during a non-mutating report scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionKind {
    /// Primary id equals an earlier entry's primary id; the record is skipped.
    PrimaryDuplicate,
    /// An id is already held by a different entry (as primary or alias).
    CrossEvent,
}

/// A single id collision recorded by [`IdentityIndex::register_identities_report`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdCollision {
    pub kind: CollisionKind,
    /// The contested id token
    pub id: String,
    /// Primary id of the entry that already holds the token
    pub existing_primary: String,
    /// Primary id of the record being registered
    pub incoming_primary: String,
}

#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    entries: Vec<CatalogEntry>,
    owners: FxHashMap<String, EntryHandle>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry`, resolving id conflicts against entries already stored.
    ///
    /// Earlier entries may lose aliases to the newcomer's primary id; the
    /// newcomer loses any alias already held by someone else.
    pub fn register_identities(&mut self, mut entry: CatalogEntry) -> Registration {
        let primary = entry.primary_id().to_string();

        if let Some(&owner) = self.owners.get(&primary) {
            let other = &mut self.entries[owner.index()];
            if other.primary_id() == primary {
                log::debug!("Skipping duplicate event {}", primary);
                return Registration::Duplicate(primary);
            }
            other.remove_alias(&primary);
            log::debug!(
                "Primary id {} reclaimed from alias list of {}",
                primary,
                other.primary_id()
            );
        }

        let owners = &self.owners;
        entry.retain_aliases(|alias| {
            let taken = owners.contains_key(alias);
            if taken {
                log::debug!("Alias {} of {} already claimed, dropping", alias, primary);
            }
            !taken
        });

        self.store(entry)
    }

    /// Register `entry` without touching existing entries, recording every id
    /// that is already taken.
    ///
    /// Ids that are free get indexed to the new entry; taken ids keep their
    /// current owner. A primary-vs-primary duplicate is recorded and the
    /// record is not stored.
    pub fn register_identities_report(
        &mut self,
        entry: CatalogEntry,
        collisions: &mut Vec<IdCollision>,
    ) -> Registration {
        let primary = entry.primary_id().to_string();

        if let Some(&owner) = self.owners.get(&primary) {
            let existing = self.entries[owner.index()].primary_id();
            if existing == primary {
                collisions.push(IdCollision {
                    kind: CollisionKind::PrimaryDuplicate,
                    id: primary.clone(),
                    existing_primary: existing.to_string(),
                    incoming_primary: primary.clone(),
                });
                return Registration::Duplicate(primary);
            }
        }

        let handle = self.next_handle();
        for id in entry.ids() {
            match self.owners.get(id) {
                Some(&owner) => collisions.push(IdCollision {
                    kind: CollisionKind::CrossEvent,
                    id: id.clone(),
                    existing_primary: self.entries[owner.index()].primary_id().to_string(),
                    incoming_primary: primary.clone(),
                }),
                None => {
                    self.owners.insert(id.clone(), handle);
                }
            }
        }
        self.entries.push(entry);
        Registration::Accepted(handle)
    }

    fn store(&mut self, entry: CatalogEntry) -> Registration {
        let handle = self.next_handle();
        for id in entry.ids() {
            self.owners.insert(id.clone(), handle);
        }
        self.entries.push(entry);
        Registration::Accepted(handle)
    }

    fn next_handle(&self) -> EntryHandle {
        EntryHandle(self.entries.len())
    }

    /// Handle of the entry owning `id`.
    pub fn owner_of(&self, id: &str) -> Option<EntryHandle> {
        self.owners.get(id).copied()
    }

    /// Entry owning `id`.
    pub fn resolve(&self, id: &str) -> Option<&CatalogEntry> {
        self.owner_of(id).map(|handle| self.get(handle))
    }

    pub fn get(&self, handle: EntryHandle) -> &CatalogEntry {
        &self.entries[handle.index()]
    }

    /// Stored entries in registration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn handles(&self) -> impl Iterator<Item = EntryHandle> + '_ {
        (0..self.entries.len()).map(EntryHandle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of indexed id tokens.
    pub fn id_count(&self) -> usize {
        self.owners.len()
    }
}
