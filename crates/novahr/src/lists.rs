//! User-editable type lists: departments, leave types and document types.
//!
//! Each list is seeded with its defaults the first time it is read. Writes
//! replace the whole list and notify every [`ListView`] so open views pick up
//! the change without restarting. Nothing checks for duplicates or for
//! records still referring to a removed entry.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::ListsConfig;
use crate::error::{Error, Result};
use crate::keys;
use crate::notify::Subscription;
use crate::storage::Storage;
use crate::store::KeyedStore;

/// One of the three dynamic lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Departments employees belong to.
    Departments,
    /// Kinds of leave that can be requested.
    LeaveTypes,
    /// Kinds of document that can be uploaded.
    DocumentTypes,
}

impl ListKind {
    /// All kinds, in display order.
    pub const ALL: [ListKind; 3] = [Self::Departments, Self::LeaveTypes, Self::DocumentTypes];

    /// Storage key holding this list.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Departments => keys::DEPARTMENTS,
            Self::LeaveTypes => keys::LEAVE_TYPES,
            Self::DocumentTypes => keys::DOCUMENT_TYPES,
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Departments => write!(f, "departments"),
            Self::LeaveTypes => write!(f, "leave types"),
            Self::DocumentTypes => write!(f, "document types"),
        }
    }
}

/// Reads and writes the dynamic lists.
#[derive(Debug, Clone)]
pub struct ListRegistry {
    storage: Arc<Storage>,
    defaults: ListsConfig,
}

impl ListRegistry {
    /// Create a registry seeding lists from `defaults`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, defaults: ListsConfig) -> Self {
        Self { storage, defaults }
    }

    /// The storage area behind the registry.
    #[must_use]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Seed values for `kind`.
    #[must_use]
    pub fn defaults(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Departments => &self.defaults.departments,
            ListKind::LeaveTypes => &self.defaults.leave_types,
            ListKind::DocumentTypes => &self.defaults.document_types,
        }
    }

    /// Read the list stored under `key`.
    ///
    /// An absent key, or an empty stored string, is seeded with `fallback`,
    /// which is returned. A stored value that is not an array of strings, or a
    /// storage failure, also yields `fallback` but leaves storage untouched.
    #[must_use]
    pub fn read_list(&self, key: &str, fallback: &[String]) -> Vec<String> {
        match self.storage.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, "Stored list is not an array of strings: {e}");
                fallback.to_vec()
            }),
            Ok(_) => {
                debug!(key, "seeding list with defaults");
                if let Err(e) = self.storage.set_item(key, &to_json(fallback)) {
                    error!(key, "Error seeding list: {e}");
                }
                fallback.to_vec()
            }
            Err(e) => {
                error!(key, "Error reading list: {e}");
                fallback.to_vec()
            }
        }
    }

    /// Replace the list stored under `key` and notify listening views.
    ///
    /// Nothing is published if the write fails.
    pub fn write_list(&self, key: &str, values: &[String]) {
        let store: KeyedStore<Vec<String>> = KeyedStore::new(Arc::clone(&self.storage), key);
        if let Some(raw) = store.set(&values.to_vec()) {
            self.storage.notify(key, Some(raw));
        }
    }

    /// Current contents of `kind`, seeding on first read.
    #[must_use]
    pub fn get(&self, kind: ListKind) -> Vec<String> {
        self.read_list(kind.key(), self.defaults(kind))
    }

    /// Replace the contents of `kind`.
    pub fn set(&self, kind: ListKind, values: &[String]) {
        self.write_list(kind.key(), values);
    }

    /// Append a trimmed entry. Blank input is ignored; duplicates are not.
    ///
    /// Returns the list as written, or `None` if nothing changed.
    pub fn add(&self, kind: ListKind, value: &str) -> Option<Vec<String>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let mut values = self.get(kind);
        values.push(value.to_string());
        self.set(kind, &values);
        Some(values)
    }

    /// Drop every entry equal to `value` and write the result back.
    ///
    /// The list is rewritten even when nothing matched.
    pub fn remove(&self, kind: ListKind, value: &str) -> Vec<String> {
        let mut values = self.get(kind);
        values.retain(|v| v != value);
        self.set(kind, &values);
        values
    }
}

fn to_json(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// A view's in-memory copy of one list, kept current through change events.
///
/// A view may also hold a selected entry, as a form's picker does. When a
/// refresh removes the selected entry the selection moves to the first one.
#[derive(Debug)]
pub struct ListView {
    registry: ListRegistry,
    kind: ListKind,
    values: Vec<String>,
    selected: Option<String>,
    subscription: Subscription,
}

impl ListView {
    /// Open a view on `kind` with the first entry selected.
    #[must_use]
    pub fn open(registry: ListRegistry, kind: ListKind) -> Self {
        // Subscribe before reading so no write can slip in between
        let subscription = registry.storage().subscribe();
        let values = registry.get(kind);
        let selected = values.first().cloned();
        Self {
            registry,
            kind,
            values,
            selected,
            subscription,
        }
    }

    /// Which list this view shows.
    #[must_use]
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// The in-memory copy.
    #[must_use]
    pub fn current(&self) -> &[String] {
        &self.values
    }

    /// The selected entry, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select an entry. Values outside the list are accepted.
    pub fn select(&mut self, value: impl Into<String>) {
        self.selected = Some(value.into());
    }

    /// Select an entry as a form submission would.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the list is not empty and does not
    /// contain `value`; the selection is unchanged.
    pub fn choose(&mut self, value: &str) -> Result<()> {
        if !self.values.is_empty() && !self.values.iter().any(|v| v == value) {
            return Err(Error::validation(format!(
                "'{value}' is not one of the {}",
                self.kind
            )));
        }
        self.selected = Some(value.to_string());
        Ok(())
    }

    /// Apply pending change events.
    ///
    /// Returns `true` if the list was re-read.
    pub fn refresh(&mut self) -> bool {
        let pending = self.subscription.drain();
        if !pending.affects(self.kind.key()) {
            return false;
        }

        self.values = self.registry.get(self.kind);
        let still_valid = self
            .selected
            .as_ref()
            .is_some_and(|s| self.values.contains(s));
        if !still_valid && !self.values.is_empty() {
            self.selected = self.values.first().cloned();
        }
        debug!(kind = %self.kind, len = self.values.len(), "list view refreshed");
        true
    }
}
