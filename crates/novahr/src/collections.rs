//! Whole-collection stores for employees, leave requests, documents and the
//! activity feed.
//!
//! Every mutation loads the full collection, changes it in memory and writes
//! the full collection back. Collections are independent: nothing is atomic
//! across them, and records in one may refer to ids that no longer exist in
//! another.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::ActivityConfig;
use crate::error::{Error, Result};
use crate::keys;
use crate::model::{
    timestamp_id, ActivityDraft, Document, Employee, EmployeeStatus, LeaveRequest,
    RecentActivityItem,
};
use crate::storage::Storage;
use crate::store::KeyedStore;

/// A record kept in a [`Collection`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Storage key of the collection.
    const KEY: &'static str;
    /// Singular name used in messages.
    const NAME: &'static str;

    /// The record's identifier.
    fn id(&self) -> &str;
}

impl Record for Employee {
    const KEY: &'static str = keys::EMPLOYEES;
    const NAME: &'static str = "employee";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for LeaveRequest {
    const KEY: &'static str = keys::LEAVE;
    const NAME: &'static str = "leave request";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Document {
    const KEY: &'static str = keys::DOCUMENTS;
    const NAME: &'static str = "document";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An ordered collection of records stored under one key.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    store: KeyedStore<Vec<T>>,
    seed: Vec<T>,
}

impl<T: Record> Collection<T> {
    /// A collection that starts out as `seed` when nothing is stored.
    #[must_use]
    pub fn new(storage: Arc<Storage>, seed: Vec<T>) -> Self {
        Self {
            store: KeyedStore::new(storage, T::KEY),
            seed,
        }
    }

    /// Read the stored records, falling back to the seed without writing it.
    #[must_use]
    pub fn read(&self) -> Vec<T> {
        self.store.get().unwrap_or_else(|| self.seed.clone())
    }

    /// Read the stored records, writing the seed first if nothing usable is stored.
    #[must_use]
    pub fn load(&self) -> Vec<T> {
        if let Some(records) = self.store.get() {
            return records;
        }
        debug!(key = T::KEY, "seeding collection");
        self.store.set(&self.seed);
        self.seed.clone()
    }

    /// Replace the stored collection.
    pub fn replace_all(&self, records: Vec<T>) -> Vec<T> {
        self.store.set(&records);
        records
    }

    /// Find the first record with `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<T> {
        self.load().into_iter().find(|r| r.id() == id)
    }

    /// Put `record` at the front of the collection.
    pub fn prepend(&self, record: T) -> T {
        let mut records = self.load();
        records.insert(0, record.clone());
        self.store.set(&records);
        record
    }

    /// Apply `change` to every record with `id`.
    ///
    /// Returns the first changed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`; nothing is written.
    pub fn update(&self, id: &str, mut change: impl FnMut(&mut T)) -> Result<T> {
        let mut records = self.load();
        let mut first = None;
        for record in records.iter_mut().filter(|r| r.id() == id) {
            change(record);
            if first.is_none() {
                first = Some(record.clone());
            }
        }
        let updated = first.ok_or_else(|| Error::not_found(T::NAME, id))?;
        self.store.set(&records);
        Ok(updated)
    }

    /// Remove every record with `id`.
    ///
    /// Returns the first removed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`; nothing is written.
    pub fn delete(&self, id: &str) -> Result<T> {
        let records = self.load();
        let (removed, kept): (Vec<T>, Vec<T>) = records.into_iter().partition(|r| r.id() == id);
        let first = removed
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(T::NAME, id))?;
        self.store.set(&kept);
        Ok(first)
    }
}

/// The activity feed: most recent first, capped in length.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    store: KeyedStore<Vec<RecentActivityItem>>,
    max_entries: usize,
    display_limit: usize,
}

impl ActivityLog {
    /// Create the log over `storage`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, config: &ActivityConfig) -> Self {
        Self {
            store: KeyedStore::new(storage, keys::ACTIVITY),
            max_entries: config.max_entries,
            display_limit: config.display_limit,
        }
    }

    /// Record an entry at the front of the feed and notify listening views.
    ///
    /// A missing `id` becomes `act-<millis>` and a missing `time` becomes
    /// `"agora"`. Entries beyond the cap are dropped from the end.
    pub fn push(&self, draft: ActivityDraft) -> RecentActivityItem {
        let entry = RecentActivityItem {
            id: draft.id.unwrap_or_else(|| timestamp_id("act")),
            user_name: draft.user_name,
            user_avatar: draft.user_avatar,
            action: draft.action,
            target: draft.target,
            time: draft.time.unwrap_or_else(|| "agora".to_string()),
        };

        let mut entries = self.store.get().unwrap_or_default();
        entries.insert(0, entry.clone());
        entries.truncate(self.max_entries);

        if let Some(raw) = self.store.set(&entries) {
            self.store.storage().notify(keys::ACTIVITY, Some(raw));
        }
        entry
    }

    /// Every stored entry, most recent first.
    #[must_use]
    pub fn all(&self) -> Vec<RecentActivityItem> {
        self.store.get().unwrap_or_default()
    }

    /// The entries shown in the feed.
    #[must_use]
    pub fn recent(&self) -> Vec<RecentActivityItem> {
        let mut entries = self.all();
        entries.truncate(self.display_limit);
        entries
    }
}

/// Employees present before anything has been stored.
#[must_use]
pub fn seed_employees() -> Vec<Employee> {
    let employee = |id: &str,
                    first: &str,
                    last: &str,
                    title: &str,
                    department: &str,
                    salary: f64,
                    (y, m, d): (i32, u32, u32),
                    status| Employee {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        job_title: title.to_string(),
        department: department.to_string(),
        salary,
        start_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        status,
    };

    vec![
        employee(
            "emp-1",
            "John",
            "Doe",
            "Software Engineer",
            "Engineering",
            100_000.0,
            (2023, 1, 15),
            EmployeeStatus::Active,
        ),
        employee(
            "emp-2",
            "Jane",
            "Smith",
            "Product Manager",
            "Product",
            120_000.0,
            (2022, 11, 20),
            EmployeeStatus::Active,
        ),
        employee(
            "emp-3",
            "Peter",
            "Jones",
            "Designer",
            "Design",
            90_000.0,
            (2023, 3, 10),
            EmployeeStatus::OnLeave,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeaveStatus;
    use chrono::Utc;

    fn storage() -> Arc<Storage> {
        Arc::new(Storage::open_in_memory().expect("failed to create test storage"))
    }

    fn leave(id: &str, name: &str) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            employee_id: "emp-1".to_string(),
            employee_name: name.to_string(),
            leave_type: "Férias".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            status: LeaveStatus::Pending,
            requested_at: Utc::now(),
        }
    }

    #[test]
    fn test_read_does_not_seed_storage() {
        let storage = storage();
        let employees = Collection::new(Arc::clone(&storage), seed_employees());

        assert_eq!(employees.read().len(), 3);
        assert!(storage.get_item(keys::EMPLOYEES).unwrap().is_none());
    }

    #[test]
    fn test_load_seeds_storage() {
        let storage = storage();
        let employees = Collection::new(Arc::clone(&storage), seed_employees());

        assert_eq!(employees.load().len(), 3);
        assert!(storage.get_item(keys::EMPLOYEES).unwrap().is_some());
    }

    #[test]
    fn test_stored_empty_collection_is_kept() {
        let employees = Collection::new(storage(), seed_employees());
        employees.replace_all(Vec::new());

        assert!(employees.load().is_empty());
    }

    #[test]
    fn test_corrupt_collection_is_reseeded() {
        let storage = storage();
        storage.set_item(keys::EMPLOYEES, "[{").unwrap();
        let employees = Collection::new(Arc::clone(&storage), seed_employees());

        assert_eq!(employees.load().len(), 3);
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let requests: Collection<LeaveRequest> = Collection::new(storage(), Vec::new());
        requests.prepend(leave("leave-1", "John Doe"));
        requests.prepend(leave("leave-2", "Jane Smith"));

        let ids: Vec<_> = requests.load().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["leave-2", "leave-1"]);
    }

    #[test]
    fn test_update_changes_record() {
        let requests: Collection<LeaveRequest> = Collection::new(storage(), Vec::new());
        requests.prepend(leave("leave-1", "John Doe"));

        let updated = requests
            .update("leave-1", |r| r.status = LeaveStatus::Approved)
            .unwrap();
        assert_eq!(updated.status, LeaveStatus::Approved);
        assert_eq!(
            requests.find("leave-1").map(|r| r.status),
            Some(LeaveStatus::Approved)
        );
    }

    #[test]
    fn test_update_applies_to_colliding_ids() {
        let requests: Collection<LeaveRequest> = Collection::new(storage(), Vec::new());
        requests.prepend(leave("leave-1", "John Doe"));
        requests.prepend(leave("leave-1", "Jane Smith"));

        requests
            .update("leave-1", |r| r.status = LeaveStatus::Rejected)
            .unwrap();
        assert!(requests
            .load()
            .iter()
            .all(|r| r.status == LeaveStatus::Rejected));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let requests: Collection<LeaveRequest> = Collection::new(storage(), Vec::new());
        let err = requests.update("leave-9", |_| {}).unwrap_err();
        assert!(err.to_string().contains("leave request record not found"));
    }

    #[test]
    fn test_delete_removes_record() {
        let employees = Collection::new(storage(), seed_employees());
        let removed = employees.delete("emp-2").unwrap();

        assert_eq!(removed.first_name, "Jane");
        assert!(employees.find("emp-2").is_none());
        assert_eq!(employees.load().len(), 2);
        assert!(employees.delete("emp-2").is_err());
    }

    #[test]
    fn test_activity_push_fills_defaults_and_notifies() {
        let storage = storage();
        let log = ActivityLog::new(Arc::clone(&storage), &ActivityConfig::default());
        let mut sub = storage.subscribe();

        let entry = log.push(ActivityDraft::admin("adicionou", "documento cv.pdf"));

        assert!(entry.id.starts_with("act-"));
        assert_eq!(entry.time, "agora");
        assert_eq!(log.all(), vec![entry]);
        assert!(sub.drain().affects(keys::ACTIVITY));
    }

    #[test]
    fn test_activity_most_recent_first_and_capped() {
        let config = ActivityConfig {
            max_entries: 100,
            display_limit: 50,
        };
        let log = ActivityLog::new(storage(), &config);

        for i in 0..105 {
            log.push(ActivityDraft {
                id: Some(format!("act-{i}")),
                ..ActivityDraft::admin("aprovou", format!("pedido {i}"))
            });
        }

        let all = log.all();
        assert_eq!(all.len(), 100);
        assert_eq!(all[0].id, "act-104");
        assert_eq!(all[99].id, "act-5");
        assert_eq!(log.recent().len(), 50);
    }

    #[test]
    fn test_activity_explicit_time_kept() {
        let log = ActivityLog::new(storage(), &ActivityConfig::default());
        let entry = log.push(ActivityDraft {
            time: Some("2 horas atrás".to_string()),
            ..ActivityDraft::admin("excluiu", "registro de John Doe")
        });
        assert_eq!(entry.time, "2 horas atrás");
    }

    #[test]
    fn test_seed_employees() {
        let seed = seed_employees();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed[0].email, "john.doe@example.com");
        assert_eq!(seed[2].status, EmployeeStatus::OnLeave);
    }
}
