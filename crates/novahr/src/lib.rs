//! `novahr` - Local-first HR administration
//!
//! This library keeps employees, leave requests, documents, the activity feed
//! and the user-editable type lists in a single key/value storage area, and
//! derives the dashboard and report figures from them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod collections;
pub mod config;
pub mod error;
pub mod forms;
pub mod hr;
pub mod keys;
pub mod lists;
pub mod logging;
pub mod model;
pub mod notify;
pub mod refresh;
pub mod stats;
pub mod storage;
pub mod store;

pub use collections::{ActivityLog, Collection, Record};
pub use config::Config;
pub use error::{Error, Result};
pub use forms::{DocumentForm, EmployeeForm, LeaveForm};
pub use hr::{DocumentStore, EmployeeStore, LeaveStore, Workspace};
pub use lists::{ListKind, ListRegistry, ListView};
pub use logging::init_logging;
pub use model::{
    ActivityDraft, Document, Employee, EmployeeStatus, LeaveRequest, LeaveStatus,
    RecentActivityItem,
};
pub use notify::{StorageEvent, Subscription};
pub use storage::{Storage, StorageStats};
pub use store::KeyedStore;
