//! Periodic re-reading of the employee and leave collections.
//!
//! Views that show derived figures do not subscribe to change events. They
//! re-read both collections in full on a fixed interval instead, so they also
//! see writes made by other processes sharing the storage file.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::collections::Collection;
use crate::model::{Employee, LeaveRequest};

/// Both collections as read at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Employees, or the seed if none are stored.
    pub employees: Vec<Employee>,
    /// Leave requests.
    pub leave_requests: Vec<LeaveRequest>,
    /// When the collections were read.
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// The local calendar day the snapshot was taken on.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.taken_at.with_timezone(&Local).date_naive()
    }
}

/// A cloneable handle that stops a running refresher.
#[derive(Debug, Clone, Default)]
pub struct RefreshHandle {
    stop_signal: Arc<AtomicBool>,
}

impl RefreshHandle {
    /// Create a handle in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the refresher to stop after its current tick.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// Re-reads employees and leave requests on every tick.
#[derive(Debug, Clone)]
pub struct Refresher {
    employees: Collection<Employee>,
    leave: Collection<LeaveRequest>,
    interval: Duration,
}

impl Refresher {
    /// Create a refresher over both collections.
    #[must_use]
    pub fn new(
        employees: Collection<Employee>,
        leave: Collection<LeaveRequest>,
        interval: Duration,
    ) -> Self {
        Self {
            employees,
            leave,
            interval,
        }
    }

    /// Read both collections now. Nothing is written, not even seed data.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employees: self.employees.read(),
            leave_requests: self.leave.read(),
            taken_at: Utc::now(),
        }
    }

    /// Send a snapshot immediately and then once per interval.
    ///
    /// The task ends when the handle is stopped or the receiver is dropped.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(self, tx: mpsc::Sender<Snapshot>) -> (RefreshHandle, JoinHandle<()>) {
        let handle = RefreshHandle::new();
        let task_handle = handle.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            debug!(interval = ?self.interval, "refresher started");

            loop {
                ticker.tick().await;
                if task_handle.should_stop() {
                    break;
                }

                let snapshot = self.snapshot();
                trace!(
                    employees = snapshot.employees.len(),
                    leave_requests = snapshot.leave_requests.len(),
                    "snapshot taken"
                );
                if tx.send(snapshot).await.is_err() {
                    break;
                }
            }
            debug!("refresher stopped");
        });

        (handle, task)
    }
}
