//! Record types kept in the storage area.
//!
//! Field names serialize in camelCase and status values use their display
//! spelling (`"On Leave"`), so stored collections stay readable by any other
//! tool that shares the same storage layout.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmployeeStatus {
    /// Currently employed and working.
    #[default]
    Active,
    /// Employed but on leave.
    #[serde(rename = "On Leave")]
    OnLeave,
    /// No longer employed.
    Terminated,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::OnLeave => write!(f, "On Leave"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Review state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Identifier, expected but not guaranteed to be unique.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Job title.
    pub job_title: String,
    /// Department name, matched against the department list only on entry.
    pub department: String,
    /// Yearly salary.
    pub salary: f64,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Employment status.
    pub status: EmployeeStatus,
}

impl Employee {
    /// "First Last", the form copied into leave requests and documents.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the employee counts towards headcount.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != EmployeeStatus::Terminated
    }
}

/// A request for time off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Identifier.
    pub id: String,
    /// Requesting employee; not checked against the employee collection.
    pub employee_id: String,
    /// Employee name at the time of the request.
    pub employee_name: String,
    /// Leave type name.
    pub leave_type: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Review state.
    pub status: LeaveStatus,
    /// When the request was filed.
    pub requested_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Whether this is approved leave covering `day`.
    #[must_use]
    pub fn is_on_leave(&self, day: NaiveDate) -> bool {
        self.status == LeaveStatus::Approved && self.start_date <= day && self.end_date >= day
    }
}

/// An uploaded employee document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Identifier.
    pub id: String,
    /// Owning employee; not checked against the employee collection.
    pub employee_id: String,
    /// Employee name at upload time.
    pub employee_name: String,
    /// Document type name.
    pub document_type: String,
    /// Original file name.
    pub file_name: String,
    /// When the document was uploaded.
    pub upload_date: DateTime<Utc>,
    /// Human readable size, e.g. `"12KB"`, or `"--"` when unknown.
    pub file_size: String,
    /// The file contents as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data_url: Option<String>,
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityItem {
    /// Identifier.
    pub id: String,
    /// Who acted.
    pub user_name: String,
    /// Initials shown as the avatar.
    pub user_avatar: String,
    /// What they did, e.g. `"aprovou"`.
    pub action: String,
    /// What they did it to.
    pub target: String,
    /// Display time, e.g. `"agora"`.
    pub time: String,
}

/// An activity entry before it is logged; `id` and `time` are filled in when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityDraft {
    /// Explicit identifier.
    pub id: Option<String>,
    /// Who acted.
    pub user_name: String,
    /// Initials shown as the avatar.
    pub user_avatar: String,
    /// What they did.
    pub action: String,
    /// What they did it to.
    pub target: String,
    /// Explicit display time.
    pub time: Option<String>,
}

impl ActivityDraft {
    /// An entry attributed to the administrator account.
    #[must_use]
    pub fn admin(action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            user_name: "Admin".to_string(),
            user_avatar: "AD".to_string(),
            action: action.into(),
            target: target.into(),
            ..Self::default()
        }
    }
}

/// Build an identifier of the form `<prefix>-<unix millis>`.
#[must_use]
pub fn timestamp_id(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

/// Placeholder employee id for records filed without selecting an employee.
#[must_use]
pub fn placeholder_employee_id() -> String {
    format!("emp-{}", rand::thread_rng().gen_range(0..100_000))
}
