//! Figures shown on the dashboard and reports.
//!
//! Every computation takes the reference day explicitly. Dates are compared at
//! day granularity and month offsets clamp to the end of shorter months.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::model::{Employee, EmployeeStatus, LeaveRequest, LeaveStatus};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Insight raised when many employees are on leave.
pub const ON_LEAVE_INSIGHT: &str =
    "High number of employees on leave. Consider redistributing tasks.";

/// Insight raised when many leave requests await a decision.
pub const PENDING_INSIGHT: &str = "High number of pending leave requests. Review them soon.";

fn months_before(day: NaiveDate, months: u32) -> NaiveDate {
    day.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Abbreviated month name of `day`, e.g. `"fev"`.
#[must_use]
pub fn month_abbreviation(day: NaiveDate) -> &'static str {
    MONTH_ABBREVIATIONS[day.month0() as usize]
}

/// Employees that count towards headcount.
#[must_use]
pub fn active_count(employees: &[Employee]) -> usize {
    employees.iter().filter(|e| e.is_active()).count()
}

/// Approved leave covering `today`.
#[must_use]
pub fn on_leave_count(requests: &[LeaveRequest], today: NaiveDate) -> usize {
    requests.iter().filter(|r| r.is_on_leave(today)).count()
}

/// Requests awaiting a decision.
#[must_use]
pub fn pending_count(requests: &[LeaveRequest]) -> usize {
    requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Pending)
        .count()
}

/// Terminated employees whose start date falls within the last twelve months,
/// as a percentage of headcount, to one decimal.
#[must_use]
pub fn turnover_rate(employees: &[Employee], today: NaiveDate) -> f64 {
    let year_ago = months_before(today, 12);
    let terminated = employees
        .iter()
        .filter(|e| e.status == EmployeeStatus::Terminated && e.start_date > year_ago)
        .count();
    round1(percent(terminated, active_count(employees)))
}

/// Headline dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Employees not terminated.
    pub total_employees: usize,
    /// Employees who started within the last month.
    pub new_hires: usize,
    /// Yearly turnover percentage.
    pub turnover_rate: f64,
    /// Percentage change of turnover against the previous month.
    pub turnover_change: f64,
    /// Employees on approved leave today.
    pub on_leave: usize,
    /// Requests awaiting a decision.
    pub pending_requests: usize,
}

impl DashboardStats {
    /// Compute the figures as of `today`.
    #[must_use]
    pub fn compute(employees: &[Employee], requests: &[LeaveRequest], today: NaiveDate) -> Self {
        let one_month_ago = months_before(today, 1);
        let two_months_ago = months_before(today, 2);

        let active_last_month = employees
            .iter()
            .filter(|e| e.start_date < one_month_ago && e.is_active())
            .count();
        let terminated_last_month = employees
            .iter()
            .filter(|e| {
                e.status == EmployeeStatus::Terminated
                    && e.start_date >= two_months_ago
                    && e.start_date < one_month_ago
            })
            .count();
        let turnover_last_month = percent(terminated_last_month, active_last_month);

        let turnover_rate = turnover_rate(employees, today);
        let turnover_change = if turnover_last_month > 0.0 {
            round1((turnover_rate - turnover_last_month) / turnover_last_month * 100.0)
        } else if turnover_rate > 0.0 {
            100.0
        } else {
            0.0
        };

        Self {
            total_employees: active_count(employees),
            new_hires: employees
                .iter()
                .filter(|e| e.start_date > one_month_ago)
                .count(),
            turnover_rate,
            turnover_change,
            on_leave: on_leave_count(requests, today),
            pending_requests: pending_count(requests),
        }
    }
}

/// Headcount at one month on the overview chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadcountPoint {
    /// Month abbreviation.
    pub name: String,
    /// Employees started by then and not terminated.
    pub total: usize,
}

/// Headcount for the twelve months ending at `today`, oldest first.
#[must_use]
pub fn headcount_series(employees: &[Employee], today: NaiveDate) -> Vec<HeadcountPoint> {
    (0..12)
        .rev()
        .map(|i| {
            let month = months_before(today, i);
            HeadcountPoint {
                name: month_abbreviation(month).to_string(),
                total: employees
                    .iter()
                    .filter(|e| e.start_date <= month && e.is_active())
                    .count(),
            }
        })
        .collect()
}

/// Hires and terminations in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnoverPoint {
    /// Month abbreviation.
    pub name: String,
    /// Employees who started that month.
    pub hires: usize,
    /// Terminated employees who started that month.
    pub terminations: usize,
}

/// Hires and terminations for the six months ending at `today`, oldest first.
///
/// Terminations are bucketed by start date; no termination date is recorded.
#[must_use]
pub fn turnover_series(employees: &[Employee], today: NaiveDate) -> Vec<TurnoverPoint> {
    (0..6)
        .rev()
        .map(|i| {
            let month = months_before(today, i);
            let same_month = |e: &&Employee| {
                e.start_date.month() == month.month() && e.start_date.year() == month.year()
            };
            TurnoverPoint {
                name: month_abbreviation(month).to_string(),
                hires: employees.iter().filter(same_month).count(),
                terminations: employees
                    .iter()
                    .filter(same_month)
                    .filter(|e| e.status == EmployeeStatus::Terminated)
                    .count(),
            }
        })
        .collect()
}

/// Active employees in one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    /// Department name.
    pub name: String,
    /// Active employees.
    pub value: usize,
}

/// Active employees per department, in order of first appearance.
///
/// Only status `Active` counts; employees on leave are left out.
#[must_use]
pub fn department_breakdown(employees: &[Employee]) -> Vec<DepartmentCount> {
    let mut counts: Vec<DepartmentCount> = Vec::new();
    for employee in employees
        .iter()
        .filter(|e| e.status == EmployeeStatus::Active)
    {
        match counts.iter_mut().find(|c| c.name == employee.department) {
            Some(count) => count.value += 1,
            None => counts.push(DepartmentCount {
                name: employee.department.clone(),
                value: 1,
            }),
        }
    }
    counts
}

/// Warnings shown above the dashboard charts.
#[must_use]
pub fn insights(
    requests: &[LeaveRequest],
    today: NaiveDate,
    thresholds: &DashboardConfig,
) -> Vec<&'static str> {
    let mut found = Vec::new();
    if on_leave_count(requests, today) > thresholds.on_leave_alert {
        found.push(ON_LEAVE_INSIGHT);
    }
    if pending_count(requests) > thresholds.pending_alert {
        found.push(PENDING_INSIGHT);
    }
    found
}

/// Figures shown on the reports page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Employees not terminated.
    pub total_employees: usize,
    /// Yearly turnover percentage.
    pub turnover_rate: f64,
    /// Hires and terminations for the last six months.
    pub turnover: Vec<TurnoverPoint>,
    /// Active employees per department.
    pub departments: Vec<DepartmentCount>,
}

impl Report {
    /// Compute the report as of `today`.
    #[must_use]
    pub fn compute(employees: &[Employee], today: NaiveDate) -> Self {
        Self {
            total_employees: active_count(employees),
            turnover_rate: turnover_rate(employees, today),
            turnover: turnover_series(employees, today),
            departments: department_breakdown(employees),
        }
    }
}
