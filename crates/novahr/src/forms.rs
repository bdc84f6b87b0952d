//! Submitted form values and the checks they must pass before they are stored.
//!
//! A rejected form yields [`Error::Validation`] and nothing is written.

use std::path::Path;
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{
    placeholder_employee_id, timestamp_id, Document, Employee, EmployeeStatus, LeaveRequest,
    LeaveStatus,
};

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("Invalid regex pattern"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern"));

/// Size shown for documents filed without a file.
pub const UNKNOWN_FILE_SIZE: &str = "--";

/// Parse a currency-like string as typed into the salary field.
///
/// Every non-digit is dropped and the remaining digits are read as cents, so
/// `"R$ 5.000,00"` and `"500000"` both give `5000.0`. Text with no digits
/// gives `0.0`.
#[must_use]
pub fn parse_salary(text: &str) -> f64 {
    let digits = NON_DIGITS.replace_all(text, "");
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().map_or(0.0, |cents| cents / 100.0)
}

/// Format a byte count the way document sizes are displayed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{}KB", kb.round());
    }
    format!("{:.2}MB", kb / 1024.0)
}

/// MIME type guessed from a file name's extension.
#[must_use]
pub fn mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// Encode file contents as a `data:` URL.
#[must_use]
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode the contents of a base64 `data:` URL.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `url` is not a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| Error::validation("not a base64 data URL"))?;
    STANDARD
        .decode(payload)
        .map_err(|e| Error::validation(format!("malformed data URL: {e}")))
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_date(value: Option<NaiveDate>, field: &str) -> Result<NaiveDate> {
    value.ok_or_else(|| Error::validation(format!("{field} is required")))
}

/// Values entered in the employee form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Job title.
    pub job_title: String,
    /// Department, normally picked from the department list.
    pub department: String,
    /// Salary as typed, see [`parse_salary`].
    pub salary: String,
    /// First day of employment.
    pub start_date: Option<NaiveDate>,
    /// Employment status.
    pub status: EmployeeStatus,
}

impl EmployeeForm {
    /// Check the form and build the record it describes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is empty, the email
    /// is malformed or the salary is not positive.
    pub fn into_employee(self, id: String) -> Result<Employee> {
        require(&self.first_name, "first name")?;
        require(&self.last_name, "last name")?;
        require(&self.email, "email")?;
        require(&self.job_title, "job title")?;
        let start_date = require_date(self.start_date, "start date")?;
        if !EMAIL.is_match(&self.email) {
            return Err(Error::validation(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        let salary = parse_salary(&self.salary);
        if salary <= 0.0 {
            return Err(Error::validation("salary must be greater than zero"));
        }

        Ok(Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            job_title: self.job_title,
            department: self.department,
            salary,
            start_date,
            status: self.status,
        })
    }
}

/// Values entered in the leave request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveForm {
    /// Employee picked from the directory, if any.
    pub employee_id: Option<String>,
    /// Employee name, free text when nobody was picked.
    pub employee_name: String,
    /// Leave type, normally picked from the leave type list.
    pub leave_type: String,
    /// First day of leave.
    pub start_date: Option<NaiveDate>,
    /// Last day of leave.
    pub end_date: Option<NaiveDate>,
    /// Review state.
    pub status: LeaveStatus,
}

impl LeaveForm {
    fn check(&self) -> Result<(NaiveDate, NaiveDate)> {
        require(&self.employee_name, "employee name")?;
        let start = require_date(self.start_date, "start date")?;
        let end = require_date(self.end_date, "end date")?;
        Ok((start, end))
    }

    /// Check the form and build a new request.
    ///
    /// Without a picked employee the request gets a placeholder employee id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name or either date is missing.
    pub fn into_request(self) -> Result<LeaveRequest> {
        let (start_date, end_date) = self.check()?;
        Ok(LeaveRequest {
            id: timestamp_id("leave"),
            employee_id: self.employee_id.unwrap_or_else(placeholder_employee_id),
            employee_name: self.employee_name,
            leave_type: self.leave_type,
            start_date,
            end_date,
            status: self.status,
            requested_at: Utc::now(),
        })
    }

    /// Check the form and write it over `request`.
    ///
    /// The employee id is kept unless an employee was picked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name or either date is missing;
    /// `request` is left unchanged.
    pub fn apply_to(self, request: &mut LeaveRequest) -> Result<()> {
        let (start_date, end_date) = self.check()?;
        if let Some(id) = self.employee_id {
            request.employee_id = id;
        }
        request.employee_name = self.employee_name;
        request.leave_type = self.leave_type;
        request.start_date = start_date;
        request.end_date = end_date;
        request.status = self.status;
        Ok(())
    }
}

/// Values entered in the document upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentForm {
    /// Employee picked from the directory, if any.
    pub employee_id: Option<String>,
    /// Employee name, free text when nobody was picked.
    pub employee_name: String,
    /// Document type, normally picked from the document type list.
    pub document_type: String,
    /// File name.
    pub file_name: String,
    /// Pre-formatted file size.
    pub file_size: Option<String>,
    /// File contents as a `data:` URL.
    pub file_data_url: Option<String>,
}

impl DocumentForm {
    /// Attach a local file: its name, size and contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn attach_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.file_size = Some(human_file_size(bytes.len() as u64));
        self.file_data_url = Some(data_url(mime_type(&file_name), &bytes));
        self.file_name = file_name;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        require(&self.employee_name, "employee name")?;
        require(&self.file_name, "file name")
    }

    fn file_size(&self) -> String {
        self.file_size
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_FILE_SIZE.to_string())
    }

    /// Check the form and build a new document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the employee name or file name is missing.
    pub fn into_document(self) -> Result<Document> {
        self.check()?;
        let file_size = self.file_size();
        Ok(Document {
            id: timestamp_id("doc"),
            employee_id: self.employee_id.unwrap_or_else(placeholder_employee_id),
            employee_name: self.employee_name,
            document_type: self.document_type,
            file_name: self.file_name,
            upload_date: Utc::now(),
            file_size,
            file_data_url: self.file_data_url,
        })
    }

    /// Check the form and write it over `document`.
    ///
    /// The employee id is kept unless an employee was picked, and the stored
    /// contents are kept unless a new file was attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the employee name or file name is
    /// missing; `document` is left unchanged.
    pub fn apply_to(self, document: &mut Document) -> Result<()> {
        self.check()?;
        document.file_size = self.file_size();
        if let Some(id) = self.employee_id {
            document.employee_id = id;
        }
        document.employee_name = self.employee_name;
        document.document_type = self.document_type;
        document.file_name = self.file_name;
        if self.file_data_url.is_some() {
            document.file_data_url = self.file_data_url;
        }
        Ok(())
    }
}
