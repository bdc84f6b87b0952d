//! Employee, leave and document stores as the application's views use them.
//!
//! Each store validates the submitted form, rewrites its collection and
//! records what happened in the activity feed.

use std::sync::Arc;

use tracing::info;

use crate::collections::{seed_employees, ActivityLog, Collection};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::forms::{DocumentForm, EmployeeForm, LeaveForm};
use crate::lists::ListRegistry;
use crate::model::{
    timestamp_id, ActivityDraft, Document, Employee, LeaveRequest, LeaveStatus,
};
use crate::storage::Storage;

/// The employee directory.
#[derive(Debug, Clone)]
pub struct EmployeeStore {
    records: Collection<Employee>,
    activity: ActivityLog,
}

impl EmployeeStore {
    /// Create the store over `storage`, logging into `activity`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, activity: ActivityLog) -> Self {
        Self {
            records: Collection::new(storage, seed_employees()),
            activity,
        }
    }

    /// The underlying collection.
    #[must_use]
    pub fn collection(&self) -> &Collection<Employee> {
        &self.records
    }

    /// All employees, newest first. Seeds the directory on first use.
    #[must_use]
    pub fn load(&self) -> Vec<Employee> {
        self.records.load()
    }

    /// Find an employee by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Employee> {
        self.records.find(id)
    }

    /// Add a new employee at the top of the directory.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected.
    pub fn add(&self, form: EmployeeForm) -> Result<Employee> {
        let employee = self.records.prepend(form.into_employee(timestamp_id("emp"))?);
        info!(id = %employee.id, "employee added");
        self.activity.push(ActivityDraft::admin(
            "adicionou",
            format!("{} como novo funcionário", employee.full_name()),
        ));
        Ok(employee)
    }

    /// Replace every field of an employee except its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected, or not-found if no
    /// employee has `id`.
    pub fn update(&self, id: &str, form: EmployeeForm) -> Result<Employee> {
        let replacement = form.into_employee(id.to_string())?;
        let employee = self
            .records
            .update(id, |existing| *existing = replacement.clone())?;
        info!(id, "employee updated");
        self.activity.push(ActivityDraft::admin(
            "atualizou",
            format!("registro de {}", employee.full_name()),
        ));
        Ok(employee)
    }

    /// Remove an employee. Their leave requests and documents are kept.
    ///
    /// # Errors
    ///
    /// Returns not-found if no employee has `id`.
    pub fn delete(&self, id: &str) -> Result<Employee> {
        let employee = self.records.delete(id)?;
        info!(id, "employee deleted");
        self.activity.push(ActivityDraft::admin(
            "excluiu",
            format!("registro de {}", employee.full_name()),
        ));
        Ok(employee)
    }
}

/// Leave requests.
#[derive(Debug, Clone)]
pub struct LeaveStore {
    records: Collection<LeaveRequest>,
    activity: ActivityLog,
}

impl LeaveStore {
    /// Create the store over `storage`, logging into `activity`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, activity: ActivityLog) -> Self {
        Self {
            records: Collection::new(storage, Vec::new()),
            activity,
        }
    }

    /// The underlying collection.
    #[must_use]
    pub fn collection(&self) -> &Collection<LeaveRequest> {
        &self.records
    }

    /// All requests, newest first.
    #[must_use]
    pub fn load(&self) -> Vec<LeaveRequest> {
        self.records.load()
    }

    /// Find a request by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<LeaveRequest> {
        self.records.find(id)
    }

    /// File a new request.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected.
    pub fn add(&self, form: LeaveForm) -> Result<LeaveRequest> {
        let request = self.records.prepend(form.into_request()?);
        info!(id = %request.id, "leave request filed");
        self.activity.push(ActivityDraft::admin(
            "criou um pedido de licença para",
            request.employee_name.clone(),
        ));
        Ok(request)
    }

    /// Edit a request. Edits are not recorded in the activity feed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected, or not-found if no
    /// request has `id`.
    pub fn update(&self, id: &str, form: LeaveForm) -> Result<LeaveRequest> {
        let mut edited = self
            .find(id)
            .ok_or_else(|| Error::not_found("leave request", id))?;
        form.apply_to(&mut edited)?;
        self.records.update(id, |existing| *existing = edited.clone())
    }

    /// Approve a request.
    ///
    /// # Errors
    ///
    /// Returns not-found if no request has `id`.
    pub fn approve(&self, id: &str) -> Result<LeaveRequest> {
        self.decide(id, LeaveStatus::Approved, "aprovou")
    }

    /// Reject a request.
    ///
    /// # Errors
    ///
    /// Returns not-found if no request has `id`.
    pub fn reject(&self, id: &str) -> Result<LeaveRequest> {
        self.decide(id, LeaveStatus::Rejected, "rejeitou")
    }

    fn decide(&self, id: &str, status: LeaveStatus, action: &str) -> Result<LeaveRequest> {
        let request = self.records.update(id, |r| r.status = status)?;
        info!(id, %status, "leave request decided");
        self.activity.push(ActivityDraft::admin(
            action,
            format!("pedido de licença de {}", request.employee_name),
        ));
        Ok(request)
    }

    /// Remove a request.
    ///
    /// # Errors
    ///
    /// Returns not-found if no request has `id`.
    pub fn delete(&self, id: &str) -> Result<LeaveRequest> {
        self.records.delete(id)
    }
}

/// Uploaded documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    records: Collection<Document>,
    activity: ActivityLog,
}

impl DocumentStore {
    /// Create the store over `storage`, logging into `activity`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, activity: ActivityLog) -> Self {
        Self {
            records: Collection::new(storage, Vec::new()),
            activity,
        }
    }

    /// All documents, newest first.
    #[must_use]
    pub fn load(&self) -> Vec<Document> {
        self.records.load()
    }

    /// Find a document by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Document> {
        self.records.find(id)
    }

    /// Store a new document.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected.
    pub fn add(&self, form: DocumentForm) -> Result<Document> {
        let document = self.records.prepend(form.into_document()?);
        info!(id = %document.id, file = %document.file_name, "document stored");
        self.activity.push(ActivityDraft::admin(
            "adicionou",
            format!("documento {}", document.file_name),
        ));
        Ok(document)
    }

    /// Edit a document. Edits are not recorded in the activity feed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is rejected, or not-found if no
    /// document has `id`.
    pub fn update(&self, id: &str, form: DocumentForm) -> Result<Document> {
        let mut edited = self
            .find(id)
            .ok_or_else(|| Error::not_found("document", id))?;
        form.apply_to(&mut edited)?;
        self.records.update(id, |existing| *existing = edited.clone())
    }

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// Returns not-found if no document has `id`.
    pub fn delete(&self, id: &str) -> Result<Document> {
        self.records.delete(id)
    }

    /// Documents filed for `employee`, matched by id or by full name.
    #[must_use]
    pub fn for_employee(&self, employee: &Employee) -> Vec<Document> {
        let name = employee.full_name();
        self.load()
            .into_iter()
            .filter(|d| d.employee_id == employee.id || d.employee_name == name)
            .collect()
    }
}

/// Every store, opened over one storage area.
#[derive(Debug, Clone)]
pub struct Workspace {
    storage: Arc<Storage>,
    /// Dynamic type lists.
    pub lists: ListRegistry,
    /// Activity feed.
    pub activity: ActivityLog,
    /// Employee directory.
    pub employees: EmployeeStore,
    /// Leave requests.
    pub leave: LeaveStore,
    /// Documents.
    pub documents: DocumentStore,
}

impl Workspace {
    /// Open the stores configured by `config` over `storage`.
    #[must_use]
    pub fn new(storage: Arc<Storage>, config: &Config) -> Self {
        let activity = ActivityLog::new(Arc::clone(&storage), &config.activity);
        Self {
            lists: ListRegistry::new(Arc::clone(&storage), config.lists.clone()),
            employees: EmployeeStore::new(Arc::clone(&storage), activity.clone()),
            leave: LeaveStore::new(Arc::clone(&storage), activity.clone()),
            documents: DocumentStore::new(Arc::clone(&storage), activity.clone()),
            activity,
            storage,
        }
    }

    /// The shared storage area.
    #[must_use]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn workspace() -> Workspace {
        let storage = Arc::new(Storage::open_in_memory().expect("failed to create test storage"));
        Workspace::new(storage, &Config::default())
    }

    fn employee_form(first: &str, last: &str) -> EmployeeForm {
        EmployeeForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            job_title: "Analyst".to_string(),
            department: "Vendas".to_string(),
            salary: "800000".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..EmployeeForm::default()
        }
    }

    fn leave_form(name: &str) -> LeaveForm {
        LeaveForm {
            employee_id: Some("emp-1".to_string()),
            employee_name: name.to_string(),
            leave_type: "Férias".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 8, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 8, 10),
            ..LeaveForm::default()
        }
    }

    fn last_activity(ws: &Workspace) -> (String, String) {
        let entry = ws.activity.all().into_iter().next().expect("no activity");
        (entry.action, entry.target)
    }

    #[test]
    fn test_add_employee_logs_activity() {
        let ws = workspace();
        let employee = ws.employees.add(employee_form("Ana", "Souza")).unwrap();

        let all = ws.employees.load();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, employee.id);
        assert_eq!(
            last_activity(&ws),
            ("adicionou".to_string(), "Ana Souza como novo funcionário".to_string())
        );
    }

    #[test]
    fn test_rejected_employee_writes_nothing() {
        let ws = workspace();
        let mut form = employee_form("Ana", "Souza");
        form.salary.clear();

        assert!(ws.employees.add(form).unwrap_err().is_validation());
        assert_eq!(ws.employees.load().len(), 3);
        assert!(ws.activity.all().is_empty());
    }

    #[test]
    fn test_update_employee_keeps_id() {
        let ws = workspace();
        let updated = ws
            .employees
            .update("emp-1", employee_form("Johnny", "Doe"))
            .unwrap();

        assert_eq!(updated.id, "emp-1");
        assert_eq!(ws.employees.find("emp-1").unwrap().first_name, "Johnny");
        assert_eq!(
            last_activity(&ws),
            ("atualizou".to_string(), "registro de Johnny Doe".to_string())
        );
    }

    #[test]
    fn test_delete_employee_orphans_records() {
        let ws = workspace();
        ws.leave.add(leave_form("John Doe")).unwrap();
        ws.employees.delete("emp-1").unwrap();

        assert!(ws.employees.find("emp-1").is_none());
        assert_eq!(ws.leave.load()[0].employee_id, "emp-1");
        assert_eq!(
            last_activity(&ws),
            ("excluiu".to_string(), "registro de John Doe".to_string())
        );
    }

    #[test]
    fn test_leave_lifecycle() {
        let ws = workspace();
        let request = ws.leave.add(leave_form("John Doe")).unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(
            last_activity(&ws),
            (
                "criou um pedido de licença para".to_string(),
                "John Doe".to_string()
            )
        );

        let approved = ws.leave.approve(&request.id).unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(
            last_activity(&ws),
            ("aprovou".to_string(), "pedido de licença de John Doe".to_string())
        );

        ws.leave.reject(&request.id).unwrap();
        assert_eq!(ws.leave.find(&request.id).unwrap().status, LeaveStatus::Rejected);
        assert_eq!(last_activity(&ws).0, "rejeitou");

        ws.leave.delete(&request.id).unwrap();
        assert!(ws.leave.load().is_empty());
        assert_eq!(ws.activity.all().len(), 3);
    }

    #[test]
    fn test_leave_update_not_logged() {
        let ws = workspace();
        let request = ws.leave.add(leave_form("John Doe")).unwrap();
        let mut form = leave_form("John Doe");
        form.leave_type = "Doença".to_string();

        let updated = ws.leave.update(&request.id, form).unwrap();
        assert_eq!(updated.leave_type, "Doença");
        assert_eq!(ws.activity.all().len(), 1);
        assert!(ws.leave.update("leave-0", leave_form("X")).is_err());
    }

    #[test]
    fn test_documents_for_employee() {
        let ws = workspace();
        let john = ws.employees.find("emp-1").unwrap();

        ws.documents
            .add(DocumentForm {
                employee_id: Some("emp-1".to_string()),
                employee_name: "J. Doe".to_string(),
                document_type: "Contrato".to_string(),
                file_name: "a.pdf".to_string(),
                ..DocumentForm::default()
            })
            .unwrap();
        ws.documents
            .add(DocumentForm {
                employee_name: "John Doe".to_string(),
                document_type: "ID".to_string(),
                file_name: "b.png".to_string(),
                ..DocumentForm::default()
            })
            .unwrap();
        ws.documents
            .add(DocumentForm {
                employee_id: Some("emp-2".to_string()),
                employee_name: "Jane Smith".to_string(),
                document_type: "ID".to_string(),
                file_name: "c.png".to_string(),
                ..DocumentForm::default()
            })
            .unwrap();

        let files: Vec<_> = ws
            .documents
            .for_employee(&john)
            .into_iter()
            .map(|d| d.file_name)
            .collect();
        assert_eq!(files, vec!["b.png", "a.pdf"]);
        assert_eq!(
            last_activity(&ws),
            ("adicionou".to_string(), "documento c.png".to_string())
        );
    }
}
