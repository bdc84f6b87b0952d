//! End-to-end scenarios over a shared storage area.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use novahr::collections::seed_employees;
use novahr::stats::{active_count, DashboardStats};
use novahr::{
    keys, Collection, Config, EmployeeForm, EmployeeStatus, KeyedStore, LeaveForm, ListKind,
    ListView, Storage, Workspace,
};

fn workspace() -> Workspace {
    let storage = Storage::open_in_memory().expect("failed to create test storage");
    Workspace::new(Arc::new(storage), &Config::default())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn temp_db(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("novahr_{name}_{}.db", std::process::id()))
}

fn cleanup(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[test]
fn department_edits_leave_existing_employees_alone() {
    let ws = workspace();
    ws.lists
        .set(ListKind::Departments, &strings(&["Engenharia", "Marketing"]));

    let employee = ws
        .employees
        .add(EmployeeForm {
            first_name: "Maria".to_string(),
            last_name: "Lima".to_string(),
            email: "maria.lima@example.com".to_string(),
            job_title: "Analyst".to_string(),
            department: "Marketing".to_string(),
            salary: "R$ 4.000,00".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8),
            status: EmployeeStatus::Active,
        })
        .unwrap();

    assert_eq!(
        ws.lists.add(ListKind::Departments, "Design"),
        Some(strings(&["Engenharia", "Marketing", "Design"]))
    );
    assert_eq!(
        ws.lists.remove(ListKind::Departments, "Marketing"),
        strings(&["Engenharia", "Design"])
    );

    let stored = ws.employees.find(&employee.id).unwrap();
    assert_eq!(stored.department, "Marketing");
}

#[test]
fn open_views_follow_list_writes() {
    let ws = workspace();
    let mut picker = ListView::open(ws.lists.clone(), ListKind::LeaveTypes);
    let mut settings = ListView::open(ws.lists.clone(), ListKind::LeaveTypes);
    assert_eq!(picker.selected(), Some("Férias"));

    ws.lists.add(ListKind::LeaveTypes, "Sabático");
    ws.lists.remove(ListKind::LeaveTypes, "Férias");

    assert!(picker.refresh());
    assert!(settings.refresh());
    assert_eq!(picker.current(), settings.current());
    assert_eq!(
        picker.current(),
        strings(&["Doença", "Pessoal", "Paternidade", "Sabático"]).as_slice()
    );
    assert_eq!(picker.selected(), Some("Doença"));
}

#[test]
fn keyed_store_properties() {
    let storage = Arc::new(Storage::open_in_memory().unwrap());
    let store: KeyedStore<Vec<String>> = KeyedStore::new(Arc::clone(&storage), "nh_custom");

    assert_eq!(store.get(), None);

    let value = strings(&["a", "b"]);
    store.set(&value);
    assert_eq!(store.get(), Some(value));

    store.remove();
    assert_eq!(store.get(), None);

    let ws = Workspace::new(Arc::clone(&storage), &Config::default());
    let _ = ws.employees.load();
    let _ = ws.lists.get(ListKind::Departments);
    store.set(&strings(&["c"]));
    store.clear();
    for key in keys::ALL {
        assert!(storage.get_item(key).unwrap().is_none(), "{key} survived clear");
    }
    assert!(storage.is_empty().unwrap());
}

#[test]
fn seed_on_read_returns_fallback_exactly() {
    let ws = workspace();
    let defaults = Config::default().lists.document_types;

    assert_eq!(ws.lists.get(ListKind::DocumentTypes), defaults);
    assert_eq!(
        ws.storage().get_item(keys::DOCUMENT_TYPES).unwrap(),
        Some(serde_json::to_string(&defaults).unwrap())
    );
}

#[test]
fn deleting_an_employee_orphans_their_records() {
    let ws = workspace();
    let peter = ws.employees.find("emp-3").unwrap();

    ws.leave
        .add(LeaveForm {
            employee_id: Some(peter.id.clone()),
            employee_name: peter.full_name(),
            leave_type: "Doença".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 6),
            ..LeaveForm::default()
        })
        .unwrap();
    ws.employees.delete(&peter.id).unwrap();

    let requests = ws.leave.load();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].employee_id, "emp-3");
    assert_eq!(requests[0].employee_name, "Peter Jones");
    assert_eq!(active_count(&ws.employees.load()), 2);
}

#[test]
fn a_second_process_sees_writes_through_the_file() {
    let path = temp_db("shared");
    cleanup(&path);

    let first = Arc::new(Storage::open(&path).unwrap());
    let second = Arc::new(Storage::open(&path).unwrap());

    let writer = Workspace::new(Arc::clone(&first), &Config::default());
    let reader: Collection<novahr::Employee> =
        Collection::new(Arc::clone(&second), seed_employees());

    writer.employees.delete("emp-1").unwrap();
    let ids: Vec<_> = reader.read().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["emp-2", "emp-3"]);

    drop(writer);
    drop(first);
    drop(second);
    cleanup(&path);
}

#[test]
fn full_quota_keeps_previous_collection() {
    let storage = Storage::open_in_memory().unwrap().with_quota(2048);
    let ws = Workspace::new(Arc::new(storage), &Config::default());
    let before = ws.employees.load();

    let mut form = EmployeeForm {
        first_name: "X".repeat(4096),
        last_name: "Y".to_string(),
        email: "x@example.com".to_string(),
        job_title: "Z".to_string(),
        salary: "100".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..EmployeeForm::default()
    };
    form.department = "RH".to_string();

    // The write fails quietly; the record is reported but not kept
    let added = ws.employees.add(form).unwrap();
    assert!(ws.employees.find(&added.id).is_none());
    assert_eq!(ws.employees.load(), before);
}

#[test]
fn dashboard_reflects_leave_decisions() {
    let ws = workspace();
    let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    let request = ws
        .leave
        .add(LeaveForm {
            employee_id: Some("emp-2".to_string()),
            employee_name: "Jane Smith".to_string(),
            leave_type: "Férias".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 18),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 22),
            ..LeaveForm::default()
        })
        .unwrap();

    let stats = DashboardStats::compute(&ws.employees.load(), &ws.leave.load(), today);
    assert_eq!(stats.pending_requests, 1);
    assert_eq!(stats.on_leave, 0);

    ws.leave.approve(&request.id).unwrap();
    let stats = DashboardStats::compute(&ws.employees.load(), &ws.leave.load(), today);
    assert_eq!(stats.pending_requests, 0);
    assert_eq!(stats.on_leave, 1);
    assert_eq!(stats.total_employees, 3);
}
