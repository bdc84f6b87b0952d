//! `novahr` - CLI for local-first HR administration
//!
//! This binary provides the command-line interface over the employee
//! directory, leave requests, documents, type lists and dashboard figures.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;

use novahr::cli::{
    ActivityCommand, Cli, Command, ConfigCommand, DashboardCommand, DocumentArgs,
    DocumentsCommand, EmployeeArgs, EmployeesCommand, LeaveArgs, LeaveCommand, ListsCommand,
    OutputFormat, ReportsCommand, StorageCommand,
};
use novahr::forms::decode_data_url;
use novahr::model::{
    Document, Employee, EmployeeStatus, LeaveRequest, LeaveStatus, RecentActivityItem,
};
use novahr::refresh::{Refresher, Snapshot};
use novahr::stats::{headcount_series, insights, DashboardStats, Report};
use novahr::{
    init_logging, Config, DocumentForm, EmployeeForm, Error, LeaveForm, ListKind,
    ListRegistry, ListView, Storage, Workspace,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Employees(cmd) => handle_employees(&open_workspace(&config)?, cmd),
        Command::Leave(cmd) => handle_leave(&open_workspace(&config)?, cmd),
        Command::Documents(cmd) => handle_documents(&open_workspace(&config)?, cmd),
        Command::Lists(cmd) => handle_lists(&open_workspace(&config)?.lists, cmd),
        Command::Activity(cmd) => handle_activity(&open_workspace(&config)?, &cmd),
        Command::Dashboard(cmd) => handle_dashboard(&open_workspace(&config)?, &config, &cmd),
        Command::Reports(cmd) => handle_reports(&open_workspace(&config)?, &cmd),
        Command::Storage(cmd) => handle_storage(open_workspace(&config)?.storage(), cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_workspace(config: &Config) -> anyhow::Result<Workspace> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("cannot open storage at {}", path.display()))?
        .with_quota(config.storage.quota_bytes);
    Ok(Workspace::new(Arc::new(storage), config))
}

/// The entry a form's picker submits for `kind`: the chosen value, or the first entry.
fn pick(
    registry: &ListRegistry,
    kind: ListKind,
    chosen: Option<&str>,
) -> novahr::Result<String> {
    let mut view = ListView::open(registry.clone(), kind);
    if let Some(value) = chosen {
        view.choose(value)?;
    }
    Ok(view.selected().unwrap_or_default().to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Employees

fn employee_form(
    ws: &Workspace,
    args: EmployeeArgs,
    base: Option<&Employee>,
) -> anyhow::Result<EmployeeForm> {
    let department = match (args.department, base) {
        (Some(d), _) => pick(&ws.lists, ListKind::Departments, Some(d.as_str()))?,
        (None, Some(b)) => b.department.clone(),
        (None, None) => pick(&ws.lists, ListKind::Departments, None)?,
    };
    let keep = |value: Option<String>, current: Option<&String>| {
        value.or_else(|| current.cloned()).unwrap_or_default()
    };

    Ok(EmployeeForm {
        first_name: keep(args.first_name, base.map(|b| &b.first_name)),
        last_name: keep(args.last_name, base.map(|b| &b.last_name)),
        email: keep(args.email, base.map(|b| &b.email)),
        job_title: keep(args.job_title, base.map(|b| &b.job_title)),
        department,
        salary: args
            .salary
            .or_else(|| base.map(|b| format!("{:.0}", b.salary * 100.0)))
            .unwrap_or_default(),
        start_date: args.start_date.or(base.map(|b| b.start_date)),
        status: args
            .status
            .map(EmployeeStatus::from)
            .or(base.map(|b| b.status))
            .unwrap_or_default(),
    })
}

fn print_employees(employees: &[Employee], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&employees)?,
        OutputFormat::Table => {
            println!(
                "{:<16} {:<24} {:<20} {:<16} {:<10} {:<11}",
                "ID", "NAME", "JOB TITLE", "DEPARTMENT", "STATUS", "START"
            );
            for e in employees {
                println!(
                    "{:<16} {:<24} {:<20} {:<16} {:<10} {:<11}",
                    e.id,
                    e.full_name(),
                    e.job_title,
                    e.department,
                    e.status.to_string(),
                    e.start_date
                );
            }
        }
        OutputFormat::Plain => {
            for e in employees {
                println!("{} {} <{}> {}", e.id, e.full_name(), e.email, e.status);
            }
        }
    }
    Ok(())
}

fn print_employee(e: &Employee) {
    println!("{}", e.full_name());
    println!("  Id:          {}", e.id);
    println!("  Email:       {}", e.email);
    println!("  Job title:   {}", e.job_title);
    println!("  Department:  {}", e.department);
    println!("  Salary:      {:.2}", e.salary);
    println!("  Start date:  {}", e.start_date);
    println!("  Status:      {}", e.status);
}

fn handle_employees(ws: &Workspace, cmd: EmployeesCommand) -> anyhow::Result<()> {
    match cmd {
        EmployeesCommand::List { status, format } => {
            let mut employees = ws.employees.load();
            if let Some(status) = status {
                let status: EmployeeStatus = status.into();
                employees.retain(|e| e.status == status);
            }
            print_employees(&employees, format)?;
        }
        EmployeesCommand::Show { id } => {
            let employee = ws
                .employees
                .find(&id)
                .ok_or_else(|| Error::not_found("employee", id))?;
            print_employee(&employee);
        }
        EmployeesCommand::Add(args) => {
            let form = employee_form(ws, args, None)?;
            let employee = ws.employees.add(form)?;
            println!("Added {} ({})", employee.full_name(), employee.id);
        }
        EmployeesCommand::Update { id, fields } => {
            let current = ws
                .employees
                .find(&id)
                .ok_or_else(|| Error::not_found("employee", id.clone()))?;
            let form = employee_form(ws, fields, Some(&current))?;
            let employee = ws.employees.update(&id, form)?;
            println!("Updated {} ({})", employee.full_name(), employee.id);
        }
        EmployeesCommand::Delete { id } => {
            let employee = ws.employees.delete(&id)?;
            println!("Deleted {} ({})", employee.full_name(), employee.id);
        }
        EmployeesCommand::Documents { id, format } => {
            let employee = ws
                .employees
                .find(&id)
                .ok_or_else(|| Error::not_found("employee", id))?;
            print_documents(&ws.documents.for_employee(&employee), format)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Leave

/// Resolve `--employee`/`--name` into an employee id and display name.
fn resolve_employee(
    ws: &Workspace,
    employee: Option<String>,
    name: Option<String>,
) -> anyhow::Result<(Option<String>, Option<String>)> {
    match employee {
        Some(id) => {
            let found = ws
                .employees
                .find(&id)
                .ok_or_else(|| Error::not_found("employee", id.clone()))?;
            Ok((Some(id), Some(name.unwrap_or_else(|| found.full_name()))))
        }
        None => Ok((None, name)),
    }
}

fn leave_form(
    ws: &Workspace,
    args: LeaveArgs,
    base: Option<&LeaveRequest>,
) -> anyhow::Result<LeaveForm> {
    let (employee_id, name) = resolve_employee(ws, args.employee, args.name)?;
    let leave_type = match (args.leave_type, base) {
        (Some(t), _) => pick(&ws.lists, ListKind::LeaveTypes, Some(t.as_str()))?,
        (None, Some(b)) => b.leave_type.clone(),
        (None, None) => pick(&ws.lists, ListKind::LeaveTypes, None)?,
    };

    Ok(LeaveForm {
        employee_id,
        employee_name: name
            .or_else(|| base.map(|b| b.employee_name.clone()))
            .unwrap_or_default(),
        leave_type,
        start_date: args.start_date.or(base.map(|b| b.start_date)),
        end_date: args.end_date.or(base.map(|b| b.end_date)),
        status: base.map(|b| b.status).unwrap_or_default(),
    })
}

fn print_leave(requests: &[LeaveRequest], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&requests)?,
        OutputFormat::Table => {
            println!(
                "{:<20} {:<24} {:<14} {:<11} {:<11} {:<9}",
                "ID", "EMPLOYEE", "TYPE", "START", "END", "STATUS"
            );
            for r in requests {
                println!(
                    "{:<20} {:<24} {:<14} {:<11} {:<11} {:<9}",
                    r.id,
                    r.employee_name,
                    r.leave_type,
                    r.start_date.to_string(),
                    r.end_date.to_string(),
                    r.status.to_string()
                );
            }
        }
        OutputFormat::Plain => {
            for r in requests {
                println!(
                    "{} {} {} {}..{} {}",
                    r.id, r.employee_name, r.leave_type, r.start_date, r.end_date, r.status
                );
            }
        }
    }
    Ok(())
}

fn handle_leave(ws: &Workspace, cmd: LeaveCommand) -> anyhow::Result<()> {
    match cmd {
        LeaveCommand::List { status, format } => {
            let mut requests = ws.leave.load();
            if let Some(status) = status {
                let status: LeaveStatus = status.into();
                requests.retain(|r| r.status == status);
            }
            print_leave(&requests, format)?;
        }
        LeaveCommand::Request(args) => {
            let form = leave_form(ws, args, None)?;
            let request = ws.leave.add(form)?;
            println!(
                "Filed {} for {} ({} to {})",
                request.id, request.employee_name, request.start_date, request.end_date
            );
        }
        LeaveCommand::Update { id, fields, status } => {
            let current = ws
                .leave
                .find(&id)
                .ok_or_else(|| Error::not_found("leave request", id.clone()))?;
            let mut form = leave_form(ws, fields, Some(&current))?;
            if let Some(status) = status {
                form.status = status.into();
            }
            let request = ws.leave.update(&id, form)?;
            println!("Updated {}", request.id);
        }
        LeaveCommand::Approve { id } => {
            let request = ws.leave.approve(&id)?;
            println!("Approved {} for {}", request.id, request.employee_name);
        }
        LeaveCommand::Reject { id } => {
            let request = ws.leave.reject(&id)?;
            println!("Rejected {} for {}", request.id, request.employee_name);
        }
        LeaveCommand::Delete { id } => {
            let request = ws.leave.delete(&id)?;
            println!("Deleted {}", request.id);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Documents

fn document_form(
    ws: &Workspace,
    args: DocumentArgs,
    base: Option<&Document>,
) -> anyhow::Result<DocumentForm> {
    let (employee_id, name) = resolve_employee(ws, args.employee, args.name)?;
    let document_type = match (args.document_type, base) {
        (Some(t), _) => pick(&ws.lists, ListKind::DocumentTypes, Some(t.as_str()))?,
        (None, Some(b)) => b.document_type.clone(),
        (None, None) => pick(&ws.lists, ListKind::DocumentTypes, None)?,
    };

    let mut form = DocumentForm {
        employee_id,
        employee_name: name
            .or_else(|| base.map(|b| b.employee_name.clone()))
            .unwrap_or_default(),
        document_type,
        file_name: args
            .file_name
            .or_else(|| base.map(|b| b.file_name.clone()))
            .unwrap_or_default(),
        file_size: base.map(|b| b.file_size.clone()),
        file_data_url: None,
    };
    if let Some(path) = args.file {
        form.attach_file(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
    }
    Ok(form)
}

fn print_documents(documents: &[Document], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&documents)?,
        OutputFormat::Table => {
            println!(
                "{:<18} {:<24} {:<28} {:<28} {:<8} {:<11}",
                "ID", "EMPLOYEE", "TYPE", "FILE", "SIZE", "UPLOADED"
            );
            for d in documents {
                println!(
                    "{:<18} {:<24} {:<28} {:<28} {:<8} {:<11}",
                    d.id,
                    d.employee_name,
                    d.document_type,
                    d.file_name,
                    d.file_size,
                    d.upload_date.with_timezone(&Local).date_naive()
                );
            }
        }
        OutputFormat::Plain => {
            for d in documents {
                println!(
                    "{} {} {} ({}, {})",
                    d.id, d.employee_name, d.file_name, d.document_type, d.file_size
                );
            }
        }
    }
    Ok(())
}

fn handle_documents(ws: &Workspace, cmd: DocumentsCommand) -> anyhow::Result<()> {
    match cmd {
        DocumentsCommand::List {
            document_type,
            format,
        } => {
            let mut documents = ws.documents.load();
            if let Some(kind) = document_type {
                documents.retain(|d| d.document_type == kind);
            }
            print_documents(&documents, format)?;
        }
        DocumentsCommand::Upload(args) => {
            let form = document_form(ws, args, None)?;
            let document = ws.documents.add(form)?;
            println!(
                "Stored {} ({}) for {}",
                document.file_name, document.file_size, document.employee_name
            );
        }
        DocumentsCommand::Update { id, fields } => {
            let current = ws
                .documents
                .find(&id)
                .ok_or_else(|| Error::not_found("document", id.clone()))?;
            let form = document_form(ws, fields, Some(&current))?;
            let document = ws.documents.update(&id, form)?;
            println!("Updated {}", document.id);
        }
        DocumentsCommand::Export { id, output } => {
            let document = ws
                .documents
                .find(&id)
                .ok_or_else(|| Error::not_found("document", id))?;
            let Some(url) = document.file_data_url.as_deref() else {
                bail!("{} has no stored contents", document.file_name);
            };
            let bytes = decode_data_url(url)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        DocumentsCommand::Delete { id } => {
            let document = ws.documents.delete(&id)?;
            println!("Deleted {}", document.file_name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lists

fn handle_lists(registry: &ListRegistry, cmd: ListsCommand) -> anyhow::Result<()> {
    match cmd {
        ListsCommand::Show { kind, json } => {
            let kinds: Vec<ListKind> =
                kind.map_or_else(|| ListKind::ALL.to_vec(), |k| vec![k.into()]);
            if json {
                let lists: serde_json::Map<String, serde_json::Value> = kinds
                    .iter()
                    .map(|&k| (k.key().to_string(), serde_json::json!(registry.get(k))))
                    .collect();
                print_json(&lists)?;
            } else {
                for k in kinds {
                    println!("[{k}]");
                    for value in registry.get(k) {
                        println!("  {value}");
                    }
                }
            }
        }
        ListsCommand::Add { kind, value } => {
            let kind: ListKind = kind.into();
            match registry.add(kind, &value) {
                Some(values) => println!("{kind}: {}", values.join(", ")),
                None => bail!("cannot add an empty entry to {kind}"),
            }
        }
        ListsCommand::Remove { kind, value } => {
            let kind: ListKind = kind.into();
            let values = registry.remove(kind, &value);
            println!("{kind}: {}", values.join(", "));
        }
        ListsCommand::Reset { kind } => {
            let kind: ListKind = kind.into();
            let defaults = registry.defaults(kind).to_vec();
            registry.set(kind, &defaults);
            println!("{kind}: {}", defaults.join(", "));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Activity, dashboard and reports

fn handle_activity(ws: &Workspace, cmd: &ActivityCommand) -> anyhow::Result<()> {
    let entries: Vec<RecentActivityItem> = if cmd.all {
        ws.activity.all()
    } else {
        ws.activity.recent()
    };

    match cmd.format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Table => {
            println!("{:<6} {:<10} {:<34} {}", "USER", "TIME", "ACTION", "TARGET");
            for a in &entries {
                println!("{:<6} {:<10} {:<34} {}", a.user_avatar, a.time, a.action, a.target);
            }
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No recent activity.");
            }
            for a in &entries {
                println!("{} {} {} ({})", a.user_name, a.action, a.target, a.time);
            }
        }
    }
    Ok(())
}

fn print_dashboard(snapshot: &Snapshot, config: &Config, json: bool) -> anyhow::Result<()> {
    let today = snapshot.day();
    let stats = DashboardStats::compute(&snapshot.employees, &snapshot.leave_requests, today);
    let headcount = headcount_series(&snapshot.employees, today);
    let found = insights(&snapshot.leave_requests, today, &config.dashboard);

    if json {
        return print_json(&serde_json::json!({
            "date": today,
            "stats": stats,
            "headcount": headcount,
            "insights": found,
        }));
    }

    println!("Dashboard ({today})");
    println!("=====================");
    println!("  Total employees:   {}", stats.total_employees);
    println!("  New hires:         {}", stats.new_hires);
    println!(
        "  Turnover rate:     {:.1}% ({:+.1}% vs last month)",
        stats.turnover_rate, stats.turnover_change
    );
    println!("  On leave today:    {}", stats.on_leave);
    println!("  Pending requests:  {}", stats.pending_requests);
    println!();
    println!("[Headcount]");
    for point in &headcount {
        println!("  {:<4} {}", point.name, point.total);
    }
    if !found.is_empty() {
        println!();
        println!("[Insights]");
        for insight in found {
            println!("  - {insight}");
        }
    }
    Ok(())
}

fn handle_dashboard(
    ws: &Workspace,
    config: &Config,
    cmd: &DashboardCommand,
) -> anyhow::Result<()> {
    let refresher = Refresher::new(
        ws.employees.collection().clone(),
        ws.leave.collection().clone(),
        config.refresh_interval(),
    );

    if !cmd.watch {
        return print_dashboard(&refresher.snapshot(), config, cmd.json);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (tx, mut rx) = mpsc::channel(8);
        let (handle, task) = refresher.spawn(tx);

        loop {
            tokio::select! {
                snapshot = rx.recv() => match snapshot {
                    Some(snapshot) => {
                        println!();
                        print_dashboard(&snapshot, config, cmd.json)?;
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    handle.stop();
                    break;
                }
            }
        }

        drop(rx);
        task.await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn handle_reports(ws: &Workspace, cmd: &ReportsCommand) -> anyhow::Result<()> {
    let report = Report::compute(&ws.employees.load(), Local::now().date_naive());
    if cmd.json {
        return print_json(&report);
    }

    println!("HR Report");
    println!("=========");
    println!("  Active employees:  {}", report.total_employees);
    println!("  Turnover rate:     {:.1}%", report.turnover_rate);
    println!();
    println!("[Hires and terminations]");
    for point in &report.turnover {
        println!("  {:<4} +{} -{}", point.name, point.hires, point.terminations);
    }
    println!();
    println!("[Departments]");
    for department in &report.departments {
        println!("  {:<20} {}", department.name, department.value);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Storage and configuration

fn handle_storage(storage: &Storage, cmd: StorageCommand) -> anyhow::Result<()> {
    match cmd {
        StorageCommand::Stats { json } => {
            let stats = storage.stats()?;
            if json {
                print_json(&stats)?;
            } else {
                println!("Storage Statistics");
                println!("==================");
                println!("  Path:          {}", storage.path().display());
                println!("  Keys:          {}", stats.total_keys);
                println!("  Used:          {} bytes", stats.used_bytes);
                println!("  Quota:         {} bytes", stats.quota_bytes);
                println!("  File size:     {} bytes", stats.db_size_bytes);
            }
        }
        StorageCommand::Keys => {
            for key in storage.keys()? {
                println!("{key}");
            }
        }
        StorageCommand::Get { key } => match storage.get_item(&key)? {
            Some(value) => println!("{value}"),
            None => bail!("no value stored under '{key}'"),
        },
        StorageCommand::Clear { yes } => {
            if yes {
                let removed = storage.clear()?;
                println!("Removed {removed} keys.");
            } else {
                println!("This will remove every stored key, including all records.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Quota (bytes):      {}", config.storage.quota_bytes);
                println!();
                println!("[Activity]");
                println!("  Max entries:        {}", config.activity.max_entries);
                println!("  Display limit:      {}", config.activity.display_limit);
                println!();
                println!("[Dashboard]");
                println!(
                    "  Refresh (ms):       {}",
                    config.dashboard.refresh_interval_ms
                );
                println!("  On-leave alert:     {}", config.dashboard.on_leave_alert);
                println!("  Pending alert:      {}", config.dashboard.pending_alert);
                println!();
                println!("[Lists]");
                println!("  Departments:        {}", config.lists.departments.join(", "));
                println!("  Leave types:        {}", config.lists.leave_types.join(", "));
                println!(
                    "  Document types:     {}",
                    config.lists.document_types.join(", ")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
