//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::lists::ListKind;
use crate::model::{EmployeeStatus, LeaveStatus};

/// Employee directory commands.
#[derive(Debug, Subcommand)]
pub enum EmployeesCommand {
    /// List employees
    List {
        /// Only show employees with this status
        #[arg(short, long, value_enum)]
        status: Option<EmployeeStatusArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one employee
    Show {
        /// Employee id
        id: String,
    },

    /// Add an employee
    Add(EmployeeArgs),

    /// Edit an employee; omitted fields keep their current value
    Update {
        /// Employee id
        id: String,

        #[command(flatten)]
        fields: EmployeeArgs,
    },

    /// Delete an employee (leave requests and documents are kept)
    Delete {
        /// Employee id
        id: String,
    },

    /// List documents filed for an employee
    Documents {
        /// Employee id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Employee form fields.
#[derive(Debug, Clone, Default, Args)]
pub struct EmployeeArgs {
    /// Given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Job title
    #[arg(long)]
    pub job_title: Option<String>,

    /// Department (defaults to the first configured department)
    #[arg(short, long)]
    pub department: Option<String>,

    /// Salary as typed in the form; digits are read as cents ("R$ 5.000,00" or 500000)
    #[arg(long)]
    pub salary: Option<String>,

    /// First day of employment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Employment status
    #[arg(short, long, value_enum)]
    pub status: Option<EmployeeStatusArg>,
}

/// Leave request commands.
#[derive(Debug, Subcommand)]
pub enum LeaveCommand {
    /// List leave requests
    List {
        /// Only show requests with this status
        #[arg(short, long, value_enum)]
        status: Option<LeaveStatusArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// File a leave request
    Request(LeaveArgs),

    /// Edit a leave request; omitted fields keep their current value
    Update {
        /// Request id
        id: String,

        #[command(flatten)]
        fields: LeaveArgs,

        /// Review state
        #[arg(short, long, value_enum)]
        status: Option<LeaveStatusArg>,
    },

    /// Approve a leave request
    Approve {
        /// Request id
        id: String,
    },

    /// Reject a leave request
    Reject {
        /// Request id
        id: String,
    },

    /// Delete a leave request
    Delete {
        /// Request id
        id: String,
    },
}

/// Leave form fields.
#[derive(Debug, Clone, Default, Args)]
pub struct LeaveArgs {
    /// Employee id to file for; fills in the employee name
    #[arg(short, long)]
    pub employee: Option<String>,

    /// Employee name, when no employee id is given
    #[arg(short, long)]
    pub name: Option<String>,

    /// Leave type (defaults to the first configured leave type)
    #[arg(short = 't', long)]
    pub leave_type: Option<String>,

    /// First day of leave (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of leave (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

/// Document commands.
#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List documents
    List {
        /// Only show documents of this type
        #[arg(short = 't', long)]
        document_type: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Upload a document
    Upload(DocumentArgs),

    /// Edit a document; omitted fields keep their current value
    Update {
        /// Document id
        id: String,

        #[command(flatten)]
        fields: DocumentArgs,
    },

    /// Write a document's stored contents to a file
    Export {
        /// Document id
        id: String,

        /// Destination (defaults to the document's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },
}

/// Document form fields.
#[derive(Debug, Clone, Default, Args)]
pub struct DocumentArgs {
    /// Employee id the document belongs to; fills in the employee name
    #[arg(short, long)]
    pub employee: Option<String>,

    /// Employee name, when no employee id is given
    #[arg(short, long)]
    pub name: Option<String>,

    /// Document type (defaults to the first configured document type)
    #[arg(short = 't', long)]
    pub document_type: Option<String>,

    /// Local file to attach; sets the file name and size
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// File name, when no file is attached
    #[arg(long)]
    pub file_name: Option<String>,
}

/// Type list commands.
#[derive(Debug, Subcommand)]
pub enum ListsCommand {
    /// Show one list, or all of them
    Show {
        /// Which list
        #[arg(value_enum)]
        kind: Option<ListKindArg>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Append an entry
    Add {
        /// Which list
        #[arg(value_enum)]
        kind: ListKindArg,

        /// Entry to add
        value: String,
    },

    /// Remove every entry equal to a value
    Remove {
        /// Which list
        #[arg(value_enum)]
        kind: ListKindArg,

        /// Entry to remove
        value: String,
    },

    /// Restore a list's configured defaults
    Reset {
        /// Which list
        #[arg(value_enum)]
        kind: ListKindArg,
    },
}

/// Activity feed arguments.
#[derive(Debug, Args)]
pub struct ActivityCommand {
    /// Show every stored entry instead of the most recent ones
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Dashboard arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Keep re-reading and printing until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report arguments.
#[derive(Debug, Args)]
pub struct ReportsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Storage area commands.
#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// Show usage against the quota
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List stored keys
    Keys,

    /// Print the raw value stored under a key
    Get {
        /// Storage key, e.g. nh_departments
        key: String,
    },

    /// Remove every stored key
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Employee status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmployeeStatusArg {
    /// Currently working
    Active,
    /// On leave
    OnLeave,
    /// No longer employed
    Terminated,
}

impl From<EmployeeStatusArg> for EmployeeStatus {
    fn from(arg: EmployeeStatusArg) -> Self {
        match arg {
            EmployeeStatusArg::Active => Self::Active,
            EmployeeStatusArg::OnLeave => Self::OnLeave,
            EmployeeStatusArg::Terminated => Self::Terminated,
        }
    }
}

/// Leave status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LeaveStatusArg {
    /// Awaiting a decision
    Pending,
    /// Approved
    Approved,
    /// Rejected
    Rejected,
}

impl From<LeaveStatusArg> for LeaveStatus {
    fn from(arg: LeaveStatusArg) -> Self {
        match arg {
            LeaveStatusArg::Pending => Self::Pending,
            LeaveStatusArg::Approved => Self::Approved,
            LeaveStatusArg::Rejected => Self::Rejected,
        }
    }
}

/// Type list argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKindArg {
    /// Departments
    Departments,
    /// Leave types
    LeaveTypes,
    /// Document types
    DocumentTypes,
}

impl From<ListKindArg> for ListKind {
    fn from(arg: ListKindArg) -> Self {
        match arg {
            ListKindArg::Departments => Self::Departments,
            ListKindArg::LeaveTypes => Self::LeaveTypes,
            ListKindArg::DocumentTypes => Self::DocumentTypes,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
