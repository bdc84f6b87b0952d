//! Command-line interface for novahr.
//!
//! This module provides the CLI structure and command handlers for the
//! `novahr` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ActivityCommand, ConfigCommand, DashboardCommand, DocumentArgs, DocumentsCommand,
    EmployeeArgs, EmployeeStatusArg, EmployeesCommand, LeaveArgs, LeaveCommand, LeaveStatusArg,
    ListKindArg, ListsCommand, OutputFormat, ReportsCommand, StorageCommand,
};

/// novahr - Local-first HR administration
///
/// Keeps employees, leave requests, documents and an activity feed in a local
/// storage file, and shows dashboard figures derived from them.
#[derive(Debug, Parser)]
#[command(name = "novahr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the employee directory
    #[command(subcommand)]
    Employees(EmployeesCommand),

    /// Manage leave requests
    #[command(subcommand)]
    Leave(LeaveCommand),

    /// Manage employee documents
    #[command(subcommand)]
    Documents(DocumentsCommand),

    /// Edit departments, leave types and document types
    #[command(subcommand)]
    Lists(ListsCommand),

    /// Show the activity feed
    Activity(ActivityCommand),

    /// Show headline figures
    Dashboard(DashboardCommand),

    /// Show turnover and department reports
    Reports(ReportsCommand),

    /// Inspect the storage area
    #[command(subcommand)]
    Storage(StorageCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
