//! CLI module for the role binding store
//!
//! Every subcommand wires the configured store into the role binding
//! repository and prints its result as JSON on stdout.

pub mod role_binding;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Role binding store - typed persistence for project role bindings
#[derive(Parser)]
#[command(name = "rolebinding-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one role binding
    Get { project: String, name: String },

    /// List role bindings
    List(role_binding::ListArgs),

    /// Create a role binding from a JSON file, failing if it exists
    Create { file: PathBuf },

    /// Create or replace a role binding from a JSON file
    Apply { file: PathBuf },

    /// Delete one role binding
    Delete { project: String, name: String },

    /// Delete every role binding of a project ("" deletes them in all projects)
    DeleteAll { project: String },
}

impl Command {
    /// Whether the command writes to the store
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Apply { .. } | Self::Delete { .. } | Self::DeleteAll { .. }
        )
    }
}
