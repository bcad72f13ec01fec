use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "covenant", version, about = "Covenant IDL contract tool")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Server configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load and check a contract, then print its catalog.
    Inspect {
        /// IDL file (JSON array of schema entries).
        idl: PathBuf,
    },

    /// Validate one value against a declared type.
    Validate {
        /// IDL file (JSON array of schema entries).
        idl: PathBuf,

        /// Base type name: primitive kind, struct or enum.
        #[arg(long = "type")]
        type_name: String,

        /// Accept null.
        #[arg(long)]
        optional: bool,

        /// Number of array levels around the base type.
        #[arg(long, default_value_t = 0)]
        array_depth: usize,

        /// Validate as a handler result instead of a request argument.
        #[arg(long)]
        response: bool,

        /// Inline JSON value, or @path to read it from a file.
        value: String,
    },

    /// Decode a request payload and validate its params. No handler runs.
    CheckRequest {
        /// IDL file (JSON array of schema entries).
        idl: PathBuf,

        /// Request file (single request or batch).
        request: PathBuf,
    },
}
