//! Command-line host for the Dataverse and form nodes

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Run Dataverse connector operations and build multi-step forms
#[derive(Parser, Debug)]
#[command(name = "dataverse-nodes", version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.config/dataverse-nodes/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read records with FetchXML, an OData path or a column list
    Get(GetArgs),
    /// Update a record
    Update(UpdateArgs),
    /// Create a record
    Create(CreateArgs),
    /// List tables with their display names
    Tables,
    /// List the columns of a table
    Columns {
        /// Logical name of the table
        entity: String,
    },
    /// Options of a table's choice column
    OptionSet {
        /// Logical name of the table
        entity: String,
        /// Logical name of the choice column
        attribute: String,
    },
    /// Options of a global choice
    GlobalOptionSet {
        /// Name of the global choice
        name: String,
    },
    /// Id/name pairs from any table
    Lookup {
        /// Logical name of the table
        entity: String,
        /// Column holding the record id
        #[arg(long)]
        id_column: String,
        /// Column holding the display name
        #[arg(long)]
        name_column: String,
    },
    /// Run a node operation over a batch of items described in a JSON file
    Run {
        /// Batch file: {operation, parameters, items, itemParameters}
        file: PathBuf,
        /// Keep going when an item fails
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Build and render multi-step forms
    #[command(subcommand)]
    Form(FormCommands),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum QueryKind {
    Fetchxml,
    Odata,
    Column,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// How to interpret the query
    #[arg(short = 't', long = "type", value_enum, default_value = "fetchxml")]
    pub query_type: QueryKind,

    /// FetchXML document or OData path
    pub query: Option<String>,

    /// Read the query from a file instead
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Table for column queries
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Comma-separated columns for column queries
    #[arg(long)]
    pub columns: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Logical name of the table
    pub entity: String,
    /// Id of the record to update
    pub record_id: String,

    /// JSON object with the new values
    #[arg(short, long)]
    pub data: Option<String>,

    /// Extra column value as NAME=VALUE, repeatable; wins over --data
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub columns: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Logical name of the table
    pub entity: String,

    /// JSON object with the record's values
    #[arg(short, long)]
    pub data: Option<String>,

    /// Extra column value as NAME=VALUE, repeatable; wins over --data
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub columns: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum FormCommands {
    /// Append a step to a form document and print the result
    Append {
        /// Previous form document (JSON); omitted starts a new form
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Name of the new step
        #[arg(short, long)]
        step: String,

        /// Field as name:label[:type[:required]], repeatable
        #[arg(short, long = "field", value_name = "FIELD")]
        fields: Vec<String>,
    },
    /// Render a form document as HTML
    Render {
        /// Form document (JSON)
        file: PathBuf,
    },
    /// Render the standalone multi-step page
    Page {
        /// Steps as {step: [{stepName, fields: {field: [...]}}]}
        file: PathBuf,

        /// Page title
        #[arg(short, long, default_value = "Form")]
        title: String,

        /// URL the page posts back to
        #[arg(short, long, default_value = "")]
        webhook_url: String,
    },
}
