use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};
use clap_complete::Shell;

#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// Database file to use (or $TACVIEW_DB).
    #[clap(short = 'd', long)]
    pub database: Option<String>,
    /// Hierarchical trace output.
    #[clap(short = 'T', long)]
    pub tree: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Connect to a Tacview server and ingest the live stream.
    Stream(StreamOpts),
    /// Read a .acmi recording and ingest it.
    Import(ImportOpts),
    /// Create all tables.
    Createdb,
    /// Drop all tables.
    Dropdb,
    /// Summary statistics about stored objects.
    Stats,
    /// Export the object table as CSV.
    Export(ExportOpts),
    /// Generate shell completions.
    Completion(CompOpts),
    /// List all package versions.
    Version,
}

#[derive(Debug, Parser)]
pub struct StreamOpts {
    /// Tacview host to connect to.
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port to connect on.
    #[clap(short = 'p', long, default_value_t = 42674)]
    pub port: u16,
    /// Stop after this many lines.
    #[clap(long)]
    pub max_lines: Option<usize>,
    /// Number of positional events per bulk insert.
    #[clap(short = 'B', long, default_value_t = 5000)]
    pub batch_size: usize,
}

#[derive(Debug, Parser)]
pub struct ImportOpts {
    /// Path to the recording.
    pub input: PathBuf,
    /// Number of positional events per bulk insert.
    #[clap(short = 'B', long, default_value_t = 5000)]
    pub batch_size: usize,
}

#[derive(Debug, Parser)]
pub struct ExportOpts {
    /// Output file (default is stdout).
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct CompOpts {
    /// Shell to generate completions for.
    pub shell: Shell,
}
