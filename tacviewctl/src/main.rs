//! Ingest a Tacview ACMI telemetry stream — live from a server or from a
//! recording — enrich every object with its derived velocity and its
//! parent/impact associations, and store the result in DuckDB.
//!
//! The enrichment itself lives in `tacview-engine`; this binary is the
//! glue: CLI, network client, file reader and the DuckDB writer.
//!

use std::env;
use std::io;

use clap::{crate_authors, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use duckdb::Connection;
use eyre::Result;
use tracing::trace;

use tacview_common::init_logging;

use crate::cli::{Opts, SubCommand};
use crate::db::DuckSink;
use crate::error::Status;
use crate::pump::Pump;

mod cli;
mod client;
mod db;
mod error;
mod export;
mod import;
mod pump;

/// Binary name
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // Commands needing neither logging nor a database.
    //
    match &opts.subcmd {
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            eprintln!("Generating completion file for {}", generator);

            let mut cmd = Opts::command();
            generate(generator, &mut cmd, NAME, &mut io::stdout());
            return Ok(());
        }
        SubCommand::Version => {
            println!(
                "{}/{}\n{}\n{}\n{}",
                NAME,
                VERSION,
                tacview_common::version(),
                tacview_formats::version(),
                tacview_engine::version()
            );
            return Ok(());
        }
        _ => (),
    }

    init_logging(opts.tree)?;
    banner();

    // We must operate on a database.
    //
    let name = opts
        .database
        .clone()
        .or_else(|| env::var("TACVIEW_DB").ok())
        .ok_or(Status::NoDatabase)?;
    trace!("Opening {}", name);
    let dbh = Connection::open(&name)?;

    match &opts.subcmd {
        SubCommand::Createdb => db::create_tables(&dbh)?,
        SubCommand::Dropdb => db::drop_tables(&dbh)?,
        SubCommand::Stats => db::show_stats(&dbh)?,
        SubCommand::Export(eopts) => {
            let count = export::export_objects(&dbh, eopts.output.as_deref())?;
            eprintln!("{} objects exported.", count);
        }
        SubCommand::Stream(sopts) => {
            let sink = DuckSink::new(dbh, sopts.batch_size)?;
            let mut pump = Pump::new(sink);
            client::stream_from(&sopts.host, sopts.port, sopts.max_lines, &mut pump).await?;
            let stats = pump.finish()?;
            eprintln!("{}", stats);
        }
        SubCommand::Import(iopts) => {
            if !iopts.input.exists() {
                return Err(Status::NoSuchFile(iopts.input.display().to_string()).into());
            }
            let sink = DuckSink::new(dbh, iopts.batch_size)?;
            let mut pump = Pump::new(sink);
            import::import_file(&iopts.input, &mut pump)?;
            let stats = pump.finish()?;
            eprintln!("{}", stats);
        }
        SubCommand::Completion(_) | SubCommand::Version => (),
    }
    Ok(())
}

/// Display banner
///
fn banner() {
    eprintln!("{}/{} by {}\n", NAME, VERSION, AUTHORS);
}
