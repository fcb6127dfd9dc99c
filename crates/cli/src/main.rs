// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # registrar - command-line front end
//!
//! Drives the case workflow engine against a `SQLite` database and a blob
//! directory. Every subcommand performs one operation and prints its result
//! as JSON on stdout; logs go to stderr.
//!
//! ```bash
//! registrar create --kind death_of_student --student 0420240032 \
//!     --detail date_of_death=2026-08-30 \
//!     --attach supporting-document=certificate.pdf --by staff
//! registrar finalize --kind death_of_student --id 1789000000000123 --by staff
//! registrar approve --kind death_of_student --id 001/PMA/MD/IX/2026 --by wadir1
//! ```

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod app;
mod commands;

#[cfg(test)]
mod tests;

use app::{App, StoreOptions};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use color_eyre::Result;
use commands::Command;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let output: serde_json::Value = args.run()?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Registrar case workflow
#[derive(Debug, Parser)]
#[command(name = "registrar", author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    store: StoreOptions,

    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

impl Args {
    fn run(self) -> Result<serde_json::Value> {
        let app: App = App::open(&self.store)?;
        self.command.run(&app)
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}
