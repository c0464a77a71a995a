//! Command-line parsing.
//!
//! Keeps **argument parsing** separate from the geometry code; everything here
//! is turned into recipe inputs by `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "emir-slitlets",
    version,
    about = "Select unrectified slitlet regions of raw EMIR multislit frames"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mask or extract the detector region of selected slitlets.
    Select(SelectArgs),
    /// List registered recipes and their inputs.
    Recipes,
}

#[derive(Debug, Parser, Clone)]
pub struct SelectArgs {
    /// Raw frame file (JSON: header + data rows).
    #[arg(value_name = "FRAME")]
    pub frame: PathBuf,

    /// Fitted boundary parameters of the multislit model (JSON).
    #[arg(long = "fitted-bound-param", value_name = "JSON")]
    pub fitted_bound_param: PathBuf,

    /// Slitlet selection: blank-separated n1[,n2[,step]] tuples, e.g. "2,10 20,40,2".
    #[arg(long)]
    pub slitlets: String,

    /// Output frame file; must not exist. Defaults to `<frame>_slitlets.json`.
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Write a 0/1 mask instead of the extracted pixel values.
    #[arg(long)]
    pub maskonly: bool,

    /// Report verbosity (0, ±1, ±2, ±10, ±11, ±12, ±21, ±22).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub debugplot: i32,

    /// Log the full command line.
    #[arg(long)]
    pub echo: bool,
}
