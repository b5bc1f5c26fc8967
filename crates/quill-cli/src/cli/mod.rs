//! Command-line interface definition for Quill.
//!
//! `quill [OPTIONS] <INPUT>...` reads JavaScript and SCSS sources (files or
//! directories), resolves the documented class graph and writes it as JSON.

mod validation;

use std::path::PathBuf;

use clap::Parser;
use quill_docs::ImportSpec;

pub use validation::{parse_import, parse_warning_rule};

/// Quill - API documentation for framework-style JavaScript and SCSS
#[derive(Parser, Debug)]
#[command(
    name = "quill",
    version,
    about = "Generate API documentation from doc-comments",
    long_about = "Quill reads /** ... */ doc-comments from JavaScript and SCSS sources,\n\
                  resolves classes, inheritance, mixins and aliases, and writes the\n\
                  finished class graph as JSON."
)]
pub struct Cli {
    /// Files or directories to document
    ///
    /// Directories are walked recursively for .js, .css and .scss files.
    /// May be omitted when `inputs` is set in quill.toml.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to ./quill.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Warning rule, `[+|-]type[:path-prefix]`; repeatable, last match wins
    ///
    /// Examples:
    ///   --warnings=-all --warnings=+tag
    ///   --warnings=-global:vendor/
    #[arg(long = "warnings", value_name = "RULE", value_parser = parse_warning_rule, allow_hyphen_values = true)]
    pub warnings: Vec<String>,

    /// Earlier API snapshot as `VERSION:PATH`; repeat oldest first
    #[arg(long = "import", value_name = "VERSION:PATH", value_parser = parse_import)]
    pub imports: Vec<ImportSpec>,

    /// Namespace whose define/extend calls declare classes (default: Ext)
    #[arg(long = "ext-namespace", value_name = "NS")]
    pub ext_namespaces: Vec<String>,

    /// Drop members that belong to no class instead of collecting them in `global`
    #[arg(long)]
    pub ignore_global: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}
