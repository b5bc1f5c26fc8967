//! Logging setup for the Quill CLI.
//!
//! Library events (per-file debug lines, per-pass summaries, warnings) go
//! through `tracing`; this module installs the subscriber that prints them
//! to stderr, so stdout stays clean for JSON output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "quill=debug,quill_docs=debug,quill_cli=debug";
const QUIET_FILTER: &str = "quill=error,quill_docs=error,quill_cli=error";
const DEFAULT_FILTER: &str = "quill=info,quill_docs=info,quill_cli=info";

/// Filter chosen by the global flags.
///
/// 1. `--verbose`: debug for quill crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG` when set
/// 4. info for quill crates
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Whether stderr can take ANSI colors.
///
/// `NO_COLOR` disables and `FORCE_COLOR` forces colors; otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
