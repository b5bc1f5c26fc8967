//! Status messages on stderr.

use console::style;

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), message);
}

/// Enable or disable styling for everything printed through this module.
pub fn init_colors(enabled: bool) {
    console::set_colors_enabled_stderr(enabled);
}

/// `1 class`, `3 classes`.
pub fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
