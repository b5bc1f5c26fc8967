use quill_docs::ImportSpec;
use quill_docs::warnings::WarnRule;

/// Parse a `VERSION:PATH` snapshot import.
///
/// # Errors
///
/// Returns an error message when either half is missing.
pub fn parse_import(s: &str) -> Result<ImportSpec, String> {
    ImportSpec::parse(s).ok_or_else(|| format!("Expected VERSION:PATH, got '{s}'"))
}

/// Validate a warning rule up front so typos fail before any file is read.
pub fn parse_warning_rule(s: &str) -> Result<String, String> {
    s.parse::<WarnRule>()
        .map(|_| s.to_string())
        .map_err(|err| err.to_string())
}
