//! The `quill` run: configuration, input discovery, extraction and output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quill_docs::{Extractor, render_json};
use walkdir::WalkDir;

use crate::cli::Cli;
use crate::config::QuillConfig;
use crate::error::{CliError, Result};
use crate::ui;

/// Extensions picked up when walking a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "css", "scss"];

/// Execute a run with the parsed arguments.
///
/// # Errors
///
/// Configuration problems, missing inputs, unreadable files, missing version
/// snapshots and output failures abort the run. Per-file parse failures are
/// reported as warnings instead.
pub fn execute(args: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = QuillConfig::load(&args, &cwd)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let files = collect_inputs(&config.inputs)?;
    tracing::info!(files = files.len(), "collected sources");

    let extractor = Extractor::new(config.docs);
    let documentation = extractor.extract(files)?;
    let json = render_json(&documentation)?;

    match &config.output {
        Some(path) => write_output(path, &json)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    if !args.quiet {
        let summary = format!(
            "Documented {} ({})",
            ui::plural(documentation.relations.len(), "class", "classes"),
            ui::plural(documentation.warnings.len(), "warning", "warnings"),
        );
        if documentation.warnings.is_empty() {
            ui::success(&summary);
        } else {
            ui::warning(&summary);
        }
        if let Some(path) = &config.output {
            ui::info(&format!("Wrote {}", path.display()));
        }
    }
    Ok(())
}

/// Expand files and directories into a sorted, de-duplicated list of
/// sources. Explicit files are kept whatever their extension.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(CliError::NoInputs);
    }
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found = walk_sources(input)?;
            found.sort();
            files.append(&mut found);
        } else {
            return Err(CliError::InputNotFound(input.clone()));
        }
    }
    let mut seen = std::collections::HashSet::new();
    files.retain(|path| seen.insert(path.clone()));
    if files.is_empty() {
        return Err(CliError::NoInputs);
    }
    Ok(files)
}

fn walk_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|error| CliError::Walk {
            path: dir.to_path_buf(),
            error,
        })?;
        if entry.file_type().is_file() && is_source(entry.path()) {
            found.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %dir.display(), files = found.len(), "walked input directory");
    Ok(found)
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    fs::write(path, format!("{json}\n")).map_err(|error| CliError::Output {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_collect_inputs_walks_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/b.js"), "").unwrap();
        fs::write(root.join("src/a.scss"), "").unwrap();
        fs::write(root.join("src/nested/c.css"), "").unwrap();
        fs::write(root.join("src/readme.md"), "").unwrap();

        let files = collect_inputs(&[root.join("src")]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/a.scss", "src/b.js", "src/nested/c.css"]);
    }

    #[test]
    fn test_collect_inputs_keeps_explicit_files_once() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("legacy.txt");
        fs::write(&file, "").unwrap();

        let files = collect_inputs(&[file.clone(), file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_inputs_errors() {
        assert!(matches!(collect_inputs(&[]), Err(CliError::NoInputs)));

        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.js");
        assert!(matches!(
            collect_inputs(&[missing]),
            Err(CliError::InputNotFound(_))
        ));

        fs::create_dir_all(temp.path().join("empty")).unwrap();
        assert!(matches!(
            collect_inputs(&[temp.path().join("empty")]),
            Err(CliError::NoInputs)
        ));
    }
}
