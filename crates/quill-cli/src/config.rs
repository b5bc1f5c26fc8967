//! Layered configuration.
//!
//! Priority, lowest first: built-in defaults, `quill.toml` (or `--config`),
//! `QUILL_*` environment variables, command-line flags. Nested keys in the
//! environment use a double underscore, e.g. `QUILL_PASSES__NODOC=true`.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use quill_docs::DocsConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "quill.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Files or directories to document.
    pub inputs: Vec<PathBuf>,
    /// JSON destination; stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub docs: DocsConfig,
}

/// Flags that replace configured values when given.
#[derive(Debug, Default, Serialize)]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ext_namespaces: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignore_global: bool,
}

impl FlagOverrides {
    fn from_args(args: &Cli) -> Self {
        Self {
            inputs: args.inputs.clone(),
            output: args.output.clone(),
            ext_namespaces: args.ext_namespaces.clone(),
            ignore_global: args.ignore_global,
        }
    }
}

impl QuillConfig {
    /// Load configuration for a run started in `cwd`.
    ///
    /// Warning rules and imports from the command line are appended to the
    /// configured ones, so file rules apply first and flags win ties.
    pub fn load(args: &Cli, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(QuillConfig::default()));

        let config_file = match &args.config {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.clone()).into());
                }
                Some(path.clone())
            }
            None => {
                let default_path = cwd.join(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };
        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(Env::prefixed("QUILL_").split("__"))
            .merge(Serialized::defaults(FlagOverrides::from_args(args)));

        let mut config: QuillConfig = figment
            .extract()
            .map_err(|err| ConfigError::Invalid(Box::new(err)))?;
        config.docs.warnings.extend(args.warnings.iter().cloned());
        config.docs.imports.extend(args.imports.iter().cloned());

        // Relative paths in a config file are relative to that file.
        if let Some(base) = config_file.as_deref().and_then(Path::parent) {
            for import in &mut config.docs.imports {
                if import.path.is_relative() && !args.imports.contains(import) {
                    import.path = base.join(&import.path);
                }
            }
            if args.inputs.is_empty() {
                for input in &mut config.inputs {
                    if input.is_relative() {
                        *input = base.join(&*input);
                    }
                }
            }
        }
        Ok(config)
    }

    /// The effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn args(argv: &[&str]) -> Cli {
        let mut full = vec!["quill"];
        full.extend_from_slice(argv);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = QuillConfig::load(&args(&["a.js"]), temp.path()).unwrap();
        assert_eq!(config.inputs, vec![PathBuf::from("a.js")]);
        assert_eq!(config.docs.ext_namespaces, vec!["Ext"]);
        assert!(config.docs.passes.accessors);
        assert!(!config.docs.passes.nodoc);
    }

    #[test]
    fn test_file_values_and_flag_overrides() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"
inputs = ["src"]
output = "out/docs.json"
ext_namespaces = ["Ext", "MyApp"]
warnings = ["-global"]
external_classes = ["jQuery"]

[passes]
nodoc = true
"#,
        )
        .unwrap();

        let config = QuillConfig::load(&args(&["--warnings=+global:app/", "-o", "cli.json"]), temp.path()).unwrap();
        assert_eq!(config.inputs, vec![temp.path().join("src")]);
        assert_eq!(config.output, Some(PathBuf::from("cli.json")));
        assert_eq!(config.docs.ext_namespaces, vec!["Ext", "MyApp"]);
        assert_eq!(config.docs.warnings, vec!["-global", "+global:app/"]);
        assert_eq!(config.docs.external_classes, vec!["jQuery"]);
        assert!(config.docs.passes.nodoc);
        assert!(config.docs.passes.fires);
    }

    #[test]
    fn test_config_imports_resolve_against_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.toml");
        fs::write(&file, "[[imports]]\nversion = \"1.0\"\npath = \"old/1.0.json\"\n").unwrap();

        let config = QuillConfig::load(
            &args(&["--config", file.to_str().unwrap(), "--import", "2.0:new.json", "a.js"]),
            Path::new("/nonexistent"),
        )
        .unwrap();
        let paths: Vec<PathBuf> = config.docs.imports.iter().map(|i| i.path.clone()).collect();
        assert_eq!(paths, vec![temp.path().join("old/1.0.json"), PathBuf::from("new.json")]);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = QuillConfig::load(&args(&["--config", "nope.toml", "a.js"]), temp.path());
        assert!(matches!(result, Err(crate::error::CliError::Config(ConfigError::NotFound(_)))));
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "ignore_global = \"sometimes\"\n").unwrap();
        let result = QuillConfig::load(&args(&["a.js"]), temp.path());
        assert!(matches!(result, Err(crate::error::CliError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_to_toml_reflects_flags() {
        let temp = TempDir::new().unwrap();
        let config = QuillConfig::load(&args(&["--ignore-global", "a.js"]), temp.path()).unwrap();
        let text = config.to_toml().unwrap();
        assert!(text.contains("ignore_global = true"));
    }
}
