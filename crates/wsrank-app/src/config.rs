// Configuration loading and parsing (config/wsrank.toml).

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wsrank_baseball::pipeline::PipelineOptions;
use wsrank_baseball::salary::ReconcilePolicy;
use wsrank_core::PercentileKind;

pub const CONFIG_FILE: &str = "wsrank.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the databank CSV files.
    pub data_dir: PathBuf,
    /// Directory the exported tables are written to.
    pub output_dir: PathBuf,
    pub analysis: AnalysisConfig,
    pub reconciliation: ReconciliationConfig,
}

// ---------------------------------------------------------------------------
// wsrank.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire wsrank.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    data: DataSection,
    output: OutputSection,
    #[serde(default)]
    analysis: AnalysisConfig,
    #[serde(default)]
    reconciliation: ReconciliationConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputSection {
    dir: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub percentile_kind: PercentileKind,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Reconcile every season whose salary ids do not match the team ids.
    #[default]
    Auto,
    /// Reconcile only the listed seasons.
    Seasons,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default)]
    pub mode: ReconcileMode,
    #[serde(default)]
    pub seasons: Vec<i32>,
}

impl Config {
    /// Translate the analysis settings into pipeline options.
    pub fn pipeline_options(&self) -> PipelineOptions {
        let reconcile = match self.reconciliation.mode {
            ReconcileMode::Auto => ReconcilePolicy::Auto,
            ReconcileMode::Seasons => {
                ReconcilePolicy::Seasons(self.reconciliation.seasons.iter().copied().collect::<BTreeSet<_>>())
            }
        };
        PipelineOptions {
            percentile_kind: self.analysis.percentile_kind,
            reconcile,
            min_year: self.analysis.min_year,
            max_year: self.analysis.max_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/wsrank.toml` relative to the
/// given `base_dir`. Relative directories in the file resolve against
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate_dir("data.dir", &file.data.dir)?;
    validate_dir("output.dir", &file.output.dir)?;

    let config = Config {
        data_dir: base_dir.join(&file.data.dir),
        output_dir: base_dir.join(&file.output.dir),
        analysis: file.analysis,
        reconciliation: file.reconciliation,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/wsrank.toml` into `config/` when the config file is
/// missing. Returns the path that was created, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_path = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !default_path.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither config/{CONFIG_FILE} nor defaults/{CONFIG_FILE} found in {}; \
                 run from the project root or ensure defaults/ is present",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&default_path, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", default_path.display()),
    })?;

    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures the default config file is copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_dir(field: &str, dir: &str) -> Result<(), ConfigError> {
    if dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if let (Some(min), Some(max)) = (config.analysis.min_year, config.analysis.max_year) {
        if min > max {
            return Err(ConfigError::ValidationError {
                field: "analysis.min_year".into(),
                message: format!("must not exceed analysis.max_year ({min} > {max})"),
            });
        }
    }

    if config.reconciliation.mode == ReconcileMode::Seasons && config.reconciliation.seasons.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "reconciliation.seasons".into(),
            message: "must list at least one season when mode = \"seasons\"".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Write `contents` as config/wsrank.toml under a fresh temp dir.
    fn write_config(contents: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config").join(CONFIG_FILE), contents).unwrap();
        tmp
    }

    /// The shipped defaults file at the workspace root.
    fn defaults_file() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join("defaults")
            .join(CONFIG_FILE)
    }

    #[test]
    fn load_minimal_config_uses_defaults() {
        let tmp = write_config(
            r#"
[data]
dir = "data/core"

[output]
dir = "out"
"#,
        );
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.data_dir, tmp.path().join("data/core"));
        assert_eq!(config.output_dir, tmp.path().join("out"));
        assert_eq!(config.analysis.percentile_kind, PercentileKind::Mean);
        assert_eq!(config.reconciliation.mode, ReconcileMode::Auto);
        assert_eq!(config.pipeline_options().reconcile, ReconcilePolicy::Auto);
    }

    #[test]
    fn load_full_config() {
        let tmp = write_config(
            r#"
[data]
dir = "data/core"

[output]
dir = "out"

[analysis]
percentile_kind = "strict"
min_year = 1985
max_year = 2016

[reconciliation]
mode = "seasons"
seasons = [2016]
"#,
        );
        let config = load_config_from(tmp.path()).unwrap();
        let options = config.pipeline_options();
        assert_eq!(options.percentile_kind, PercentileKind::Strict);
        assert_eq!(options.min_year, Some(1985));
        assert_eq!(options.max_year, Some(2016));
        assert_eq!(
            options.reconcile,
            ReconcilePolicy::Seasons([2016].into_iter().collect())
        );
    }

    #[test]
    fn missing_config_is_file_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = write_config("[data\ndir = ");
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn unknown_percentile_kind_is_parse_error() {
        let tmp = write_config(
            r#"
[data]
dir = "d"
[output]
dir = "o"
[analysis]
percentile_kind = "median"
"#,
        );
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn inverted_year_bounds_rejected() {
        let tmp = write_config(
            r#"
[data]
dir = "d"
[output]
dir = "o"
[analysis]
min_year = 2010
max_year = 2000
"#,
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "analysis.min_year"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn seasons_mode_requires_seasons() {
        let tmp = write_config(
            r#"
[data]
dir = "d"
[output]
dir = "o"
[reconciliation]
mode = "seasons"
"#,
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "reconciliation.seasons"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_data_dir_rejected() {
        let tmp = write_config(
            r#"
[data]
dir = " "
[output]
dir = "o"
"#,
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "data.dir"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ensure_copies_defaults_once() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(defaults_file(), tmp.path().join("defaults").join(CONFIG_FILE)).unwrap();

        let copied = ensure_config_file(tmp.path()).unwrap();
        assert_eq!(copied, Some(tmp.path().join("config").join(CONFIG_FILE)));
        assert_eq!(ensure_config_file(tmp.path()).unwrap(), None);

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.analysis.percentile_kind, PercentileKind::Mean);
    }

    #[test]
    fn ensure_without_defaults_or_config_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ensure_config_file(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
    }
}
