//! Configuration loading for ai-reporter
//!
//! Loads configuration from an `ai-reporter.toml` file found by walking up
//! from the working directory. Values are validated up front; a bad value
//! fails with a descriptive [`ConfigError`] before any failure is processed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "ai-reporter.toml";
pub const DEFAULT_MAX_FRAMES: usize = 8;
/// Default output directory, relative to the project root
pub const DEFAULT_OUTPUT_DIR: &str = "tests/_output";

static DRIVE_LETTER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:[\\/]").unwrap());

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid `format`; expected one of: text, json, both.")]
    InvalidFormat,

    #[error("Invalid `output`; expected a non-empty directory path.")]
    InvalidOutput,

    #[error("Invalid `max_frames`; expected a positive integer.")]
    InvalidMaxFrames,

    #[error("Invalid `{0}`; expected boolean.")]
    InvalidFlag(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which report files to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Both,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "both" => Some(ReportFormat::Both),
            _ => None,
        }
    }
}

/// Unvalidated settings, as written in the config file or given on the CLI
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct RawConfig {
    #[serde(default)]
    pub format: Option<toml::Value>,
    #[serde(default)]
    pub output: Option<toml::Value>,
    #[serde(default)]
    pub max_frames: Option<toml::Value>,
    #[serde(default)]
    pub include_steps: Option<toml::Value>,
    #[serde(default)]
    pub include_artifacts: Option<toml::Value>,
    #[serde(default)]
    pub compact_paths: Option<toml::Value>,
}

impl RawConfig {
    /// Overlay `overrides` on top of `self`; set override values win
    pub fn merge(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            format: overrides.format.or(self.format),
            output: overrides.output.or(self.output),
            max_frames: overrides.max_frames.or(self.max_frames),
            include_steps: overrides.include_steps.or(self.include_steps),
            include_artifacts: overrides.include_artifacts.or(self.include_artifacts),
            compact_paths: overrides.compact_paths.or(self.compact_paths),
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterConfig {
    format: ReportFormat,
    output_dir: String,
    max_frames: usize,
    include_steps: bool,
    include_artifacts: bool,
    compact_paths: bool,
}

impl ReporterConfig {
    /// Validate raw settings; `default_output_dir` is used when `output` is unset or empty
    pub fn from_raw(raw: &RawConfig, default_output_dir: &str, project_root: &str) -> Result<Self, ConfigError> {
        let format = match &raw.format {
            None => ReportFormat::Both,
            Some(value) => value
                .as_str()
                .and_then(ReportFormat::parse)
                .ok_or(ConfigError::InvalidFormat)?,
        };

        let output = match &raw.output {
            None => default_output_dir.to_string(),
            Some(value) => match value.as_str() {
                Some("") => default_output_dir.to_string(),
                Some(path) => path.to_string(),
                None => return Err(ConfigError::InvalidOutput),
            },
        };
        if output.is_empty() {
            return Err(ConfigError::InvalidOutput);
        }

        let max_frames = match &raw.max_frames {
            None => DEFAULT_MAX_FRAMES,
            Some(value) => value
                .as_integer()
                .filter(|n| *n >= 1)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(ConfigError::InvalidMaxFrames)?,
        };

        let output_dir = resolve_path(&output, project_root)
            .trim_end_matches(&['/', '\\'][..])
            .to_string();

        Ok(Self {
            format,
            output_dir,
            max_frames,
            include_steps: flag(&raw.include_steps, "include_steps")?,
            include_artifacts: flag(&raw.include_artifacts, "include_artifacts")?,
            compact_paths: flag(&raw.compact_paths, "compact_paths")?,
        })
    }

    pub fn wants_json(&self) -> bool {
        matches!(self.format, ReportFormat::Json | ReportFormat::Both)
    }

    pub fn wants_text(&self) -> bool {
        matches!(self.format, ReportFormat::Text | ReportFormat::Both)
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn include_steps(&self) -> bool {
        self.include_steps
    }

    pub fn include_artifacts(&self) -> bool {
        self.include_artifacts
    }

    pub fn compact_paths(&self) -> bool {
        self.compact_paths
    }
}

/// Flags default to `true`
fn flag(value: &Option<toml::Value>, name: &'static str) -> Result<bool, ConfigError> {
    match value {
        None => Ok(true),
        Some(value) => value.as_bool().ok_or(ConfigError::InvalidFlag(name)),
    }
}

/// Leading `/`, a UNC prefix or a drive letter
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("\\\\") || DRIVE_LETTER_REGEX.is_match(path)
}

/// Resolve `path` against the project root unless it is already absolute
pub fn resolve_path(path: &str, project_root: &str) -> String {
    if is_absolute_path(path) {
        return path.to_string();
    }

    format!("{}/{}", project_root.trim_end_matches(&['/', '\\'][..]), path)
}

/// Default output directory for a project root
pub fn default_output_dir(project_root: &str) -> String {
    resolve_path(DEFAULT_OUTPUT_DIR, project_root)
}

/// Find `ai-reporter.toml` starting from a path and walking up
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        current = current.parent()?;
    }
}

/// Load raw settings from a config file
pub fn load_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from an explicit path, or discover one from `start_dir`; `None` when there is none
pub fn discover_config(explicit: Option<&Path>, start_dir: &Path) -> Result<Option<RawConfig>, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file(start_dir) {
            Some(path) => path,
            None => return Ok(None),
        },
    };

    log::debug!("loading configuration from {}", path.display());
    load_config(&path).map(Some)
}
