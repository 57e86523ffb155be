//! tyshape_options: Checker options and the `tyshape.json` config file.
//!
//! The config file follows the shape of `tsconfig.json`:
//!
//! ```json
//! {
//!   "checkerOptions": { "strictFunctionTypes": true, "unresolvedTypeParameters": "warning" },
//!   "files": ["a.json", "b.json"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tyshape_diagnostics::DiagnosticCategory;

/// Options that change checking behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerOptions {
    /// Compare function parameters contravariantly instead of bivariantly.
    pub strict_function_types: bool,
    /// How to report type parameters that inference could not bind and that
    /// silently fell back to `unknown`.
    pub unresolved_type_parameters: DiagnosticLevel,
}

/// Reporting level for configurable checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    #[default]
    Off,
    Warning,
    Error,
}

impl DiagnosticLevel {
    /// The diagnostic category to report with, or `None` when the check is off.
    pub fn category(self) -> Option<DiagnosticCategory> {
        match self {
            DiagnosticLevel::Off => None,
            DiagnosticLevel::Warning => Some(DiagnosticCategory::Warning),
            DiagnosticLevel::Error => Some(DiagnosticCategory::Error),
        }
    }
}

impl std::str::FromStr for DiagnosticLevel {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(DiagnosticLevel::Off),
            "warning" => Ok(DiagnosticLevel::Warning),
            "error" => Ok(DiagnosticLevel::Error),
            other => Err(OptionsError::InvalidLevel(other.to_string())),
        }
    }
}

/// The `tyshape.json` file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub checker_options: Option<CheckerOptions>,
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid diagnostic level '{0}' (expected off, warning or error)")]
    InvalidLevel(String),
}

/// Parse a config file from a string.
pub fn parse_config(content: &str) -> Result<ProjectConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a config file from a path. Relative `files` entries are resolved
/// against the config file's directory.
pub fn parse_config_file(path: &Path) -> Result<ProjectConfig, OptionsError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: display.clone(),
        source,
    })?;
    let mut config = parse_config(&content).map_err(|source| OptionsError::Json {
        path: display,
        source,
    })?;
    if let (Some(files), Some(dir)) = (config.files.as_mut(), path.parent()) {
        for file in files.iter_mut() {
            if Path::new(file.as_str()).is_relative() {
                *file = dir.join(file.as_str()).to_string_lossy().into_owned();
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_permissive() {
        let options = CheckerOptions::default();
        assert!(!options.strict_function_types);
        assert_eq!(options.unresolved_type_parameters, DiagnosticLevel::Off);
        assert_eq!(options.unresolved_type_parameters.category(), None);
    }

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"{
                "checkerOptions": { "strictFunctionTypes": true, "unresolvedTypeParameters": "error" },
                "files": ["a.json"]
            }"#,
        )
        .unwrap();
        let options = config.checker_options.unwrap();
        assert!(options.strict_function_types);
        assert_eq!(options.unresolved_type_parameters.category(), Some(DiagnosticCategory::Error));
        assert_eq!(config.files.unwrap(), vec!["a.json".to_string()]);
    }

    #[test]
    fn test_partial_options_fill_defaults() {
        let config = parse_config(r#"{ "checkerOptions": { "unresolvedTypeParameters": "warning" } }"#).unwrap();
        let options = config.checker_options.unwrap();
        assert!(!options.strict_function_types);
        assert_eq!(options.unresolved_type_parameters, DiagnosticLevel::Warning);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warning".parse::<DiagnosticLevel>().unwrap(), DiagnosticLevel::Warning);
        assert!(matches!(
            "loud".parse::<DiagnosticLevel>(),
            Err(OptionsError::InvalidLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = parse_config_file(Path::new("/definitely/not/here/tyshape.json")).unwrap_err();
        assert!(matches!(err, OptionsError::Io { .. }));
    }
}
