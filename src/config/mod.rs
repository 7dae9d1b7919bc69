//! Configuration module for pipeline-codegen
//!
//! `CompilerConfig` controls how scripts are laid out (indent unit, entry
//! routine name, device prologue), how strictly `ModelTraining` options are
//! checked, and which imports are required beyond what generators ask for.
//!
//! # File formats
//!
//! Configs are read from TOML when the path ends in `.toml` and from JSON
//! otherwise. Every field is optional:
//!
//! ```toml
//! indent = "    "
//! entrypoint = "main"
//! device_setup = true
//! strict_models = false
//!
//! [imports]
//! defaults = [{ module = "torch" }]
//!
//! [imports.node_types]
//! KMeans = [{ module = "sklearn.cluster", alias = "cluster" }]
//! ```

pub mod requirements;

pub use requirements::ImportRequirements;

use crate::compiler::generators::GeneratorOptions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default indentation unit
pub const DEFAULT_INDENT: &str = "    ";

/// Default entry routine name
pub const DEFAULT_ENTRYPOINT: &str = "main";

/// Reserved words that cannot name the entry routine
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Indentation unit inside the entry routine and nested blocks
    pub indent: String,

    /// Name of the entry routine
    pub entrypoint: String,

    /// Emit the accelerator-selection line at the top of the entry routine
    pub device_setup: bool,

    /// Reject unknown model/optimizer names at compile time
    pub strict_models: bool,

    /// Default and per-type import requirements
    pub imports: ImportRequirements,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            device_setup: true,
            strict_models: false,
            imports: ImportRequirements::default(),
        }
    }
}

impl CompilerConfig {
    pub fn with_strict_models(mut self, strict: bool) -> Self {
        self.strict_models = strict;
        self
    }

    pub fn with_imports(mut self, imports: ImportRequirements) -> Self {
        self.imports = imports;
        self
    }

    /// Options handed to every generator
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            indent: self.indent.clone(),
            strict_models: self.strict_models,
            device_setup: self.device_setup,
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.indent.is_empty() || !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(Error::Config(format!(
                "indent must be one or more spaces or tabs, got {:?}",
                self.indent
            )));
        }
        let mut chars = self.entrypoint.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start
            || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            || PYTHON_KEYWORDS.contains(&self.entrypoint.as_str())
        {
            return Err(Error::Config(format!(
                "entrypoint '{}' is not a valid identifier",
                self.entrypoint
            )));
        }
        if self.device_setup && !self.imports.defaults.iter().any(|d| d.module == "torch") {
            tracing::warn!("device_setup is enabled but 'torch' is not a default import");
        }
        Ok(())
    }

    /// Load a config file from disk (TOML for `.toml`, JSON otherwise)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        config.validate()?;
        tracing::debug!("Loaded compiler config from {:?}", path);
        Ok(config)
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load compiler config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to disk (TOML for `.toml`, JSON otherwise)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::imports::ImportDirective;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.indent, "    ");
        assert_eq!(config.entrypoint, "main");
        assert!(config.device_setup);
        assert!(!config.strict_models);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CompilerConfig = toml::from_str("strict_models = true").unwrap();
        assert!(config.strict_models);
        assert_eq!(config.entrypoint, "main");
        assert_eq!(config.imports, ImportRequirements::default());
    }

    #[test]
    fn test_toml_requirements_table() {
        let config: CompilerConfig = toml::from_str(
            r#"
            [imports]
            defaults = [{ module = "torch" }, { module = "numpy", alias = "np" }]

            [imports.node_types]
            Plot = [{ module = "matplotlib.pyplot", as_name = "plt" }]
            "#,
        )
        .unwrap();
        assert_eq!(config.imports.defaults[1], ImportDirective::aliased("numpy", "np"));
        assert_eq!(
            config.imports.for_node_type("Plot"),
            &[ImportDirective::aliased("matplotlib.pyplot", "plt")]
        );
        assert!(config.imports.for_node_type("KMeans").is_empty());
    }

    #[test]
    fn test_generator_options() {
        let config = CompilerConfig {
            indent: "\t".to_string(),
            ..Default::default()
        }
        .with_strict_models(true);
        let options = config.generator_options();
        assert_eq!(options.indent, "\t");
        assert!(options.strict_models);
        assert!(options.device_setup);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = CompilerConfig {
            indent: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CompilerConfig {
            entrypoint: "2run".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CompilerConfig {
            entrypoint: "class".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CompilerConfig {
            entrypoint: "run_pipeline".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_extension_detection() {
        assert!(is_toml(Path::new("codegen.toml")));
        assert!(is_toml(Path::new("dir/CODEGEN.TOML")));
        assert!(!is_toml(Path::new("codegen.json")));
        assert!(!is_toml(Path::new("codegen")));
    }
}
