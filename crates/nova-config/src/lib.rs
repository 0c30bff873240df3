use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{global_log_buffer, init_tracing, LogBuffer};

/// Top-level `nova.toml` configuration.
///
/// ```toml
/// [classpath]
/// boot = ["jdk/rt.jar"]
/// entries = ["target/classes", "lib/dep.jar"]
///
/// [analysis]
/// implicit_java_lang = true
/// resolve_implicit_this = true
/// max_inference_depth = 32
///
/// [logging]
/// level = "info,nova.typeck=debug"
/// json = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NovaConfig {
    #[serde(default)]
    pub classpath: ClasspathConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Global logging settings for Nova crates.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClasspathConfig {
    /// Entries of the parent (boot) classpath, consulted before `entries`.
    #[serde(default)]
    pub boot: Vec<PathBuf>,

    /// Directories and archives searched in order.
    #[serde(default)]
    pub entries: Vec<PathBuf>,
}

impl ClasspathConfig {
    /// Resolves relative paths against `base` (usually the config file's
    /// directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in self.boot.iter_mut().chain(self.entries.iter_mut()) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Knobs for the per-unit semantic analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Make every `java.lang` type visible by simple name.
    #[serde(default = "default_true")]
    pub implicit_java_lang: bool,

    /// Fall back to members of enclosing classes for unqualified names.
    #[serde(default = "default_true")]
    pub resolve_implicit_this: bool,

    /// Nesting limit for recursive generic unification.
    #[serde(default = "AnalysisConfig::default_max_inference_depth")]
    pub max_inference_depth: usize,
}

impl AnalysisConfig {
    fn default_max_inference_depth() -> usize {
        32
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            implicit_java_lang: true,
            resolve_implicit_this: true,
            max_inference_depth: Self::default_max_inference_depth(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all Nova crates: a simple level (`debug`) or a full
    /// `EnvFilter` directive string (`warn,nova.typeck=trace`).
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Mirror logs to stderr (in addition to the in-memory buffer).
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// Append logs to the given file path. If the file cannot be opened, file
    /// logging is disabled while other sinks remain active.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Number of log lines kept in memory.
    #[serde(default = "LoggingConfig::default_buffer_lines")]
    pub buffer_lines: usize,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_buffer_lines() -> usize {
        2_000
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Create the effective `EnvFilter` for Nova tracing.
    ///
    /// If `RUST_LOG` is set, it is merged into the resulting filter.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: true,
            file: None,
            buffer_lines: Self::default_buffer_lines(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The `Display` impl embeds a snippet of the input; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl NovaConfig {
    /// Load a config file from TOML. Relative classpath entries are resolved
    /// against the file's directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(dir) = path.parent() {
            config.classpath.resolve_paths(dir);
        }
        tracing::debug!(
            target: "nova.config",
            path = %path.display(),
            entries = config.classpath.entries.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = NovaConfig::load_from_str("").unwrap();
        assert_eq!(config, NovaConfig::default());
        assert!(config.analysis.implicit_java_lang);
        assert_eq!(config.analysis.max_inference_depth, 32);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_all_sections() {
        let config = NovaConfig::load_from_str(
            r#"
            [classpath]
            boot = ["rt.jar"]
            entries = ["classes", "/abs/dep.jar"]

            [analysis]
            resolve_implicit_this = false
            max_inference_depth = 4

            [logging]
            level = "warn,nova.typeck=trace"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.classpath.boot, vec![PathBuf::from("rt.jar")]);
        assert!(!config.analysis.resolve_implicit_this);
        assert!(config.analysis.implicit_java_lang);
        assert_eq!(config.analysis.max_inference_depth, 4);
        assert!(config.logging.json);
    }

    #[test]
    fn rejects_unknown_keys_without_echoing_input() {
        let err = NovaConfig::load_from_str("[analysis]\nsecret_knob = \"hunter2\"\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown field"), "{message}");
        assert!(!message.contains("hunter2"), "{message}");
    }

    #[test]
    fn load_from_path_resolves_relative_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nova.toml");
        std::fs::write(&path, "[classpath]\nentries = [\"classes\", \"/abs/dep.jar\"]\n").unwrap();

        let config = NovaConfig::load_from_path(&path).unwrap();
        assert_eq!(
            config.classpath.entries,
            vec![dir.path().join("classes"), PathBuf::from("/abs/dep.jar")]
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NovaConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn level_normalization() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("nova.classpath=trace"),
            "nova.classpath=trace"
        );
    }
}
