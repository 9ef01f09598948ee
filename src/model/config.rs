use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const ENV_CONFIG_PATH: &str = "LOT_INTEL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_DB_PATH: &str = "LOT_INTEL_DB_PATH";
const ENV_INFERENCE_URL: &str = "LOT_INTEL_INFERENCE_URL";
const ENV_REPORT_URL: &str = "LOT_INTEL_REPORT_URL";
const ENV_REPORT_MODEL: &str = "LOT_INTEL_REPORT_MODEL";
const ENV_AI_POLICY: &str = "LOT_INTEL_AI_POLICY";

const DEFAULT_DB_PATH: &str = "./data/lot_intel.db";
const DEFAULT_INFERENCE_URL: &str = "http://127.0.0.1:8500";
const DEFAULT_REPORT_URL: &str = "http://ollama:11434";
const DEFAULT_REPORT_MODEL: &str = "qwen:4b";
const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 30;

/// Which AI-image detection policy the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiPolicyKind {
    #[default]
    Heuristic,
    Classifier,
}

/// Model-backend endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the model-serving backend (detector, classifier, embedder).
    pub base_url: Url,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_INFERENCE_URL).expect("default inference URL is valid"),
        }
    }
}

/// Report-generation endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Base URL of the Ollama-compatible text-generation endpoint.
    pub base_url: Url,
    pub model: String,
    #[serde(default = "default_report_timeout")]
    pub timeout_secs: u64,
}

fn default_report_timeout() -> u64 {
    DEFAULT_REPORT_TIMEOUT_SECS
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_REPORT_URL).expect("default report URL is valid"),
            model: DEFAULT_REPORT_MODEL.to_string(),
            timeout_secs: DEFAULT_REPORT_TIMEOUT_SECS,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub inference: Option<InferenceConfig>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
    #[serde(default)]
    pub ai_policy: Option<AiPolicyKind>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub inference: InferenceConfig,
    pub report: ReportConfig,
    pub ai_policy: AiPolicyKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            inference: InferenceConfig::default(),
            report: ReportConfig::default(),
            ai_policy: AiPolicyKind::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file.
    ///
    /// Environment variables override the YAML file, which overrides defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let database_path = std::env::var(ENV_DB_PATH)
            .map(PathBuf::from)
            .ok()
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let mut inference = file.inference.unwrap_or_default();
        if let Some(url) = env_url(ENV_INFERENCE_URL) {
            inference.base_url = url;
        }

        let mut report = file.report.unwrap_or_default();
        if let Some(url) = env_url(ENV_REPORT_URL) {
            report.base_url = url;
        }
        if let Ok(model) = std::env::var(ENV_REPORT_MODEL) {
            report.model = model;
        }

        let ai_policy = std::env::var(ENV_AI_POLICY)
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "heuristic" => Some(AiPolicyKind::Heuristic),
                "classifier" => Some(AiPolicyKind::Classifier),
                other => {
                    tracing::warn!(policy = %other, "Unknown AI policy, using file/default");
                    None
                }
            })
            .or(file.ai_policy)
            .unwrap_or_default();

        Self {
            host,
            port,
            database_path,
            inference,
            report,
            ai_policy,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_url(var: &str) -> Option<Url> {
    let raw = std::env::var(var).ok()?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(var = %var, value = %raw, error = %e, "Invalid URL in environment, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.ai_policy, AiPolicyKind::Heuristic);
        assert_eq!(config.report.model, "qwen:4b");
        assert_eq!(config.report.timeout_secs, 30);
    }

    #[test]
    fn config_file_parses_partial_yaml() {
        let yaml = r#"
database_path: /tmp/lots.db
ai_policy: classifier
report:
  base_url: http://localhost:11434
  model: llama3
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.database_path.unwrap(), PathBuf::from("/tmp/lots.db"));
        assert_eq!(file.ai_policy.unwrap(), AiPolicyKind::Classifier);
        let report = file.report.unwrap();
        assert_eq!(report.model, "llama3");
        // timeout_secs falls back to the serde default
        assert_eq!(report.timeout_secs, 30);
        assert!(file.inference.is_none());
    }
}
