use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::error::Error;
use crate::task::TaskKind;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_USER_AGENT: &str = "bedrock-tasks/0.1.0";

/// Configuration for task invocations.
///
/// Resolved from a JSON settings file with environment-variable override:
/// `BEDROCK_SETTINGS` picks the file, `BEDROCK_REGION`, `BEDROCK_BASE_URL`
/// and `BEDROCK_OUTPUT_DIR` override individual values.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: String,
    /// Endpoint override; when unset the regional Bedrock runtime endpoint
    /// is derived from `region`.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    /// Per-task model-identifier overrides; tasks not listed here use
    /// [`TaskKind::default_model`].
    pub models: HashMap<TaskKind, String>,
    /// Directory where generated images are written.
    pub output_dir: PathBuf,
}

/// On-disk settings shape.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SettingsFile {
    region: Option<String>,
    base_url: Option<String>,
    output_dir: Option<String>,
    models: HashMap<TaskKind, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            models: HashMap::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from the settings file and environment.
    ///
    /// The file named by `BEDROCK_SETTINGS` (or `settings.json` in the
    /// working directory, if present) is loaded first; environment
    /// variables then override its values. A missing default settings file
    /// is not an error; a missing `BEDROCK_SETTINGS` file is.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = match std::env::var("BEDROCK_SETTINGS") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit settings file (no env overrides).
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SettingsFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid settings file {}: {e}", path.display())))?;

        let defaults = Self::default();
        Ok(Self {
            region: file.region.unwrap_or(defaults.region),
            base_url: file.base_url,
            timeout: defaults.timeout,
            user_agent: defaults.user_agent,
            models: file.models,
            output_dir: file
                .output_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(region) = std::env::var("BEDROCK_REGION") {
            if !region.trim().is_empty() {
                self.region = region.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("BEDROCK_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = Some(url.trim().to_string());
            }
        }
        if let Ok(dir) = std::env::var("BEDROCK_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir.trim());
            }
        }
    }

    /// The model identifier to invoke for `task`.
    pub fn model_for(&self, task: TaskKind) -> &str {
        self.models
            .get(&task)
            .map(String::as_str)
            .unwrap_or_else(|| task.default_model())
    }

    /// The effective inference endpoint.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }

    /// Build the default header set for invocation requests.
    ///
    /// Content-type and accept are per-request properties of the
    /// [`InvocationRequest`](crate::request::InvocationRequest) and are not
    /// set here.
    pub fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(val) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(reqwest::header::USER_AGENT, val);
        }
        headers
    }
}
