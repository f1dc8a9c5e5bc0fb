//! Configuration management for STEM Tutor.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.stemtutor/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones. Runtime state (the embedding cache)
//! lives in `<workspace>/.stemtutor/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Known semantic embedding providers.
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Known extractive QA providers.
pub const QA_PROVIDERS: [&str; 3] = ["huggingface", "hf", "lexical"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .stemtutor/ and datasets/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Semantic search model settings
    pub embedding: EmbeddingSettings,

    /// Extractive QA model settings
    pub qa: QaSettings,

    /// External dataset settings
    pub datasets: DatasetSettings,

    /// Retrieval thresholds and conversation settings
    pub retrieval: RetrievalSettings,

    /// HTTP server settings
    pub server: ServerSettings,
}

/// Semantic embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier. `all-minilm` is all-MiniLM-L6-v2 packaged for Ollama.
    pub model: String,

    /// Provider endpoint
    pub endpoint: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            dimensions: 384,
        }
    }
}

/// Extractive QA model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QaSettings {
    /// Provider name: "huggingface" or "lexical"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Inference API base URL
    pub endpoint: String,

    /// Name of the environment variable holding the API token
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Minimum span score for an extracted answer to be reported
    #[serde(rename = "minScore")]
    pub min_score: f32,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            model: "distilbert-base-cased-distilled-squad".to_string(),
            endpoint: "https://api-inference.huggingface.co".to_string(),
            api_key_env: "HF_API_TOKEN".to_string(),
            timeout_secs: 30,
            min_score: 0.1,
        }
    }
}

/// External dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetSettings {
    /// Directory holding the JSONL exports (relative paths resolve against the workspace)
    pub dir: PathBuf,

    /// Maximum ScienceQA rows indexed
    #[serde(rename = "scienceqaLimit")]
    pub scienceqa_limit: usize,

    /// Maximum SciQ rows indexed
    #[serde(rename = "sciqLimit")]
    pub sciq_limit: usize,

    /// MMLU subject configs to load
    #[serde(rename = "mmluSubjects")]
    pub mmlu_subjects: Vec<String>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("datasets"),
            scienceqa_limit: 3001,
            sciq_limit: 2001,
            mmlu_subjects: vec![
                "high_school_physics".to_string(),
                "high_school_chemistry".to_string(),
                "high_school_biology".to_string(),
                "high_school_mathematics".to_string(),
            ],
        }
    }
}

/// Retrieval thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    /// A match must score strictly above this to be returned as an answer
    #[serde(rename = "similarityThreshold")]
    pub similarity_threshold: f32,

    /// Floor for "related information" fallback answers
    #[serde(rename = "relatedThreshold")]
    pub related_threshold: f32,

    /// Multiplier applied to the confidence of related answers
    #[serde(rename = "relatedPenalty")]
    pub related_penalty: f32,

    /// Number of recent questions kept in the conversation history
    #[serde(rename = "maxHistory")]
    pub max_history: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.45,
            related_threshold: 0.30,
            related_penalty: 0.7,
            max_history: 5,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// Socket address string in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full configuration file structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    embedding: Option<EmbeddingSettings>,
    qa: Option<QaSettings>,
    datasets: Option<DatasetSettings>,
    retrieval: Option<RetrievalSettings>,
    server: Option<ServerSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            embedding: EmbeddingSettings::default(),
            qa: QaSettings::default(),
            datasets: DatasetSettings::default(),
            retrieval: RetrievalSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `STEMTUTOR_WORKSPACE`: Override workspace path
    /// - `STEMTUTOR_CONFIG`: Path to config file
    /// - `STEMTUTOR_EMBEDDING_PROVIDER`: Embedding provider
    /// - `STEMTUTOR_QA_PROVIDER`: QA provider
    /// - `STEMTUTOR_DATASETS_DIR`: Dataset directory
    /// - `STEMTUTOR_HOST` / `STEMTUTOR_PORT`: Server bind address
    /// - `OLLAMA_URL`: Embedding endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use stemtutor_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with the workspace and config file given on
    /// the command line taking the place of their environment variables.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(workspace, config_file, |key| std::env::var(key).ok())
    }

    fn load_with<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        var: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| var("STEMTUTOR_WORKSPACE").map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| var("STEMTUTOR_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        config.apply_env(var)?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, var: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = var("STEMTUTOR_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Some(url) = var("OLLAMA_URL") {
            self.embedding.endpoint = url;
        }

        if let Some(provider) = var("STEMTUTOR_QA_PROVIDER") {
            self.qa.provider = provider;
        }

        if let Some(dir) = var("STEMTUTOR_DATASETS_DIR") {
            self.datasets.dir = PathBuf::from(dir);
        }

        if let Some(host) = var("STEMTUTOR_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("STEMTUTOR_PORT") {
            self.server.port = port.parse().map_err(|e| {
                AppError::Config(format!("Invalid STEMTUTOR_PORT '{}': {}", port, e))
            })?;
        }

        if let Some(level) = var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if var("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(qa) = config_file.qa {
            result.qa = qa;
        }
        if let Some(datasets) = config_file.datasets {
            result.datasets = datasets;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(server) = config_file.server {
            result.server = server;
        }

        tracing::debug!("Merged configuration from {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        embedding_provider: Option<String>,
        qa_provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(provider) = qa_provider {
            self.qa.provider = provider;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the .stemtutor state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".stemtutor")
    }

    /// Ensure the .stemtutor directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .stemtutor directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the persistent embedding cache.
    pub fn embedding_cache_path(&self) -> PathBuf {
        self.state_dir().join("embeddings.sqlite")
    }

    /// Dataset directory resolved against the workspace.
    pub fn datasets_dir(&self) -> PathBuf {
        if self.datasets.dir.is_absolute() {
            self.datasets.dir.clone()
        } else {
            self.workspace.join(&self.datasets.dir)
        }
    }

    /// Resolve the QA API token from the configured environment variable.
    pub fn resolve_qa_api_key(&self) -> Option<String> {
        std::env::var(&self.qa.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        let embedding_provider = self.embedding.provider.to_lowercase();
        if !EMBEDDING_PROVIDERS.contains(&embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let qa_provider = self.qa.provider.to_lowercase();
        if !QA_PROVIDERS.contains(&qa_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown QA provider: {}. Supported: {}",
                self.qa.provider,
                QA_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        let thresholds = [
            ("similarityThreshold", self.retrieval.similarity_threshold),
            ("relatedThreshold", self.retrieval.related_threshold),
            ("relatedPenalty", self.retrieval.related_penalty),
            ("qa.minScore", self.qa.min_score),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.retrieval.max_history == 0 {
            return Err(AppError::Config(
                "maxHistory must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
