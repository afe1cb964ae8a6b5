//! Configuration management for the heavy machinery assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.heavyrag/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers with a client implementation.
const KNOWN_PROVIDERS: [&str; 1] = ["ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .heavyrag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Text-generation and classification backend
    pub llm: LlmSettings,

    /// Sampling parameters for answer generation
    pub generation: GenerationSettings,

    /// Knowledge base retrieval backend
    pub knowledge: KnowledgeSettings,

    /// Prompt definition id to load from `.heavyrag/prompts/<id>.yml`;
    /// the built-in template is used when unset
    pub prompt_id: Option<String>,
}

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Provider name (currently "ollama")
    pub provider: String,

    /// Provider endpoint
    pub endpoint: String,

    /// Model used to generate answers
    pub model: String,

    /// Model used by the domain classifier; falls back to `model`
    pub classifier_model: Option<String>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(), // Local-first default
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            classifier_model: None,
            timeout: Some(60),
        }
    }
}

impl LlmSettings {
    /// Model used for domain classification.
    pub fn classifier_model(&self) -> &str {
        self.classifier_model.as_deref().unwrap_or(&self.model)
    }
}

/// Sampling parameters for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.1,
            max_tokens: 512,
        }
    }
}

/// Knowledge base retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnowledgeSettings {
    /// Base URL of the retrieval service
    pub endpoint: String,

    /// Knowledge base identifier
    pub knowledge_base_id: Option<String>,

    /// Number of chunks requested per query
    pub number_of_results: u32,

    /// Name of the environment variable holding the bearer token
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            knowledge_base_id: None,
            number_of_results: 3,
            api_key_env: None,
            timeout: Some(30),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    generation: Option<GenerationSettings>,
    knowledge: Option<KnowledgeSettings>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    prompt: Option<PromptConfig>,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptConfig {
    id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: LlmSettings::default(),
            generation: GenerationSettings::default(),
            knowledge: KnowledgeSettings::default(),
            prompt_id: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, the environment
    /// and the explicit workspace and config file paths.
    ///
    /// Environment variables:
    /// - `HEAVYRAG_WORKSPACE`: Override workspace path
    /// - `HEAVYRAG_CONFIG`: Path to config file
    /// - `HEAVYRAG_MODEL`: Generation model
    /// - `HEAVYRAG_LLM_ENDPOINT`: LLM provider endpoint
    /// - `HEAVYRAG_KB_ENDPOINT`: Retrieval service endpoint
    /// - `HEAVYRAG_KB_ID`: Knowledge base identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// Explicit paths take precedence over their environment variables, and
    /// both take precedence over `workspace.path` in the config file.
    ///
    /// # Example
    /// ```no_run
    /// use heavyrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_from(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env_path("HEAVYRAG_WORKSPACE"));
        if let Some(ref workspace) = workspace {
            config.workspace = workspace.clone();
        }

        config.config_file = config_file.or_else(|| env_path("HEAVYRAG_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.heavyrag_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
            if let Some(workspace) = workspace {
                config.workspace = workspace;
            }
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("HEAVYRAG_MODEL") {
            config.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("HEAVYRAG_LLM_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("HEAVYRAG_KB_ENDPOINT") {
            config.knowledge.endpoint = endpoint;
        }

        if let Ok(kb_id) = std::env::var("HEAVYRAG_KB_ID") {
            config.knowledge.knowledge_base_id = Some(kb_id);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

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

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        if let Some(id) = config_file.prompt.and_then(|p| p.id) {
            result.prompt_id = Some(id);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        knowledge_base_id: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(kb_id) = knowledge_base_id {
            self.knowledge.knowledge_base_id = Some(kb_id);
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

    /// Get the path to the .heavyrag directory.
    pub fn heavyrag_dir(&self) -> PathBuf {
        self.workspace.join(".heavyrag")
    }

    /// Resolve the retrieval service bearer token.
    ///
    /// `HEAVYRAG_KB_API_KEY` wins over the variable named by `knowledge.apiKeyEnv`.
    pub fn resolve_kb_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("HEAVYRAG_KB_API_KEY") {
            return Some(key);
        }

        self.knowledge
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration before building the backends.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.llm.provider.as_str();
        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AppError::Config(format!(
                "generation.temperature must be within 0.0-2.0, got {}",
                self.generation.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(AppError::Config(format!(
                "generation.topP must be within 0.0-1.0, got {}",
                self.generation.top_p
            )));
        }

        if self.generation.max_tokens == 0 {
            return Err(AppError::Config(
                "generation.maxTokens must be greater than zero".to_string(),
            ));
        }

        if self.knowledge.number_of_results == 0 {
            return Err(AppError::Config(
                "knowledge.numberOfResults must be greater than zero".to_string(),
            ));
        }

        match self.knowledge.knowledge_base_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(()),
            _ => Err(AppError::Config(
                "No knowledge base id configured. Set knowledge.knowledgeBaseId, \
                 HEAVYRAG_KB_ID or --knowledge-base"
                    .to_string(),
            )),
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.knowledge.knowledge_base_id = Some("KB123".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.classifier_model(), "llama3.2");
        assert_eq!(config.knowledge.number_of_results, 3);
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.top_p, 0.1);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_heavyrag_dir() {
        let config = AppConfig::default();
        assert!(config.heavyrag_dir().ends_with(".heavyrag"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            Some("mistral".to_string()),
            Some("KB42".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.model, "mistral");
        assert_eq!(overridden.knowledge.knowledge_base_id.as_deref(), Some("KB42"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: llama3.1
  classifierModel: llama3.2:1b
generation:
  maxTokens: 1024
knowledge:
  endpoint: http://kb.internal:9000
  knowledgeBaseId: MACHINERY
  numberOfResults: 5
logging:
  level: info
  color: false
prompt:
  id: machinery.custom
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.llm.model, "llama3.1");
        assert_eq!(merged.llm.classifier_model(), "llama3.2:1b");
        assert_eq!(merged.llm.endpoint, "http://localhost:11434");
        assert_eq!(merged.generation.max_tokens, 1024);
        assert_eq!(merged.generation.top_p, 0.1);
        assert_eq!(merged.knowledge.endpoint, "http://kb.internal:9000");
        assert_eq!(merged.knowledge.knowledge_base_id.as_deref(), Some("MACHINERY"));
        assert_eq!(merged.knowledge.number_of_results, 5);
        assert_eq!(merged.log_level.as_deref(), Some("info"));
        assert!(merged.no_color);
        assert_eq!(merged.prompt_id.as_deref(), Some("machinery.custom"));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [not, a, map]").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_from_explicit_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "prompt:\n  id: from.file\n").unwrap();

        let config =
            AppConfig::load_from(Some(temp.path().to_path_buf()), Some(path.clone())).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.prompt_id.as_deref(), Some("from.file"));
    }

    #[test]
    fn test_explicit_workspace_beats_config_file() {
        let workspace = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let heavyrag_dir = workspace.path().join(".heavyrag");
        std::fs::create_dir_all(&heavyrag_dir).unwrap();
        std::fs::write(
            heavyrag_dir.join("config.yaml"),
            format!(
                "workspace:\n  path: {}\nprompt:\n  id: from.file\n",
                other.path().display()
            ),
        )
        .unwrap();

        let config = AppConfig::load_from(Some(workspace.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, workspace.path());
        assert_eq!(config.prompt_id.as_deref(), Some("from.file"));
    }

    #[test]
    fn test_load_from_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("absent.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_from_missing_workspace() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(Some(temp.path().join("nope")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_knowledge_base_id() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = valid_config();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_sampling_ranges() {
        let mut config = valid_config();
        config.generation.top_p = 1.5;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.generation.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.knowledge.number_of_results = 0;
        assert!(config.validate().is_err());
    }
}
