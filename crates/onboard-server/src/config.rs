use onboard_ai::{ResponderConfig, ResponderKind};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub responder: ResponderConfig,
    pub langgraph_url: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    responder: ResponderConfig,
    #[serde(default)]
    langgraph: LangGraphSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct LangGraphSection {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingSection {
    #[serde(default)]
    format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        FileConfig::default().into()
    }
}

impl From<FileConfig> for ServerConfig {
    fn from(file: FileConfig) -> Self {
        Self {
            host: file.server.host,
            port: file.server.port,
            responder: file.responder,
            langgraph_url: file.langgraph.url,
            log_format: file.logging.format,
        }
    }
}

impl ServerConfig {
    /// Load from `server.toml` (or `ONBOARD_SERVER_CONFIG`), else from the environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = config_path() {
            return Self::from_file(&path);
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path.display(), err))?;
        Self::from_toml_str(&contents)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), err))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let parsed: FileConfig = toml::from_str(contents)?;
        Ok(parsed.into())
    }

    /// Build from `ONBOARD_*` variables resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("ONBOARD_SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ONBOARD_SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid ONBOARD_SERVER_PORT: {}", port))?;
        }
        if let Some(kind) = lookup("ONBOARD_RESPONDER_KIND") {
            config.responder.kind = ResponderKind::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("Unknown ONBOARD_RESPONDER_KIND: {}", kind))?;
        }
        config.responder.url = lookup("ONBOARD_RESPONDER_URL");
        config.responder.model = lookup("ONBOARD_RESPONDER_MODEL");
        if let Some(api_key_env) = lookup("ONBOARD_RESPONDER_API_KEY_ENV") {
            config.responder.api_key_env = api_key_env;
        }
        config.responder.system_prompt = lookup("ONBOARD_SYSTEM_PROMPT");
        config.langgraph_url = lookup("ONBOARD_LANGGRAPH_URL");
        if let Some(format) = lookup("ONBOARD_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format)
                .ok_or_else(|| anyhow::anyhow!("Invalid ONBOARD_LOG_FORMAT: {}", format))?;
        }

        Ok(config)
    }
}

fn config_path() -> Option<String> {
    if let Ok(path) = env::var("ONBOARD_SERVER_CONFIG") {
        return Some(path);
    }
    Path::new("server.toml")
        .exists()
        .then(|| "server.toml".to_string())
}
