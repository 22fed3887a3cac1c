use serde::{Deserialize, Serialize};

/// Canta backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CantaConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub log: LogConfig,
    /// Origins allowed by the CORS layer (the dev frontend hosts).
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            max_output_tokens: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}

impl CantaConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                bind: std::env::var("CANTA_BIND").unwrap_or(defaults.server.bind),
                port: std::env::var("CANTA_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            vision: VisionConfig {
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                model: std::env::var("CANTA_VISION_MODEL").unwrap_or(defaults.vision.model),
                base_url: std::env::var("CANTA_VISION_BASE_URL")
                    .unwrap_or(defaults.vision.base_url),
                timeout_secs: std::env::var("CANTA_VISION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.vision.timeout_secs),
                max_output_tokens: std::env::var("CANTA_VISION_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.vision.max_output_tokens),
            },
            log: LogConfig {
                level: std::env::var("RUST_LOG").unwrap_or(defaults.log.level),
                dir: std::env::var("CANTA_LOG_DIR").unwrap_or(defaults.log.dir),
            },
            cors_origins: std::env::var("CANTA_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:5173".to_string(),
                        "http://localhost:5174".to_string(),
                    ]
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = CantaConfig::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.vision.model, "gpt-4o-mini");
        assert_eq!(config.vision.max_output_tokens, 3000);
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn deserializes_partial_config() {
        let config: CantaConfig =
            serde_json::from_str(r#"{"server": {"port": 8080}}"#).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.log.level, "info");
    }
}
