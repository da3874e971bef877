use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Credentials for Google Custom Search. Both parts are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub search: Option<SearchCredentials>,
    pub templates_dir: PathBuf,
    pub media_dir: PathBuf,
    pub bind_addr: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            search: None,
            templates_dir: PathBuf::from("templates_source"),
            media_dir: PathBuf::from("media"),
            bind_addr: "127.0.0.1:8080".to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Non-empty value of an environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read configuration from the environment. Call `dotenvy::dotenv()`
    /// first to pick up a `.env` file.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let gemini_api_key = env_opt("GEMINI_API_KEY");
        if gemini_api_key.is_none() {
            log::warn!("No GEMINI_API_KEY set, content generation will be unavailable");
        }

        let search = match (env_opt("GOOGLE_SEARCH_API_KEY"), env_opt("GOOGLE_SEARCH_ENGINE_ID")) {
            (Some(api_key), Some(engine_id)) => Some(SearchCredentials { api_key, engine_id }),
            (None, None) => {
                log::warn!("Google image search not configured, using placeholder images");
                None
            }
            _ => {
                log::warn!(
                    "GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID must both be set, using placeholder images"
                );
                None
            }
        };

        let http_timeout = match env_opt("HTTP_TIMEOUT_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log::warn!("Invalid HTTP_TIMEOUT_SECS '{v}', using {}s", defaults.http_timeout.as_secs());
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        Self {
            gemini_api_key,
            gemini_model: env_opt("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: env_opt("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            search,
            templates_dir: env_opt("TEMPLATES_DIR").map(PathBuf::from).unwrap_or(defaults.templates_dir),
            media_dir: env_opt("MEDIA_DIR").map(PathBuf::from).unwrap_or(defaults.media_dir),
            bind_addr: env_opt("BIND_ADDR").unwrap_or(defaults.bind_addr),
            http_timeout,
        }
    }
}
