use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const SETTINGS_FILE_NAME: &str = ".logprob_viewer_settings.json";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Strips at most one trailing slash so the completions path can be appended
// directly. Idempotent.
pub fn sanitize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

impl Settings {
    fn config_file_path() -> PathBuf {
        let home = env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        home.join(SETTINGS_FILE_NAME)
    }

    pub fn load() -> Self {
        let path = Self::config_file_path();
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str::<Settings>(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Failed to parse settings file: {}", e),
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_file_path();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
