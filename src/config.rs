use std::{env, fs, io::ErrorKind, path::Path};

use {
    anyhow::{Context, Result},
    log::{debug, warn},
    serde::{Deserialize, Serialize},
};

pub const CONFIG_ENV_NAME: &str = "RELAY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "relay.toml";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
}

impl Config {
    /// Read the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("unable to parse config {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                Err(e).with_context(|| format!("unable to read config {}", path.display()))
            }
        }
    }

    pub fn path_from_env() -> String {
        env::var(CONFIG_ENV_NAME).unwrap_or(String::from(DEFAULT_CONFIG_PATH))
    }
}

/// Fixed sampling parameters and endpoint of the completion service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub temperature: f32,
    pub endpoint: String,
    pub api_key_env: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: String::from(DEFAULT_MODEL),
            temperature: DEFAULT_TEMPERATURE,
            endpoint: String::from(DEFAULT_ENDPOINT),
            api_key_env: String::from(DEFAULT_API_KEY_ENV),
        }
    }
}

impl CompletionConfig {
    /// Load `.env` if present and read the credential from the configured variable.
    pub fn load_api_key(&self) -> Option<String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        match env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => {
                warn!(
                    "{} is not set; requests will fail until it is configured",
                    self.api_key_env
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("does/not/exist/relay.toml")).unwrap();
        assert_eq!(config.completion.model, DEFAULT_MODEL);
        assert_eq!(config.completion.temperature, 0.7);
        assert_eq!(config.completion.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.completion.api_key_env, DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[completion]
model = "gpt-4o-mini"
"#,
        )
        .unwrap();
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.completion.api_key_env, DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = env::temp_dir().join(format!("consult-bad-{}.toml", std::process::id()));
        fs::write(&path, "[completion]\ntemperature = \"hot\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("unable to parse config"));
    }

    #[test]
    fn empty_credential_is_missing() {
        let config = CompletionConfig {
            api_key_env: String::from("CONSULT_TEST_EMPTY_KEY"),
            ..Default::default()
        };
        env::set_var("CONSULT_TEST_EMPTY_KEY", "");
        assert_eq!(config.load_api_key(), None);

        env::set_var("CONSULT_TEST_EMPTY_KEY", "sk-test");
        assert_eq!(config.load_api_key().as_deref(), Some("sk-test"));
    }
}
