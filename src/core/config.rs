use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateHostConfig {
    pub base_url: String,
    #[serde(default)]
    pub access_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchangerate_host: Option<ExchangeRateHostConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchangerate_host: Some(ExchangeRateHostConfig {
                base_url: "http://api.exchangerate.host".to_string(),
                access_key: String::new(),
            }),
        }
    }
}

/// Element ids of the conversion form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FormSelectors {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub display: String,
    pub form: String,
}

impl FormSelectors {
    pub fn ids(&self) -> [&str; 5] {
        [
            &self.from,
            &self.to,
            &self.amount,
            &self.display,
            &self.form,
        ]
    }
}

impl Default for FormSelectors {
    fn default() -> Self {
        FormSelectors {
            from: "con-from".to_string(),
            to: "con-to".to_string(),
            amount: "currency-amount".to_string(),
            display: "messages".to_string(),
            form: "con-form".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FormConfig {
    /// Absolute URL of the conversion endpoint
    pub endpoint: String,
    #[serde(default)]
    pub selectors: FormSelectors,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            endpoint: "http://127.0.0.1:5000/conv".to_string(),
            selectors: FormSelectors::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub form: FormConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Loads `path` if given, else the default config file, else built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        let default_path = Self::default_config_path()?;
        if default_path.exists() {
            Self::load_from_path(&default_path)
        } else {
            debug!(
                "No config at {}, using built-in defaults",
                default_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "forex", "forex")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "forex", "forex")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind: "0.0.0.0:8080"
providers:
  exchangerate_host:
    base_url: "http://example.com/rates"
    access_key: "secret"
form:
  endpoint: "http://example.com/conv"
  selectors:
    amount: "amount-input"
data_path: "/tmp/forex"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        let provider = config.providers.exchangerate_host.unwrap();
        assert_eq!(provider.base_url, "http://example.com/rates");
        assert_eq!(provider.access_key, "secret");
        assert_eq!(config.form.endpoint, "http://example.com/conv");
        assert_eq!(config.form.selectors.amount, "amount-input");
        // Unspecified selectors keep their defaults
        assert_eq!(config.form.selectors.from, "con-from");
        assert_eq!(config.form.selectors.display, "messages");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/forex"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.form.endpoint, "http://127.0.0.1:5000/conv");
        assert_eq!(config.form.selectors, FormSelectors::default());
        assert_eq!(
            config.providers.exchangerate_host.unwrap().base_url,
            "http://api.exchangerate.host"
        );
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_custom_data_path() {
        let config = AppConfig {
            data_path: Some("/var/lib/forex".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/var/lib/forex")
        );
    }

    #[test]
    fn test_load_or_default_reads_given_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "server:\n  bind: \"127.0.0.1:9999\"\n").unwrap();
        let config = AppConfig::load_or_default(file.path().to_str()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9999");

        assert!(AppConfig::load_or_default(Some("/nonexistent/forex.yaml")).is_err());
    }
}
