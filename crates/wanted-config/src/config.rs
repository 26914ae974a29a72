use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wanted_models::{PushOptions, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub radarr: Option<ServiceDefaults>,
    #[serde(default)]
    pub sonarr: Option<ServiceDefaults>,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Defaults used to pre-fill push options for one service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDefaults {
    #[serde(default)]
    pub root_folder: Option<String>,
    #[serde(default)]
    pub profile_id: Option<u32>,
    #[serde(default = "default_true")]
    pub enable_search: bool,
    #[serde(default)]
    pub monitor_specials: Option<bool>,
}

impl ServiceDefaults {
    /// Complete push options, or `None` while root folder or profile is unset
    pub fn push_options(&self) -> Option<PushOptions> {
        let root_folder = self.root_folder.clone().filter(|r| !r.trim().is_empty())?;
        let profile_id = self.profile_id.filter(|p| *p > 0)?;
        Some(PushOptions {
            root_folder,
            profile_id,
            enable_search: self.enable_search,
            monitor_specials: self.monitor_specials,
        })
    }
}

/// Pending-download poller tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Reload attempts before unresolved ids fall back to the placeholder
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after a single-record push
    #[serde(default = "default_single_delay_ms")]
    pub single_delay_ms: u64,
    /// Delay after a bulk push
    #[serde(default = "default_bulk_delay_ms")]
    pub bulk_delay_ms: u64,
}

impl PollerConfig {
    pub fn single_delay(&self) -> Duration {
        Duration::from_millis(self.single_delay_ms)
    }

    pub fn bulk_delay(&self) -> Duration {
        Duration::from_millis(self.bulk_delay_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            single_delay_ms: default_single_delay_ms(),
            bulk_delay_ms: default_bulk_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_page_length")]
    pub page_length: usize,
    /// Pause after a successful push/merge before controls come back
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
    #[serde(default = "default_delete_confirm_delay_ms")]
    pub delete_confirm_delay_ms: u64,
}

impl UiConfig {
    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    pub fn delete_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.delete_confirm_delay_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_length: default_page_length(),
            confirm_delay_ms: default_confirm_delay_ms(),
            delete_confirm_delay_ms: default_delete_confirm_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logging")]
    pub json: bool,
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    4
}

fn default_single_delay_ms() -> u64 {
    2500
}

fn default_bulk_delay_ms() -> u64 {
    3500
}

fn default_page_length() -> usize {
    50
}

fn default_confirm_delay_ms() -> u64 {
    900
}

fn default_delete_confirm_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_logging() -> bool {
    use std::io::IsTerminal;
    !std::io::stdout().is_terminal()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:5000".to_string(),
                timeout_seconds: default_timeout_seconds(),
            },
            radarr: None,
            sonarr: None,
            poller: PollerConfig::default(),
            ui: UiConfig::default(),
            logging: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("server.base_url is required and cannot be empty"));
        }
        if !self.server.base_url.starts_with("http://") && !self.server.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("server.base_url must start with http:// or https://"));
        }
        if self.poller.max_attempts == 0 {
            return Err(anyhow::anyhow!("poller.max_attempts must be at least 1"));
        }
        if self.ui.page_length == 0 {
            return Err(anyhow::anyhow!("ui.page_length must be at least 1"));
        }
        Ok(())
    }

    pub fn service_defaults(&self, service: Service) -> Option<&ServiceDefaults> {
        match service {
            Service::Radarr => self.radarr.as_ref(),
            Service::Sonarr => self.sonarr.as_ref(),
        }
    }

    /// Configured push options for a service, if complete
    pub fn push_defaults(&self, service: Service) -> Option<PushOptions> {
        self.service_defaults(service).and_then(ServiceDefaults::push_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            radarr: Some(ServiceDefaults {
                root_folder: Some("/data/movies".to_string()),
                profile_id: Some(1),
                enable_search: true,
                monitor_specials: None,
            }),
            ..Config::default()
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://localhost:5000");
        assert_eq!(loaded.radarr.as_ref().unwrap().root_folder.as_deref(), Some("/data/movies"));
        assert!(loaded.sonarr.is_none());
        assert_eq!(loaded.poller.max_attempts, 4);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "http://wanted.lan"

            [sonarr]
            root_folder = "/data/series"
            profile_id = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.poller.single_delay(), Duration::from_millis(2500));
        assert_eq!(config.poller.bulk_delay(), Duration::from_millis(3500));
        assert_eq!(config.ui.page_length, 50);

        let sonarr = config.push_defaults(Service::Sonarr).unwrap();
        assert_eq!(sonarr.root_folder, "/data/series");
        assert!(sonarr.enable_search);
        assert!(config.push_defaults(Service::Radarr).is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.poller.max_attempts = 0;
        assert!(config.validate().is_err());

        config.poller.max_attempts = 4;
        config.server.base_url = "wanted.lan".to_string();
        assert!(config.validate().is_err());

        config.server.base_url = "https://wanted.lan".to_string();
        config.ui.page_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_incomplete_defaults_yield_no_options() {
        let defaults = ServiceDefaults {
            root_folder: Some("/data/movies".to_string()),
            profile_id: None,
            enable_search: true,
            monitor_specials: None,
        };
        assert!(defaults.push_options().is_none());
    }
}
