use std::collections::HashMap;
use std::time::Duration;
use wanted_config::Config;
use wanted_models::{PushOptions, Service};

/// Engine tuning taken from the loaded configuration
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_attempts: u32,
    pub single_poll_delay: Duration,
    pub bulk_poll_delay: Duration,
    pub confirm_delay: Duration,
    pub delete_confirm_delay: Duration,
    pub page_length: usize,
    pub push_defaults: HashMap<Service, PushOptions>,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        let push_defaults = Service::ALL
            .iter()
            .filter_map(|service| config.push_defaults(*service).map(|options| (*service, options)))
            .collect();
        Self {
            max_attempts: config.poller.max_attempts,
            single_poll_delay: config.poller.single_delay(),
            bulk_poll_delay: config.poller.bulk_delay(),
            confirm_delay: config.ui.confirm_delay(),
            delete_confirm_delay: config.ui.delete_confirm_delay(),
            page_length: config.ui.page_length,
            push_defaults,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
