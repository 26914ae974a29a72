use crate::output::{build_table, Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;
use wanted_config::{Config, PathManager};
use wanted_models::Service;

fn config_path(explicit: Option<&PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .unwrap_or_else(|| PathManager::default().config_file())
}

/// Load and validate the config file, or fall back to defaults when it does not exist
pub fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let path = config_path(explicit);
    let config = if path.exists() {
        Config::load_from_file(&path)
            .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?
    } else {
        warn!(
            "Configuration file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", path.display(), e))?;
    Ok(config)
}

pub async fn run_config(cmd: &ConfigCommands, explicit: Option<&PathBuf>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(explicit, output),
        ConfigCommands::Init { base_url, force } => {
            init_config(explicit, base_url.as_deref(), *force, output)
        }
    }
}

fn show_config(explicit: Option<&PathBuf>, output: &Output) -> Result<()> {
    let path = config_path(explicit);
    if !path.exists() {
        output.warn(format!("Configuration file not found at: {}", path.display()));
        output.info("Run 'wanted config init' to create one. Defaults are shown below.");
    }
    let config = load_config(explicit)?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            println!("{} {}", "Config file:".bright_black(), path.display());

            let mut rows = vec![
                vec!["Server URL".to_string(), config.server.base_url.clone()],
                vec!["Timeout".to_string(), format!("{}s", config.server.timeout_seconds)],
                vec!["Page length".to_string(), config.ui.page_length.to_string()],
                vec!["Poll attempts".to_string(), config.poller.max_attempts.to_string()],
                vec![
                    "Poll delay".to_string(),
                    format!(
                        "{} ms single, {} ms bulk",
                        config.poller.single_delay_ms, config.poller.bulk_delay_ms
                    ),
                ],
            ];
            for service in Service::ALL {
                let value = match config.push_defaults(service) {
                    Some(options) => format!(
                        "{} · profile {} · search {}",
                        options.root_folder,
                        options.profile_id,
                        super::yes_no(options.enable_search)
                    ),
                    None => "not configured".bright_black().to_string(),
                };
                rows.push(vec![format!("{} defaults", service.display_name()), value]);
            }
            println!("{}", build_table(vec!["Setting", "Value"], rows));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "path": path,
                "exists": path.exists(),
                "config": config,
            }));
        }
    }
    Ok(())
}

fn init_config(explicit: Option<&PathBuf>, base_url: Option<&str>, force: bool, output: &Output) -> Result<()> {
    let path = config_path(explicit);
    if path.exists() && !force {
        return Err(eyre!(
            "Configuration file already exists at {}; pass --force to overwrite",
            path.display()
        ));
    }

    let mut config = Config::default();
    if let Some(url) = base_url {
        config.server.base_url = url.trim().to_string();
    }
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;
    config
        .save_to_file(&path)
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;

    output.success(format!("Configuration written to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:5000");
        assert_eq!(config.poller.max_attempts, 4);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbase_url = \"wanted.lan\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let output = Output::new(OutputFormat::Json, true);

        init_config(Some(&path), Some("https://wanted.lan"), false, &output).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().server.base_url, "https://wanted.lan");

        assert!(init_config(Some(&path), None, false, &output).is_err());
        init_config(Some(&path), None, true, &output).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().server.base_url, "http://localhost:5000");
    }
}
