use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use futures::future::join_all;
use serde_json::json;
use wanted_client::{HttpWantedApi, WantedApi};
use wanted_config::Config;
use wanted_models::Service;

/// List root folders and profiles straight from the server, without loading the list
pub async fn run_options(config: &Config, service: Option<Service>, output: &Output) -> Result<()> {
    let api = HttpWantedApi::new(&config.server).map_err(|e| eyre!("{}", e))?;
    let services: Vec<Service> = match service {
        Some(service) => vec![service],
        None => Service::ALL.to_vec(),
    };

    let results = join_all(services.iter().map(|service| api.service_options(*service))).await;

    let mut report = serde_json::Map::new();
    let mut failures = 0;
    for (service, result) in services.iter().zip(results) {
        match result {
            Ok(options) => {
                let configured = config.push_defaults(*service);
                output.info(format!("{}:", service.display_name()));
                output.table(
                    vec!["Kind", "Value", "Detail"],
                    options
                        .root_folders
                        .iter()
                        .map(|root| {
                            let default = configured
                                .as_ref()
                                .is_some_and(|c| c.root_folder == root.path);
                            vec![
                                "root folder".to_string(),
                                root.path.clone(),
                                detail(root.free_space.map(format_bytes), default),
                            ]
                        })
                        .chain(options.profiles.iter().map(|profile| {
                            let default = configured.as_ref().is_some_and(|c| c.profile_id == profile.id);
                            vec![
                                "profile".to_string(),
                                profile.id.to_string(),
                                detail(Some(profile.name.clone()), default),
                            ]
                        }))
                        .collect(),
                );
                report.insert(service.as_str().to_string(), json!(options));
            }
            Err(e) => {
                failures += 1;
                output.warn(format!("Could not load {} options: {}", service.display_name(), e));
                report.insert(service.as_str().to_string(), json!({ "error": e.code() }));
            }
        }
    }

    output.json(&serde_json::Value::Object(report));
    if failures == services.len() {
        return Err(eyre!("No service options could be loaded"));
    }
    Ok(())
}

fn detail(text: Option<String>, default: bool) -> String {
    let text = text.unwrap_or_default();
    match (text.is_empty(), default) {
        (_, false) => text,
        (true, true) => "(default)".to_string(),
        (false, true) => format!("{} (default)", text),
    }
}

fn format_bytes(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    format!("{:.1} GiB free", bytes as f64 / GIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_marks_defaults() {
        assert_eq!(detail(Some("HD".to_string()), true), "HD (default)");
        assert_eq!(detail(None, true), "(default)");
        assert_eq!(detail(Some("HD".to_string()), false), "HD");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.0 GiB free");
    }
}
