use super::{open_session, resolve_ids, yes_no};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use wanted_config::Config;
use wanted_models::{ExternalSource, Service};

pub async fn run_assign(
    config: &Config,
    id: String,
    source: ExternalSource,
    external_id: String,
    link: Option<String>,
    output: &Output,
) -> Result<()> {
    if external_id.trim().is_empty() {
        return Err(eyre!("External id cannot be empty"));
    }
    let mut session = open_session(config, output).await?;
    let ids = resolve_ids(&mut session, &[id])?;
    let id = &ids[0];

    let outcome = session
        .assign_external(id, source, &external_id, link.as_deref())
        .await?;

    let record = session
        .record(id)
        .cloned()
        .ok_or_else(|| eyre!("Record {} vanished after assignment", id))?;
    let link = link.unwrap_or_else(|| source.default_link(external_id.trim(), record.media_type));

    output.table(
        vec!["Field", "Value"],
        vec![
            vec!["Record".to_string(), format!("{} {}", record.id, record.title)],
            vec![source.as_str().to_uppercase(), external_id.trim().to_string()],
            vec!["Link".to_string(), link.clone()],
            vec!["Missing ids".to_string(), yes_no(record.missing_external).to_string()],
            vec![
                Service::Radarr.display_name().to_string(),
                yes_no(record.in_service(Service::Radarr)).to_string(),
            ],
            vec![
                Service::Sonarr.display_name().to_string(),
                yes_no(record.in_service(Service::Sonarr)).to_string(),
            ],
        ],
    );
    output.json(&json!({
        "id": id,
        "source": source,
        "external_id": external_id.trim(),
        "link": link,
        "outcome": outcome,
        "record": record,
    }));
    Ok(())
}
