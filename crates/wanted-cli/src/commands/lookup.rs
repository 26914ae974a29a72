use super::{open_session, resolve_ids};
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;
use wanted_config::Config;
use wanted_models::ExternalSource;

pub async fn run_lookup(
    config: &Config,
    id: String,
    source: ExternalSource,
    query: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = open_session(config, output).await?;
    let ids = resolve_ids(&mut session, &[id])?;
    let id = &ids[0];

    let candidates = session.lookup(id, source, query.as_deref()).await?;
    if candidates.is_empty() {
        output.warn(format!("No {} matches for {}", source.as_str(), id));
        output.json(&json!({ "id": id, "source": source, "candidates": [] }));
        return Ok(());
    }

    output.table(
        vec!["External id", "Title", "IMDb", "Link"],
        candidates
            .iter()
            .map(|c| {
                vec![
                    c.external_id.clone(),
                    c.display_title(),
                    c.imdb_id.clone().unwrap_or_default(),
                    c.link.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    );
    output.json(&json!({ "id": id, "source": source, "candidates": candidates }));
    Ok(())
}
