use super::{open_session, resolve_ids};
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;
use wanted_config::Config;

pub async fn run_delete(config: &Config, ids: Vec<String>, output: &Output) -> Result<()> {
    let mut session = open_session(config, output).await?;
    let ids = resolve_ids(&mut session, &ids)?;

    let deleted = if let [id] = ids.as_slice() {
        usize::from(session.delete(id).await?)
    } else {
        for id in &ids {
            session.select(id.clone());
        }
        session.bulk_delete().await?
    };

    output.json(&json!({
        "requested": ids,
        "deleted": deleted,
        "remaining": session.stats().total,
    }));
    Ok(())
}
