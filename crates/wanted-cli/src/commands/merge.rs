use super::{open_session, resolve_ids};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Confirm;
use serde_json::json;
use std::io::IsTerminal;
use wanted_config::Config;
use wanted_models::MergePreview;

pub async fn run_merge(config: &Config, ids: Vec<String>, yes: bool, output: &Output) -> Result<()> {
    let mut session = open_session(config, output).await?;
    let ids = resolve_ids(&mut session, &ids)?;
    for id in &ids {
        session.select(id.clone());
    }

    let preview = session.merge_preview().await?;
    show_preview(&preview, output);

    if !preview.has_groups() {
        output.json(&json!({ "preview": preview, "merged": 0 }));
        session.close_merge();
        return Ok(());
    }

    if !yes {
        if !std::io::stdin().is_terminal() || !output.is_human() {
            session.close_merge();
            return Err(eyre!("Refusing to merge without confirmation; pass --yes"));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Merge {} records into {} survivors?",
                preview.merged_away_ids().len(),
                preview.merge_groups.len()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            session.close_merge();
            output.info("Merge cancelled");
            return Ok(());
        }
    }

    let merged = session.merge_commit().await?;
    output.json(&json!({
        "preview": preview,
        "merged": merged,
        "removed": preview.merged_away_ids(),
    }));
    Ok(())
}

fn show_preview(preview: &MergePreview, output: &Output) {
    output.info(preview.summary());

    let mut rows = Vec::new();
    for group in &preview.merge_groups {
        for item in &group.items {
            let role = if item.id == group.keep_id { "keep" } else { "merge" };
            rows.push(vec![
                format!("{} {}", group.source.as_str(), group.external_id),
                item.id.to_string(),
                item.title.clone(),
                item.year.map(|y| y.to_string()).unwrap_or_default(),
                role.to_string(),
            ]);
        }
    }
    if !rows.is_empty() {
        output.table(vec!["Match", "ID", "Title", "Year", "Role"], rows);
    }

    if !preview.singletons.is_empty() {
        output.table(
            vec!["ID", "Title", "No duplicate found"],
            preview
                .singletons
                .iter()
                .map(|item| vec![item.id.to_string(), item.title.clone(), String::new()])
                .collect(),
        );
    }

    if !preview.excluded.is_empty() {
        output.table(
            vec!["ID", "Title", "Excluded because"],
            preview
                .excluded
                .iter()
                .map(|entry| {
                    vec![
                        entry.id.to_string(),
                        entry.title.clone().unwrap_or_default(),
                        entry.reason.label(),
                    ]
                })
                .collect(),
        );
    }
}
