use super::{open_session, resolve_ids, ui::PendingUi, Session};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use wanted_config::Config;
use wanted_core::PollOutcome;
use wanted_models::{PushMode, PushOptions, Service};

pub struct PushRequest {
    pub service: Service,
    pub ids: Vec<String>,
    pub update: bool,
    pub root: Option<String>,
    pub profile: Option<u32>,
    pub search: bool,
    pub specials: Option<bool>,
    pub wait: bool,
}

pub async fn run_push(config: &Config, request: PushRequest, output: &Output) -> Result<()> {
    let mut session = open_session(config, output).await?;
    let ids = resolve_ids(&mut session, &request.ids)?;
    let options = push_options(&mut session, &request).await?;
    let service = request.service;
    let mode = if request.update { PushMode::Update } else { PushMode::Add };

    if let [id] = ids.as_slice() {
        let status = session.push(service, mode, id, &options).await?;
        output.json(&json!({
            "service": service.as_str(),
            "mode": mode.as_str(),
            "id": id,
            "status": status,
        }));
    } else {
        for id in &ids {
            session.select(id.clone());
        }
        if let Some(allowed) = session.bulk_mode(service).push_mode().filter(|m| *m != mode) {
            return Err(eyre!(
                "Selected records can only be {} in {}; {} the --update flag",
                match allowed {
                    PushMode::Add => "added",
                    PushMode::Update => "updated",
                },
                service.display_name(),
                if request.update { "drop" } else { "add" }
            ));
        }
        if let Some(eligibility) = session.bulk_summary().service(service) {
            output.info(eligibility.note());
        }
        let result = session.bulk_push(service, &options).await?;
        output.json(&json!({
            "service": service.as_str(),
            "mode": mode.as_str(),
            "result": result,
        }));
    }

    if request.wait && !session.pending().is_empty() {
        wait_for_downloads(&mut session, output).await;
    }
    Ok(())
}

/// Configured or first offered options, with flags applied on top
async fn push_options(session: &mut Session, request: &PushRequest) -> Result<PushOptions> {
    let service = request.service;
    let available = session.service_options(service).await?;
    let mut options = session
        .default_push_options(service)
        .await?
        .unwrap_or_else(|| PushOptions::new(String::new(), 0));

    if let Some(root) = &request.root {
        if !available.has_root(root) {
            return Err(eyre!("{} has no root folder {}", service.display_name(), root));
        }
        options.root_folder = root.clone();
    }
    if let Some(profile) = request.profile {
        if !available.has_profile(profile) {
            return Err(eyre!("{} has no quality profile {}", service.display_name(), profile));
        }
        options.profile_id = profile;
    }
    options.enable_search = request.search;
    if service == Service::Sonarr {
        options.monitor_specials = request.specials.or(options.monitor_specials);
    }

    if !options.is_complete() {
        return Err(eyre!(
            "No root folder or quality profile for {}; pass --root and --profile",
            service.display_name()
        ));
    }
    Ok(options)
}

async fn wait_for_downloads(session: &mut Session, output: &Output) {
    let ui = PendingUi::new(session.pending().len());
    let outcomes = session.watch_pending(|outcome| ui.update(outcome)).await;
    ui.finish();

    match outcomes.last() {
        Some(PollOutcome::GaveUp { abandoned, .. }) => output.warn(format!(
            "Download status still unknown for {} records",
            abandoned.len()
        )),
        Some(PollOutcome::Settled { .. }) => output.success("Download status known for every pushed record"),
        _ => {}
    }
}
