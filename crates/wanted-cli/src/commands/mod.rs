pub mod assign;
pub mod config;
pub mod delete;
pub mod list;
pub mod lookup;
pub mod merge;
pub mod options;
pub mod push;
pub mod ui;

use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use tracing::debug;
use wanted_client::HttpWantedApi;
use wanted_config::Config;
use wanted_core::{EngineSettings, MemoryGrid, WantedController};
use wanted_models::RecordId;

pub type Session = WantedController<HttpWantedApi, MemoryGrid, Output>;

/// Connect to the server and load the full list
pub async fn open_session(config: &Config, output: &Output) -> Result<Session> {
    let api = HttpWantedApi::new(&config.server)
        .map_err(|e| eyre!("{}", e))
        .wrap_err("Failed to create API client")?;
    let grid = MemoryGrid::new(config.ui.page_length);
    let mut session = WantedController::new(api, grid, output.clone(), EngineSettings::from_config(config));

    debug!("Loading wanted list from {}", config.server.base_url);
    session
        .reload()
        .await
        .wrap_err_with(|| format!("Failed to load the wanted list from {}", config.server.base_url))?;
    Ok(session)
}

/// Parse positional ids and reject the ones the list does not know
pub fn resolve_ids(session: &mut Session, raw: &[String]) -> Result<Vec<RecordId>> {
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw {
        let id = RecordId::new(value.trim());
        if session.record(&id).is_none() {
            return Err(eyre!("No record with id {} in the wanted list", id));
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
