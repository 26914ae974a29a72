use super::open_session;
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;
use wanted_config::Config;
use wanted_core::{GridRow, GridWidget};
use wanted_models::MediaKind;

pub struct ListFilters {
    pub search: Option<String>,
    pub media_type: Option<MediaKind>,
    pub category: Option<String>,
    /// 1-based
    pub page: usize,
    pub length: Option<usize>,
}

pub async fn run_list(config: &Config, filters: ListFilters, output: &Output) -> Result<()> {
    let mut session = open_session(config, output).await?;

    if let Some(search) = &filters.search {
        session.set_search(search);
    }
    session.set_type_filter(filters.media_type);
    session.set_category_filter(filters.category.as_deref());
    if let Some(length) = filters.length {
        session.set_page_length(length);
    }
    session.go_to_page(filters.page.saturating_sub(1));

    let grid = session.grid();
    let rows: Vec<&GridRow> = grid.page_rows();
    let matching = grid.filtered_rows().len();
    let page = grid.page() + 1;
    let pages = grid.page_count().max(1);
    let stats = *session.stats();

    if output.is_human() {
        output.table(
            vec!["ID", "Title", "Category", "Type", "IDs", "Services", "Downloaded"],
            rows.iter()
                .map(|row| {
                    let mut cells = row.cells.clone();
                    cells[0] = row.record.id.to_string();
                    if row.record.missing_external {
                        cells[4] = format!("{} (missing)", cells[4]).trim().to_string();
                    }
                    cells
                })
                .collect(),
        );
        output.info(format!(
            "Page {}/{} · {} matching · Total {} (movies {}, series {}) · Missing ids {} · Radarr {} · Sonarr {}",
            page,
            pages,
            matching,
            stats.total,
            stats.movies,
            stats.series,
            stats.missing,
            stats.in_radarr,
            stats.in_sonarr
        ));
    } else {
        let records: Vec<_> = rows
            .iter()
            .map(|row| json!({ "record": row.record, "download": row.marker }))
            .collect();
        output.json(&json!({
            "page": page,
            "pages": pages,
            "matching": matching,
            "stats": stats,
            "rows": records,
        }));
    }
    Ok(())
}
