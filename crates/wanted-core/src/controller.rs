use crate::capsule::ReloadCapsule;
use crate::controls::{ControlId, Controls};
use crate::error::{Result, WantedError};
use crate::filter::{FilterComposer, FilterCriteria};
use crate::grid::{DownloadMarker, GridEvent, GridWidget, SortOrder};
use crate::merge::{MergeState, MergeWorkflow};
use crate::notify::Notifier;
use crate::pending::{PendingPoller, PendingRegistry, PollOutcome};
use crate::selection::{BulkMode, BulkSummary, SelectionSet};
use crate::settings::EngineSettings;
use crate::snapshot::RowSnapshotIndex;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};
use wanted_client::{ApiError, WantedApi};
use wanted_models::{
    ExternalSource, LookupCandidate, MediaKind, PushOptions, RecordId, Service, ServiceOptions,
    WantedRecord, WantedStats,
};

/// Owns the wanted list view: grid, selection, filters, pending downloads
/// and every mutation workflow.
///
/// The grid is a render target. Decisions read the snapshot index, which is
/// patched optimistically after each successful mutation and rebuilt on reload.
pub struct WantedController<A, G, N> {
    pub(crate) api: A,
    pub(crate) grid: G,
    pub(crate) notifier: N,
    pub(crate) settings: EngineSettings,
    pub(crate) snapshot: RowSnapshotIndex,
    pub(crate) filters: FilterComposer,
    pub(crate) selection: SelectionSet,
    pub(crate) poller: PendingPoller,
    pub(crate) merge: MergeWorkflow,
    pub(crate) controls: Controls,
    options: HashMap<Service, ServiceOptions>,
    stats: WantedStats,
    bulk: BulkSummary,
    syncing_selection: bool,
}

impl<A, G, N> WantedController<A, G, N>
where
    A: WantedApi,
    G: GridWidget,
    N: Notifier,
{
    pub fn new(api: A, mut grid: G, notifier: N, settings: EngineSettings) -> Self {
        let filters = FilterComposer::new();
        grid.register_filter(filters.predicate());
        Self {
            api,
            grid,
            notifier,
            poller: PendingPoller::new(settings.max_attempts),
            settings,
            snapshot: RowSnapshotIndex::new(),
            filters,
            selection: SelectionSet::new(),
            merge: MergeWorkflow::new(),
            controls: Controls::new(),
            options: HashMap::new(),
            stats: WantedStats::default(),
            bulk: BulkSummary::default(),
            syncing_selection: false,
        }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Direct widget access, for user interaction. Call [`Self::pump_events`] afterwards.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn stats(&self) -> &WantedStats {
        &self.stats
    }

    pub fn bulk_summary(&self) -> &BulkSummary {
        &self.bulk
    }

    pub fn bulk_mode(&self, service: Service) -> BulkMode {
        self.bulk.mode(service)
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn pending(&self) -> &PendingRegistry {
        &self.poller.registry
    }

    pub fn poller(&self) -> &PendingPoller {
        &self.poller
    }

    pub fn merge_state(&self) -> &MergeState {
        self.merge.state()
    }

    pub fn filter_criteria(&self) -> FilterCriteria {
        self.filters.criteria()
    }

    /// Current attributes of a record, or `None` if it is not in the list
    pub fn record(&mut self, id: &RecordId) -> Option<&WantedRecord> {
        self.snapshot.lookup(id, &self.grid)
    }

    pub fn marker(&self, id: &RecordId) -> Option<DownloadMarker> {
        let handle = self.snapshot.handle(id)?;
        self.grid.row(handle).map(|row| row.marker)
    }

    /// Fetch the full list and rebuild the grid, keeping filters, sorting and paging.
    ///
    /// On failure the previous rows stay on screen.
    pub async fn reload(&mut self) -> Result<()> {
        match self.reload_content().await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.notifier.error(&format!("Could not load the wanted list: {}", e));
                Err(e)
            }
        }
    }

    /// Returns the pending ids resolved by the new content
    pub(crate) async fn reload_content(&mut self) -> Result<Vec<RecordId>> {
        let capsule = ReloadCapsule::capture(&self.filters, &self.grid);
        let content = self.api.fetch_content().await.map_err(|e| {
            warn!("Failed to fetch wanted content: {}", e);
            WantedError::from(e)
        })?;
        let stats = content.stats();

        let downloaded: HashMap<RecordId, _> = content
            .rows
            .iter()
            .map(|record| (record.id.clone(), record.downloaded))
            .collect();
        let resolved = self
            .poller
            .registry
            .resolve(|id| downloaded.get(id).copied());
        if !resolved.is_empty() {
            debug!("Resolved {} pending ids on reload", resolved.len());
        }

        let rows: Vec<(WantedRecord, DownloadMarker)> = content
            .rows
            .into_iter()
            .map(|record| {
                let marker = self.marker_for(&record);
                (record, marker)
            })
            .collect();
        let row_count = rows.len();

        self.grid.rebuild(rows);
        self.grid.register_filter(self.filters.predicate());
        self.snapshot.rebuild(&self.grid);
        capsule.restore(&self.filters, &mut self.grid);

        self.stats = stats;
        self.pump_events();
        self.refresh_bulk_state();
        info!(
            "Loaded {} wanted records ({} selected, {} pending)",
            row_count,
            self.selection.len(),
            self.poller.registry.len()
        );
        Ok(resolved)
    }

    pub(crate) fn marker_for(&self, record: &WantedRecord) -> DownloadMarker {
        if self.poller.registry.contains(&record.id) {
            DownloadMarker::InProgress
        } else {
            DownloadMarker::from_state(record.downloaded)
        }
    }

    /// Handle every queued grid event, including ones raised while handling
    pub fn pump_events(&mut self) {
        loop {
            let events = self.grid.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_grid_event(event);
            }
        }
    }

    fn handle_grid_event(&mut self, event: GridEvent) {
        if self.syncing_selection {
            trace!("Ignoring grid event during selection sync: {:?}", event);
            return;
        }
        match event {
            GridEvent::SelectionChanged { id, checked } => {
                if checked {
                    self.selection.add(id);
                } else {
                    self.selection.remove(&id);
                }
                self.refresh_bulk_state();
            }
            GridEvent::Drawn => self.sync_selection_to_table(),
        }
    }

    /// Project the selection onto the checkboxes of the visible page.
    ///
    /// Checkbox events raised by the projection itself are dropped.
    pub fn sync_selection_to_table(&mut self) {
        // Settle queued user changes first so the projection cannot undo them
        for event in self.grid.drain_events() {
            if let GridEvent::SelectionChanged { .. } = event {
                self.handle_grid_event(event);
            }
        }

        self.syncing_selection = true;
        for handle in self.grid.visible_rows() {
            let checked = match self.grid.row(handle) {
                Some(row) => self.selection.has(row.id()),
                None => continue,
            };
            self.grid.set_checked(handle, checked);
        }
        for event in self.grid.drain_events() {
            self.handle_grid_event(event);
        }
        self.syncing_selection = false;
    }

    /// Recompute counters, eligibility notes and bulk control enablement
    pub fn refresh_bulk_state(&mut self) {
        self.bulk = self.selection.summary(&mut self.snapshot, &self.grid);
        for eligibility in &self.bulk.services {
            let enabled = matches!(eligibility.mode, BulkMode::Add | BulkMode::Update);
            self.controls
                .set_enabled(ControlId::BulkPush(eligibility.service), enabled);
        }
        let any = !self.selection.is_empty();
        self.controls.set_enabled(ControlId::BulkDelete, any);
        self.controls.set_enabled(ControlId::MergePreview, any);
        self.controls
            .set_enabled(ControlId::MergeCommit, self.merge.can_commit());
    }

    pub(crate) fn recompute_stats(&mut self) {
        let mut records = Vec::with_capacity(self.snapshot.len());
        for id in self.snapshot.ids() {
            if let Some(record) = self.snapshot.lookup(&id, &self.grid) {
                records.push(record.clone());
            }
        }
        self.stats = WantedStats::from_records(&records);
    }

    pub(crate) fn redraw(&mut self, hold_page: bool) {
        self.grid.draw(hold_page);
        self.pump_events();
        self.refresh_bulk_state();
    }

    pub fn set_search(&mut self, text: &str) {
        if self.filters.set_search(text) {
            self.redraw(false);
        }
    }

    pub fn set_type_filter(&mut self, kind: Option<MediaKind>) {
        if self.filters.set_media_type(kind) {
            self.redraw(false);
        }
    }

    pub fn set_category_filter(&mut self, category: Option<&str>) {
        if self.filters.set_category(category) {
            self.redraw(false);
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.grid.set_page(page);
        self.redraw(true);
    }

    pub fn set_page_length(&mut self, length: usize) {
        self.grid.set_page_length(length);
        self.redraw(false);
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.grid.set_order(order);
        self.redraw(false);
    }

    pub fn select(&mut self, id: RecordId) -> bool {
        let added = self.selection.add(id);
        if added {
            self.sync_selection_to_table();
            self.refresh_bulk_state();
        }
        added
    }

    pub fn deselect(&mut self, id: &RecordId) -> bool {
        let removed = self.selection.remove(id);
        if removed {
            self.sync_selection_to_table();
            self.refresh_bulk_state();
        }
        removed
    }

    /// Select every row passing the current filters, on all pages. Returns how many were added.
    pub fn select_visible(&mut self) -> usize {
        let mut added = 0;
        for handle in self.grid.filtered_rows() {
            if let Some(row) = self.grid.row(handle) {
                if self.selection.add(row.id().clone()) {
                    added += 1;
                }
            }
        }
        self.sync_selection_to_table();
        self.refresh_bulk_state();
        added
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_selection_to_table();
        self.refresh_bulk_state();
    }

    /// One tick of the pending poller. Safe to call with nothing pending.
    pub async fn fire_poll_timer(&mut self) -> PollOutcome {
        self.poller.cancel();
        if self.poller.registry.is_empty() {
            return PollOutcome::Idle;
        }

        let attempt = self.poller.registry.record_attempt();
        debug!(
            "Pending reload attempt {}/{} for {} ids",
            attempt,
            self.poller.max_attempts(),
            self.poller.registry.len()
        );
        let resolved = match self.reload_content().await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Pending reload attempt {} failed: {}", attempt, e);
                Vec::new()
            }
        };

        if self.poller.registry.is_empty() {
            info!("All pending downloads resolved");
            return PollOutcome::Settled { resolved };
        }

        if self.poller.exhausted() {
            let abandoned = self.poller.registry.drain();
            warn!(
                "Giving up on {} pending ids after {} attempts",
                abandoned.len(),
                attempt
            );
            for id in &abandoned {
                if let Some(record) = self.snapshot.lookup(id, &self.grid).cloned() {
                    self.render_record(&record);
                }
            }
            return PollOutcome::GaveUp { resolved, abandoned };
        }

        self.poller.reschedule();
        PollOutcome::Rescheduled {
            resolved,
            remaining: self.poller.registry.len(),
        }
    }

    /// Sleep until each scheduled reload and fire it, until nothing is scheduled
    pub async fn wait_for_pending(&mut self) -> Vec<PollOutcome> {
        self.watch_pending(|_| {}).await
    }

    /// [`Self::wait_for_pending`], reporting every outcome as it happens
    pub async fn watch_pending(&mut self, mut on_outcome: impl FnMut(&PollOutcome)) -> Vec<PollOutcome> {
        let mut outcomes = Vec::new();
        while let Some(deadline) = self.poller.deadline() {
            tokio::time::sleep_until(deadline).await;
            let outcome = self.fire_poll_timer().await;
            on_outcome(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Root folders and quality profiles for a service, fetched once per session
    pub async fn service_options(&mut self, service: Service) -> Result<ServiceOptions> {
        if let Some(options) = self.options.get(&service) {
            return Ok(options.clone());
        }
        let options = self.api.service_options(service).await.map_err(|e| {
            self.notifier.error(&format!(
                "Could not load {} options: {}",
                service.display_name(),
                e
            ));
            WantedError::from(e)
        })?;
        debug!(
            "Cached {} options: {} root folders, {} profiles",
            service.as_str(),
            options.root_folders.len(),
            options.profiles.len()
        );
        self.options.insert(service, options.clone());
        Ok(options)
    }

    /// Push options pre-filled from configuration, falling back to the first
    /// root folder and profile the service offers
    pub async fn default_push_options(&mut self, service: Service) -> Result<Option<PushOptions>> {
        let options = self.service_options(service).await?;
        if let Some(configured) = self.settings.push_defaults.get(&service) {
            if options.has_root(&configured.root_folder) && options.has_profile(configured.profile_id) {
                return Ok(Some(configured.clone()));
            }
            warn!(
                "Configured {} defaults are not offered by the service, using its first options",
                service.as_str()
            );
        }
        let root = options.root_folders.first();
        let profile = options.profiles.first();
        Ok(match (root, profile) {
            (Some(root), Some(profile)) => {
                let mut fallback = PushOptions::new(root.path.clone(), profile.id);
                fallback.enable_search = true;
                Some(fallback)
            }
            _ => None,
        })
    }

    /// Catalog candidates for assigning an external id by hand
    pub async fn lookup(
        &mut self,
        id: &RecordId,
        source: ExternalSource,
        query: Option<&str>,
    ) -> Result<Vec<LookupCandidate>> {
        if !self.snapshot.contains(id) {
            return Err(WantedError::UnknownRecord(id.clone()));
        }
        match self.api.lookup(id, source, query).await {
            Ok(candidates) => {
                debug!("{} {} candidates for {}", candidates.len(), source.as_str(), id);
                Ok(candidates)
            }
            Err(e) => Err(self.report_failure(None, "Lookup failed", e)),
        }
    }

    /// Restore a control and surface a failed request
    pub(crate) fn report_failure(
        &mut self,
        control: Option<&ControlId>,
        context: &str,
        error: ApiError,
    ) -> WantedError {
        if let Some(control) = control {
            self.controls.finish(control);
        }
        warn!("{}: {}", context, error);
        self.notifier.error(&format!("{}: {}", context, error));
        self.refresh_bulk_state();
        WantedError::Api(error)
    }

    pub(crate) fn begin_control(&mut self, control: &ControlId) -> Result<()> {
        if self.controls.begin(control) {
            Ok(())
        } else {
            Err(WantedError::Busy(control.clone()))
        }
    }
}
