use crate::grid::{DownloadMarker, GridWidget};
use crate::snapshot::RowSnapshotIndex;
use serde::Serialize;
use std::collections::HashSet;
use wanted_models::{PushMode, RecordId, Service};

/// Which bulk push a selection allows for one service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkMode {
    None,
    Add,
    Update,
    /// Both add- and update-eligible records are selected
    Mixed,
}

impl BulkMode {
    pub fn from_counts(add: usize, update: usize) -> Self {
        match (add > 0, update > 0) {
            (false, false) => BulkMode::None,
            (true, false) => BulkMode::Add,
            (false, true) => BulkMode::Update,
            (true, true) => BulkMode::Mixed,
        }
    }

    pub fn push_mode(&self) -> Option<PushMode> {
        match self {
            BulkMode::Add => Some(PushMode::Add),
            BulkMode::Update => Some(PushMode::Update),
            BulkMode::None | BulkMode::Mixed => None,
        }
    }
}

/// Eligibility of the selection for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEligibility {
    pub service: Service,
    pub add: usize,
    pub update: usize,
    /// Selected but neither addable nor updatable here
    pub excluded: usize,
    pub mode: BulkMode,
}

impl ServiceEligibility {
    pub fn note(&self) -> String {
        let name = self.service.display_name();
        match self.mode {
            BulkMode::None => format!("Nothing selected can go to {}", name),
            BulkMode::Add => format!("Add {} to {} ({} excluded)", self.add, name, self.excluded),
            BulkMode::Update => format!("Update {} in {} ({} excluded)", self.update, name, self.excluded),
            BulkMode::Mixed => format!(
                "Selection mixes {} to add and {} to update in {}",
                self.add, self.update, name
            ),
        }
    }
}

/// Selection counters and per-service eligibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub selected: usize,
    pub services: Vec<ServiceEligibility>,
}

impl BulkSummary {
    pub fn service(&self, service: Service) -> Option<&ServiceEligibility> {
        self.services.iter().find(|s| s.service == service)
    }

    pub fn mode(&self, service: Service) -> BulkMode {
        self.service(service).map(|s| s.mode).unwrap_or(BulkMode::None)
    }
}

impl Default for BulkSummary {
    fn default() -> Self {
        Self {
            selected: 0,
            services: Service::ALL
                .iter()
                .map(|service| ServiceEligibility {
                    service: *service,
                    add: 0,
                    update: 0,
                    excluded: 0,
                    mode: BulkMode::None,
                })
                .collect(),
        }
    }
}

/// Ids the user has checked, independent of what the grid currently shows.
///
/// Ids stay selected across redraws, paging and reloads. Ids whose row is gone
/// are kept but never count as eligible.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: HashSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: RecordId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn has(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Every selected id, sorted for stable requests
    pub fn all(&self) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rows still waiting on a download from an earlier add are left out
    pub fn add_eligible(
        &self,
        service: Service,
        index: &mut RowSnapshotIndex,
        grid: &dyn GridWidget,
    ) -> Vec<RecordId> {
        let eligible = self.eligible(index, grid, |record| record.is_add_eligible(service));
        let index: &RowSnapshotIndex = index;
        eligible
            .into_iter()
            .filter(|id| !in_progress(id, index, grid))
            .collect()
    }

    pub fn update_eligible(
        &self,
        service: Service,
        index: &mut RowSnapshotIndex,
        grid: &dyn GridWidget,
    ) -> Vec<RecordId> {
        self.eligible(index, grid, |record| record.is_update_eligible(service))
    }

    pub fn eligible_for(
        &self,
        service: Service,
        mode: PushMode,
        index: &mut RowSnapshotIndex,
        grid: &dyn GridWidget,
    ) -> Vec<RecordId> {
        match mode {
            PushMode::Add => self.add_eligible(service, index, grid),
            PushMode::Update => self.update_eligible(service, index, grid),
        }
    }

    pub fn bulk_mode(&self, service: Service, index: &mut RowSnapshotIndex, grid: &dyn GridWidget) -> BulkMode {
        self.eligibility(service, index, grid).mode
    }

    pub fn eligibility(
        &self,
        service: Service,
        index: &mut RowSnapshotIndex,
        grid: &dyn GridWidget,
    ) -> ServiceEligibility {
        let add = self.add_eligible(service, index, grid).len();
        let update = self.update_eligible(service, index, grid).len();
        ServiceEligibility {
            service,
            add,
            update,
            excluded: self.len() - add - update,
            mode: BulkMode::from_counts(add, update),
        }
    }

    pub fn summary(&self, index: &mut RowSnapshotIndex, grid: &dyn GridWidget) -> BulkSummary {
        BulkSummary {
            selected: self.len(),
            services: Service::ALL
                .iter()
                .map(|service| self.eligibility(*service, index, grid))
                .collect(),
        }
    }

    fn eligible(
        &self,
        index: &mut RowSnapshotIndex,
        grid: &dyn GridWidget,
        predicate: impl Fn(&wanted_models::WantedRecord) -> bool,
    ) -> Vec<RecordId> {
        self.all()
            .into_iter()
            .filter(|id| index.lookup(id, grid).map(&predicate).unwrap_or(false))
            .collect()
    }
}

fn in_progress(id: &RecordId, index: &RowSnapshotIndex, grid: &dyn GridWidget) -> bool {
    index
        .handle(id)
        .and_then(|handle| grid.row(handle))
        .is_some_and(|row| row.marker == DownloadMarker::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DownloadMarker;
    use crate::memory_grid::MemoryGrid;
    use wanted_models::{ExternalSource, MediaKind, WantedRecord};

    fn movie(id: u64, tmdb: Option<&str>, in_radarr: bool) -> WantedRecord {
        let mut record = WantedRecord::new(id, format!("Movie {}", id), MediaKind::Movie);
        if let Some(tmdb) = tmdb {
            record.assign_external(ExternalSource::Tmdb, tmdb);
        }
        record.in_radarr = in_radarr;
        record
    }

    fn setup(records: Vec<WantedRecord>) -> (MemoryGrid, RowSnapshotIndex) {
        let mut grid = MemoryGrid::new(50);
        grid.rebuild(records.into_iter().map(|r| (r, DownloadMarker::Unknown)).collect());
        let index = RowSnapshotIndex::index(&grid);
        (grid, index)
    }

    #[test]
    fn test_bulk_mode_from_counts() {
        assert_eq!(BulkMode::from_counts(0, 0), BulkMode::None);
        assert_eq!(BulkMode::from_counts(2, 0), BulkMode::Add);
        assert_eq!(BulkMode::from_counts(0, 1), BulkMode::Update);
        assert_eq!(BulkMode::from_counts(1, 1), BulkMode::Mixed);
        assert_eq!(BulkMode::Mixed.push_mode(), None);
    }

    #[test]
    fn test_eligibility_partitions_selection() {
        let (grid, mut index) = setup(vec![
            movie(1, Some("11"), false),
            movie(2, Some("12"), true),
            movie(3, None, false),
            WantedRecord::new(4u64, "Show", MediaKind::Series),
        ]);
        let mut selection = SelectionSet::new();
        for id in ["1", "2", "3", "4", "99"] {
            selection.add(id.into());
        }

        let radarr = selection.eligibility(Service::Radarr, &mut index, &grid);
        assert_eq!(radarr.add, 1);
        assert_eq!(radarr.update, 1);
        assert_eq!(radarr.excluded, 3);
        assert_eq!(radarr.mode, BulkMode::Mixed);

        let add = selection.add_eligible(Service::Radarr, &mut index, &grid);
        let update = selection.update_eligible(Service::Radarr, &mut index, &grid);
        assert_eq!(add, vec![RecordId::from("1")]);
        assert_eq!(update, vec![RecordId::from("2")]);
        assert!(add.iter().all(|id| !update.contains(id)));

        // Missing ids stay selected but are never eligible
        assert!(selection.has(&"99".into()));
        assert_eq!(selection.bulk_mode(Service::Sonarr, &mut index, &grid), BulkMode::None);
    }

    #[test]
    fn test_in_progress_rows_are_not_add_eligible() {
        let mut grid = MemoryGrid::new(50);
        grid.rebuild(vec![
            (movie(1, Some("11"), false), DownloadMarker::InProgress),
            (movie(2, Some("12"), false), DownloadMarker::Unknown),
        ]);
        let mut index = RowSnapshotIndex::index(&grid);
        let mut selection = SelectionSet::new();
        selection.add("1".into());
        selection.add("2".into());

        let radarr = selection.eligibility(Service::Radarr, &mut index, &grid);
        assert_eq!(radarr.add, 1);
        assert_eq!(radarr.excluded, 1);
        assert_eq!(
            selection.add_eligible(Service::Radarr, &mut index, &grid),
            vec![RecordId::from("2")]
        );
    }

    #[test]
    fn test_summary_counts() {
        let (grid, mut index) = setup(vec![movie(1, Some("11"), false), movie(2, Some("12"), false)]);
        let mut selection = SelectionSet::new();
        selection.add("1".into());
        selection.add("2".into());
        let summary = selection.summary(&mut index, &grid);
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.mode(Service::Radarr), BulkMode::Add);
        assert_eq!(summary.service(Service::Radarr).unwrap().note(), "Add 2 to Radarr (0 excluded)");
        assert_eq!(summary.mode(Service::Sonarr), BulkMode::None);
    }

    #[test]
    fn test_add_remove_clear() {
        let mut selection = SelectionSet::new();
        assert!(selection.add("1".into()));
        assert!(!selection.add("1".into()));
        assert!(selection.remove(&"1".into()));
        selection.add("2".into());
        selection.clear();
        assert!(selection.is_empty());
    }
}
