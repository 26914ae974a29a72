use crate::grid::{GridWidget, RowHandle};
use std::collections::HashMap;
use tracing::trace;
use wanted_models::{RecordId, WantedRecord};

/// Per-id lookup over the rows of the current grid instance.
///
/// Handles map ids to rows; record info is cached lazily and can be patched in
/// place by optimistic updates. Rebuilt from scratch whenever the grid is.
#[derive(Debug, Default)]
pub struct RowSnapshotIndex {
    handles: HashMap<RecordId, RowHandle>,
    info: HashMap<RecordId, WantedRecord>,
}

impl RowSnapshotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every row of `grid` once, across all pages
    pub fn index(grid: &dyn GridWidget) -> Self {
        let mut index = Self::new();
        index.rebuild(grid);
        index
    }

    pub fn rebuild(&mut self, grid: &dyn GridWidget) {
        self.handles.clear();
        self.info.clear();
        for handle in grid.rows() {
            if let Some(row) = grid.row(handle) {
                self.handles.insert(row.record.id.clone(), handle);
                self.info.insert(row.record.id.clone(), row.record.clone());
            }
        }
        trace!("Indexed {} rows", self.handles.len());
    }

    pub fn handle(&self, id: &RecordId) -> Option<RowHandle> {
        self.handles.get(id).copied()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.handles.contains_key(id)
    }

    /// Cached info for `id`, derived from the live row on a miss
    pub fn lookup(&mut self, id: &RecordId, grid: &dyn GridWidget) -> Option<&WantedRecord> {
        if !self.info.contains_key(id) {
            let handle = match self.handles.get(id) {
                Some(handle) => *handle,
                None => {
                    let found = grid
                        .rows()
                        .into_iter()
                        .find(|h| grid.row(*h).map(|row| &row.record.id == id).unwrap_or(false))?;
                    self.handles.insert(id.clone(), found);
                    found
                }
            };
            let record = grid.row(handle)?.record.clone();
            self.info.insert(id.clone(), record);
        }
        self.info.get(id)
    }

    /// Mutable cached info, for optimistic patches
    pub fn lookup_mut(&mut self, id: &RecordId, grid: &dyn GridWidget) -> Option<&mut WantedRecord> {
        self.lookup(id, grid)?;
        self.info.get_mut(id)
    }

    /// Drop cached info so the next lookup re-derives it from the row
    pub fn invalidate(&mut self, id: &RecordId) {
        self.info.remove(id);
    }

    /// Forget the id entirely; returns its row handle if it had one
    pub fn remove(&mut self, id: &RecordId) -> Option<RowHandle> {
        self.info.remove(id);
        self.handles.remove(id)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.handles.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DownloadMarker;
    use crate::memory_grid::MemoryGrid;
    use wanted_models::MediaKind;

    fn grid_with(records: Vec<WantedRecord>) -> MemoryGrid {
        let mut grid = MemoryGrid::new(2);
        grid.rebuild(records.into_iter().map(|r| (r, DownloadMarker::Unknown)).collect());
        grid.draw(false);
        grid
    }

    #[test]
    fn test_index_covers_all_pages() {
        let grid = grid_with(vec![
            WantedRecord::new(1u64, "A", MediaKind::Movie),
            WantedRecord::new(2u64, "B", MediaKind::Movie),
            WantedRecord::new(3u64, "C", MediaKind::Series),
        ]);
        let mut index = RowSnapshotIndex::index(&grid);
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(&"3".into(), &grid).unwrap().media_type, MediaKind::Series);
        assert!(index.lookup(&"4".into(), &grid).is_none());
    }

    #[test]
    fn test_invalidate_rederives_from_row() {
        let mut grid = grid_with(vec![WantedRecord::new(1u64, "A", MediaKind::Movie)]);
        let mut index = RowSnapshotIndex::index(&grid);
        let id = RecordId::from("1");

        let handle = index.handle(&id).unwrap();
        let mut changed = WantedRecord::new(1u64, "A", MediaKind::Movie);
        changed.in_radarr = true;
        grid.render_row(handle, &changed, DownloadMarker::Unknown);

        assert!(!index.lookup(&id, &grid).unwrap().in_radarr);
        index.invalidate(&id);
        assert!(index.lookup(&id, &grid).unwrap().in_radarr);
    }

    #[test]
    fn test_patch_and_remove() {
        let grid = grid_with(vec![WantedRecord::new(1u64, "A", MediaKind::Movie)]);
        let mut index = RowSnapshotIndex::index(&grid);
        let id = RecordId::from("1");

        index.lookup_mut(&id, &grid).unwrap().in_radarr = true;
        assert!(index.lookup(&id, &grid).unwrap().in_radarr);

        assert!(index.remove(&id).is_some());
        assert!(!index.contains(&id));
        assert!(index.is_empty());
    }
}
