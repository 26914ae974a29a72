use crate::grid::{
    DownloadMarker, GridEvent, GridRow, GridWidget, RowHandle, RowPredicate, SortDirection, SortOrder,
};
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::trace;
use wanted_models::WantedRecord;

/// Headless grid keeping rows in memory.
///
/// Behaves like a deferred-render table: every draw recreates the visible
/// rows, so checkbox state does not survive a redraw unless it is projected
/// back on.
pub struct MemoryGrid {
    generation: u64,
    slots: Vec<Option<GridRow>>,
    display: Vec<RowHandle>,
    filters: Vec<RowPredicate>,
    order: SortOrder,
    page: usize,
    page_length: usize,
    default_page_length: usize,
    events: VecDeque<GridEvent>,
}

impl MemoryGrid {
    pub fn new(page_length: usize) -> Self {
        let page_length = page_length.max(1);
        Self {
            generation: 0,
            slots: Vec::new(),
            display: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            page: 0,
            page_length,
            default_page_length: page_length,
            events: VecDeque::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        if self.display.is_empty() {
            0
        } else {
            (self.display.len() + self.page_length - 1) / self.page_length
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows on the current page, for rendering
    pub fn page_rows(&self) -> Vec<&GridRow> {
        self.visible_rows()
            .into_iter()
            .filter_map(|handle| self.row(handle))
            .collect()
    }

    /// A user clicking a row checkbox
    pub fn click(&mut self, handle: RowHandle, checked: bool) {
        self.set_checked(handle, checked);
    }

    /// A user following a pager link
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.draw(true);
    }

    /// A user clicking a column header
    pub fn sort_by(&mut self, order: SortOrder) {
        self.order = order;
        self.draw(false);
    }

    fn slot(&self, handle: RowHandle) -> Option<&GridRow> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get(handle.index).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: RowHandle) -> Option<&mut GridRow> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get_mut(handle.index).and_then(Option::as_mut)
    }

    fn compare(&self, a: RowHandle, b: RowHandle) -> Ordering {
        let (Some(left), Some(right)) = (self.slot(a), self.slot(b)) else {
            return Ordering::Equal;
        };
        for (column, direction) in &self.order {
            let l = left.cells.get(*column).map(|c| c.to_lowercase()).unwrap_or_default();
            let r = right.cells.get(*column).map(|c| c.to_lowercase()).unwrap_or_default();
            let ordering = match direction {
                SortDirection::Asc => l.cmp(&r),
                SortDirection::Desc => r.cmp(&l),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl GridWidget for MemoryGrid {
    fn rebuild(&mut self, rows: Vec<(WantedRecord, DownloadMarker)>) {
        self.generation += 1;
        let generation = self.generation;
        self.slots = rows
            .into_iter()
            .enumerate()
            .map(|(index, (record, marker))| {
                Some(GridRow {
                    handle: RowHandle { generation, index },
                    cells: GridRow::render_cells(&record, marker),
                    record,
                    marker,
                    checked: false,
                })
            })
            .collect();
        self.display = self.rows();
        self.filters.clear();
        self.order.clear();
        self.page = 0;
        self.page_length = self.default_page_length;
        self.events.clear();
        trace!("Grid rebuilt with {} rows (generation {})", self.slots.len(), generation);
    }

    fn register_filter(&mut self, predicate: RowPredicate) {
        self.filters.push(predicate);
    }

    fn rows(&self) -> Vec<RowHandle> {
        self.slots.iter().flatten().map(|row| row.handle).collect()
    }

    fn row(&self, handle: RowHandle) -> Option<&GridRow> {
        self.slot(handle)
    }

    fn render_row(&mut self, handle: RowHandle, record: &WantedRecord, marker: DownloadMarker) -> bool {
        match self.slot_mut(handle) {
            Some(row) => {
                row.cells = GridRow::render_cells(record, marker);
                row.record = record.clone();
                row.marker = marker;
                true
            }
            None => false,
        }
    }

    fn remove_row(&mut self, handle: RowHandle) -> bool {
        if self.slot(handle).is_none() {
            return false;
        }
        self.slots[handle.index] = None;
        self.display.retain(|h| *h != handle);
        true
    }

    fn set_checked(&mut self, handle: RowHandle, checked: bool) {
        let Some(row) = self.slot_mut(handle) else {
            return;
        };
        if row.checked == checked {
            return;
        }
        row.checked = checked;
        let id = row.record.id.clone();
        self.events.push_back(GridEvent::SelectionChanged { id, checked });
    }

    fn draw(&mut self, hold_page: bool) {
        let mut display: Vec<RowHandle> = self
            .slots
            .iter()
            .flatten()
            .filter(|row| self.filters.iter().all(|f| f(row)))
            .map(|row| row.handle)
            .collect();
        display.sort_by(|a, b| self.compare(*a, *b));
        self.display = display;

        // Visible rows are recreated without their checkbox state
        for row in self.slots.iter_mut().flatten() {
            row.checked = false;
        }

        if !hold_page {
            self.page = 0;
        }
        let pages = self.page_count();
        if pages == 0 {
            self.page = 0;
        } else if self.page >= pages {
            self.page = pages - 1;
        }
        self.events.push_back(GridEvent::Drawn);
    }

    fn visible_rows(&self) -> Vec<RowHandle> {
        self.display
            .iter()
            .skip(self.page * self.page_length)
            .take(self.page_length)
            .copied()
            .collect()
    }

    fn filtered_rows(&self) -> Vec<RowHandle> {
        self.display.clone()
    }

    fn order(&self) -> SortOrder {
        self.order.clone()
    }

    fn set_order(&mut self, order: SortOrder) {
        self.order = order;
    }

    fn page(&self) -> usize {
        self.page
    }

    fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    fn page_length(&self) -> usize {
        self.page_length
    }

    fn set_page_length(&mut self, length: usize) {
        self.page_length = length.max(1);
    }

    fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wanted_models::MediaKind;

    fn rows(count: usize) -> Vec<(WantedRecord, DownloadMarker)> {
        (1..=count)
            .map(|i| {
                (
                    WantedRecord::new(i as u64, format!("Title {:03}", i), MediaKind::Movie),
                    DownloadMarker::Unknown,
                )
            })
            .collect()
    }

    #[test]
    fn test_paging_and_clamp() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(25));
        grid.draw(false);
        assert_eq!(grid.page_count(), 3);
        assert_eq!(grid.visible_rows().len(), 10);

        grid.go_to_page(2);
        assert_eq!(grid.visible_rows().len(), 5);

        grid.go_to_page(9);
        assert_eq!(grid.page(), 2);
    }

    #[test]
    fn test_draw_drops_checkbox_state() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(3));
        grid.draw(false);
        let handle = grid.visible_rows()[0];
        grid.click(handle, true);
        assert!(grid.row(handle).unwrap().checked);

        grid.draw(true);
        assert!(!grid.row(handle).unwrap().checked);
        let events = grid.drain_events();
        assert_eq!(
            events,
            vec![
                GridEvent::Drawn,
                GridEvent::SelectionChanged { id: "1".into(), checked: true },
                GridEvent::Drawn,
            ]
        );
    }

    #[test]
    fn test_set_checked_without_change_is_silent() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(1));
        let handle = grid.rows()[0];
        grid.set_checked(handle, false);
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_rebuild_invalidates_handles_and_resets_state() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(30));
        grid.set_page_length(5);
        grid.sort_by(vec![(1, SortDirection::Desc)]);
        let stale = grid.rows()[0];

        grid.rebuild(rows(30));
        assert!(grid.row(stale).is_none());
        assert!(grid.order().is_empty());
        assert_eq!(grid.page_length(), 10);
        assert!(!grid.render_row(stale, &WantedRecord::new(1u64, "x", MediaKind::Movie), DownloadMarker::No));
    }

    #[test]
    fn test_filters_and_sorting() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(12));
        grid.register_filter(Box::new(|row: &GridRow| row.record.title.ends_with('1') || row.record.title.ends_with('2')));
        grid.sort_by(vec![(1, SortDirection::Desc)]);
        let titles: Vec<String> = grid.page_rows().iter().map(|r| r.record.title.clone()).collect();
        assert_eq!(titles, vec!["Title 012", "Title 011", "Title 002", "Title 001"]);
    }

    #[test]
    fn test_remove_row() {
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(rows(3));
        grid.draw(false);
        let handle = grid.rows()[1];
        assert!(grid.remove_row(handle));
        assert!(!grid.remove_row(handle));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.filtered_rows().len(), 2);
    }
}
