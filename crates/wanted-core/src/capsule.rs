use crate::filter::{FilterComposer, FilterCriteria};
use crate::grid::{GridWidget, SortOrder};

/// View state that must survive a full grid rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadCapsule {
    pub filters: FilterCriteria,
    pub order: SortOrder,
    pub page: usize,
    pub page_length: usize,
}

impl ReloadCapsule {
    pub fn capture(filters: &FilterComposer, grid: &dyn GridWidget) -> Self {
        Self {
            filters: filters.criteria(),
            order: grid.order(),
            page: grid.page(),
            page_length: grid.page_length(),
        }
    }

    /// Re-apply onto a freshly built grid whose filters are already registered.
    ///
    /// Filters go first so the page index is resolved against the filtered rows.
    pub fn restore(&self, filters: &FilterComposer, grid: &mut dyn GridWidget) {
        filters.apply(self.filters.clone());
        grid.set_order(self.order.clone());
        grid.set_page_length(self.page_length);
        grid.set_page(self.page);
        grid.draw(true);
    }
}
