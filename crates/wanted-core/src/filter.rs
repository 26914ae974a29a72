use crate::grid::{GridRow, RowPredicate};
use std::cell::RefCell;
use std::rc::Rc;
use wanted_models::{MediaKind, WantedRecord};

/// Current values of the filter fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Free text, matched case-insensitively against the title
    pub search: String,
    pub media_type: Option<MediaKind>,
    /// Exact (case-insensitive) category match
    pub category: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &WantedRecord) -> bool {
        let search = self.search.trim();
        if !search.is_empty() && !record.title.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
        if let Some(kind) = self.media_type {
            if record.media_type != kind {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !record.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.media_type.is_none() && self.category.is_none()
    }
}

/// Combines the filter fields into one predicate for the grid.
///
/// The predicate reads the shared criteria each time it runs, so it is
/// registered once per grid instance. The grid does not observe criteria
/// changes; callers redraw after every setter that returns `true`.
#[derive(Debug, Clone, Default)]
pub struct FilterComposer {
    criteria: Rc<RefCell<FilterCriteria>>,
}

impl FilterComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.criteria.borrow().clone()
    }

    pub fn set_search(&self, text: &str) -> bool {
        let mut criteria = self.criteria.borrow_mut();
        if criteria.search == text {
            return false;
        }
        criteria.search = text.to_string();
        true
    }

    pub fn set_media_type(&self, kind: Option<MediaKind>) -> bool {
        let mut criteria = self.criteria.borrow_mut();
        if criteria.media_type == kind {
            return false;
        }
        criteria.media_type = kind;
        true
    }

    pub fn set_category(&self, category: Option<&str>) -> bool {
        let category = category.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);
        let mut criteria = self.criteria.borrow_mut();
        if criteria.category == category {
            return false;
        }
        criteria.category = category;
        true
    }

    /// Replace every field at once
    pub fn apply(&self, criteria: FilterCriteria) -> bool {
        let mut current = self.criteria.borrow_mut();
        if *current == criteria {
            return false;
        }
        *current = criteria;
        true
    }

    pub fn matches(&self, record: &WantedRecord) -> bool {
        self.criteria.borrow().matches(record)
    }

    pub fn predicate(&self) -> RowPredicate {
        let criteria = Rc::clone(&self.criteria);
        Box::new(move |row: &GridRow| criteria.borrow().matches(&row.record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DownloadMarker, GridWidget};
    use crate::memory_grid::MemoryGrid;

    fn record(id: u64, title: &str, kind: MediaKind, category: &str) -> WantedRecord {
        let mut record = WantedRecord::new(id, title, kind);
        record.category = category.to_string();
        record
    }

    #[test]
    fn test_criteria_combine() {
        let criteria = FilterCriteria {
            search: "ring".to_string(),
            media_type: Some(MediaKind::Movie),
            category: Some("Film".to_string()),
        };
        assert!(criteria.matches(&record(1, "The Ring", MediaKind::Movie, "film")));
        assert!(!criteria.matches(&record(2, "The Ring", MediaKind::Series, "film")));
        assert!(!criteria.matches(&record(3, "The Ring", MediaKind::Movie, "anime")));
        assert!(!criteria.matches(&record(4, "Heat", MediaKind::Movie, "film")));
        assert!(FilterCriteria::default().matches(&record(5, "Heat", MediaKind::Series, "")));
    }

    #[test]
    fn test_setters_report_changes() {
        let composer = FilterComposer::new();
        assert!(composer.set_search("abc"));
        assert!(!composer.set_search("abc"));
        assert!(composer.set_category(Some("anime")));
        assert!(composer.set_category(Some("  ")));
        assert_eq!(composer.criteria().category, None);
    }

    #[test]
    fn test_registered_predicate_sees_later_changes() {
        let composer = FilterComposer::new();
        let mut grid = MemoryGrid::new(10);
        grid.rebuild(vec![
            (record(1, "Heat", MediaKind::Movie, "film"), DownloadMarker::Unknown),
            (record(2, "Cowboy Bebop", MediaKind::Series, "anime"), DownloadMarker::Unknown),
        ]);
        grid.register_filter(composer.predicate());
        grid.draw(false);
        assert_eq!(grid.filtered_rows().len(), 2);

        composer.set_media_type(Some(MediaKind::Series));
        // Not observed until the next draw
        assert_eq!(grid.filtered_rows().len(), 2);

        grid.go_to_page(0);
        assert_eq!(grid.filtered_rows().len(), 1);
    }
}
