//! Filter predicate, visible set, and selection over the collection points.

use std::sync::Arc;

use tracing::debug;

use crate::model::{CollectionPoint, PointId, PointStatus, WasteType};
use crate::repository::PointRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Waste-type part of the filter.
pub enum WasteTypeFilter {
    /// Every point passes.
    #[default]
    All,
    /// Only points accepting this category pass.
    Only(WasteType),
}

impl WasteTypeFilter {
    /// Label shown in the filter selector.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            WasteTypeFilter::All => "All Types",
            WasteTypeFilter::Only(waste_type) => waste_type.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Status part of the filter.
pub enum StatusFilter {
    /// Every status passes.
    #[default]
    All,
    /// Only points in this status pass.
    Only(PointStatus),
}

impl StatusFilter {
    /// Label shown in the filter selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Statuses",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Combined predicate deciding which points are visible.
pub struct PointFilter {
    /// Required waste category.
    pub waste_type: WasteTypeFilter,
    /// Required status.
    pub status: StatusFilter,
    /// Case-insensitive substring of name or address; empty matches all.
    pub search: String,
}

impl PointFilter {
    /// Filter on waste category only.
    #[must_use]
    pub fn by_waste_type(waste_type: WasteTypeFilter) -> Self {
        Self {
            waste_type,
            ..Self::default()
        }
    }

    /// True when nothing is being filtered.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.waste_type == WasteTypeFilter::All
            && self.status == StatusFilter::All
            && self.search.trim().is_empty()
    }

    /// Whether `point` passes every predicate.
    #[must_use]
    pub fn matches(&self, point: &CollectionPoint) -> bool {
        let type_ok = match &self.waste_type {
            WasteTypeFilter::All => true,
            WasteTypeFilter::Only(waste_type) => point.accepts(waste_type),
        };
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => point.status == status,
        };
        type_ok && status_ok && matches_search(point, &self.search)
    }
}

fn matches_search(point: &CollectionPoint, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || point.name.to_lowercase().contains(&needle)
        || point.address.to_lowercase().contains(&needle)
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Reasons a selection request is refused.
pub enum SelectionError {
    /// The point exists but is not part of the visible set.
    #[error("Point {0} is not visible")]
    NotVisible(PointId),
}

/// Holds the active filter, the derived visible set, and the selection.
#[derive(Debug, Clone)]
pub struct PointBrowser {
    source: Arc<PointRepository>,
    filter: PointFilter,
    visible: Vec<CollectionPoint>,
    selected: Option<PointId>,
}

impl PointBrowser {
    /// Start unfiltered with nothing selected.
    #[must_use]
    pub fn new(source: Arc<PointRepository>) -> Self {
        let visible = source.all().to_vec();
        Self {
            source,
            filter: PointFilter::default(),
            visible,
            selected: None,
        }
    }

    /// Active filter.
    #[must_use]
    pub fn filter(&self) -> &PointFilter {
        &self.filter
    }

    /// Points passing the active filter, in source order.
    #[must_use]
    pub fn visible(&self) -> &[CollectionPoint] {
        &self.visible
    }

    /// Identifier of the selected point, if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<&PointId> {
        self.selected.as_ref()
    }

    /// The selected point, looked up in the source list so it resolves even
    /// when the active filter hides it.
    #[must_use]
    pub fn selected(&self) -> Option<&CollectionPoint> {
        self.selected.as_ref().and_then(|id| self.source.get(id))
    }

    /// Whether the selection is part of the visible set.
    #[must_use]
    pub fn is_selected_visible(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|id| self.visible.iter().any(|point| &point.id == id))
    }

    /// Replace the whole filter and recompute the visible set.
    pub fn set_filter(&mut self, filter: PointFilter) {
        self.filter = filter;
        self.recompute();
    }

    /// Change only the waste-type predicate.
    pub fn set_waste_type(&mut self, waste_type: WasteTypeFilter) {
        self.filter.waste_type = waste_type;
        self.recompute();
    }

    /// Name/address search over the full source list. Other predicates are
    /// cleared, matching the search box which ignores the selectors.
    pub fn search(&mut self, query: &str) {
        self.filter = PointFilter {
            search: query.trim().to_owned(),
            ..PointFilter::default()
        };
        self.recompute();
    }

    /// Drop every predicate. The selection is left untouched.
    pub fn reset(&mut self) {
        self.filter = PointFilter::default();
        self.recompute();
    }

    /// Select a point from the visible set.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotVisible`] when `id` is not currently visible.
    pub fn select(&mut self, id: &PointId) -> Result<&CollectionPoint, SelectionError> {
        let point = self
            .visible
            .iter()
            .find(|candidate| &candidate.id == id)
            .ok_or_else(|| SelectionError::NotVisible(id.clone()))?;
        self.selected = Some(point.id.clone());
        Ok(point)
    }

    /// Forget the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn recompute(&mut self) {
        self.visible = self
            .source
            .all()
            .iter()
            .filter(|point| self.filter.matches(point))
            .cloned()
            .collect();
        debug!(
            visible = self.visible.len(),
            selection_visible = self.is_selected_visible(),
            "recomputed visible collection points"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser() -> PointBrowser {
        PointBrowser::new(Arc::new(PointRepository::fixture()))
    }

    fn ids(points: &[CollectionPoint]) -> Vec<&str> {
        points.iter().map(|point| point.id.0.as_str()).collect()
    }

    #[test]
    fn starts_with_full_list_and_no_selection() {
        let browser = browser();
        assert_eq!(browser.visible().len(), 6);
        assert!(browser.selected().is_none());
    }

    #[test]
    fn waste_type_filter_is_exact_subset_for_every_type() {
        let repo = PointRepository::fixture();
        let mut browser = browser();

        for waste_type in WasteType::BUILT_IN {
            browser.set_waste_type(WasteTypeFilter::Only(waste_type.clone()));
            let expected: Vec<&str> = repo
                .all()
                .iter()
                .filter(|point| point.waste_types.contains(&waste_type))
                .map(|point| point.id.0.as_str())
                .collect();
            assert_eq!(ids(browser.visible()), expected, "filter {waste_type}");
        }

        browser.set_waste_type(WasteTypeFilter::All);
        assert_eq!(browser.visible().len(), repo.all().len());
    }

    #[test]
    fn organic_filter_over_three_points_yields_one() {
        let three = PointRepository::fixture().all().iter().take(3).cloned().collect();
        let mut browser = PointBrowser::new(Arc::new(PointRepository::new(three)));

        browser.set_waste_type(WasteTypeFilter::Only(WasteType::Organic));

        assert_eq!(ids(browser.visible()), vec!["3"]);
    }

    #[test]
    fn combined_filter_applies_status_and_search() {
        let mut browser = browser();
        browser.set_filter(PointFilter {
            waste_type: WasteTypeFilter::Only(WasteType::Plastic),
            status: StatusFilter::Only(PointStatus::Operational),
            search: "district".to_owned(),
        });
        assert_eq!(ids(browser.visible()), vec!["1", "5"]);
    }

    #[test]
    fn search_matches_name_or_address_ignoring_case() {
        let mut browser = browser();
        browser.search("RECYCLE AVENUE");
        assert_eq!(ids(browser.visible()), vec!["2"]);

        browser.search("recycling");
        assert_eq!(ids(browser.visible()), vec!["1", "6"]);
    }

    #[test]
    fn selecting_hidden_point_is_refused() {
        let mut browser = browser();
        browser.set_waste_type(WasteTypeFilter::Only(WasteType::Organic));

        let err = browser
            .select(&PointId::new("1"))
            .expect_err("point 1 is filtered out");

        assert_eq!(err, SelectionError::NotVisible(PointId::new("1")));
        assert!(browser.selected().is_none());
    }

    #[test]
    fn selection_survives_reset() {
        let mut browser = browser();
        browser.select(&PointId::new("2")).expect("point 2 is visible");

        browser.reset();

        assert_eq!(browser.selected_id(), Some(&PointId::new("2")));
        assert_eq!(browser.visible().len(), 6);
    }

    #[test]
    fn selection_survives_being_filtered_out() {
        let mut browser = browser();
        browser.select(&PointId::new("2")).expect("point 2 is visible");

        browser.set_waste_type(WasteTypeFilter::Only(WasteType::Organic));

        assert_eq!(
            browser.selected().map(|point| point.name.as_str()),
            Some("Community Collection Center")
        );
        assert!(!browser.is_selected_visible());
    }
}
