//! View-model tying the point browser, marker synchronizer, and map adapter
//! together.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, warn};

use crate::browser::{PointBrowser, PointFilter, SelectionError, WasteTypeFilter};
use crate::directions::directions_url;
use crate::map::{MapAdapter, SELECTED_ZOOM};
use crate::markers::MarkerSynchronizer;
use crate::model::{CollectionPoint, Coordinate, PointId};
use crate::ports::{MapError, MapProvider, MapSurface};
use crate::repository::PointRepository;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by the locator.
pub enum LocatorError {
    /// The requested point cannot be selected.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The map failed.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Collection-point list and map kept in sync with each other.
pub struct CollectionLocator<P: MapProvider> {
    browser: PointBrowser,
    markers: MarkerSynchronizer,
    map: MapAdapter<P>,
}

impl<P: MapProvider> CollectionLocator<P> {
    /// Create a locator over `points`, centered on `home` once mounted.
    #[must_use]
    pub fn new(points: Arc<PointRepository>, provider: P, home: Coordinate) -> Self {
        Self {
            browser: PointBrowser::new(points),
            markers: MarkerSynchronizer::new(),
            map: MapAdapter::new(provider, home),
        }
    }

    /// Filter and selection state.
    #[must_use]
    pub fn browser(&self) -> &PointBrowser {
        &self.browser
    }

    /// Markers currently on the map.
    #[must_use]
    pub fn markers(&self) -> &MarkerSynchronizer {
        &self.markers
    }

    /// Map adapter, for rendering.
    #[must_use]
    pub fn map(&self) -> &MapAdapter<P> {
        &self.map
    }

    /// Points passing the active filter.
    #[must_use]
    pub fn visible(&self) -> &[CollectionPoint] {
        self.browser.visible()
    }

    /// Selected point, even when filtered out.
    #[must_use]
    pub fn selected(&self) -> Option<&CollectionPoint> {
        self.browser.selected()
    }

    /// Whether the view runs without a map.
    #[must_use]
    pub fn is_list_only(&self) -> bool {
        !self.map.is_ready()
    }

    /// Initialize the map and draw the markers.
    ///
    /// On failure the locator keeps working as a plain list.
    ///
    /// # Errors
    ///
    /// Returns the [`MapError`] that prevented the map from loading.
    pub async fn mount(&mut self) -> Result<(), MapError> {
        self.map.initialize().await?;
        self.resync()
    }

    /// Release markers and the map surface.
    pub fn unmount(&mut self) {
        if let Some(surface) = self.map.surface_mut() {
            self.markers.clear(surface);
        } else {
            self.markers.forget();
        }
        self.map.teardown();
    }

    /// Replace the filter and redraw.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the markers cannot be redrawn.
    pub fn apply_filter(&mut self, filter: PointFilter) -> Result<(), MapError> {
        self.browser.set_filter(filter);
        self.resync()
    }

    /// Change only the waste-type filter and redraw.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the markers cannot be redrawn.
    pub fn set_waste_type(&mut self, waste_type: WasteTypeFilter) -> Result<(), MapError> {
        self.browser.set_waste_type(waste_type);
        self.resync()
    }

    /// Search by name or address and redraw.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the markers cannot be redrawn.
    pub fn search(&mut self, query: &str) -> Result<(), MapError> {
        self.browser.search(query);
        self.resync()
    }

    /// Clear every filter and redraw. The selection is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the markers cannot be redrawn.
    pub fn reset(&mut self) -> Result<(), MapError> {
        self.browser.reset();
        self.resync()
    }

    /// Select a visible point, focus the map on it, and redraw.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Selection`] when the point is not visible, or
    /// [`LocatorError::Map`] when the map cannot follow.
    pub fn select_point(&mut self, id: &PointId) -> Result<&CollectionPoint, LocatorError> {
        let coordinate = self
            .browser
            .visible()
            .iter()
            .find(|point| &point.id == id)
            .map(|point| point.coordinate)
            .ok_or_else(|| SelectionError::NotVisible(id.clone()))?;
        self.map.recenter(coordinate, SELECTED_ZOOM)?;
        self.browser.select(id)?;
        self.resync()?;
        debug!(point = %id, "selected collection point");
        self.browser
            .selected()
            .ok_or_else(|| LocatorError::Selection(SelectionError::NotVisible(id.clone())))
    }

    /// Route a click on the map to the marker under it.
    ///
    /// Returns the selected point identifier, or `None` when the click hit no
    /// collection-point marker.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionLocator::select_point`].
    pub fn click_at(
        &mut self,
        coordinate: Coordinate,
        tolerance: f64,
    ) -> Result<Option<PointId>, LocatorError> {
        let Some(layer) = self
            .map
            .surface()
            .and_then(|surface| surface.layer_at(coordinate, tolerance))
        else {
            return Ok(None);
        };
        let Some(id) = self.markers.point_for_layer(layer).cloned() else {
            return Ok(None);
        };
        self.select_point(&id)?;
        Ok(Some(id))
    }

    /// Deep link with directions to the selected point.
    #[must_use]
    pub fn directions_for_selected(&self) -> Option<Url> {
        self.selected()
            .and_then(|point| directions_url(point.coordinate))
    }

    fn resync(&mut self) -> Result<(), MapError> {
        let Some(surface) = self.map.surface_mut() else {
            return Ok(());
        };
        let result = self.markers.sync(
            surface,
            self.browser.visible(),
            self.browser.selected_id(),
        );
        if let Err(err) = &result {
            warn!(error = %err, "failed to redraw collection point markers");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::testing::FakeProvider;
    use crate::model::WasteType;
    use crate::ports::MarkerStyle;

    const HOME: Coordinate = Coordinate::new(34.05, -118.24);

    async fn mounted() -> (CollectionLocator<FakeProvider>, FakeProvider) {
        let provider = FakeProvider::default();
        let mut locator = CollectionLocator::new(
            Arc::new(PointRepository::fixture()),
            provider.clone(),
            HOME,
        );
        locator.mount().await.expect("mount succeeds");
        (locator, provider)
    }

    #[tokio::test]
    async fn mount_draws_a_marker_per_point() {
        let (locator, provider) = mounted().await;

        assert_eq!(locator.markers().len(), 6);
        assert_eq!(provider.surface.marker_layers().len(), 6);
        assert!(!locator.is_list_only());
    }

    #[tokio::test]
    async fn selecting_recenters_exactly_once() {
        let (mut locator, provider) = mounted().await;
        let views_before = provider.surface.log.lock().expect("lock").views.len();

        let point = locator
            .select_point(&PointId::new("2"))
            .expect("point 2 is visible")
            .clone();

        let log = provider.surface.log.lock().expect("lock");
        assert_eq!(log.views.len(), views_before + 1);
        assert_eq!(log.views.last(), Some(&(point.coordinate, SELECTED_ZOOM)));
        drop(log);
        assert_eq!(
            locator.selected().map(|selected| &selected.id),
            Some(&PointId::new("2"))
        );
        let highlighted: Vec<_> = locator
            .markers()
            .markers()
            .iter()
            .filter(|marker| marker.selected)
            .collect();
        assert_eq!(highlighted.len(), 1);
    }

    #[tokio::test]
    async fn failed_recenter_leaves_selection_untouched() {
        let (mut locator, provider) = mounted().await;
        locator.select_point(&PointId::new("1")).expect("select 1");
        provider.surface.log.lock().expect("lock").reject_views = true;

        let err = locator
            .select_point(&PointId::new("2"))
            .expect_err("map cannot follow");

        assert!(matches!(err, LocatorError::Map(_)));
        assert_eq!(
            locator.selected().map(|point| &point.id),
            Some(&PointId::new("1"))
        );
        let highlighted: Vec<_> = provider
            .surface
            .marker_layers()
            .into_iter()
            .filter(|spec| spec.style == MarkerStyle::Highlighted)
            .filter_map(|spec| spec.point)
            .collect();
        assert_eq!(highlighted, vec![PointId::new("1")]);
    }

    #[tokio::test]
    async fn filter_rebuilds_markers_to_visible_count() {
        let (mut locator, provider) = mounted().await;

        locator
            .set_waste_type(WasteTypeFilter::Only(WasteType::Electronics))
            .expect("filter");

        assert_eq!(locator.visible().len(), 2);
        assert_eq!(locator.markers().len(), 2);
        assert_eq!(provider.surface.marker_layers().len(), 2);
    }

    #[tokio::test]
    async fn selection_persists_through_reset() {
        let (mut locator, _provider) = mounted().await;
        locator.select_point(&PointId::new("2")).expect("select");
        locator
            .set_waste_type(WasteTypeFilter::Only(WasteType::Organic))
            .expect("filter");

        assert!(
            locator
                .markers()
                .markers()
                .iter()
                .all(|marker| !marker.selected)
        );

        locator.reset().expect("reset");

        assert_eq!(
            locator.selected().map(|point| &point.id),
            Some(&PointId::new("2"))
        );
        assert_eq!(locator.visible().len(), 6);
    }

    #[tokio::test]
    async fn click_on_marker_selects_point() {
        let (mut locator, provider) = mounted().await;
        let target = PointRepository::fixture()
            .get(&PointId::new("5"))
            .expect("point 5")
            .coordinate;

        let clicked = locator.click_at(target, 0.0005).expect("click");

        assert_eq!(clicked, Some(PointId::new("5")));
        let specs = provider.surface.marker_layers();
        let highlighted: Vec<_> = specs
            .iter()
            .filter(|spec| spec.style == MarkerStyle::Highlighted)
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(
            highlighted.first().and_then(|spec| spec.point.clone()),
            Some(PointId::new("5"))
        );
    }

    #[tokio::test]
    async fn click_on_empty_area_selects_nothing() {
        let (mut locator, _provider) = mounted().await;

        let clicked = locator
            .click_at(Coordinate::new(0.0, 0.0), 0.0005)
            .expect("click");

        assert!(clicked.is_none());
        assert!(locator.selected().is_none());
    }

    #[tokio::test]
    async fn failed_mount_keeps_list_working() {
        let provider = FakeProvider {
            fail: true,
            ..FakeProvider::default()
        };
        let mut locator =
            CollectionLocator::new(Arc::new(PointRepository::fixture()), provider, HOME);

        assert!(locator.mount().await.is_err());
        assert!(locator.is_list_only());

        locator.select_point(&PointId::new("1")).expect("list selection still works");
        assert!(locator.markers().is_empty());
        assert!(locator.directions_for_selected().is_some());
    }

    #[tokio::test]
    async fn unmount_removes_everything() {
        let (mut locator, provider) = mounted().await;

        locator.unmount();

        assert!(locator.markers().is_empty());
        let log = provider.surface.log.lock().expect("lock");
        assert!(log.released);
        assert!(log.layers.is_empty());
    }
}
