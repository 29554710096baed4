//! Binds a map provider to a view and owns the resulting surface.

use tracing::{debug, info, warn};

use crate::model::Coordinate;
use crate::ports::{MapError, MapProvider, MapSurface, MarkerSpec, MarkerStyle};

/// Zoom level used when the map first opens.
pub const INITIAL_ZOOM: u8 = 14;
/// Zoom level used when focusing a selected point.
pub const SELECTED_ZOOM: u8 = 15;

enum AdapterState<S> {
    Unloaded,
    Ready(S),
    Failed(String),
    TornDown,
}

/// Lifecycle wrapper around a [`MapProvider`] and its surface.
pub struct MapAdapter<P: MapProvider> {
    provider: P,
    home: Coordinate,
    state: AdapterState<P::Surface>,
}

impl<P: MapProvider> MapAdapter<P> {
    /// Create an adapter that centers on `home` once loaded.
    #[must_use]
    pub fn new(provider: P, home: Coordinate) -> Self {
        Self {
            provider,
            home,
            state: AdapterState::Unloaded,
        }
    }

    /// Load the provider and prepare the surface.
    ///
    /// Calling this while already initialized does nothing. After a failure
    /// the adapter stays degraded until `initialize` is called again.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Load`] when the provider cannot be loaded, or any
    /// error raised while placing the home view and user marker.
    pub async fn initialize(&mut self) -> Result<(), MapError> {
        if self.is_ready() {
            debug!("map already initialized");
            return Ok(());
        }

        let mut surface = match self.provider.load().await {
            Ok(surface) => surface,
            Err(err) => {
                warn!(error = %err, "map provider failed to load, falling back to list view");
                self.state = AdapterState::Failed(err.to_string());
                return Err(err);
            }
        };

        if let Err(err) = place_home(&mut surface, self.home) {
            warn!(error = %err, "map surface rejected the home view, falling back to list view");
            surface.release();
            self.state = AdapterState::Failed(err.to_string());
            return Err(err);
        }

        info!(home = %self.home, "map initialized");
        self.state = AdapterState::Ready(surface);
        Ok(())
    }

    /// Whether a surface is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, AdapterState::Ready(_))
    }

    /// Whether the last load attempt failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.state, AdapterState::Failed(_))
    }

    /// Reason for the last load failure.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            AdapterState::Failed(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Location the map opens on.
    #[must_use]
    pub fn home(&self) -> Coordinate {
        self.home
    }

    /// Loaded surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&P::Surface> {
        match &self.state {
            AdapterState::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    /// Mutable access to the loaded surface, if any.
    pub fn surface_mut(&mut self) -> Option<&mut P::Surface> {
        match &mut self.state {
            AdapterState::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    /// Pan and zoom to `center`. Returns `false` when no surface is loaded.
    ///
    /// # Errors
    ///
    /// Propagates [`MapError`] from the surface.
    pub fn recenter(&mut self, center: Coordinate, zoom: u8) -> Result<bool, MapError> {
        let Some(surface) = self.surface_mut() else {
            return Ok(false);
        };
        surface.set_view(center, zoom)?;
        debug!(%center, zoom, "map recentered");
        Ok(true)
    }

    /// Release the surface and everything drawn on it.
    pub fn teardown(&mut self) {
        if let AdapterState::Ready(surface) = &mut self.state {
            surface.release();
            info!("map torn down");
        }
        self.state = AdapterState::TornDown;
    }
}

fn place_home<S: MapSurface>(surface: &mut S, home: Coordinate) -> Result<(), MapError> {
    surface.set_view(home, INITIAL_ZOOM)?;
    surface.add_marker(MarkerSpec {
        point: None,
        coordinate: home,
        label: "You are here".to_owned(),
        style: MarkerStyle::UserLocation,
    })?;
    Ok(())
}

impl<P: MapProvider> Drop for MapAdapter<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::testing::FakeProvider;

    const HOME: Coordinate = Coordinate::new(34.05, -118.24);

    #[tokio::test]
    async fn initialize_loads_once_and_places_user_marker() {
        let provider = FakeProvider::default();
        let log = provider.surface.log.clone();
        let mut adapter = MapAdapter::new(provider, HOME);

        adapter.initialize().await.expect("first init");
        adapter.initialize().await.expect("second init is a no-op");

        let recorded = log.lock().expect("lock");
        assert_eq!(recorded.loads, 1);
        assert_eq!(recorded.views, vec![(HOME, INITIAL_ZOOM)]);
        assert_eq!(recorded.layers.len(), 1);
        assert!(
            recorded
                .layers
                .values()
                .all(|spec| spec.style == MarkerStyle::UserLocation)
        );
    }

    #[tokio::test]
    async fn failed_load_degrades_without_surface() {
        let provider = FakeProvider {
            fail: true,
            ..FakeProvider::default()
        };
        let mut adapter = MapAdapter::new(provider, HOME);

        let err = adapter.initialize().await.expect_err("load fails");

        assert!(matches!(err, MapError::Load(_)));
        assert!(adapter.is_degraded());
        assert!(adapter.surface().is_none());
        assert_eq!(adapter.recenter(HOME, SELECTED_ZOOM).ok(), Some(false));
    }

    #[tokio::test]
    async fn rejected_home_view_releases_surface_and_degrades() {
        let provider = FakeProvider::default();
        let log = provider.surface.log.clone();
        log.lock().expect("lock").reject_views = true;
        let mut adapter = MapAdapter::new(provider, HOME);

        let err = adapter.initialize().await.expect_err("view is rejected");

        assert!(matches!(err, MapError::Load(_)));
        assert!(adapter.is_degraded());
        assert!(adapter.failure().is_some());
        assert!(adapter.surface().is_none());
        let recorded = log.lock().expect("lock");
        assert!(recorded.released);
        assert!(recorded.layers.is_empty());
    }

    #[tokio::test]
    async fn initialize_retries_after_failed_load() {
        let provider = FakeProvider::default();
        let log = provider.surface.log.clone();
        log.lock().expect("lock").failing_loads = 1;
        let mut adapter = MapAdapter::new(provider, HOME);

        adapter.initialize().await.expect_err("first load fails");
        assert!(adapter.is_degraded());

        adapter.initialize().await.expect("second load succeeds");

        assert!(adapter.is_ready());
        assert!(!adapter.is_degraded());
        assert!(adapter.failure().is_none());
        let recorded = log.lock().expect("lock");
        assert_eq!(recorded.loads, 2);
        assert_eq!(recorded.views, vec![(HOME, INITIAL_ZOOM)]);
    }

    #[tokio::test]
    async fn teardown_releases_surface() {
        let provider = FakeProvider::default();
        let log = provider.surface.log.clone();
        let mut adapter = MapAdapter::new(provider, HOME);
        adapter.initialize().await.expect("init");

        adapter.teardown();

        assert!(!adapter.is_ready());
        let recorded = log.lock().expect("lock");
        assert!(recorded.released);
        assert!(recorded.layers.is_empty());
    }
}
