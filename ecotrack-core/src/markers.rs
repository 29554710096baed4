//! Keeps one map marker per visible collection point.

use tracing::debug;

use crate::model::{CollectionPoint, PointId};
use crate::ports::{LayerId, MapError, MapSurface, MarkerSpec, MarkerStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rendered overlay for one collection point.
pub struct Marker {
    /// Point the overlay represents.
    pub point: PointId,
    /// Surface handle of the overlay.
    pub layer: LayerId,
    /// Whether the overlay is drawn highlighted.
    pub selected: bool,
}

/// Owns every collection-point marker currently on the surface.
///
/// Each [`MarkerSynchronizer::sync`] tears down all tracked markers and
/// rebuilds them from scratch; there is no per-identifier diffing.
#[derive(Debug, Default)]
pub struct MarkerSynchronizer {
    markers: Vec<Marker>,
}

impl MarkerSynchronizer {
    /// Start with no markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers in the order they were created.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of tracked markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no markers are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Point represented by a surface layer, used to route marker clicks.
    #[must_use]
    pub fn point_for_layer(&self, layer: LayerId) -> Option<&PointId> {
        self.markers
            .iter()
            .find(|marker| marker.layer == layer)
            .map(|marker| &marker.point)
    }

    /// Rebuild the markers for `visible`, highlighting `selected`.
    ///
    /// The view is never moved, so an empty set leaves the map where it was.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the surface refuses a new marker. Markers
    /// created before the failure stay tracked.
    pub fn sync<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        visible: &[CollectionPoint],
        selected: Option<&PointId>,
    ) -> Result<(), MapError> {
        self.clear(surface);

        for point in visible {
            let is_selected = selected == Some(&point.id);
            let style = if is_selected {
                MarkerStyle::Highlighted
            } else {
                MarkerStyle::Normal
            };
            let layer = surface.add_marker(MarkerSpec {
                point: Some(point.id.clone()),
                coordinate: point.coordinate,
                label: point.name.clone(),
                style,
            })?;
            self.markers.push(Marker {
                point: point.id.clone(),
                layer,
                selected: is_selected,
            });
        }

        debug!(markers = self.markers.len(), "rebuilt collection point markers");
        Ok(())
    }

    /// Remove every tracked marker from the surface.
    pub fn clear<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        for marker in self.markers.drain(..) {
            surface.remove_layer(marker.layer);
        }
    }

    /// Forget tracked markers without touching a surface, for when the
    /// surface itself is gone.
    pub fn forget(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording fakes for the map ports.

    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::model::Coordinate;
    use crate::ports::{LayerId, MapError, MapProvider, MapSurface, MarkerSpec};

    #[derive(Debug, Default)]
    pub(crate) struct Recorded {
        pub(crate) views: Vec<(Coordinate, u8)>,
        pub(crate) layers: BTreeMap<LayerId, MarkerSpec>,
        pub(crate) removed: usize,
        pub(crate) released: bool,
        pub(crate) loads: usize,
        pub(crate) reject_views: bool,
        pub(crate) failing_loads: usize,
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeSurface {
        pub(crate) log: Arc<Mutex<Recorded>>,
        next: u64,
    }

    impl FakeSurface {
        pub(crate) fn marker_layers(&self) -> Vec<MarkerSpec> {
            let log = self.log.lock().expect("fake log lock");
            log.layers
                .values()
                .filter(|spec| spec.point.is_some())
                .cloned()
                .collect()
        }
    }

    impl MapSurface for FakeSurface {
        fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<(), MapError> {
            let mut log = self.log.lock().expect("fake log lock");
            if log.released {
                return Err(MapError::Released);
            }
            if log.reject_views {
                return Err(MapError::Load("view rejected".to_owned()));
            }
            log.views.push((center, zoom));
            Ok(())
        }

        fn add_marker(&mut self, spec: MarkerSpec) -> Result<LayerId, MapError> {
            let mut log = self.log.lock().expect("fake log lock");
            if log.released {
                return Err(MapError::Released);
            }
            self.next += 1;
            let layer = LayerId(self.next);
            log.layers.insert(layer, spec);
            Ok(layer)
        }

        fn remove_layer(&mut self, layer: LayerId) {
            let mut log = self.log.lock().expect("fake log lock");
            if log.layers.remove(&layer).is_some() {
                log.removed += 1;
            }
        }

        fn layer_at(&self, coordinate: Coordinate, tolerance: f64) -> Option<LayerId> {
            let log = self.log.lock().expect("fake log lock");
            log.layers
                .iter()
                .filter(|(_, spec)| spec.point.is_some())
                .find(|(_, spec)| {
                    (spec.coordinate.lat - coordinate.lat).abs() <= tolerance
                        && (spec.coordinate.lng - coordinate.lng).abs() <= tolerance
                })
                .map(|(layer, _)| *layer)
        }

        fn release(&mut self) {
            let mut log = self.log.lock().expect("fake log lock");
            log.layers.clear();
            log.released = true;
        }
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeProvider {
        pub(crate) surface: FakeSurface,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl MapProvider for FakeProvider {
        type Surface = FakeSurface;

        async fn load(&self) -> Result<FakeSurface, MapError> {
            let mut log = self.surface.log.lock().expect("fake log lock");
            log.loads += 1;
            if self.fail || log.failing_loads > 0 {
                log.failing_loads = log.failing_loads.saturating_sub(1);
                return Err(MapError::Load("network unreachable".to_owned()));
            }
            drop(log);
            Ok(self.surface.clone())
        }
    }
}
