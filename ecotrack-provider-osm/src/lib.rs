//! Map provider backed by a slippy-map tile server such as OpenStreetMap.
//!
//! Loading probes the server's root tile; the resulting [`TileSurface`] keeps
//! the view and overlays in memory for a front end to draw.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use ecotrack_core::model::Coordinate;
use ecotrack_core::ports::{
    LayerId, MapError, MapProvider, MapSurface, MarkerSpec, MarkerStyle, PortError,
};

/// Attribution required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;
const MAX_ZOOM: u8 = 19;
const TILES_ACROSS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Slippy-map tile address.
pub struct TileCoord {
    /// Zoom level.
    pub zoom: u8,
    /// Column, counted eastwards from the antimeridian.
    pub x: u32,
    /// Row, counted southwards from the northern Mercator limit.
    pub y: u32,
}

impl TileCoord {
    /// Tile containing `coordinate` at `zoom`.
    #[must_use]
    pub fn containing(coordinate: Coordinate, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let tiles = f64::from(1_u32 << zoom);
        let lat = coordinate
            .lat
            .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
            .to_radians();
        let lng = wrap_lng(coordinate.lng);

        let x = (lng + 180.0) / 360.0 * tiles;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * tiles;

        Self {
            zoom,
            x: to_index(x, tiles),
            y: to_index(y, tiles),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to the tile grid first"
)]
fn to_index(value: f64, tiles: f64) -> u32 {
    value.floor().clamp(0.0, tiles - 1.0) as u32
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Geographic rectangle currently in view.
pub struct Viewport {
    /// Western longitude bound.
    pub west: f64,
    /// Eastern longitude bound.
    pub east: f64,
    /// Southern latitude bound.
    pub south: f64,
    /// Northern latitude bound.
    pub north: f64,
}

impl Viewport {
    /// Whether `coordinate` lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.west..=self.east).contains(&coordinate.lng)
            && (self.south..=self.north).contains(&coordinate.lat)
    }

    /// Map a position inside a `width` x `height` canvas (origin top left)
    /// back to a coordinate.
    #[must_use]
    pub fn unproject(&self, column: f64, row: f64, width: f64, height: f64) -> Coordinate {
        let lng = self.west + (self.east - self.west) * (column / width.max(1.0));
        let lat = self.north - (self.north - self.south) * (row / height.max(1.0));
        Coordinate::new(lat, lng)
    }
}

/// In-memory map view produced by [`OsmTileProvider`].
#[derive(Debug, Clone)]
pub struct TileSurface {
    tile_base: Url,
    center: Coordinate,
    zoom: u8,
    layers: BTreeMap<LayerId, MarkerSpec>,
    next_layer: u64,
    released: bool,
}

impl TileSurface {
    fn new(tile_base: Url) -> Self {
        Self {
            tile_base,
            center: Coordinate::new(0.0, 0.0),
            zoom: 0,
            layers: BTreeMap::new(),
            next_layer: 0,
            released: false,
        }
    }

    /// Current view center.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Current zoom level.
    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Whether the surface was released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Overlays in creation order.
    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &MarkerSpec)> {
        self.layers.iter()
    }

    /// Tile under the view center.
    #[must_use]
    pub fn center_tile(&self) -> TileCoord {
        TileCoord::containing(self.center, self.zoom)
    }

    /// Download URL for a tile.
    #[must_use]
    pub fn tile_url(&self, tile: TileCoord) -> Option<Url> {
        self.tile_base
            .join(&format!("{}/{}/{}.png", tile.zoom, tile.x, tile.y))
            .ok()
    }

    /// Rectangle shown on a canvas of the given proportions.
    ///
    /// The view spans a fixed number of tiles horizontally; the vertical span
    /// follows the canvas aspect and shrinks with latitude like Mercator does.
    #[must_use]
    pub fn viewport(&self, width: f64, height: f64) -> Viewport {
        let tile_degrees = 360.0 / f64::from(1_u32 << self.zoom.min(MAX_ZOOM));
        let lng_span = (tile_degrees * TILES_ACROSS).min(360.0);
        let aspect = if width > 0.0 { height / width } else { 1.0 };
        let lat_scale = self.center.lat.to_radians().cos().abs();
        let lat_span = (lng_span * aspect * lat_scale).min(2.0 * MERCATOR_MAX_LAT_DEG);

        Viewport {
            west: self.center.lng - lng_span / 2.0,
            east: self.center.lng + lng_span / 2.0,
            south: self.center.lat - lat_span / 2.0,
            north: self.center.lat + lat_span / 2.0,
        }
    }
}

impl MapSurface for TileSurface {
    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<(), MapError> {
        if self.released {
            return Err(MapError::Released);
        }
        self.center = center;
        self.zoom = zoom.min(MAX_ZOOM);
        debug!(%center, zoom = self.zoom, "tile view moved");
        Ok(())
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> Result<LayerId, MapError> {
        if self.released {
            return Err(MapError::Released);
        }
        self.next_layer += 1;
        let layer = LayerId(self.next_layer);
        self.layers.insert(layer, spec);
        Ok(layer)
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    fn layer_at(&self, coordinate: Coordinate, tolerance: f64) -> Option<LayerId> {
        self.layers
            .iter()
            .filter(|(_, spec)| spec.style != MarkerStyle::UserLocation)
            .map(|(layer, spec)| {
                let d_lat = spec.coordinate.lat - coordinate.lat;
                let d_lng = spec.coordinate.lng - coordinate.lng;
                (*layer, d_lat.hypot(d_lng))
            })
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|left, right| {
                left.1
                    .total_cmp(&right.1)
                    .then_with(|| right.0.cmp(&left.0))
            })
            .map(|(layer, _)| layer)
    }

    fn release(&mut self) {
        self.layers.clear();
        self.released = true;
        debug!("tile surface released");
    }
}

/// Map provider that checks a tile server before handing out a surface.
pub struct OsmTileProvider {
    client: Client,
    tile_base: Url,
}

impl OsmTileProvider {
    /// Create a provider for the tile server at `tile_base`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Internal`] when `tile_base` is not a valid URL.
    pub fn new(client: Client, tile_base: &str) -> Result<Self, PortError> {
        let normalised = format!("{}/", tile_base.trim_end_matches('/'));
        let tile_base = Url::parse(&normalised)
            .map_err(|err| PortError::Internal(format!("invalid tile URL '{tile_base}': {err}")))?;
        Ok(Self { client, tile_base })
    }

    /// Origin tiles are fetched from.
    #[must_use]
    pub fn tile_base(&self) -> &Url {
        &self.tile_base
    }
}

#[async_trait]
impl MapProvider for OsmTileProvider {
    type Surface = TileSurface;

    async fn load(&self) -> Result<TileSurface, MapError> {
        let surface = TileSurface::new(self.tile_base.clone());
        let probe = surface
            .tile_url(TileCoord {
                zoom: 0,
                x: 0,
                y: 0,
            })
            .ok_or_else(|| MapError::Load("cannot build tile URL".to_owned()))?;

        self.client
            .get(probe.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MapError::Load(err.to_string()))?;

        info!(%probe, "tile server reachable");
        Ok(surface)
    }
}
