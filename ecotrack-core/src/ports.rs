//! Traits describing the external map and text-generation backends.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, PointId};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a remote backend.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Backend answered with an error status.
    #[error("API error: {0}")]
    Api(String),
    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[source] ReqwestError),
    /// Backend is not configured.
    #[error("Not configured: {0}")]
    NotConfigured(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors raised by the map provider and its surface.
pub enum MapError {
    /// Provider assets could not be loaded.
    #[error("Map failed to load: {0}")]
    Load(String),
    /// Surface was already released.
    #[error("Map surface was released")]
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle for an overlay added to a map surface.
pub struct LayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Visual variant of an overlay.
pub enum MarkerStyle {
    /// Regular collection point.
    Normal,
    /// Currently selected collection point.
    Highlighted,
    /// The user's own position.
    UserLocation,
}

#[derive(Debug, Clone, PartialEq)]
/// Everything a surface needs to draw one marker.
pub struct MarkerSpec {
    /// Point the marker represents, `None` for the user-location marker.
    pub point: Option<PointId>,
    /// Marker position.
    pub coordinate: Coordinate,
    /// Short label drawn next to the marker.
    pub label: String,
    /// Visual variant.
    pub style: MarkerStyle,
}

/// Rendered map instance produced by a [`MapProvider`].
pub trait MapSurface: Send {
    /// Move the view to `center` at the given zoom level.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Released`] after [`MapSurface::release`].
    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<(), MapError>;

    /// Add a marker overlay and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Released`] after [`MapSurface::release`].
    fn add_marker(&mut self, spec: MarkerSpec) -> Result<LayerId, MapError>;

    /// Remove an overlay. Unknown handles are ignored.
    fn remove_layer(&mut self, layer: LayerId);

    /// Topmost marker layer within `tolerance` degrees of `coordinate`.
    fn layer_at(&self, coordinate: Coordinate, tolerance: f64) -> Option<LayerId>;

    /// Release the rendering surface and every overlay on it.
    fn release(&mut self);
}

#[async_trait]
/// Loader for an external map rendering library.
pub trait MapProvider: Send + Sync {
    /// Surface type produced once the provider has loaded.
    type Surface: MapSurface;

    /// Load the provider's assets and construct a surface.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Load`] when the assets cannot be fetched.
    async fn load(&self) -> Result<Self::Surface, MapError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Sampling parameters sent with every generation request.
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-K sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Upper bound on reply length.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A single prompt ready to send to a [`TextGenerator`].
pub struct GenerationRequest {
    /// Full prompt text including the assistant's topic focus.
    pub prompt: String,
    /// Sampling parameters.
    pub config: GenerationConfig,
}

#[async_trait]
/// Backend producing assistant replies.
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for the request.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend call fails.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PortError>;
}
