//! Core types and view-models for the `EcoTrack` recycling companion.

/// Topic-specific chat assistants and their registry.
pub mod assistant;
/// Filter predicate, visible set, and selection.
pub mod browser;
/// Assistant transcripts.
pub mod chat;
/// Environment-driven configuration.
pub mod config;
/// Directions and share links.
pub mod directions;
/// Job listings and applications.
pub mod jobs;
/// Collection-point list and map view-model.
pub mod locator;
/// Map provider lifecycle.
pub mod map;
/// Marker synchronization.
pub mod markers;
/// Domain models and identifiers.
pub mod model;
/// Traits describing external backends.
pub mod ports;
/// Fixture-backed repositories.
pub mod repository;
/// High-level service facade used by clients.
pub mod service;

pub use model::*;
pub use ports::*;
pub use service::*;
