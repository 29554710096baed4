//! High-level service facade handing repositories and backends to views.

use std::sync::Arc;

use crate::assistant::{AssistantError, AssistantId, AssistantRegistry};
use crate::chat::ChatSession;
use crate::jobs::JobBoard;
use crate::locator::CollectionLocator;
use crate::model::Coordinate;
use crate::ports::{GenerationRequest, MapProvider, PortError, TextGenerator};
use crate::repository::{JobRepository, PointRepository};

/// Public entry point for building views over the shared data sets.
pub struct EcoTrackService {
    points: Arc<PointRepository>,
    jobs: JobRepository,
    assistants: AssistantRegistry,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl EcoTrackService {
    /// Create a service over the given repositories.
    ///
    /// Without a `generator` every assistant request fails with
    /// [`PortError::NotConfigured`].
    #[must_use]
    pub fn new(
        points: Arc<PointRepository>,
        jobs: JobRepository,
        assistants: AssistantRegistry,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            points,
            jobs,
            assistants,
            generator,
        }
    }

    /// Service over the bundled fixtures and built-in assistants.
    #[must_use]
    pub fn with_fixtures(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::new(
            Arc::new(PointRepository::fixture()),
            JobRepository::fixture(),
            AssistantRegistry::builtin(),
            generator,
        )
    }

    /// Collection-point source list.
    #[must_use]
    pub fn points(&self) -> Arc<PointRepository> {
        Arc::clone(&self.points)
    }

    /// New locator view over the collection points.
    #[must_use]
    pub fn locator<P: MapProvider>(&self, provider: P, home: Coordinate) -> CollectionLocator<P> {
        CollectionLocator::new(self.points(), provider, home)
    }

    /// New job board over a copy of the listings.
    #[must_use]
    pub fn job_board(&self) -> JobBoard {
        JobBoard::new(self.jobs.clone())
    }

    /// Registered assistants.
    #[must_use]
    pub fn assistants(&self) -> &AssistantRegistry {
        &self.assistants
    }

    /// Fresh transcript for an assistant.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Unknown`] for unregistered identifiers.
    pub fn open_session(&self, id: &AssistantId) -> Result<ChatSession, AssistantError> {
        self.assistants.get(id).map(|assistant| assistant.session())
    }

    /// Backend used for assistant replies, if configured.
    #[must_use]
    pub fn generator(&self) -> Option<Arc<dyn TextGenerator>> {
        self.generator.clone()
    }

    /// Generate a reply with the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotConfigured`] without a backend, or whatever the
    /// backend reports.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, PortError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| PortError::NotConfigured("Gemini API key is not set".to_owned()))?;
        generator.generate(request).await
    }
}
