use std::cell::Cell;
use std::fmt::Display;
use std::sync::Arc;

use chrono::Local;
use ratatui::layout::Rect;
use reqwest::Url;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use ecotrack_core::{
    assistant::AssistantId,
    browser::{PointFilter, StatusFilter, WasteTypeFilter},
    chat::{ChatError, ChatSession},
    directions::share_text,
    jobs::{JobBoard, JobQuery},
    locator::CollectionLocator,
    model::{CollectionPoint, JobListing, PointStatus, WasteType},
    ports::{GenerationRequest, PortError},
    service::EcoTrackService,
};
use ecotrack_provider_osm::{OsmTileProvider, TileSurface, Viewport};

pub(crate) type Locator = CollectionLocator<OsmTileProvider>;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;
/// Click tolerance in cells around a marker.
const CLICK_RADIUS_CELLS: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Points,
    Jobs,
    Assistants,
}

impl Screen {
    pub(crate) const ALL: [Screen; 3] = [Screen::Points, Screen::Jobs, Screen::Assistants];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Screen::Points => "Collection points",
            Screen::Jobs => "Green jobs",
            Screen::Assistants => "Assistants",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Screen::Points => Screen::Jobs,
            Screen::Jobs => Screen::Assistants,
            Screen::Assistants => Screen::Points,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            Screen::Points => Screen::Assistants,
            Screen::Jobs => Screen::Points,
            Screen::Assistants => Screen::Jobs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Editing,
}

/// Reply from a spawned generation request.
pub(crate) struct ChatReply {
    pub assistant: AssistantId,
    pub outcome: Result<String, PortError>,
}

pub(crate) struct Conversation {
    pub id: AssistantId,
    pub title: String,
    pub description: String,
    pub session: ChatSession,
}

pub(crate) struct App {
    pub service: Arc<EcoTrackService>,

    pub screen: Screen,
    pub mode: InputMode,

    pub locator: Locator,
    pub waste_types: Vec<WasteType>,
    pub point_index: usize,
    pub point_search: String,
    pub map_area: Cell<Rect>,

    pub jobs: JobBoard,
    pub job_index: usize,
    pub job_search: String,

    pub conversations: Vec<Conversation>,
    pub conversation_index: usize,
    pub chat_input: String,
    pub chat_tx: UnboundedSender<ChatReply>,

    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<EcoTrackService>,
        locator: Locator,
        chat_tx: UnboundedSender<ChatReply>,
    ) -> Self {
        let conversations = service
            .assistants()
            .iter()
            .map(|assistant| Conversation {
                id: assistant.id.clone(),
                title: assistant.title.clone(),
                description: assistant.description.clone(),
                session: assistant.session(),
            })
            .collect();
        let waste_types = service.points().waste_types();
        let jobs = service.job_board();

        Self {
            service,
            screen: Screen::Points,
            mode: InputMode::Normal,
            locator,
            waste_types,
            point_index: 0,
            point_search: String::new(),
            map_area: Cell::new(Rect::default()),
            jobs,
            job_index: 0,
            job_search: String::new(),
            conversations,
            conversation_index: 0,
            chat_input: String::new(),
            chat_tx,
            status_message: None,
            error_message: None,
        }
    }

    pub(crate) fn clear_messages(&mut self) {
        self.error_message = None;
        self.status_message = None;
    }

    // Collection points

    pub(crate) fn point_under_cursor(&self) -> Option<&CollectionPoint> {
        self.locator.visible().get(self.point_index)
    }

    pub(crate) fn move_point_cursor(&mut self, down: bool) {
        self.point_index = step(self.point_index, self.locator.visible().len(), down);
    }

    pub(crate) fn select_point_under_cursor(&mut self) {
        let Some(id) = self.point_under_cursor().map(|point| point.id.clone()) else {
            return;
        };
        if let Err(err) = self.locator.select_point(&id) {
            self.error_message = Some(format!("Cannot select point: {err}"));
        }
    }

    pub(crate) fn cycle_waste_type(&mut self) {
        let current = match &self.locator.browser().filter().waste_type {
            WasteTypeFilter::All => None,
            WasteTypeFilter::Only(waste_type) => Some(waste_type),
        };
        let next =
            cycle(&self.waste_types, current).map_or(WasteTypeFilter::All, WasteTypeFilter::Only);
        let result = self.locator.set_waste_type(next);
        self.after_point_filter(result);
    }

    pub(crate) fn cycle_status(&mut self) {
        let current = match self.locator.browser().filter().status {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status),
        };
        let status = cycle(&PointStatus::ALL, current.as_ref())
            .map_or(StatusFilter::All, StatusFilter::Only);
        let filter = PointFilter {
            status,
            ..self.locator.browser().filter().clone()
        };
        let result = self.locator.apply_filter(filter);
        self.after_point_filter(result);
    }

    pub(crate) fn update_point_search(&mut self) {
        let result = self.locator.search(&self.point_search);
        self.after_point_filter(result);
    }

    pub(crate) fn reset_points(&mut self) {
        self.point_search.clear();
        let result = self.locator.reset();
        self.after_point_filter(result);
    }

    fn after_point_filter<E: Display>(&mut self, result: Result<(), E>) {
        self.point_index = clamp_index(self.point_index, self.locator.visible().len());
        if let Err(err) = result {
            warn!(error = %err, "markers could not be redrawn");
            self.error_message = Some(format!("Map could not be updated: {err}"));
        }
    }

    /// Select the marker under a mouse click inside the map pane.
    pub(crate) fn click_map(&mut self, column: u16, row: u16) {
        let inner = inner_area(self.map_area.get());
        let inside = (inner.x..inner.x.saturating_add(inner.width)).contains(&column)
            && (inner.y..inner.y.saturating_add(inner.height)).contains(&row);
        if !inside {
            return;
        }
        let Some(surface) = self.locator.map().surface() else {
            return;
        };

        let viewport = viewport_for(surface, inner);
        let width = f64::from(inner.width);
        let height = f64::from(inner.height);
        let coordinate = viewport.unproject(
            f64::from(column - inner.x) + 0.5,
            f64::from(row - inner.y) + 0.5,
            width,
            height,
        );
        let tolerance = (viewport.east - viewport.west) / width.max(1.0) * CLICK_RADIUS_CELLS;

        match self.locator.click_at(coordinate, tolerance) {
            Ok(Some(id)) => {
                let visible = self.locator.visible();
                if let Some(index) = visible.iter().position(|point| point.id == id) {
                    self.point_index = index;
                }
            }
            Ok(None) => debug!(%coordinate, "map click hit no marker"),
            Err(err) => self.error_message = Some(format!("Cannot select point: {err}")),
        }
    }

    pub(crate) fn directions(&self) -> Option<Url> {
        self.locator.directions_for_selected()
    }

    /// Put a shareable description of the selected point in the status bar.
    pub(crate) fn share_selected(&mut self) {
        match self.locator.selected().map(share_text) {
            Some(text) => self.status_message = Some(text),
            None => self.error_message = Some("Select a collection point first".to_owned()),
        }
    }

    // Jobs

    pub(crate) fn visible_jobs(&self) -> Vec<&JobListing> {
        self.jobs.visible()
    }

    pub(crate) fn job_under_cursor(&self) -> Option<&JobListing> {
        self.jobs.visible().get(self.job_index).copied()
    }

    pub(crate) fn move_job_cursor(&mut self, down: bool) {
        self.job_index = step(self.job_index, self.jobs.visible().len(), down);
    }

    pub(crate) fn cycle_employment_type(&mut self) {
        let options: Vec<String> = self
            .jobs
            .employment_types()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let employment_type = cycle(&options, self.jobs.query().employment_type.as_ref());
        self.apply_job_query(JobQuery {
            employment_type,
            ..self.jobs.query().clone()
        });
    }

    pub(crate) fn cycle_location(&mut self) {
        let options: Vec<String> = self.jobs.locations().into_iter().map(str::to_owned).collect();
        let location = cycle(&options, self.jobs.query().location.as_ref());
        self.apply_job_query(JobQuery {
            location,
            ..self.jobs.query().clone()
        });
    }

    pub(crate) fn update_job_search(&mut self) {
        self.apply_job_query(JobQuery {
            search: self.job_search.clone(),
            ..self.jobs.query().clone()
        });
    }

    pub(crate) fn reset_jobs(&mut self) {
        self.job_search.clear();
        self.jobs.reset();
        self.job_index = clamp_index(self.job_index, self.jobs.visible().len());
    }

    fn apply_job_query(&mut self, query: JobQuery) {
        self.jobs.apply_query(query);
        self.job_index = clamp_index(self.job_index, self.jobs.visible().len());
    }

    pub(crate) fn apply_to_job_under_cursor(&mut self) {
        let Some(id) = self.job_under_cursor().map(|job| job.id.clone()) else {
            return;
        };
        let today = Local::now().date_naive();
        match self.jobs.apply(&id, today) {
            Ok(application) => {
                self.status_message = Some(format!(
                    "Applied to {} at {}",
                    application.job_title, application.company
                ));
            }
            Err(err) => self.error_message = Some(err.to_string()),
        }
    }

    // Assistants

    pub(crate) fn conversation(&self) -> Option<&Conversation> {
        self.conversations.get(self.conversation_index)
    }

    pub(crate) fn switch_conversation(&mut self, down: bool) {
        self.conversation_index = step(self.conversation_index, self.conversations.len(), down);
    }

    /// Start a request for the current assistant and clear the input line.
    pub(crate) fn begin_chat(&mut self) -> Option<(AssistantId, GenerationRequest)> {
        let conversation = self.conversations.get_mut(self.conversation_index)?;
        match conversation.session.begin(&self.chat_input) {
            Ok(request) => {
                self.chat_input.clear();
                Some((conversation.id.clone(), request))
            }
            Err(ChatError::EmptyPrompt) => None,
            Err(err) => {
                self.error_message = Some(err.to_string());
                None
            }
        }
    }

    pub(crate) fn finish_chat(&mut self, reply: ChatReply) {
        let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|conversation| conversation.id == reply.assistant)
        else {
            warn!(assistant = %reply.assistant, "reply for unknown assistant dropped");
            return;
        };
        if let Err(err) = conversation.session.finish(reply.outcome) {
            warn!(assistant = %reply.assistant, error = %err, "unexpected chat reply");
        }
    }
}

/// Bounds shown in a bordered map pane whose inner area is `inner`.
pub(crate) fn viewport_for(surface: &TileSurface, inner: Rect) -> Viewport {
    surface.viewport(
        f64::from(inner.width),
        f64::from(inner.height) * CELL_ASPECT,
    )
}

pub(crate) fn inner_area(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Next option after `current`, wrapping back to `None` ("all") after the last.
fn cycle<T: Clone + PartialEq>(options: &[T], current: Option<&T>) -> Option<T> {
    let next = match current {
        None => 0,
        Some(value) => match options.iter().position(|option| option == value) {
            Some(index) => index + 1,
            None => 0,
        },
    };
    options.get(next).cloned()
}

fn step(index: usize, len: usize, down: bool) -> usize {
    if down {
        if index + 1 < len { index + 1 } else { index }
    } else {
        index.saturating_sub(1)
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_walks_options_then_returns_to_all() {
        let options = ["a", "b"];
        assert_eq!(cycle(&options, None), Some("a"));
        assert_eq!(cycle(&options, Some(&"a")), Some("b"));
        assert_eq!(cycle(&options, Some(&"b")), None);
        assert_eq!(cycle(&options, Some(&"z")), Some("a"));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(1, 3, true), 2);
        assert_eq!(clamp_index(5, 2), 1);
        assert_eq!(clamp_index(5, 0), 0);
    }

    #[test]
    fn inner_area_strips_borders() {
        let inner = inner_area(Rect::new(10, 5, 20, 10));
        assert_eq!(inner, Rect::new(11, 6, 18, 8));
    }
}
