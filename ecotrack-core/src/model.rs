//! Domain data structures for collection points, jobs, and chat transcripts.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position in decimal degrees.
pub struct Coordinate {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lng: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a collection point.
pub struct PointId(pub String);

impl PointId {
    /// Build an identifier from anything string-like.
    #[must_use]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste categories a collection point can accept.
pub enum WasteType {
    /// Plastic containers and packaging.
    Plastic,
    /// Paper.
    Paper,
    /// Glass bottles and jars.
    Glass,
    /// Metal scrap and cans.
    Metal,
    /// Electronic devices.
    Electronics,
    /// Household batteries.
    Batteries,
    /// Organic and garden waste.
    Organic,
    /// Hazardous household waste.
    Hazardous,
    /// Cardboard.
    Cardboard,
    /// Any other label.
    Other(String),
}

impl WasteType {
    /// Every built-in category, in the order filters offer them.
    pub const BUILT_IN: [WasteType; 9] = [
        WasteType::Plastic,
        WasteType::Paper,
        WasteType::Glass,
        WasteType::Metal,
        WasteType::Electronics,
        WasteType::Batteries,
        WasteType::Organic,
        WasteType::Hazardous,
        WasteType::Cardboard,
    ];

    /// Human-readable label, identical to the fixture spelling.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            WasteType::Plastic => "Plastic",
            WasteType::Paper => "Paper",
            WasteType::Glass => "Glass",
            WasteType::Metal => "Metal",
            WasteType::Electronics => "Electronics",
            WasteType::Batteries => "Batteries",
            WasteType::Organic => "Organic",
            WasteType::Hazardous => "Hazardous",
            WasteType::Cardboard => "Cardboard",
            WasteType::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

impl FromStr for WasteType {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let known = WasteType::BUILT_IN
            .into_iter()
            .find(|waste_type| waste_type.label().eq_ignore_ascii_case(trimmed));
        Ok(known.unwrap_or_else(|| WasteType::Other(trimmed.to_owned())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Operational status of a collection point.
pub enum PointStatus {
    /// Open as usual.
    Operational,
    /// Open with limited service.
    Maintenance,
    /// Temporarily closed.
    Closed,
}

impl PointStatus {
    /// All statuses, in the order filters offer them.
    pub const ALL: [PointStatus; 3] = [
        PointStatus::Operational,
        PointStatus::Maintenance,
        PointStatus::Closed,
    ];

    /// Capitalized label used in badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PointStatus::Operational => "Operational",
            PointStatus::Maintenance => "Maintenance",
            PointStatus::Closed => "Closed",
        }
    }

    /// Visitor guidance shown next to a selected point.
    #[must_use]
    pub const fn instructions(self) -> &'static str {
        match self {
            PointStatus::Operational => {
                "Please bring your ID for electronic waste disposal. Large items may require assistance."
            }
            PointStatus::Maintenance => {
                "This location is currently under maintenance. Some services may be limited."
            }
            PointStatus::Closed => {
                "This location is temporarily closed. Please visit an alternative collection point."
            }
        }
    }
}

impl fmt::Display for PointStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A physical location accepting specific waste categories.
pub struct CollectionPoint {
    /// Unique identifier.
    pub id: PointId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Map position.
    pub coordinate: Coordinate,
    /// Free-form opening hours.
    pub operating_hours: String,
    /// Accepted waste categories.
    pub waste_types: Vec<WasteType>,
    /// Distance from the user, already formatted (for example "1.2 km").
    pub distance: String,
    /// Current status.
    pub status: PointStatus,
}

impl CollectionPoint {
    /// Whether the point takes the given waste category.
    #[must_use]
    pub fn accepts(&self, waste_type: &WasteType) -> bool {
        self.waste_types.contains(waste_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a job listing.
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An open position in the recycling sector.
pub struct JobListing {
    /// Unique identifier.
    pub id: JobId,
    /// Position title.
    pub title: String,
    /// Hiring organization.
    pub company: String,
    /// Work location.
    pub location: String,
    /// Employment type such as "Full-time" or "Contract".
    pub employment_type: String,
    /// Pay, already formatted.
    pub salary: String,
    /// Relative posting age, for example "2 days ago".
    pub posted: String,
    /// Role description.
    pub description: String,
    /// Required skills.
    pub skills: Vec<String>,
    /// Whether the user already applied.
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Review status of a submitted application.
pub enum ApplicationStatus {
    /// Awaiting review.
    Pending,
    /// Interview scheduled.
    Interview,
    /// Offer made.
    Accepted,
    /// Not selected.
    Rejected,
}

impl ApplicationStatus {
    /// Badge text for the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending Review",
            ApplicationStatus::Interview => "Interview Scheduled",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Not Selected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A job application made by the user.
pub struct Application {
    /// Listing the application refers to.
    pub job_id: JobId,
    /// Title copied from the listing.
    pub job_title: String,
    /// Company copied from the listing.
    pub company: String,
    /// Submission date.
    pub applied_on: NaiveDate,
    /// Review status.
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Author of a chat message.
pub enum ChatRole {
    /// The person typing.
    User,
    /// The generated reply.
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of an assistant transcript.
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Message authored by the user.
    #[must_use]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Message authored by the assistant.
    #[must_use]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waste_type_parses_known_labels_case_insensitively() {
        assert_eq!("organic".parse::<WasteType>(), Ok(WasteType::Organic));
        assert_eq!(" Cardboard ".parse::<WasteType>(), Ok(WasteType::Cardboard));
    }

    #[test]
    fn waste_type_keeps_unknown_labels() {
        let parsed = "Textiles".parse::<WasteType>();
        assert_eq!(parsed, Ok(WasteType::Other("Textiles".to_owned())));
        assert_eq!(WasteType::Other("Textiles".to_owned()).to_string(), "Textiles");
    }

    #[test]
    fn status_instructions_differ_per_status() {
        assert!(PointStatus::Closed.instructions().contains("temporarily closed"));
        assert!(PointStatus::Maintenance.instructions().contains("maintenance"));
        assert!(PointStatus::Operational.instructions().contains("bring your ID"));
    }
}
