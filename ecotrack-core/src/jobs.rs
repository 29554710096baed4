//! Job listings with filtering and in-memory applications.

use chrono::NaiveDate;
use tracing::info;

use crate::model::{Application, ApplicationStatus, JobId, JobListing};
use crate::repository::JobRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter over job listings. `None` fields match everything.
pub struct JobQuery {
    /// Exact employment type.
    pub employment_type: Option<String>,
    /// Exact location.
    pub location: Option<String>,
    /// Case-insensitive substring of title, company, or description.
    pub search: String,
}

impl JobQuery {
    /// Whether `job` passes the query.
    #[must_use]
    pub fn matches(&self, job: &JobListing) -> bool {
        let type_ok = self
            .employment_type
            .as_ref()
            .is_none_or(|wanted| &job.employment_type == wanted);
        let location_ok = self
            .location
            .as_ref()
            .is_none_or(|wanted| &job.location == wanted);
        let needle = self.search.trim().to_lowercase();
        let search_ok = needle.is_empty()
            || job.title.to_lowercase().contains(&needle)
            || job.company.to_lowercase().contains(&needle)
            || job.description.to_lowercase().contains(&needle);
        type_ok && location_ok && search_ok
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Reasons an application is refused.
pub enum JobError {
    /// No listing with that identifier.
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),
    /// The user already applied.
    #[error("Already applied to job {0}")]
    AlreadyApplied(JobId),
}

/// Listings, the active query, and the user's applications.
#[derive(Debug, Clone)]
pub struct JobBoard {
    jobs: Vec<JobListing>,
    applications: Vec<Application>,
    query: JobQuery,
}

impl JobBoard {
    /// Board over the repository's listings, unfiltered.
    #[must_use]
    pub fn new(repository: JobRepository) -> Self {
        let (jobs, applications) = repository.into_parts();
        Self {
            jobs,
            applications,
            query: JobQuery::default(),
        }
    }

    /// Active query.
    #[must_use]
    pub fn query(&self) -> &JobQuery {
        &self.query
    }

    /// Listings passing the active query.
    #[must_use]
    pub fn visible(&self) -> Vec<&JobListing> {
        self.jobs
            .iter()
            .filter(|job| self.query.matches(job))
            .collect()
    }

    /// Look up a listing regardless of the query.
    #[must_use]
    pub fn job(&self, id: &JobId) -> Option<&JobListing> {
        self.jobs.iter().find(|job| &job.id == id)
    }

    /// Replace the query.
    pub fn apply_query(&mut self, query: JobQuery) {
        self.query = query;
    }

    /// Clear the query.
    pub fn reset(&mut self) {
        self.query = JobQuery::default();
    }

    /// Distinct employment types in first-seen order.
    #[must_use]
    pub fn employment_types(&self) -> Vec<&str> {
        distinct(self.jobs.iter().map(|job| job.employment_type.as_str()))
    }

    /// Distinct locations in first-seen order.
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        distinct(self.jobs.iter().map(|job| job.location.as_str()))
    }

    /// Applications, oldest first.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Apply to a listing, recording a pending application dated `on`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::UnknownJob`] for unknown identifiers and
    /// [`JobError::AlreadyApplied`] when the listing is already marked.
    pub fn apply(&mut self, id: &JobId, on: NaiveDate) -> Result<Application, JobError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|job| &job.id == id)
            .ok_or_else(|| JobError::UnknownJob(id.clone()))?;
        if job.applied {
            return Err(JobError::AlreadyApplied(id.clone()));
        }
        job.applied = true;

        let application = Application {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            applied_on: on,
            status: ApplicationStatus::Pending,
        };
        info!(job = %id, "submitted job application");
        self.applications.push(application.clone());
        Ok(application)
    }
}

fn distinct<'item>(values: impl Iterator<Item = &'item str>) -> Vec<&'item str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> JobBoard {
        JobBoard::new(JobRepository::fixture())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
    }

    #[test]
    fn query_combines_type_location_and_search() {
        let mut board = board();
        board.apply_query(JobQuery {
            employment_type: Some("Full-time".to_owned()),
            location: Some("Central District".to_owned()),
            search: String::new(),
        });
        let ids: Vec<&str> = board.visible().iter().map(|job| job.id.0.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        board.apply_query(JobQuery {
            search: "ELECTRONIC".to_owned(),
            ..JobQuery::default()
        });
        let ids: Vec<&str> = board.visible().iter().map(|job| job.id.0.as_str()).collect();
        assert_eq!(ids, vec!["5"]);

        board.reset();
        assert_eq!(board.visible().len(), 6);
    }

    #[test]
    fn filter_options_are_distinct() {
        let board = board();
        assert_eq!(board.employment_types(), vec!["Full-time", "Part-time", "Contract"]);
        assert_eq!(board.locations().len(), 5);
    }

    #[test]
    fn applying_marks_job_and_records_pending_application() {
        let mut board = board();
        let id = JobId("3".to_owned());

        let application = board.apply(&id, today()).expect("apply");

        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.applied_on, today());
        assert!(board.job(&id).is_some_and(|job| job.applied));
        assert_eq!(board.applications().len(), 4);
        assert_eq!(board.applications().last(), Some(&application));
    }

    #[test]
    fn applying_twice_or_to_unknown_job_fails() {
        let mut board = board();

        assert_eq!(
            board.apply(&JobId("2".to_owned()), today()),
            Err(JobError::AlreadyApplied(JobId("2".to_owned())))
        );
        assert_eq!(
            board.apply(&JobId("99".to_owned()), today()),
            Err(JobError::UnknownJob(JobId("99".to_owned())))
        );
        assert_eq!(board.applications().len(), 3);
    }

    #[test]
    fn applied_flag_survives_filtering() {
        let mut board = board();
        board.apply(&JobId("1".to_owned()), today()).expect("apply");

        board.apply_query(JobQuery {
            employment_type: Some("Full-time".to_owned()),
            ..JobQuery::default()
        });
        board.reset();

        assert!(board.job(&JobId("1".to_owned())).is_some_and(|job| job.applied));
    }
}
