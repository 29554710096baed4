//! In-memory repositories holding the bundled fixture records.

use chrono::NaiveDate;

use crate::model::{
    Application, ApplicationStatus, CollectionPoint, Coordinate, JobId, JobListing, PointId,
    PointStatus, WasteType,
};

/// Read-only source list of collection points.
#[derive(Debug, Clone)]
pub struct PointRepository {
    points: Vec<CollectionPoint>,
}

impl PointRepository {
    /// Wrap an arbitrary list of points.
    #[must_use]
    pub fn new(points: Vec<CollectionPoint>) -> Self {
        Self { points }
    }

    /// The bundled sample data set.
    #[must_use]
    pub fn fixture() -> Self {
        use WasteType::{
            Batteries, Cardboard, Electronics, Glass, Hazardous, Metal, Organic, Paper, Plastic,
        };

        let points = vec![
            point(
                "1",
                "Central Recycling Facility",
                "123 Green Street, Eco District",
                Coordinate::new(34.052, -118.243),
                "Mon-Fri: 8AM-6PM, Sat: 9AM-4PM",
                vec![Plastic, Paper, Glass],
                "0.8 km",
                PointStatus::Operational,
            ),
            point(
                "2",
                "Community Collection Center",
                "456 Recycle Avenue, Green Zone",
                Coordinate::new(34.055, -118.248),
                "Mon-Sat: 7AM-7PM",
                vec![Electronics, Metal, Batteries],
                "1.2 km",
                PointStatus::Operational,
            ),
            point(
                "3",
                "Neighborhood Drop-off Point",
                "789 Sustainability Road",
                Coordinate::new(34.048, -118.25),
                "24/7 Access",
                vec![Plastic, Paper, Organic],
                "1.5 km",
                PointStatus::Operational,
            ),
            point(
                "4",
                "Eastern District Collection Point",
                "234 East Avenue, Eastern District",
                Coordinate::new(34.058, -118.235),
                "Tue-Sun: 9AM-5PM",
                vec![Plastic, Glass, Metal],
                "2.3 km",
                PointStatus::Maintenance,
            ),
            point(
                "5",
                "Southern Community Hub",
                "567 South Boulevard, Southern District",
                Coordinate::new(34.042, -118.247),
                "Mon-Fri: 10AM-6PM",
                vec![Paper, Cardboard, Plastic],
                "3.1 km",
                PointStatus::Operational,
            ),
            point(
                "6",
                "Western Recycling Center",
                "890 West Road, Western Zone",
                Coordinate::new(34.051, -118.26),
                "Wed-Mon: 8AM-7PM",
                vec![Electronics, Batteries, Hazardous],
                "3.8 km",
                PointStatus::Closed,
            ),
        ];

        Self::new(points)
    }

    /// All points in source order.
    #[must_use]
    pub fn all(&self) -> &[CollectionPoint] {
        &self.points
    }

    /// Look up a point by identifier.
    #[must_use]
    pub fn get(&self, id: &PointId) -> Option<&CollectionPoint> {
        self.points.iter().find(|candidate| &candidate.id == id)
    }

    /// Distinct waste categories across all points, in first-seen order.
    #[must_use]
    pub fn waste_types(&self) -> Vec<WasteType> {
        let mut seen: Vec<WasteType> = Vec::new();
        for waste_type in self.points.iter().flat_map(|entry| &entry.waste_types) {
            if !seen.contains(waste_type) {
                seen.push(waste_type.clone());
            }
        }
        seen
    }
}

#[expect(clippy::too_many_arguments, reason = "fixture rows mirror the record layout")]
fn point(
    id: &str,
    name: &str,
    address: &str,
    coordinate: Coordinate,
    operating_hours: &str,
    waste_types: Vec<WasteType>,
    distance: &str,
    status: PointStatus,
) -> CollectionPoint {
    CollectionPoint {
        id: PointId::new(id),
        name: name.to_owned(),
        address: address.to_owned(),
        coordinate,
        operating_hours: operating_hours.to_owned(),
        waste_types,
        distance: distance.to_owned(),
        status,
    }
}

/// Source list of job listings and the user's past applications.
#[derive(Debug, Clone)]
pub struct JobRepository {
    jobs: Vec<JobListing>,
    applications: Vec<Application>,
}

impl JobRepository {
    /// Wrap arbitrary listings and applications.
    #[must_use]
    pub fn new(jobs: Vec<JobListing>, applications: Vec<Application>) -> Self {
        Self { jobs, applications }
    }

    /// The bundled sample data set.
    #[must_use]
    pub fn fixture() -> Self {
        let jobs = vec![
            JobListing {
                id: JobId("1".to_owned()),
                title: "Recycling Facility Operator".to_owned(),
                company: "EcoWaste Solutions".to_owned(),
                location: "Central District".to_owned(),
                employment_type: "Full-time".to_owned(),
                salary: "$15-18/hr".to_owned(),
                posted: "2 days ago".to_owned(),
                description: "Operate recycling machinery and sort materials at our state-of-the-art facility. Training provided.".to_owned(),
                skills: skills(&["Physical Stamina", "Basic Mechanical Knowledge", "Team Player"]),
                applied: false,
            },
            JobListing {
                id: JobId("2".to_owned()),
                title: "Waste Collection Coordinator".to_owned(),
                company: "GreenPath Recycling".to_owned(),
                location: "North Zone".to_owned(),
                employment_type: "Part-time".to_owned(),
                salary: "$17-20/hr".to_owned(),
                posted: "1 week ago".to_owned(),
                description: "Guide collection vehicles to gather recyclable materials from designated collection points.".to_owned(),
                skills: skills(&["Communication Skills", "Route Planning", "Safety Conscious"]),
                applied: true,
            },
            JobListing {
                id: JobId("3".to_owned()),
                title: "Community Recycling Educator".to_owned(),
                company: "EcoAwareness Initiative".to_owned(),
                location: "Various Locations".to_owned(),
                employment_type: "Contract".to_owned(),
                salary: "$16/hr".to_owned(),
                posted: "3 days ago".to_owned(),
                description: "Educate community members about proper recycling practices and the importance of waste management.".to_owned(),
                skills: skills(&["Communication", "Public Speaking", "Environmental Knowledge"]),
                applied: false,
            },
            JobListing {
                id: JobId("4".to_owned()),
                title: "Recycling Program Coordinator".to_owned(),
                company: "Green Future NGO".to_owned(),
                location: "Central District".to_owned(),
                employment_type: "Full-time".to_owned(),
                salary: "$45,000-55,000/year".to_owned(),
                posted: "5 days ago".to_owned(),
                description: "Coordinate recycling programs, manage volunteers, and develop educational materials for community outreach.".to_owned(),
                skills: skills(&["Project Management", "Communication", "Environmental Science"]),
                applied: false,
            },
            JobListing {
                id: JobId("5".to_owned()),
                title: "E-Waste Technician".to_owned(),
                company: "TechRecycle Inc.".to_owned(),
                location: "Industrial Zone".to_owned(),
                employment_type: "Full-time".to_owned(),
                salary: "$19-22/hr".to_owned(),
                posted: "2 weeks ago".to_owned(),
                description: "Disassemble and process electronic waste for recycling. Identify valuable components and hazardous materials.".to_owned(),
                skills: skills(&[
                    "Technical Knowledge",
                    "Attention to Detail",
                    "Safety Procedures",
                ]),
                applied: false,
            },
            JobListing {
                id: JobId("6".to_owned()),
                title: "Sustainability Consultant".to_owned(),
                company: "EcoSolutions Consulting".to_owned(),
                location: "Business District".to_owned(),
                employment_type: "Contract".to_owned(),
                salary: "$30-35/hr".to_owned(),
                posted: "1 week ago".to_owned(),
                description: "Provide consulting services to businesses looking to improve their recycling and waste management practices.".to_owned(),
                skills: skills(&[
                    "Consulting Experience",
                    "Sustainability Knowledge",
                    "Business Acumen",
                ]),
                applied: false,
            },
        ];

        let applications = [
            (
                "2",
                "Waste Collection Coordinator",
                "GreenPath Recycling",
                (2023, 6, 10),
                ApplicationStatus::Interview,
            ),
            (
                "7",
                "Recycling Plant Supervisor",
                "Urban Recyclers Ltd.",
                (2023, 5, 28),
                ApplicationStatus::Rejected,
            ),
            (
                "8",
                "Environmental Educator",
                "City Environmental Department",
                (2023, 6, 5),
                ApplicationStatus::Pending,
            ),
        ]
        .into_iter()
        .filter_map(|(job_id, title, company, (year, month, day), status)| {
            Some(Application {
                job_id: JobId(job_id.to_owned()),
                job_title: title.to_owned(),
                company: company.to_owned(),
                applied_on: NaiveDate::from_ymd_opt(year, month, day)?,
                status,
            })
        })
        .collect();

        Self::new(jobs, applications)
    }

    /// All listings in source order.
    #[must_use]
    pub fn jobs(&self) -> &[JobListing] {
        &self.jobs
    }

    /// Past applications in source order.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub(crate) fn into_parts(self) -> (Vec<JobListing>, Vec<Application>) {
        (self.jobs, self.applications)
    }
}

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}
