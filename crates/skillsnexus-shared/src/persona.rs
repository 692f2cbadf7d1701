//! Persona-filtered dashboard catalog.
//!
//! A persona names the partners whose courses form the learner's "core"
//! curriculum. Everything else is shown as an elective; no course is ever
//! hidden.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::course::Course;

/// Level at or below which a course is open without progression.
const OPEN_LEVEL: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Partner names whose courses are "core" for this persona.
    pub partners: Vec<String>,
    pub icon: String,
}

impl Persona {
    pub fn includes_partner(&self, partner: &str) -> bool {
        self.partners.iter().any(|p| p == partner)
    }
}

/// One course as the dashboard renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    pub course: Arc<Course>,
    pub is_elective: bool,
    pub is_locked: bool,
}

impl CourseCard {
    pub fn new(course: Arc<Course>, is_elective: bool) -> Self {
        // Electives stay browsable regardless of level.
        let is_locked = course.required_level() > OPEN_LEVEL && !is_elective;
        Self {
            course,
            is_elective,
            is_locked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
    pub core: Vec<CourseCard>,
    pub electives: Vec<CourseCard>,
}

/// Split `courses` into core and elective groups for `persona`.
///
/// With no persona selected both groups are empty. Catalog order is kept
/// within each group.
pub fn partition<'a, I>(courses: I, persona: Option<&Persona>) -> DashboardView
where
    I: IntoIterator<Item = &'a Arc<Course>>,
{
    let Some(persona) = persona else {
        return DashboardView::default();
    };

    let (core, electives): (Vec<_>, Vec<_>) = courses
        .into_iter()
        .map(|course| {
            let elective = !persona.includes_partner(&course.partner_name);
            CourseCard::new(Arc::clone(course), elective)
        })
        .partition(|card| !card.is_elective);

    DashboardView {
        persona: Some(persona.clone()),
        core,
        electives,
    }
}
