//! Course content model: course → module → lesson.
//!
//! Records are plain values. Edits go through [`crate::catalog::Catalog`],
//! which replaces whole course records rather than mutating nested
//! modules or lessons in place.

use serde::{Deserialize, Serialize};

use crate::types::{CourseId, LessonId, LessonKind, ModuleId};

// ---------------------------------------------------------------------------
// Lesson
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    /// Free-form label such as `"15 min"`.
    pub duration: String,
    pub is_locked: bool,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Lesson {
    pub fn new(id: impl Into<LessonId>, title: &str, duration: &str, kind: LessonKind) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            duration: duration.to_string(),
            is_locked: true,
            kind,
            description: None,
            video_url: None,
            transcript: None,
        }
    }

    pub fn unlocked(mut self) -> Self {
        self.is_locked = false;
        self
    }

    pub fn with_video(mut self, url: &str, transcript: &str) -> Self {
        self.video_url = Some(url.to_string());
        self.transcript = Some(transcript.to_string());
        self
    }

    /// Placeholder returned when a course has nothing to play.
    pub fn placeholder() -> Self {
        Self {
            is_locked: false,
            ..Self::default()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.as_str().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn new(id: impl Into<ModuleId>, title: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            description: description.to_string(),
            lessons: Vec::new(),
        }
    }

    pub fn with_lessons(mut self, lessons: Vec<Lesson>) -> Self {
        self.lessons = lessons;
        self
    }

    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == id)
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Partner organisation that publishes the course.
    pub partner_name: String,
    pub description: String,
    pub modules: Vec<Module>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Completion percentage, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_required: Option<u32>,
}

impl Course {
    pub fn new(id: impl Into<CourseId>, title: &str, partner_name: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            partner_name: partner_name.to_string(),
            description: description.to_string(),
            modules: Vec::new(),
            thumbnail_url: None,
            progress: None,
            xp: None,
            level_required: None,
        }
    }

    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == id)
    }

    pub fn module_index(&self, id: &ModuleId) -> Option<usize> {
        self.modules.iter().position(|m| &m.id == id)
    }

    /// Module owning the given lesson, searching in traversal order.
    pub fn module_of(&self, lesson: &LessonId) -> Option<&Module> {
        self.modules.iter().find(|m| m.lesson(lesson).is_some())
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn required_level(&self) -> u32 {
        self.level_required.unwrap_or(0)
    }
}
