//! Course viewer navigation.
//!
//! [`CourseNavigator`] flattens a course's module → lesson tree into one
//! linear sequence and tracks the current lesson, the expanded module, and
//! the autoplay toggle. Locked lessons can never become current: selecting
//! one, stepping onto one, or autoplaying into one is silently ignored.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::course::{Course, Lesson};
use crate::types::{LessonId, ModuleId};

/// Hosts whose players are embedded in an iframe rather than driven natively.
const EMBED_HOSTS: &[&str] = &["synthesia.io", "youtube.com", "youtu.be", "vimeo.com"];

/// A lesson together with the module that owns it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatLesson {
    pub module_id: ModuleId,
    #[serde(flatten)]
    pub lesson: Lesson,
}

/// How the current lesson's media should be played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "url", rename_all = "lowercase")]
pub enum Playback {
    /// Third-party player; end-of-media is not observable.
    Embedded(String),
    /// Native player that reports end-of-media.
    Native(String),
    Unavailable,
}

impl Playback {
    pub fn for_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            None | Some("") => Self::Unavailable,
            Some(url) if EMBED_HOSTS.iter().any(|host| url.contains(host)) => {
                Self::Embedded(url.to_string())
            }
            Some(url) => Self::Native(url.to_string()),
        }
    }
}

/// Flatten `course` into `(lesson, module)` pairs in module-then-lesson order.
pub fn flatten(course: &Course) -> Vec<FlatLesson> {
    course
        .modules
        .iter()
        .flat_map(|module| {
            module.lessons.iter().map(move |lesson| FlatLesson {
                module_id: module.id.clone(),
                lesson: lesson.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CourseNavigator {
    course: Arc<Course>,
    lessons: Vec<FlatLesson>,
    /// Index into `lessons`; `None` only when the course has no lessons.
    current: Option<usize>,
    expanded_module: Option<ModuleId>,
    autoplay: bool,
    placeholder: Lesson,
}

impl CourseNavigator {
    pub fn new(course: Arc<Course>) -> Self {
        let lessons = flatten(&course);
        let current = if lessons.is_empty() { None } else { Some(0) };
        let expanded_module = course.modules.first().map(|m| m.id.clone());

        Self {
            course,
            lessons,
            current,
            expanded_module,
            autoplay: true,
            placeholder: Lesson::placeholder(),
        }
    }

    pub fn course(&self) -> &Arc<Course> {
        &self.course
    }

    pub fn flattened(&self) -> &[FlatLesson] {
        &self.lessons
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The current lesson, or an empty placeholder for a course without
    /// lessons.
    pub fn current_lesson(&self) -> &Lesson {
        self.current
            .and_then(|i| self.lessons.get(i))
            .map(|flat| &flat.lesson)
            .unwrap_or(&self.placeholder)
    }

    pub fn expanded_module(&self) -> Option<&ModuleId> {
        self.expanded_module.as_ref()
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    pub fn toggle_autoplay(&mut self) -> bool {
        self.autoplay = !self.autoplay;
        self.autoplay
    }

    /// Toggle a module in the sidebar without changing the current lesson.
    /// Choosing the expanded module again collapses it.
    pub fn expand_module(&mut self, module: &ModuleId) -> bool {
        if self.course.module(module).is_none() {
            return false;
        }
        if self.expanded_module.as_ref() == Some(module) {
            self.expanded_module = None;
        } else {
            self.expanded_module = Some(module.clone());
        }
        true
    }

    fn next_entry(&self) -> Option<&FlatLesson> {
        self.current.and_then(|i| self.lessons.get(i + 1))
    }

    fn previous_entry(&self) -> Option<&FlatLesson> {
        self.current
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.lessons.get(i))
    }

    pub fn can_go_next(&self) -> bool {
        self.next_entry().is_some_and(|flat| !flat.lesson.is_locked)
    }

    pub fn can_go_previous(&self) -> bool {
        self.previous_entry().is_some()
    }

    /// Make `lesson_id` current. Returns `false` without changing anything
    /// when the lesson is locked or not part of the course.
    pub fn select(&mut self, lesson_id: &LessonId) -> bool {
        let Some(index) = self.lessons.iter().position(|f| &f.lesson.id == lesson_id) else {
            debug!(lesson = %lesson_id, "Ignoring selection of unknown lesson");
            return false;
        };
        self.select_index(index)
    }

    fn select_index(&mut self, index: usize) -> bool {
        let flat = &self.lessons[index];
        if flat.lesson.is_locked {
            debug!(lesson = %flat.lesson.id, "Ignoring selection of locked lesson");
            return false;
        }

        if self.expanded_module.as_ref() != Some(&flat.module_id) {
            self.expanded_module = Some(flat.module_id.clone());
        }
        self.current = Some(index);
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        match self.current {
            Some(i) => self.select_index(i + 1),
            None => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.current.and_then(|i| i.checked_sub(1)) {
            Some(i) => self.select_index(i),
            None => false,
        }
    }

    /// End-of-media hook. Autoplay advances one lesson but stops in front of
    /// a locked one.
    pub fn media_ended(&mut self) -> bool {
        if !self.autoplay {
            return false;
        }
        self.next()
    }

    pub fn playback(&self) -> Playback {
        Playback::for_url(self.current_lesson().video_url.as_deref())
    }

    /// Context line handed to the AI tutor.
    pub fn tutor_context(&self) -> String {
        let module_title = self
            .current
            .and_then(|i| self.lessons.get(i))
            .map(|flat| &flat.module_id)
            .and_then(|id| self.course.module(id))
            .map(|m| m.title.as_str())
            .unwrap_or_default();

        format!(
            "Lesson: {}. Module: {}. Course: {}",
            self.current_lesson().title,
            module_title,
            self.course.title
        )
    }
}
