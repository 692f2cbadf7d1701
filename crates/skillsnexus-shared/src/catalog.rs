//! In-memory course catalog edited by partners.
//!
//! Courses are stored as `Arc<Course>` records keyed by id, with a separate
//! order index. Every edit builds a new record and swaps it in, so a
//! snapshot taken by a course viewer never observes a half-applied change.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::course::{Course, Lesson, Module};
use crate::error::CatalogError;
use crate::types::{CourseId, LessonId, LessonKind, ModuleId};

pub type Result<T> = std::result::Result<T, CatalogError>;

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial update of a course's own fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub title: Option<String>,
    pub partner_name: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub progress: Option<u8>,
    pub xp: Option<u32>,
    pub level_required: Option<u32>,
}

impl CoursePatch {
    fn apply(self, course: &mut Course) {
        if let Some(v) = self.title {
            course.title = v;
        }
        if let Some(v) = self.partner_name {
            course.partner_name = v;
        }
        if let Some(v) = self.description {
            course.description = v;
        }
        if let Some(v) = self.thumbnail_url {
            course.thumbnail_url = Some(v);
        }
        if let Some(v) = self.progress {
            course.progress = Some(v.min(100));
        }
        if let Some(v) = self.xp {
            course.xp = Some(v);
        }
        if let Some(v) = self.level_required {
            course.level_required = Some(v);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ModulePatch {
    fn apply(self, module: &mut Module) {
        if let Some(v) = self.title {
            module.title = v;
        }
        if let Some(v) = self.description {
            module.description = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPatch {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub is_locked: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<LessonKind>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub transcript: Option<String>,
}

impl LessonPatch {
    fn apply(self, lesson: &mut Lesson) {
        if let Some(v) = self.title {
            lesson.title = v;
        }
        if let Some(v) = self.duration {
            lesson.duration = v;
        }
        if let Some(v) = self.is_locked {
            lesson.is_locked = v;
        }
        if let Some(v) = self.kind {
            lesson.kind = v;
        }
        if let Some(v) = self.description {
            lesson.description = Some(v);
        }
        if let Some(v) = self.video_url {
            lesson.video_url = Some(v);
        }
        if let Some(v) = self.transcript {
            lesson.transcript = Some(v);
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    order: Vec<CourseId>,
    courses: HashMap<CourseId, Arc<Course>>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Self {
        let mut catalog = Self::default();
        for course in courses {
            catalog.insert(course);
        }
        catalog
    }

    fn insert(&mut self, course: Course) {
        let id = course.id.clone();
        if self.courses.insert(id.clone(), Arc::new(course)).is_none() {
            self.order.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All courses in insertion order.
    pub fn list(&self) -> Vec<Arc<Course>> {
        self.order
            .iter()
            .filter_map(|id| self.courses.get(id).cloned())
            .collect()
    }

    pub fn get(&self, id: &CourseId) -> Result<Arc<Course>> {
        self.courses
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::CourseNotFound(id.clone()))
    }

    /// First course in catalog order, used when no course is active.
    pub fn first(&self) -> Option<Arc<Course>> {
        self.order.first().and_then(|id| self.courses.get(id).cloned())
    }

    /// Copy the record, edit the copy, swap it in.
    fn replace_with<F>(&mut self, id: &CourseId, edit: F) -> Result<Arc<Course>>
    where
        F: FnOnce(&mut Course) -> Result<()>,
    {
        let current = self.get(id)?;
        let mut next = Course::clone(&current);
        edit(&mut next)?;
        let next = Arc::new(next);
        self.courses.insert(id.clone(), Arc::clone(&next));
        Ok(next)
    }

    /// Add an empty partner course with placeholder text.
    pub fn create_course(&mut self) -> Arc<Course> {
        let mut id = CourseId::generate();
        while self.courses.contains_key(&id) {
            id = CourseId::generate();
        }
        let course = Course::new(
            id.clone(),
            "New Partner Course",
            "Your Organization Name",
            "Course description goes here.",
        );
        self.insert(course);
        Arc::clone(&self.courses[&id])
    }

    pub fn update_course(&mut self, id: &CourseId, patch: CoursePatch) -> Result<Arc<Course>> {
        self.replace_with(id, |course| {
            patch.apply(course);
            Ok(())
        })
    }

    pub fn add_module(&mut self, course_id: &CourseId) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            let mut id = ModuleId::generate();
            while course.module(&id).is_some() {
                id = ModuleId::generate();
            }
            course
                .modules
                .push(Module::new(id, "New Module", "Module description"));
            Ok(())
        })
    }

    /// Append a prepared module; its id must be new within the course.
    pub fn push_module(&mut self, course_id: &CourseId, module: Module) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            if course.module(&module.id).is_some() {
                return Err(CatalogError::DuplicateId(module.id.to_string()));
            }
            course.modules.push(module);
            Ok(())
        })
    }

    pub fn update_module(
        &mut self,
        course_id: &CourseId,
        module_id: &ModuleId,
        patch: ModulePatch,
    ) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            let index = module_position(course, module_id)?;
            patch.apply(&mut course.modules[index]);
            Ok(())
        })
    }

    pub fn add_lesson(&mut self, course_id: &CourseId, module_id: &ModuleId) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            let index = module_position(course, module_id)?;
            let module = &mut course.modules[index];
            let mut id = LessonId::generate();
            while module.lesson(&id).is_some() {
                id = LessonId::generate();
            }
            let mut lesson = Lesson::new(id, "New Lesson", "10 min", LessonKind::Video);
            lesson.video_url = Some(String::new());
            lesson.transcript = Some(String::new());
            module.lessons.push(lesson);
            Ok(())
        })
    }

    /// Append a prepared lesson; its id must be new within the module.
    pub fn push_lesson(
        &mut self,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson: Lesson,
    ) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            let index = module_position(course, module_id)?;
            let module = &mut course.modules[index];
            if module.lesson(&lesson.id).is_some() {
                return Err(CatalogError::DuplicateId(lesson.id.to_string()));
            }
            module.lessons.push(lesson);
            Ok(())
        })
    }

    pub fn update_lesson(
        &mut self,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
        patch: LessonPatch,
    ) -> Result<Arc<Course>> {
        self.replace_with(course_id, |course| {
            let index = module_position(course, module_id)?;
            let module = &mut course.modules[index];
            let lesson = module
                .lessons
                .iter_mut()
                .find(|l| &l.id == lesson_id)
                .ok_or_else(|| CatalogError::LessonNotFound {
                    module: module_id.clone(),
                    lesson: lesson_id.clone(),
                })?;
            patch.apply(lesson);
            Ok(())
        })
    }
}

fn module_position(course: &Course, module_id: &ModuleId) -> Result<usize> {
    course
        .module_index(module_id)
        .ok_or_else(|| CatalogError::ModuleNotFound {
            course: course.id.clone(),
            module: module_id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::default_courses;

    fn catalog() -> Catalog {
        Catalog::new(default_courses())
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let mut catalog = catalog();
        let created = catalog.create_course();
        let ids: Vec<_> = catalog.list().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[0], "c1");
        assert_eq!(ids[5], created.id);
        assert_eq!(created.title, "New Partner Course");
        assert!(created.modules.is_empty());
    }

    #[test]
    fn test_update_replaces_record_not_snapshot() {
        let mut catalog = catalog();
        let id = CourseId::from("c1");
        let before = catalog.get(&id).unwrap();

        let patch = CoursePatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let after = catalog.update_course(&id, patch).unwrap();

        assert_eq!(before.title, "Silver Intelligence: AI Masterclass");
        assert_eq!(after.title, "Renamed");
        assert_eq!(catalog.get(&id).unwrap().title, "Renamed");
        assert_eq!(after.modules, before.modules);
    }

    #[test]
    fn test_add_module_and_lesson() {
        let mut catalog = catalog();
        let id = CourseId::from("c2");
        let course = catalog.add_module(&id).unwrap();
        let module_id = course.modules[0].id.clone();
        assert_eq!(course.modules[0].title, "New Module");

        let course = catalog.add_lesson(&id, &module_id).unwrap();
        let lesson = &course.modules[0].lessons[0];
        assert_eq!(lesson.title, "New Lesson");
        assert_eq!(lesson.duration, "10 min");
        assert!(lesson.is_locked);
        assert_eq!(lesson.kind, LessonKind::Video);
    }

    #[test]
    fn test_update_lesson_patch() {
        let mut catalog = catalog();
        let course = CourseId::from("c1");
        let patch = LessonPatch {
            is_locked: Some(false),
            video_url: Some("https://cdn.example.com/l2.mp4".into()),
            ..Default::default()
        };
        let updated = catalog
            .update_lesson(&course, &"m1".into(), &"l2".into(), patch)
            .unwrap();
        let lesson = &updated.modules[0].lessons[1];
        assert!(!lesson.is_locked);
        assert_eq!(lesson.title, "AI History Without the Hype");
        assert_eq!(lesson.video_url.as_deref(), Some("https://cdn.example.com/l2.mp4"));
    }

    #[test]
    fn test_missing_targets_are_errors() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.get(&"nope".into()),
            Err(CatalogError::CourseNotFound(_))
        ));
        assert!(matches!(
            catalog.add_lesson(&"c1".into(), &"m99".into()),
            Err(CatalogError::ModuleNotFound { .. })
        ));
        assert!(matches!(
            catalog.update_lesson(&"c1".into(), &"m1".into(), &"l99".into(), LessonPatch::default()),
            Err(CatalogError::LessonNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected_and_catalog_unchanged() {
        let mut catalog = catalog();
        let course = CourseId::from("c1");
        let err = catalog
            .push_module(&course, Module::new("m1", "Dup", ""))
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("m1".into()));

        let err = catalog
            .push_lesson(
                &course,
                &"m1".into(),
                Lesson::new("l1", "Dup", "1 min", LessonKind::Text),
            )
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("l1".into()));
        assert_eq!(catalog.get(&course).unwrap().lesson_count(), 20);

        // Lesson ids only need to be unique within their own module.
        catalog
            .push_lesson(
                &course,
                &"m2".into(),
                Lesson::new("l1", "Same id, other module", "1 min", LessonKind::Text),
            )
            .unwrap();
    }
}
