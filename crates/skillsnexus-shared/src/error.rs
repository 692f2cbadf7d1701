use thiserror::Error;

use crate::types::{CourseId, LessonId, ModuleId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Module {module} not found in course {course}")]
    ModuleNotFound { course: CourseId, module: ModuleId },

    #[error("Lesson {lesson} not found in module {module}")]
    LessonNotFound { module: ModuleId, lesson: LessonId },

    #[error("Duplicate identifier within parent collection: {0}")]
    DuplicateId(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartnerAccessError {
    #[error(
        "Access Restricted: Only authorized partners ({0}) may access this portal."
    )]
    DomainNotAllowed(String),

    #[error("Partner login required")]
    NotLoggedIn,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment gateway is not initialized")]
    NotInitialized,

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment gateway unreachable: {0}")]
    Transport(String),

    #[error("A payment is already being processed")]
    AlreadyProcessing,

    #[error("Payment already completed")]
    AlreadyCompleted,
}
