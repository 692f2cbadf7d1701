//! # skillsnexus-shared
//!
//! Domain model and view-state logic for the SkillsNexus course platform:
//! the course catalog, lesson navigation, persona dashboards, referral
//! pricing, learner sessions, and chat. Nothing in this crate performs I/O.

pub mod catalog;
pub mod chat;
pub mod constants;
pub mod course;
pub mod error;
pub mod fixtures;
pub mod navigation;
pub mod partner;
pub mod persona;
pub mod pricing;
pub mod session;
pub mod types;

pub use catalog::Catalog;
pub use course::{Course, Lesson, Module};
pub use navigation::CourseNavigator;
pub use pricing::{Checkout, ReferralTable};
pub use session::UserContext;
pub use types::{CourseId, Currency, LessonId, ModuleId};
