//! Feature slices - one module per domain area
//!
//! Each feature follows the same layout: models, dtos, services, handlers
//! and a routes.rs assembling its router.

pub mod admin;
pub mod auth;
pub mod companies;
pub mod notifications;
pub mod reports;
pub mod telegram;
pub mod users;
