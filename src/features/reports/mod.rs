pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{
    AssignmentService, ConversationService, GeocodingService, ReportService, WorkflowService,
};
