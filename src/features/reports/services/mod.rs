pub(crate) mod report_service;

mod assignment_service;
mod conversation_service;
mod geocoding_service;
mod workflow_service;

pub use assignment_service::AssignmentService;
pub use conversation_service::ConversationService;
pub use geocoding_service::GeocodingService;
pub use report_service::ReportService;
pub use workflow_service::WorkflowService;
