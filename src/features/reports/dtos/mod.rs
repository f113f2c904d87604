pub mod conversation_dto;
pub mod geocoding_dto;
pub mod report_dto;
pub mod workflow_dto;

pub use conversation_dto::{CreateMessageDto, MessageResponseDto, NoteResponseDto};
pub use geocoding_dto::{GeocodingQuery, GeocodingResultDto};
pub use report_dto::{CreateReportDto, PhotoDto, ReportResponseDto, ReporterDto};
pub use workflow_dto::{
    ApproveReportDto, AssignExternalDto, AssignableExternalDto, AssignableTechnicalDto,
    RejectReportDto, UpdateReportStatusDto,
};
