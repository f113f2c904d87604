mod internal_note;
mod report;
mod report_category;
mod report_message;
mod report_photo;

pub use internal_note::InternalNote;
pub use report::{CreateReport, Report, ReportStatus};
pub use report_category::ReportCategory;
pub use report_message::ReportMessage;
pub use report_photo::{ReportPhoto, UploadedPhoto};
