pub mod conversation_handler;
pub mod geocoding_handler;
pub mod report_handler;
pub mod workflow_handler;

pub use conversation_handler::{
    __path_create_report_message, __path_create_report_note, __path_list_report_messages,
    __path_list_report_notes, create_report_message, create_report_note, list_report_messages,
    list_report_notes,
};
pub use geocoding_handler::{__path_search_addresses, search_addresses};
pub use report_handler::{
    __path_create_report, __path_get_report, __path_list_assigned_reports,
    __path_list_external_reports, __path_list_my_reports, __path_list_pending_reports,
    __path_list_shared_reports, create_report, get_report, list_assigned_reports,
    list_external_reports, list_my_reports, list_pending_reports, list_shared_reports,
    ReportsState,
};
pub use workflow_handler::{
    __path_approve_report, __path_assign_external, __path_list_assignable_externals,
    __path_list_assignable_technicals, __path_reject_report, __path_update_report_status,
    approve_report, assign_external, list_assignable_externals, list_assignable_technicals,
    reject_report, update_report_status,
};
