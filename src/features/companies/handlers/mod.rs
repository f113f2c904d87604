pub mod company_handler;

pub use company_handler::{
    __path_create_company, __path_get_company, __path_list_companies,
    __path_update_platform_access, create_company, get_company, list_companies,
    update_platform_access,
};
