mod company;

pub use company::{CreateExternalCompany, ExternalCompany};
