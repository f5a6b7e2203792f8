pub mod appointment;
pub mod billing;
pub mod directory;
pub mod profile;

pub use appointment::FrontDeskService;
pub use billing::BillingService;
pub use directory::DirectoryService;
pub use profile::ProfileService;
