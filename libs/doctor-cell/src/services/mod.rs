pub mod account;
pub mod appointment;
pub mod consultation;
pub mod patient;
pub mod profile;
pub mod report;
pub mod timetable;

pub use account::AccountService;
pub use appointment::AppointmentService;
pub use consultation::ConsultationService;
pub use patient::PatientService;
pub use profile::ProfileService;
pub use report::ReportService;
pub use timetable::TimetableService;
