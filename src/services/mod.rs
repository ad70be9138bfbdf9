pub mod admin_service;
pub mod booking_service;
pub mod coach_service;
pub mod email_service;
pub mod format;
pub mod journal_service;
pub mod psych_service;
pub mod slot_service;
pub mod user_service;

pub use admin_service::AdminService;
pub use booking_service::BookingService;
pub use coach_service::CoachService;
pub use email_service::EmailService;
pub use journal_service::JournalService;
pub use psych_service::PsychService;
pub use slot_service::SlotService;
pub use user_service::UserService;
