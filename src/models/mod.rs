pub mod booking;
pub mod coach;
pub mod journal;
pub mod psych;
pub mod user;

pub use booking::{
    Booking, BookingCreate, BookingDetailedView, BookingStatus, BookingUpdate, BookingView,
    CoachBookingView,
};
pub use coach::{
    CoachAccountView, CoachBrowseView, CoachProfile, CoachProfileUpsert, CoachProfileView,
    CoachSlot, CoachSlotCreate, CoachSlotUpdate, SlotOwnerView, SlotPublicView,
};
pub use journal::{Journal, JournalCreate, JournalUpdate};
pub use psych::{
    PsychOption, PsychOptionCreate, PsychOptionUpdate, PsychOptionView, PsychQuestion,
    PsychQuestionCreate, PsychQuestionUpdate, PsychQuestionView, PsychTest, PsychTestCreate,
    PsychTestPatch, PsychTestView, PsychUserResponse, PsychUserResponseCreate,
};
pub use user::{Gender, User, UserCreateByAdmin, UserProfileUpdate, UserProfileView};
