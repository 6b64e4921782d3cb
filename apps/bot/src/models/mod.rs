pub mod message;
pub mod usage;
pub mod vehicle;

pub use message::{
    ChatKind, ChatProfile, Command, EventKind, InboundEvent, RegistrationQuery, Sender,
    UsageIdentity,
};
pub use usage::{NewUsageEvent, UsageStats};
pub use vehicle::{Defect, MotTest, MotVehicle, VesVehicle};
