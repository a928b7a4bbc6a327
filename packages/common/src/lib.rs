pub mod event_type;
pub mod media_kind;
pub mod payment_status;
pub mod storage;

pub use event_type::EventType;
pub use media_kind::MediaKind;
pub use payment_status::PaymentStatus;
