pub mod event;
pub mod mail_settings;
pub mod media;
pub mod user;
