pub mod admin;
pub mod auth;
pub mod event;
pub mod media;
pub mod payment;
pub mod shared;
