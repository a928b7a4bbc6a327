pub mod admin;
pub mod auth;
pub mod event;
pub mod files;
pub mod guest;
pub mod health;
pub mod media;
pub mod payment;
