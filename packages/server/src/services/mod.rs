pub mod archive;
pub mod notifier;
pub mod payment;
pub mod transcoder;
pub mod upload;
