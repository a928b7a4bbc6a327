mod common;

mod admin;
mod event;
mod upload;
