pub mod auth;
pub mod chat;
pub mod common;
pub mod connection;
pub mod matchmaker;
pub mod notification;
pub mod profile;
pub mod user_chat;
