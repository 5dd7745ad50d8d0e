pub mod ai_message;
pub mod connection;
pub mod profile;
pub mod user;
pub mod user_message;
