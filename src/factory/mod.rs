pub mod connection;
pub mod profile;
pub mod user;
