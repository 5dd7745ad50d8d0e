pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod chat;
pub mod connection;
pub mod matchmaker;
#[cfg(test)]
mod matchmaker_test;
pub mod notification;
pub mod profile;
#[cfg(test)]
mod profile_test;
pub mod user_chat;
