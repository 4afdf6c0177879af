pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod json_responses;
pub mod logging;
pub mod multipart;
pub mod server;
pub mod storage;
pub mod web_handlers;

#[cfg(test)]
mod tests;
