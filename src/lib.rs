pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod mistral_client;
