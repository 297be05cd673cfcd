pub mod celebrate;
pub mod config;
pub mod prompts;
