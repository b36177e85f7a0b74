pub mod config;
pub mod documents;
pub mod error;
pub mod services;
pub mod state;
