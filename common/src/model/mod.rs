pub mod callback;
pub mod document;
pub mod editor_config;
