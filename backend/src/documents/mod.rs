//! Document storage, editor configuration and callback handling.

pub mod callback;
pub mod editor_config;
pub mod fetch;
pub mod forms;
pub mod keys;
pub mod locks;
pub mod naming;
pub mod service;
pub mod store;
pub mod submissions;
