//! Data types shared between the document backend and its clients.
//!
//! Everything here is plain serde data: the document listing, the editor
//! configuration handed to client editors, and the callback payloads sent by
//! the editing server.

pub mod model;
pub mod requests;
