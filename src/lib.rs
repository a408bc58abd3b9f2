//! Kanban boards whose columns, tasks and subtasks keep dense, unique
//! positions through every create, delete, reorder and move.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod http;
pub mod model;
pub mod position;
pub mod service;
pub mod tui;
pub mod watch;

pub use error::{Error, ErrorKind, Result};
