//! BookDiscover backend: demo library sync, settings, logs, feedback and
//! trope-based book recommendations over an axum HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
