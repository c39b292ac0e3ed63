//! HTTP route handlers, grouped by the resource they serve.

pub mod auth;
pub mod chat;
pub mod health;
pub mod system;
pub mod vault;
pub mod workbench;
