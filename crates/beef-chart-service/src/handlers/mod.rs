//! API handlers.

pub mod admin;
pub mod cuts;
pub mod health;
