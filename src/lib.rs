// src/lib.rs

pub mod config;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod models;
pub mod quiz;
pub mod repository;
pub mod routes;
pub mod state;
pub mod tenant;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
