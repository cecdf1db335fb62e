// src/models/mod.rs

pub mod chapter;
pub mod task;
pub mod tenant;
