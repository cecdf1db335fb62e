// src/handlers/mod.rs

pub mod chapters;
pub mod pages;
pub mod quiz;
pub mod tasks;
pub mod tenants;
