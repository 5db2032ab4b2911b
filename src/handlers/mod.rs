// src/handlers/mod.rs

pub mod admin;
pub mod catalog;
pub mod events;
pub mod results;
