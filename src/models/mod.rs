// src/models/mod.rs

pub mod answer_key;
pub mod event;
pub mod grading_record;
