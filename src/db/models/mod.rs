// src/db/models/mod.rs

//! Data models for statistics database entities

mod statistic;

pub use statistic::{PackageStatistic, investigation_count, record_investigation};
