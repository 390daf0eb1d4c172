//! Climate Dash - client for the Altbau/Neubau environmental monitoring backend
//!
//! This library exposes the chart shaping pipeline, the threshold mapper,
//! the API client and the polling runtime for testing and reuse.

pub mod api;
pub mod chart;
pub mod common;
pub mod config;
pub mod error;
pub mod metric;
pub mod poll;
pub mod thresholds;
