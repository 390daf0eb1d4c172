pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{
    AlertEmailRequest, AlertMailRequest, ComparisonQuery, ComparisonResponse, ConfirmEmailRequest,
    CurrentReadings, LatestReading, Payload,
};
