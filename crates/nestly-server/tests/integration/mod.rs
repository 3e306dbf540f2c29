mod api_tests;
mod engagement_api_tests;
pub mod common;
