//! Integration tests for httpscope
//!
//! These tests drive the observer through real actix services and a mocked
//! ingestion API.

pub mod delivery_tests;
pub mod error_handling_tests;
pub mod middleware_tests;
