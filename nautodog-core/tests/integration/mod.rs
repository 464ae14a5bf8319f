//! Integration test modules

mod config_tests;
mod session_tests;
mod upload_tests;
