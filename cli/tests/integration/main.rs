//! Integration tests for the mimipanel binary
//!
//! These tests run the built binary and never modify the host.

mod cli_tests;
