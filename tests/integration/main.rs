//! Integration tests against a running server.
//!
//! Start the server (with a migrated database) on localhost:8080, then:
//! `cargo test -- --ignored`

mod api_tests;
mod lifecycle_tests;
