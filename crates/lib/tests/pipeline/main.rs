//! End-to-end tests for the deploy pipeline against a mocked API and edge.

mod common;
mod deploy_tests;
mod runtime_tests;
