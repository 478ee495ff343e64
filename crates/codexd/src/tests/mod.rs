//! Crate-level test suites.
