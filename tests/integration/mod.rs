//! Integration tests for the customer dashboard.

pub mod postgres_test;
pub mod seeded_test;
