//! Customer dashboard data-access layer.
//!
//! Runs fixed aggregate queries over customer and transaction tables and
//! shapes the results into KPI numbers and declarative chart specs.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod logging;
