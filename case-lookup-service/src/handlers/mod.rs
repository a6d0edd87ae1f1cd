//! HTTP handlers for the case lookup service.

pub mod app;
pub mod case;
pub mod metrics;
