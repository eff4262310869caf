//! # Admin Authentication

pub mod middleware;
