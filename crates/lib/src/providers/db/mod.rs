//! # Storage Providers

pub mod sqlite;
