//! Safety plan wizard and document export
//!
//! Collects a six-section personal safety plan and exports it as a
//! single-page PDF, with a JSON snapshot kept in a local store.

pub mod app;
pub mod config;
pub mod domain;
pub mod storage;
pub mod ui;
