//! Mochi backtest launcher
//!
//! HTTP service that turns a backtest trigger into a chain of dependent batch
//! jobs. The binary in `main.rs` wires configuration and backends; everything
//! else lives here so it can be driven from integration tests.

pub mod api;
pub mod backend;
pub mod config;
pub mod service;
pub mod state;
