//! Data Transfer Objects for the launcher HTTP API
//!
//! This module contains the request and response bodies exchanged between
//! the launcher and its callers (the client crate and the CLI).

pub mod backtest;
pub mod echo;
