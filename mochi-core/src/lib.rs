//! Mochi Core
//!
//! Core types and abstractions for the Mochi backtest launcher.
//!
//! This crate contains:
//! - Domain types: backtest requests, group tags, artifact keys, job nodes and stages
//! - DTOs: Data transfer objects exchanged between the launcher, client and CLI

pub mod domain;
pub mod dto;
