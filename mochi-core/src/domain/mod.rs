//! Core domain types
//!
//! This module contains the domain structures shared by the launcher service
//! (which builds and submits the job chain) and the client tooling (which
//! triggers launches and reads their receipts).

pub mod artifact;
pub mod group_tag;
pub mod job;
pub mod parameters;
pub mod request;
pub mod stage;
