//! Echo DTOs

use serde::{Deserialize, Serialize};

/// Response of `POST /echo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoResponse {
    pub message: String,
    pub ticker: String,
    /// The event as the launcher saw it
    pub input: serde_json::Value,
}
