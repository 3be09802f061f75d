//! Backtest request parsing and validation
//!
//! The launcher is triggered with a loosely structured event: either a proxy
//! envelope whose `body` holds the request (as a JSON string or an object), or
//! the request object itself. Everything here turns that event into a typed
//! [`PipelineRequest`] or a [`ValidationError`] naming the offending field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Default trade duration in hours when the request does not set one
pub const DEFAULT_TRADE_DURATION: u32 = 24;

/// Default trade timeout in hours when the request does not set one
pub const DEFAULT_TRADE_TIMEOUT: u32 = 4;

/// Wire names of the request fields
pub mod fields {
    pub const TICKER: &str = "ticker";
    pub const FROM_DATE: &str = "from_date";
    pub const TO_DATE: &str = "to_date";
    pub const SHORT_ATR_PERIOD: &str = "shortATRPeriod";
    pub const LONG_ATR_PERIOD: &str = "longATRPeriod";
    pub const ALPHA: &str = "alpha";
    pub const TRADE_DURATION: &str = "tradeDuration";
    pub const TRADE_TIMEOUT: &str = "tradeTimeout";

    /// Mandatory fields, in the order their absence is reported
    pub const REQUIRED: [&str; 6] = [
        TICKER,
        FROM_DATE,
        TO_DATE,
        SHORT_ATR_PERIOD,
        LONG_ATR_PERIOD,
        ALPHA,
    ];
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated backtest trigger
///
/// Serialises with the same field names the trigger endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub ticker: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(rename = "shortATRPeriod")]
    pub short_atr_period: u32,
    #[serde(rename = "longATRPeriod")]
    pub long_atr_period: u32,
    pub alpha: f64,
    #[serde(rename = "tradeDuration")]
    pub trade_duration: u32,
    #[serde(rename = "tradeTimeout")]
    pub trade_timeout: u32,
}

/// Request validation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A mandatory field is absent (or null)
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but its value is unusable
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The event or its body is not a JSON object
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// The field this error refers to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::InvalidField { field, .. } => Some(field),
            Self::MalformedBody(_) => None,
        }
    }

    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl PipelineRequest {
    /// Parse a raw HTTP body into a request
    pub fn from_slice(raw: &[u8]) -> Result<Self, ValidationError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MalformedBody(
                "request body is empty".to_string(),
            ));
        }

        let event: Value = serde_json::from_slice(raw)
            .map_err(|e| ValidationError::MalformedBody(format!("invalid JSON: {}", e)))?;

        Self::from_event(&event)
    }

    /// Parse a trigger event
    ///
    /// Accepts a proxy envelope with a string or object `body`, or the
    /// request object itself.
    pub fn from_event(event: &Value) -> Result<Self, ValidationError> {
        let body = extract_body(event)?;
        Self::from_body(&body)
    }

    /// Validate an already unwrapped request object
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        // Presence first, so a missing field is never masked by a bad neighbour
        for field in fields::REQUIRED {
            required(body, field)?;
        }

        let ticker = read_string(required(body, fields::TICKER)?, fields::TICKER)?;
        validate_ticker(&ticker)?;

        let (from_date, from) = read_date(required(body, fields::FROM_DATE)?, fields::FROM_DATE)?;
        let (to_date, to) = read_date(required(body, fields::TO_DATE)?, fields::TO_DATE)?;
        if to < from {
            return Err(ValidationError::invalid(
                fields::TO_DATE,
                format!("{} is before from_date {}", to_date, from_date),
            ));
        }

        let short_atr_period = read_positive_int(
            required(body, fields::SHORT_ATR_PERIOD)?,
            fields::SHORT_ATR_PERIOD,
        )?;
        let long_atr_period = read_positive_int(
            required(body, fields::LONG_ATR_PERIOD)?,
            fields::LONG_ATR_PERIOD,
        )?;
        let alpha = read_alpha(required(body, fields::ALPHA)?)?;

        let trade_duration =
            read_optional_hours(body, fields::TRADE_DURATION, DEFAULT_TRADE_DURATION)?;
        let trade_timeout = read_optional_hours(body, fields::TRADE_TIMEOUT, DEFAULT_TRADE_TIMEOUT)?;

        Ok(Self {
            ticker,
            from_date,
            to_date,
            short_atr_period,
            long_atr_period,
            alpha,
            trade_duration,
            trade_timeout,
        })
    }
}

/// Best-effort ticker lookup used by the echo endpoint
///
/// Looks in the body (string or object), then the query string parameters,
/// then the top level of the event. Never fails: problems are reported in the
/// returned text.
pub fn extract_ticker(event: &Value) -> String {
    const NO_TICKER: &str = "No ticker provided";

    let ticker_of = |value: Option<&Value>| -> String {
        value
            .and_then(|v| v.get(fields::TICKER))
            .and_then(Value::as_str)
            .unwrap_or(NO_TICKER)
            .to_string()
    };

    match event.get("body") {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(body) => ticker_of(Some(&body)),
            Err(e) => {
                tracing::warn!("Error parsing JSON body: {}", e);
                "Error parsing JSON body".to_string()
            }
        },
        Some(body) if !body.is_null() => ticker_of(Some(body)),
        _ => match event.get("queryStringParameters") {
            Some(params) if !params.is_null() => ticker_of(Some(params)),
            _ => ticker_of(Some(event)),
        },
    }
}

// =============================================================================
// Field Readers
// =============================================================================

fn extract_body(event: &Value) -> Result<Map<String, Value>, ValidationError> {
    let envelope = event
        .as_object()
        .ok_or_else(|| ValidationError::MalformedBody("expected a JSON object".to_string()))?;

    match envelope.get("body") {
        Some(Value::String(raw)) => {
            let parsed: Value = serde_json::from_str(raw).map_err(|e| {
                ValidationError::MalformedBody(format!("body is not valid JSON: {}", e))
            })?;
            match parsed {
                Value::Object(body) => Ok(body),
                _ => Err(ValidationError::MalformedBody(
                    "body must encode a JSON object".to_string(),
                )),
            }
        }
        Some(Value::Object(body)) => Ok(body.clone()),
        Some(Value::Null) | None => Ok(envelope.clone()),
        Some(_) => Err(ValidationError::MalformedBody(
            "body must be a JSON object or a string holding one".to_string(),
        )),
    }
}

fn required<'a>(
    body: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn read_string(value: &Value, field: &'static str) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ValidationError::invalid(field, "expected a string"))
}

/// Tickers end up in storage keys and job names, so only symbol characters
/// are accepted: `[A-Za-z0-9.^_-]`, with at least one letter or digit.
fn validate_ticker(ticker: &str) -> Result<(), ValidationError> {
    if ticker.is_empty() {
        return Err(ValidationError::invalid(fields::TICKER, "must not be empty"));
    }

    if let Some(bad) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(*c, '.' | '^' | '_' | '-')))
    {
        return Err(ValidationError::invalid(
            fields::TICKER,
            format!("'{}' contains disallowed character {:?}", ticker, bad),
        ));
    }

    if !ticker.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::invalid(
            fields::TICKER,
            "must contain a letter or digit",
        ));
    }

    Ok(())
}

fn read_date(value: &Value, field: &'static str) -> Result<(String, NaiveDate), ValidationError> {
    let raw = read_string(value, field)?;
    let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|_| ValidationError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", raw)))?;
    Ok((raw, date))
}

fn read_positive_int(value: &Value, field: &'static str) -> Result<u32, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|n| u32::try_from(n).ok()) {
        Some(0) => Err(ValidationError::invalid(field, "must be greater than zero")),
        Some(n) => Ok(n),
        None => Err(ValidationError::invalid(field, "expected a positive integer")),
    }
}

fn read_alpha(value: &Value) -> Result<f64, ValidationError> {
    let alpha = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ValidationError::invalid(fields::ALPHA, "expected a number"))?;

    if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
        return Err(ValidationError::invalid(
            fields::ALPHA,
            format!("{} is outside (0, 1]", alpha),
        ));
    }

    Ok(alpha)
}

fn read_optional_hours(
    body: &Map<String, Value>,
    field: &'static str,
    default: u32,
) -> Result<u32, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => {
            tracing::info!("{} not provided, using default of {} hours", field, default);
            Ok(default)
        }
        Some(value) => read_positive_int(value, field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> Value {
        json!({
            "ticker": "AAPL",
            "from_date": "2024-01-01",
            "to_date": "2024-06-01",
            "shortATRPeriod": 5,
            "longATRPeriod": 20,
            "alpha": 0.1
        })
    }

    #[test]
    fn test_parses_bare_object() {
        let request = PipelineRequest::from_event(&full_body()).unwrap();

        assert_eq!(request.ticker, "AAPL");
        assert_eq!(request.from_date, "2024-01-01");
        assert_eq!(request.to_date, "2024-06-01");
        assert_eq!(request.short_atr_period, 5);
        assert_eq!(request.long_atr_period, 20);
        assert_eq!(request.alpha, 0.1);
    }

    #[test]
    fn test_parses_string_encoded_body() {
        let event = json!({ "body": full_body().to_string() });
        let request = PipelineRequest::from_event(&event).unwrap();
        assert_eq!(request.ticker, "AAPL");
    }

    #[test]
    fn test_parses_object_body() {
        let event = json!({ "body": full_body(), "queryStringParameters": null });
        let request = PipelineRequest::from_event(&event).unwrap();
        assert_eq!(request.long_atr_period, 20);
    }

    #[test]
    fn test_missing_field_is_named() {
        for field in fields::REQUIRED {
            let mut body = full_body();
            body.as_object_mut().unwrap().remove(field);

            let err = PipelineRequest::from_event(&body).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(field));
            assert_eq!(err.field(), Some(field));
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut body = full_body();
        body["alpha"] = Value::Null;

        let err = PipelineRequest::from_event(&body).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("alpha"));
    }

    #[test]
    fn test_missing_reported_before_invalid() {
        let body = json!({
            "ticker": 42,
            "from_date": "2024-01-01",
            "to_date": "2024-06-01",
            "shortATRPeriod": 5,
            "alpha": 0.1
        });

        let err = PipelineRequest::from_event(&body).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("longATRPeriod"));
    }

    #[test]
    fn test_trade_defaults_applied() {
        let request = PipelineRequest::from_event(&full_body()).unwrap();
        assert_eq!(request.trade_duration, 24);
        assert_eq!(request.trade_timeout, 4);
    }

    #[test]
    fn test_trade_values_used_verbatim() {
        let mut body = full_body();
        body["tradeDuration"] = json!(48);
        body["tradeTimeout"] = json!("6");

        let request = PipelineRequest::from_event(&body).unwrap();
        assert_eq!(request.trade_duration, 48);
        assert_eq!(request.trade_timeout, 6);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut body = full_body();
        body["shortATRPeriod"] = json!("7");
        body["alpha"] = json!("0.25");

        let request = PipelineRequest::from_event(&body).unwrap();
        assert_eq!(request.short_atr_period, 7);
        assert_eq!(request.alpha, 0.25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            ("ticker", json!("   ")),
            ("from_date", json!("01/01/2024")),
            ("shortATRPeriod", json!(0)),
            ("longATRPeriod", json!(-3)),
            ("longATRPeriod", json!(2.5)),
            ("alpha", json!(0.0)),
            ("alpha", json!(1.5)),
            ("alpha", json!("fast")),
            ("tradeTimeout", json!("soon")),
        ];

        for (field, value) in cases {
            let mut body = full_body();
            body[field] = value;

            let err = PipelineRequest::from_event(&body).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidField { field: f, .. } if f == field),
                "expected invalid {}, got {:?}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_ticker_outside_symbol_charset_rejected() {
        for ticker in ["../../params/x", "AAPL#frag", "AAPL?q=1", "AA PL", "AAPL/B", "..", "ÄPFEL"] {
            let mut body = full_body();
            body["ticker"] = json!(ticker);

            let err = PipelineRequest::from_event(&body).unwrap_err();
            assert_eq!(err.field(), Some("ticker"), "accepted {:?}", ticker);
        }
    }

    #[test]
    fn test_symbol_tickers_accepted() {
        for ticker in ["AAPL", "BRK.B", "^GSPC", "BF-B", "X_1"] {
            let mut body = full_body();
            body["ticker"] = json!(ticker);

            let request = PipelineRequest::from_event(&body).unwrap();
            assert_eq!(request.ticker, ticker);
        }
    }

    #[test]
    fn test_to_date_before_from_date_rejected() {
        let mut body = full_body();
        body["to_date"] = json!("2023-12-31");

        let err = PipelineRequest::from_event(&body).unwrap_err();
        assert_eq!(err.field(), Some("to_date"));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            PipelineRequest::from_slice(b""),
            Err(ValidationError::MalformedBody(_))
        ));
        assert!(matches!(
            PipelineRequest::from_slice(b"{not json"),
            Err(ValidationError::MalformedBody(_))
        ));
        assert!(matches!(
            PipelineRequest::from_event(&json!({ "body": "[1, 2]" })),
            Err(ValidationError::MalformedBody(_))
        ));
        assert!(matches!(
            PipelineRequest::from_event(&json!(["AAPL"])),
            Err(ValidationError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let request = PipelineRequest::from_event(&full_body()).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["shortATRPeriod"], 5);
        assert_eq!(value["tradeDuration"], 24);
        assert_eq!(value["from_date"], "2024-01-01");
    }

    #[test]
    fn test_extract_ticker_sources() {
        assert_eq!(
            extract_ticker(&json!({ "body": "{\"ticker\": \"MSFT\"}" })),
            "MSFT"
        );
        assert_eq!(
            extract_ticker(&json!({ "body": { "ticker": "TSLA" } })),
            "TSLA"
        );
        assert_eq!(
            extract_ticker(&json!({ "body": null, "queryStringParameters": { "ticker": "NVDA" } })),
            "NVDA"
        );
        assert_eq!(extract_ticker(&json!({ "ticker": "AMD" })), "AMD");
        assert_eq!(extract_ticker(&json!({})), "No ticker provided");
        assert_eq!(
            extract_ticker(&json!({ "body": "{oops" })),
            "Error parsing JSON body"
        );
    }
}
