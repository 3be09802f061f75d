//! Echo API Handler
//!
//! Reports the ticker a trigger would launch without submitting anything.

use axum::{
    Json,
    body::Bytes,
    extract::Query,
};
use mochi_core::domain::request::extract_ticker;
use mochi_core::dto::echo::EchoResponse;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// POST /echo
pub async fn echo(
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Json<EchoResponse> {
    let event = build_event(&params, &body);
    let ticker = extract_ticker(&event);

    tracing::info!("Echo request for ticker {}", ticker);

    Json(EchoResponse {
        message: format!("Processing ticker: {}", ticker),
        ticker,
        input: event,
    })
}

/// Shape the request like a proxy event: raw body as a string, query
/// parameters alongside
fn build_event(params: &HashMap<String, String>, body: &[u8]) -> Value {
    let mut event = Map::new();

    if !body.is_empty() {
        event.insert(
            "body".to_string(),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        );
    }

    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<_, _>>();
        event.insert("queryStringParameters".to_string(), Value::Object(query));
    }

    Value::Object(event)
}
