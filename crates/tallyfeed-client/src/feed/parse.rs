use serde_json::{Map, Value};
use tracing::warn;

use crate::feed::record::RawTransaction;
use crate::{ClientError, ClientResult};

pub(crate) fn parse_response(body: &str) -> ClientResult<Vec<RawTransaction>> {
    let parsed = serde_json::from_str::<Value>(body.trim())
        .map_err(|error| ClientError::response_malformed(&error.to_string()))?;

    let items: &[Value] = match &parsed {
        Value::Array(items) => items.as_slice(),
        Value::Object(envelope) => {
            if envelope.get("ok").and_then(Value::as_bool) == Some(false) {
                let message = envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message provided");
                return Err(ClientError::response_rejected(message));
            }
            match envelope.get("data") {
                None | Some(Value::Null) => &[],
                Some(Value::Array(items)) => items.as_slice(),
                Some(_) => {
                    return Err(ClientError::response_malformed(
                        "top-level `data` field must be an array of transaction objects",
                    ));
                }
            }
        }
        _ => {
            return Err(ClientError::response_malformed(
                "expected a JSON object with a `data` array",
            ));
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            warn!(index, "skipping non-object entry in transactions response");
            continue;
        };
        rows.push(record_from_object(object));
    }

    Ok(rows)
}

pub(crate) fn record_from_object(object: &Map<String, Value>) -> RawTransaction {
    RawTransaction {
        id: read_string(object.get("id")),
        external_id: read_string(object.get("externalId")),
        provider: read_string(object.get("provider")),
        amount_minor: read_minor_units(object.get("amountMinor")),
        currency: read_string(object.get("currency")),
        product_type: read_string(object.get("productType")),
        occurred_at: read_string(object.get("occurredAt")),
        person_name: read_string(object.get("personName")),
        status: read_string(object.get("status")),
        reference: read_string(object.get("reference")),
        description: read_string(object.get("description")),
        lead_id: read_string(object.get("leadId")),
        confidence: read_string(object.get("confidence")),
        source_file: read_string(object.get("sourceFile")),
        created_at: read_string(object.get("createdAt")),
        updated_at: read_string(object.get("updatedAt")),
        raw: object.get("raw").and_then(Value::as_object).cloned(),
        metadata: object.get("metadata").and_then(Value::as_object).cloned(),
    }
}

fn read_string(value: Option<&Value>) -> String {
    let Some(current) = value else {
        return String::new();
    };

    match current {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn read_minor_units(value: Option<&Value>) -> i64 {
    let Some(current) = value else {
        return 0;
    };

    if let Some(integer) = current.as_i64() {
        return integer;
    }

    if let Some(float) = current.as_f64() {
        return float.round() as i64;
    }

    current
        .as_str()
        .and_then(|text| text.trim().parse::<i64>().ok())
        .unwrap_or(0)
}
