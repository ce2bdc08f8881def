use serde_json::{Map, Value};

/// One transaction object as delivered by the ledger service.
///
/// Every scalar field defaults to empty when the service omits it or sends
/// `null`; the nested provider payload (`raw`) and `metadata` stay optional
/// because their absence carries meaning for classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub id: String,
    pub external_id: String,
    pub provider: String,
    pub amount_minor: i64,
    pub currency: String,
    pub product_type: String,
    pub occurred_at: String,
    pub person_name: String,
    pub status: String,
    pub reference: String,
    pub description: String,
    pub lead_id: String,
    pub confidence: String,
    pub source_file: String,
    pub created_at: String,
    pub updated_at: String,
    pub raw: Option<Map<String, Value>>,
    pub metadata: Option<Map<String, Value>>,
}

impl RawTransaction {
    pub fn raw_field(&self, key: &str) -> Option<String> {
        object_field(self.raw.as_ref(), key)
    }

    pub fn metadata_field(&self, key: &str) -> Option<String> {
        object_field(self.metadata.as_ref(), key)
    }

    /// Display text for a provider column: any present, non-null value.
    pub fn raw_text(&self, key: &str) -> String {
        self.raw
            .as_ref()
            .and_then(|raw| raw.get(key))
            .map(display_text)
            .unwrap_or_default()
    }

    /// Date portion of `occurred_at` (`YYYY-MM-DD` for well-formed values).
    pub fn occurred_date(&self) -> &str {
        match self.occurred_at.char_indices().nth(10) {
            Some((index, _)) => &self.occurred_at[..index],
            None => &self.occurred_at,
        }
    }
}

/// Reads a truthy `key` from an optional JSON object, for fallback chains.
///
/// `null`, `false`, and empty strings count as absent.
pub(crate) fn object_field(object: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    let value = object?.get(key)?;
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        other => Some(display_text(other)),
    }
}

/// Strings verbatim, `null` as empty, everything else as its JSON text.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::RawTransaction;

    fn with_raw(raw: serde_json::Value) -> RawTransaction {
        RawTransaction {
            raw: raw.as_object().cloned(),
            ..RawTransaction::default()
        }
    }

    #[test]
    fn raw_field_treats_null_false_and_empty_as_absent() {
        let record = with_raw(json!({
            "a": null,
            "b": false,
            "c": "",
            "d": "x",
            "e": true,
            "f": 12
        }));
        assert_eq!(record.raw_field("a"), None);
        assert_eq!(record.raw_field("b"), None);
        assert_eq!(record.raw_field("c"), None);
        assert_eq!(record.raw_field("d"), Some("x".to_string()));
        assert_eq!(record.raw_field("e"), Some("true".to_string()));
        assert_eq!(record.raw_field("f"), Some("12".to_string()));
        assert_eq!(record.raw_field("missing"), None);
    }

    #[test]
    fn raw_text_keeps_false_and_blanks_null() {
        let record = with_raw(json!({
            "hasReceipt": false,
            "hasAttachment": true,
            "country": null,
            "merchantUid": ""
        }));
        assert_eq!(record.raw_text("hasReceipt"), "false");
        assert_eq!(record.raw_text("hasAttachment"), "true");
        assert_eq!(record.raw_text("country"), "");
        assert_eq!(record.raw_text("merchantUid"), "");
        assert_eq!(record.raw_text("missing"), "");
        assert_eq!(RawTransaction::default().raw_text("hasReceipt"), "");
    }

    #[test]
    fn occurred_date_takes_first_ten_characters() {
        let record = RawTransaction {
            occurred_at: "2024-01-05T10:00:00Z".to_string(),
            ..RawTransaction::default()
        };
        assert_eq!(record.occurred_date(), "2024-01-05");

        let short = RawTransaction {
            occurred_at: "2024-01".to_string(),
            ..RawTransaction::default()
        };
        assert_eq!(short.occurred_date(), "2024-01");
    }
}
