use std::io;

use serde::Serialize;
use tallyfeed_client::contracts::envelope::failure_from_error;
use tallyfeed_client::{ClientError, SuccessEnvelope};

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    serialize_json_pretty(success)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tallyfeed_client::{ClientError, SuccessEnvelope};

    use super::{render_error_json, render_success_json};

    #[test]
    fn success_json_keeps_envelope_fields() {
        let payload = SuccessEnvelope {
            ok: true,
            command: "export".to_string(),
            version: "0.1.0".to_string(),
            data: json!({"summary": {"rows_written": 3}}),
        };

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["command"], "export");
                assert_eq!(value["data"]["summary"]["rows_written"], 3);
            }
        }
    }

    #[test]
    fn error_json_uses_failure_envelope() {
        let error = ClientError::response_rejected("maintenance");
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(false));
                assert_eq!(value["error"]["code"], "response_rejected");
                assert!(value["error"]["recovery_steps"].is_array());
            }
        }
    }
}
