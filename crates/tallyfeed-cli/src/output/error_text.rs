use tallyfeed_client::ClientError;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Export did not complete.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
        String::new(),
        "What to do next:".to_string(),
    ];

    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use tallyfeed_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_code_details_and_numbered_steps() {
        let error = ClientError::fetch_http_status("http://127.0.0.1:9/api/transactions", 503);

        let rendered = render_error(&error);
        assert!(rendered.starts_with("Export did not complete."));
        assert!(rendered.contains("  Error:    fetch_http_status"));
        assert!(rendered.contains("HTTP 503"));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. Verify the base URL"));
        assert!(rendered.contains("  2. Rerun the export"));
    }

    #[test]
    fn falls_back_to_retry_hint() {
        let error = ClientError::internal_serialization("boom");
        assert!(render_error(&error).contains("  1. Retry the command."));
    }
}
