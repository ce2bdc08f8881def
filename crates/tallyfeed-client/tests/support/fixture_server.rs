use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use serde_json::{Value, json};

/// Canned reply served once per accepted connection.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn ok_envelope(rows: &[Value]) -> Self {
        Self {
            status: 200,
            body: json!({"ok": true, "data": rows}).to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

pub struct FixtureServer {
    pub base_url: String,
    handle: JoinHandle<Vec<String>>,
}

impl FixtureServer {
    /// Request lines seen by the server, e.g. `GET /api/transactions?... HTTP/1.1`.
    pub fn request_lines(self) -> Vec<String> {
        self.handle.join().unwrap_or_default()
    }
}

pub fn serve(responses: Vec<CannedResponse>) -> std::io::Result<FixtureServer> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for response in responses {
            let Ok((stream, _)) = listener.accept() else {
                break;
            };
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                break;
            }
            seen.push(request_line.trim_end().to_string());
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) if header == "\r\n" || header == "\n" => break,
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }

            let mut stream = reader.into_inner();
            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                reason(response.status),
                response.body.len(),
                response.body
            );
            let _ = stream.write_all(reply.as_bytes());
            let _ = stream.flush();
        }
        seen
    });

    Ok(FixtureServer { base_url, handle })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

pub fn api_row(id: &str, amount_minor: i64, occurred_at: &str, counterparty: &str) -> Value {
    json!({
        "id": id,
        "provider": "Starling",
        "amountMinor": amount_minor,
        "currency": "GBP",
        "occurredAt": occurred_at,
        "personName": counterparty,
        "raw": {
            "feedItemUid": format!("fi_{id}"),
            "counterPartyName": counterparty,
            "source": "FASTER_PAYMENTS_IN",
            "status": "SETTLED"
        }
    })
}

pub fn imported_row(id: &str, amount_minor: i64, occurred_at: &str, person: &str) -> Value {
    json!({
        "id": id,
        "provider": "Starling",
        "amountMinor": amount_minor,
        "currency": "GBP",
        "occurredAt": occurred_at,
        "personName": person,
        "sourceFile": "statement-2023.csv",
        "metadata": {"direction": "OUT"}
    })
}
