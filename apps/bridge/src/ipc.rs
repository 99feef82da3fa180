//! # IPC Channel
//!
//! One JSON request per input line, one JSON response per output line.
//!
//! ```text
//! stdin  ──► {"id": 1, "cmd": "list_products"}
//! stdout ◄── {"id": 1, "ok": true, "data": [...], "notices": []}
//!
//! stdin  ──► {"id": 2, "cmd": "complete_sale", "args": {}}
//! stdout ◄── {"id": 2, "ok": false, "error": {"code": "SALE_ERROR", ...}}
//! ```
//!
//! Requests are handled strictly in order; the state lock is held for the
//! whole of each request. End of input ends the loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::commands;
use crate::error::ApiError;
use crate::state::{Notice, SharedState};

/// A request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Echoed back unchanged; any JSON value.
    #[serde(default)]
    pub id: Value,
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

/// A response line.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notices: Option<Vec<Notice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn success(id: Value, data: Value, notices: Vec<Notice>) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            notices: Some(notices),
            error: None,
        }
    }

    pub fn failure(id: Value, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            notices: None,
            error: Some(error),
        }
    }
}

/// Handles one raw request line.
///
/// Notices queued by a failed command stay queued for the next success.
pub async fn handle_line(state: &SharedState, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed request");
            return Response::failure(
                Value::Null,
                ApiError::bad_request(format!("Malformed request: {}", e)),
            );
        }
    };

    let start = Instant::now();
    let mut app = state.lock().await;
    let result = commands::dispatch(&mut app, &request.cmd, request.args).await;

    debug!(
        cmd = %request.cmd,
        ok = result.is_ok(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Request handled"
    );

    match result {
        Ok(data) => Response::success(request.id, data, app.take_notices()),
        Err(error) => {
            debug!(cmd = %request.cmd, error = %error, "Command failed");
            Response::failure(request.id, error)
        }
    }
}

/// Serves requests from `reader` until end of input.
pub async fn serve<R, W>(state: SharedState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Listening for requests");
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&state, &line).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_state;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::BufReader;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_serve_answers_each_line_in_order() {
        let (app, _kv) = seeded_state().await;
        let state = Arc::new(Mutex::new(app));

        let input = concat!(
            "{\"id\": 1, \"cmd\": \"list_products\"}\n",
            "\n",
            "not json\n",
            "{\"id\": \"x\", \"cmd\": \"fly\"}\n",
            "{\"id\": 3, \"cmd\": \"get_sale_draft\", \"args\": null}\n",
        );
        let mut output = Vec::new();
        serve(state, BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let responses: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[0]["data"].as_array().unwrap().len(), 5);
        assert_eq!(responses[0]["notices"], json!([]));

        assert_eq!(responses[1]["ok"], false);
        assert_eq!(responses[1]["error"]["code"], "BAD_REQUEST");

        assert_eq!(responses[2]["id"], "x");
        assert_eq!(responses[2]["error"]["message"], "Unknown command: fly");

        assert_eq!(responses[3]["data"]["state"], "empty");
    }

    #[tokio::test]
    async fn test_save_failure_is_a_notice_not_an_error() {
        let (app, kv) = seeded_state().await;
        let state = Arc::new(Mutex::new(app));
        kv.set_fail_on_save(true).await;

        let request = json!({
            "id": 9,
            "cmd": "record_purchase",
            "args": {"productName": "Tea", "quantity": "1", "cost": "10", "supplier": "Acme"}
        });
        let response = handle_line(&state, &request.to_string()).await;

        assert!(response.ok);
        let notices = response.notices.unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("purchases"));
        assert_eq!(state.lock().await.store.purchases().len(), 1);
    }

    #[tokio::test]
    async fn test_every_listed_command_is_known() {
        let (app, _kv) = seeded_state().await;
        let state = Arc::new(Mutex::new(app));

        for cmd in crate::commands::COMMANDS {
            if *cmd == "clear_all_data" {
                continue;
            }
            let response = handle_line(&state, &format!(r#"{{"cmd": "{}"}}"#, cmd)).await;
            if let Some(error) = response.error {
                assert!(
                    !error.message.starts_with("Unknown command"),
                    "{} is not dispatched",
                    cmd
                );
            }
        }
    }
}
