// src/fetch/bridge.rs
//! Playwright over a Node.js child process.
//!
//! The bridge script is passed to `node -e`, so `require('playwright')` resolves
//! from the working directory. Requests and replies are one JSON object per
//! line on the child's stdin/stdout; stderr is forwarded to the debug log.

use std::io::{ BufRead, BufReader, ErrorKind, Write };
use std::process::{ Child, ChildStdin, ChildStdout, Command, Stdio };

use serde::{ Deserialize, Serialize };
use serde_json::{ json, Value };

use super::{ first_available, LookbackWindow, PageSource };
use crate::config::consts::NAVIGATION_TIMEOUT_MS;
use crate::config::FetchOptions;
use crate::error::AupError;
use crate::progress::Progress;

const BRIDGE_SCRIPT: &str = include_str!("bridge_script.js");

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<BridgeErrorResponse>,
}

#[derive(Debug, Deserialize)]
struct BridgeErrorResponse {
    message: String,
}

/// Opens the portal in Chromium and clicks through the snapshot links.
pub struct PlaywrightSource {
    options: FetchOptions,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    next_id: u64,
}

impl PlaywrightSource {
    pub fn new(options: FetchOptions) -> Self {
        Self { options, child: None, stdin: None, stdout: None, next_id: 1 }
    }

    fn start(&mut self) -> Result<(), AupError> {
        let node = &self.options.node_path;
        let mut child = Command::new(node)
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AupError::Bridge(format!(
                    "Node.js not found at '{}'; install Node.js and run `npm install playwright`",
                    node.display()
                )),
                _ => AupError::Bridge(format!("failed to start bridge: {e}")),
            })?;

        if let Some(stderr) = child.stderr.take() {
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    logw!("[bridge] {line}");
                }
            });
        }

        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take().map(BufReader::new);
        self.child = Some(child);

        let ready = self.call("ping", json!({}))?;
        if ready.as_str() != Some("pong") {
            return Err(AupError::Bridge(String::from("bridge did not answer ping")));
        }
        logf!("Fetch: bridge started");
        Ok(())
    }

    /// One request, one reply. Lines that are not replies to `id` are skipped.
    fn call(&mut self, method: &str, params: Value) -> Result<Value, AupError> {
        let id = self.next_id;
        self.next_id += 1;

        let line = serde_json::to_string(&BridgeRequest { id, method, params })?;
        let stdin = self.stdin.as_mut().ok_or_else(|| AupError::Bridge(String::from("bridge not started")))?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;

        let stdout = self.stdout.as_mut().ok_or_else(|| AupError::Bridge(String::from("bridge not started")))?;
        let mut buf = String::new();
        loop {
            buf.clear();
            if stdout.read_line(&mut buf)? == 0 {
                return Err(AupError::Bridge(format!("bridge exited during '{method}'")));
            }
            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            let reply: BridgeResponse = match serde_json::from_str(text) {
                Ok(r) => r,
                Err(e) => {
                    let head: String = text.chars().take(200).collect();
                    logd!("Fetch: skipping bridge output ({e}): {head}");
                    continue;
                }
            };
            if reply.id != id {
                continue;
            }
            return match reply.error {
                Some(err) => Err(AupError::Bridge(err.message)),
                None => Ok(reply.result.unwrap_or(Value::Null)),
            };
        }
    }

    fn stop(&mut self) {
        if self.stdin.is_some() {
            let _ = self.call("shutdown", json!({}));
        }
        self.stdin = None;
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            if !matches!(child.try_wait(), Ok(Some(_))) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn run(
        &mut self,
        window: &LookbackWindow,
        progress: Option<&mut (dyn Progress + '_)>,
    ) -> Result<String, AupError> {
        self.start()?;
        self.call("open", json!({
            "url": self.options.portal_url,
            "headless": self.options.headless,
            "timeoutMs": NAVIGATION_TIMEOUT_MS,
        }))?;

        let click_timeout_ms = self.options.click_timeout_ms;
        first_available(window, progress, |label| {
            let page = self.call("snapshot", snapshot_params(label, click_timeout_ms))?;
            Ok(page.as_str().map(str::to_string))
        })
    }
}

/// Only a missed click means "no such slot"; the tab it opens may take longer.
fn snapshot_params(label: &str, click_timeout_ms: u64) -> Value {
    json!({
        "label": label,
        "clickTimeoutMs": click_timeout_ms,
        "pageTimeoutMs": NAVIGATION_TIMEOUT_MS,
    })
}

impl PageSource for PlaywrightSource {
    fn fetch(
        &mut self,
        window: &LookbackWindow,
        progress: Option<&mut (dyn Progress + '_)>,
    ) -> Result<String, AupError> {
        let result = self.run(window, progress);
        self.stop();
        result
    }
}

impl Drop for PlaywrightSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn request_wire_format() {
        let req = BridgeRequest { id: 7, method: "snapshot", params: json!({ "label": "19/10/2026 13:30" }) };
        let line = serde_json::to_string(&req).unwrap();
        assert_eq!(line, r#"{"id":7,"method":"snapshot","params":{"label":"19/10/2026 13:30"}}"#);
    }

    #[test]
    fn response_wire_format() {
        let ok: BridgeResponse = serde_json::from_str(r#"{"id":3,"result":null}"#).unwrap();
        assert_eq!(ok.id, 3);
        assert!(ok.error.is_none());
        assert_eq!(ok.result.unwrap_or(Value::Null), Value::Null);

        let err: BridgeResponse = serde_json::from_str(r#"{"id":4,"error":{"message":"boom","code":1}}"#).unwrap();
        assert_eq!(err.error.unwrap().message, "boom");
    }

    #[test]
    fn missing_node_is_a_bridge_error() {
        let options = FetchOptions {
            node_path: PathBuf::from("definitely-not-a-node-binary-7f3a"),
            ..FetchOptions::default()
        };
        let mut source = PlaywrightSource::new(options);
        let window = LookbackWindow::ending_at(chrono::Utc::now(), 1);
        let err = source.fetch(&window, None).unwrap_err();
        assert!(matches!(err, AupError::Bridge(msg) if msg.contains("Node.js not found")));
    }

    #[test]
    fn snapshot_waits_longer_for_the_tab_than_for_the_click() {
        let params = snapshot_params("19/10/2026 13:30", 2000);
        assert_eq!(params["label"], "19/10/2026 13:30");
        assert_eq!(params["clickTimeoutMs"], 2000);
        assert_eq!(params["pageTimeoutMs"], NAVIGATION_TIMEOUT_MS);

        assert!(BRIDGE_SCRIPT.contains("waitForEvent('page', { timeout: params.pageTimeoutMs })"));
        assert!(BRIDGE_SCRIPT.contains("click({ timeout: params.clickTimeoutMs })"));
    }

    #[test]
    fn script_speaks_the_protocol() {
        for method in ["'ping'", "'open'", "'snapshot'", "'shutdown'"] {
            assert!(BRIDGE_SCRIPT.contains(method), "missing {method}");
        }
    }
}
