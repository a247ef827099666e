// src/config/options.rs
use std::path::PathBuf;
use super::consts::*;

/// Everything one run needs. Built from `consts` and overridden by the CLI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub input_html_path: PathBuf,
    pub input_kml_path: PathBuf,
    pub output_kml_path: PathBuf,
    pub kml_namespace: String,
    pub full_copy_folders: Vec<String>,
    pub traceback_path: PathBuf,
    pub log_path: PathBuf,
    pub fetch: FetchOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_html_path: PathBuf::from(HTML_FILE),
            input_kml_path: PathBuf::from(INPUT_KML),
            output_kml_path: PathBuf::from(OUTPUT_KML),
            kml_namespace: KML_NS.to_string(),
            full_copy_folders: FULL_COPY.iter().map(|s| s.to_string()).collect(),
            traceback_path: PathBuf::from(TRACEBACK_FILE),
            log_path: PathBuf::from(LOG_FILE),
            fetch: FetchOptions::default(),
        }
    }
}

impl Config {
    /// Title written into the output `<Document><name>`: file stem, trimmed.
    pub fn output_name(&self) -> String {
        crate::core::sanitize::document_title(&self.output_kml_path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// Download a fresh snapshot before parsing; otherwise reuse `input_html_path`.
    pub online: bool,
    pub portal_url: String,
    pub headless: bool,
    pub click_timeout_ms: u64,
    pub lookback_slots: usize,
    pub node_path: PathBuf,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            online: true,
            portal_url: PORTAL_URL.to_string(),
            headless: true,
            click_timeout_ms: CLICK_TIMEOUT_MS,
            lookback_slots: LOOKBACK_SLOTS,
            node_path: PathBuf::from(NODE_BIN),
        }
    }
}
