// src/config/consts.rs

// Files
pub const HTML_FILE: &str = "AUP_UUP Details.htm";
pub const INPUT_KML: &str = "Data Base.kml";
pub const OUTPUT_KML: &str = "Active Regions.kml";
pub const TRACEBACK_FILE: &str = "Traceback.txt";
pub const LOG_FILE: &str = "aup_kml.log";

// KML (GE Pro writes 2.2)
pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";

// Folders copied into the output as-is
pub const FULL_COPY: &[&str] = &[
    "SUPLEMENTOS ACTIVIDADES",
    "ESPAÇO AÉREO",
    "AERODROMOS E CAMPOS VOO",
];
pub const UNNAMED_FOLDER: &str = "Unnamed Folder";

// Portal
pub const PORTAL_URL: &str = "https://www.public.nm.eurocontrol.int/PUBPORTAL/gateway/spec/";
pub const SLOT_LABEL_FORMAT: &str = "%d/%m/%Y %H:%M";
pub const SLOT_MINUTES: i64 = 30;
pub const LOOKBACK_SLOTS: usize = 49; // 24h back, both ends included
pub const CLICK_TIMEOUT_MS: u64 = 2000;
pub const NODE_BIN: &str = "node";
pub const NAVIGATION_TIMEOUT_MS: u64 = 60_000;
