// src/core/sanitize.rs
use std::path::Path;

/// Substrings dropped from placemark names, applied in this order.
/// `lp-` has to go before `lp`.
const NAME_NOISE: [&str; 5] = ["lp-", "lp", "area", "fall", "land"];

/// `LP-D10` / `LPD10` → `d10`: drop the two-letter region prefix, lowercase, no hyphens.
pub fn region_key(ident: &str) -> String {
    ident.get(2..)
        .unwrap_or_default()
        .to_lowercase()
        .replace('-', "")
        .trim()
        .to_string()
}

/// Lookup key for a placemark name: `LP-D10 AREA` → `d10`.
/// `None` when nothing is left after the noise words are removed.
pub fn placemark_key(name: &str) -> Option<String> {
    let mut key = name.trim().to_lowercase();
    for noise in NAME_NOISE {
        key = key.replace(noise, "");
    }
    key.split_whitespace().next().map(str::to_string)
}

/// Display name for an output file: stem without extension, trimmed.
pub fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_key_variants() {
        assert_eq!(region_key("LPD10"), "d10");
        assert_eq!(region_key("LP-D10"), "d10");
        assert_eq!(region_key("LPR42A-B"), "r42ab");
        assert_eq!(region_key("LP"), "");
    }

    #[test]
    fn placemark_key_strips_noise_words() {
        assert_eq!(placemark_key("LP-D10 AREA").as_deref(), Some("d10"));
        assert_eq!(placemark_key("LP-D10").as_deref(), Some("d10"));
        assert_eq!(placemark_key("  LPR42 Fall Zone ").as_deref(), Some("r42"));
        assert_eq!(placemark_key("Landing LP-T5").as_deref(), Some("ing"));
    }

    #[test]
    fn placemark_key_noise_order() {
        // "lp-" goes first, then the bare "lp" left behind
        assert_eq!(placemark_key("lp-lp9").as_deref(), Some("9"));
        assert_eq!(placemark_key("LPlp-D3").as_deref(), Some("d3"));
    }

    #[test]
    fn placemark_key_empty_after_noise() {
        assert_eq!(placemark_key("LP AREA"), None);
        assert_eq!(placemark_key("   "), None);
        assert_eq!(placemark_key(""), None);
    }

    #[test]
    fn document_title_uses_stem() {
        assert_eq!(document_title(Path::new("Active Regions.kml")), "Active Regions");
        assert_eq!(document_title(Path::new("out/dir/ Today .kml")), "Today");
    }
}
