// src/kml/merge.rs
use std::collections::BTreeSet;

use super::document::{ child, is_kml, set_text, text_of, text_of_child, Element, KmlDocument, Node };
use super::{ DESCRIPTION, FOLDER, NAME, PLACEMARK };
use crate::config::consts::UNNAMED_FOLDER;
use crate::core::sanitize::placemark_key;
use crate::error::AupError;
use crate::specs::aup::RegionTable;

/// Between the merged windows and a description the template already had.
pub const DESCRIPTION_SEP: &str = "\n \n";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolderAction {
    /// Listed as full-copy; untouched.
    Copied,
    /// Placemarks filtered against the region table.
    Filtered { kept: usize, removed: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderReport {
    pub name: String,
    pub action: FolderAction,
}

/// What a merge did, folder by folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub folders: Vec<FolderReport>,
    /// Region keys that matched at least one placemark.
    pub matched: BTreeSet<String>,
}

impl MergeReport {
    pub fn kept(&self) -> usize {
        self.folders.iter().map(|f| match f.action {
            FolderAction::Filtered { kept, .. } => kept,
            FolderAction::Copied => 0,
        }).sum()
    }

    pub fn removed(&self) -> usize {
        self.folders.iter().map(|f| match f.action {
            FolderAction::Filtered { removed, .. } => removed,
            FolderAction::Copied => 0,
        }).sum()
    }
}

#[derive(Debug)]
pub struct MergeOutput {
    pub bytes: Vec<u8>,
    pub report: MergeReport,
}

/// Load `template`, merge `regions` into it and serialize.
/// `output_name` becomes the document title; folders named in `full_copy` pass through as-is.
pub fn merge(
    template: &str,
    output_name: &str,
    full_copy: &[String],
    namespace: &str,
    regions: &RegionTable,
) -> Result<MergeOutput, AupError> {
    let mut doc = KmlDocument::parse(template, namespace)?;
    let report = merge_into(&mut doc, output_name, full_copy, regions);
    let bytes = doc.to_bytes()?;
    Ok(MergeOutput { bytes, report })
}

/// In-place part of `merge`: rename, then walk the top-level folders.
pub fn merge_into(
    doc: &mut KmlDocument,
    output_name: &str,
    full_copy: &[String],
    regions: &RegionTable,
) -> MergeReport {
    doc.set_name(output_name);

    let ns = doc.namespace().to_string();
    let mut report = MergeReport::default();

    for node in doc.container_mut().children.iter_mut() {
        let Node::Element(folder) = node else { continue };
        if !is_kml(folder, FOLDER, &ns) {
            continue;
        }

        let name = text_of_child(folder, NAME, &ns).unwrap_or_else(|| UNNAMED_FOLDER.to_string());

        if full_copy.iter().any(|f| *f == name) {
            logd!("KML: full copy of folder '{name}'");
            report.folders.push(FolderReport { name, action: FolderAction::Copied });
            continue;
        }

        let (kept, removed) = filter_folder(folder, &ns, regions, &mut report.matched);
        logd!("KML: folder '{name}': kept {kept}, removed {removed}");
        report.folders.push(FolderReport { name, action: FolderAction::Filtered { kept, removed } });
    }

    report
}

/// Drop placemarks without a region, annotate the rest. Returns (kept, removed).
fn filter_folder(
    folder: &mut Element,
    ns: &str,
    regions: &RegionTable,
    matched: &mut BTreeSet<String>,
) -> (usize, usize) {
    let before = folder.children.len();
    let mut kept = 0usize;

    folder.children.retain_mut(|node| {
        let Node::Element(pm) = node else { return true };
        if !is_kml(pm, PLACEMARK, ns) {
            return true;
        }

        let key = text_of_child(pm, NAME, ns).and_then(|n| placemark_key(&n));
        let Some((key, windows)) = key.and_then(|k| regions.get(&k).map(|w| (k, w))) else {
            return false;
        };

        annotate(pm, ns, windows);
        matched.insert(key);
        kept += 1;
        true
    });

    (kept, before - folder.children.len())
}

/// New windows first, then whatever the template already said. Written as CDATA.
fn annotate(pm: &mut Element, ns: &str, windows: &[String]) {
    let merged = windows.join("\n");
    let previous = child(pm, DESCRIPTION, ns).and_then(text_of);

    let text = match previous {
        Some(old) if !old.trim().is_empty() => format!("{merged}{DESCRIPTION_SEP}{old}"),
        _ => merged,
    };
    set_text(pm, DESCRIPTION, ns, Node::CData(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::KML_NS;
    use crate::kml::document::{ child, children };

    fn regions() -> RegionTable {
        [
            ("d10".to_string(), vec!["10:00 - 12:00 | 10000 ft AMSL".to_string()]),
            ("r42".to_string(), vec![
                "08:00 - 09:00 | GND AMSL".to_string(),
                "13:00 - 14:00 | GND/FL245 AMSL".to_string(),
            ]),
        ]
        .into_iter()
        .collect()
    }

    const TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Data Base</name>
    <Style id="red"><LineStyle><color>ff0000ff</color></LineStyle></Style>
    <Folder>
      <name>ESPAÇO AÉREO</name>
      <Placemark><name>LPPC FIR</name></Placemark>
      <Placemark><name>LP-Z9</name></Placemark>
    </Folder>
    <Folder>
      <name>Zones</name>
      <Placemark><name>LP-D10 AREA</name><styleUrl>#red</styleUrl></Placemark>
      <Placemark><name>LP-Z9</name></Placemark>
      <Placemark><name>LPR42 Fall</name><description>Glider site</description></Placemark>
      <Placemark><name>  </name></Placemark>
      <Placemark></Placemark>
    </Folder>
  </Document>
</kml>"#;

    fn full_copy() -> Vec<String> {
        vec!["ESPAÇO AÉREO".to_string()]
    }

    fn description(doc: &KmlDocument, folder: &str, placemark: &str) -> Option<String> {
        let f = doc
            .folders()
            .find(|f| text_of_child(f, NAME, KML_NS).as_deref() == Some(folder))?;
        let pm = children(f, PLACEMARK, KML_NS)
            .find(|p| text_of_child(p, NAME, KML_NS).as_deref() == Some(placemark))?;
        text_of_child(pm, DESCRIPTION, KML_NS)
    }

    #[test]
    fn filters_and_annotates() {
        let mut doc = KmlDocument::parse(TEMPLATE, KML_NS).unwrap();
        let report = merge_into(&mut doc, "Active Regions", &full_copy(), &regions());

        assert_eq!(doc.placemark_names("Zones"), vec!["LP-D10 AREA", "LPR42 Fall"]);
        assert_eq!(
            description(&doc, "Zones", "LP-D10 AREA").as_deref(),
            Some("10:00 - 12:00 | 10000 ft AMSL")
        );
        assert_eq!(
            description(&doc, "Zones", "LPR42 Fall").as_deref(),
            Some("08:00 - 09:00 | GND AMSL\n13:00 - 14:00 | GND/FL245 AMSL\n \nGlider site")
        );

        assert_eq!(report.folders.len(), 2);
        assert_eq!(report.folders[0].action, FolderAction::Copied);
        assert_eq!(report.folders[1].action, FolderAction::Filtered { kept: 2, removed: 3 });
        assert_eq!(report.kept(), 2);
        assert_eq!(report.removed(), 3);
        assert_eq!(report.matched.iter().map(String::as_str).collect::<Vec<_>>(), vec!["d10", "r42"]);
    }

    #[test]
    fn full_copy_folder_untouched() {
        let before = KmlDocument::parse(TEMPLATE, KML_NS).unwrap();
        let mut doc = before.clone();
        merge_into(&mut doc, "x", &full_copy(), &RegionTable::default());

        let pick = |d: &KmlDocument| d.folders().next().cloned().unwrap();
        assert_eq!(pick(&before), pick(&doc));
        assert_eq!(doc.placemark_names("ESPAÇO AÉREO"), vec!["LPPC FIR", "LP-Z9"]);
    }

    #[test]
    fn non_folder_children_survive() {
        let mut doc = KmlDocument::parse(TEMPLATE, KML_NS).unwrap();
        merge_into(&mut doc, "x", &full_copy(), &RegionTable::default());
        assert!(child(doc.container(), "Style", KML_NS).is_some());
        // styleUrl of a kept placemark is left alone
        let mut doc = KmlDocument::parse(TEMPLATE, KML_NS).unwrap();
        merge_into(&mut doc, "x", &full_copy(), &regions());
        let zones = doc.folders().nth(1).unwrap();
        let d10 = children(zones, PLACEMARK, KML_NS).next().unwrap();
        assert_eq!(text_of_child(d10, "styleUrl", KML_NS).as_deref(), Some("#red"));
    }

    #[test]
    fn whitespace_only_description_is_replaced_not_joined() {
        let text = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document><name>a</name>
            <Folder><name>Zones</name>
              <Placemark><name>LP-D10</name><description>   </description></Placemark>
            </Folder></Document></kml>"#;
        let mut doc = KmlDocument::parse(text, KML_NS).unwrap();
        merge_into(&mut doc, "x", &[], &regions());
        assert_eq!(
            description(&doc, "Zones", "LP-D10").as_deref(),
            Some("10:00 - 12:00 | 10000 ft AMSL")
        );
    }

    #[test]
    fn unnamed_folder_is_filtered() {
        let text = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
            <Folder><Placemark><name>LP-Q1</name></Placemark></Folder></Document></kml>"#;
        let mut doc = KmlDocument::parse(text, KML_NS).unwrap();
        let report = merge_into(&mut doc, "x", &full_copy(), &regions());
        assert_eq!(report.folders[0].name, UNNAMED_FOLDER);
        assert_eq!(report.folders[0].action, FolderAction::Filtered { kept: 0, removed: 1 });
    }

    #[test]
    fn serialized_output_uses_cdata() {
        let out = merge(TEMPLATE, "Active Regions", &full_copy(), KML_NS, &regions()).unwrap();
        let text = String::from_utf8(out.bytes).unwrap();
        assert!(text.contains("<![CDATA[10:00 - 12:00 | 10000 ft AMSL]]>"));
        assert!(text.contains("<name>Active Regions</name>"));
        // only the full-copy folder still has one
        assert_eq!(text.matches("LP-Z9").count(), 1);
    }
}
