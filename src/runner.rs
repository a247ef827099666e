// src/runner.rs
use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::Config,
    error::AupError,
    fetch::{ LookbackWindow, PageSource },
    file::{ read_input, write_output, write_snapshot },
    kml::{ self, MergeReport },
    progress::Progress,
    specs::aup::{ self, RegionTable },
};

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum RunOutcome {
    /// Output KML written.
    Written {
        path: PathBuf,
        regions: RegionTable,
        report: MergeReport,
    },
    /// Nothing active in the table; no output written.
    NoRegions,
}

/// fetch → parse → merge → write.
/// `source` is `None` for offline runs: the HTML at `config.input_html_path` is used as-is.
pub fn run(
    config: &Config,
    source: Option<&mut dyn PageSource>,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<RunOutcome, AupError> {
    if let Some(source) = source {
        let window = LookbackWindow::ending_at(Utc::now(), config.fetch.lookback_slots);
        let html = source.fetch(&window, progress.as_deref_mut())?;
        write_snapshot(&config.input_html_path, &html)?;
        logf!("Fetch: saved snapshot to {}", config.input_html_path.display());
    }

    let html = read_input(&config.input_html_path)?;
    let regions = match aup::parse(&html) {
        Ok(regions) => regions,
        Err(AupError::NoTableRows) => {
            logf!("Parse: no table rows in {}", config.input_html_path.display());
            RegionTable::default()
        }
        Err(e) => return Err(e),
    };

    if regions.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No regions found in the AUP/UUP table.");
            p.finish();
        }
        return Ok(RunOutcome::NoRegions);
    }

    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Found {} active regions.", regions.len()));
    }

    let template = read_input(&config.input_kml_path)?;
    let merged = kml::merge(
        &template,
        &config.output_name(),
        &config.full_copy_folders,
        &config.kml_namespace,
        &regions,
    )?;

    write_output(&config.output_kml_path, &merged.bytes)?;
    logf!(
        "Write: {} ({} placemarks kept, {} removed)",
        config.output_kml_path.display(),
        merged.report.kept(),
        merged.report.removed()
    );

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    Ok(RunOutcome::Written {
        path: config.output_kml_path.clone(),
        regions,
        report: merged.report,
    })
}
