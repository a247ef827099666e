// src/cli.rs
use std::io::{ BufRead, IsTerminal, Write };
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{ self, WrapErr };

use crate::config::Config;
use crate::fetch::{ PageSource, PlaywrightSource };
use crate::file::write_traceback;
use crate::kml::{ FolderAction, MergeReport };
use crate::progress::Progress;
use crate::runner::{ self, RunOutcome };
use crate::specs::aup::RegionTable;

/// Merge today's AUP/UUP airspace activations into a KML map.
#[derive(Debug, Parser)]
#[command(name = "aup_kml")]
#[command(version)]
pub struct Args {
    /// AUP/UUP page snapshot (written when online, read when offline)
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Template KML
    #[arg(long, value_name = "PATH")]
    pub kml: Option<PathBuf>,

    /// Output KML; its file stem becomes the document name
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Folder copied without filtering (repeatable; replaces the built-in list)
    #[arg(long = "full-copy", value_name = "FOLDER")]
    pub full_copy: Vec<String>,

    /// Reuse the existing HTML snapshot instead of downloading
    #[arg(long)]
    pub offline: bool,

    /// Show the browser window while fetching
    #[arg(long)]
    pub headful: bool,

    /// Do not wait for Enter before exiting
    #[arg(long)]
    pub no_pause: bool,

    /// Debug log file
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Where the error report goes on failure
    #[arg(long, value_name = "PATH")]
    pub traceback: Option<PathBuf>,
}

impl Args {
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(p) = &self.html { config.input_html_path = p.clone(); }
        if let Some(p) = &self.kml { config.input_kml_path = p.clone(); }
        if let Some(p) = &self.out { config.output_kml_path = p.clone(); }
        if let Some(p) = &self.log { config.log_path = p.clone(); }
        if let Some(p) = &self.traceback { config.traceback_path = p.clone(); }
        if !self.full_copy.is_empty() {
            config.full_copy_folders = self.full_copy.clone();
        }
        config.fetch.online = !self.offline;
        config.fetch.headless = !self.headful;
        config
    }
}

/// Console lines for the operator.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }
}

pub fn run() -> ExitCode {
    let args = Args::parse();
    let config = args.to_config();

    // Blank hook: the report lands in a text file, so no colours or spantrace.
    let _ = color_eyre::config::HookBuilder::blank().install();

    if let Err(e) = crate::log::init(&config.log_path) {
        eprintln!("Warning: cannot open log file {}: {e}", config.log_path.display());
    }

    let code = match execute(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            loge!("{report:?}");
            let saved = write_traceback(&config.traceback_path, &format!("{report:?}\n"));
            eprintln!("Error: {report:#}");
            match saved {
                Ok(()) => eprintln!("Details written to {}", config.traceback_path.display()),
                Err(e) => eprintln!("Could not write {}: {e}", config.traceback_path.display()),
            }
            ExitCode::FAILURE
        }
    };

    if !args.no_pause && std::io::stdin().is_terminal() {
        pause();
    }
    code
}

fn execute(config: &Config) -> eyre::Result<()> {
    logf!("Run: start (online = {})", config.fetch.online);

    let mut bridge = config.fetch.online.then(|| PlaywrightSource::new(config.fetch.clone()));
    let source = bridge.as_mut().map(|b| b as &mut dyn PageSource);
    let mut console = ConsoleProgress;

    let outcome = runner::run(config, source, Some(&mut console))
        .wrap_err("AUP/UUP update failed")?;

    match outcome {
        RunOutcome::NoRegions => {
            logf!("Run: no regions, nothing written");
        }
        RunOutcome::Written { path, regions, report } => {
            print_regions(&regions);
            print_report(&report);
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

fn print_regions(regions: &RegionTable) {
    for (key, windows) in regions.sorted() {
        println!("{key}: {}", windows.join(", "));
    }
}

fn print_report(report: &MergeReport) {
    for folder in &report.folders {
        match folder.action {
            FolderAction::Copied => println!("Full copying folder: {}", folder.name),
            FolderAction::Filtered { kept, .. } => {
                println!("Processing folder contents: {}", folder.name);
                println!("Number of processed placemarks: {kept}");
            }
        }
    }
}

fn pause() {
    print!("Press Enter to exit...");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_flags_keeps_defaults() {
        let args = Args::parse_from(["aup_kml"]);
        assert_eq!(args.to_config(), Config::default());
    }

    #[test]
    fn overrides_apply() {
        let args = Args::parse_from([
            "aup_kml", "--offline", "--headful",
            "--out", "maps/Today.kml",
            "--full-copy", "A", "--full-copy", "B",
        ]);
        let cfg = args.to_config();
        assert!(!cfg.fetch.online);
        assert!(!cfg.fetch.headless);
        assert_eq!(cfg.output_kml_path, PathBuf::from("maps/Today.kml"));
        assert_eq!(cfg.full_copy_folders, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(cfg.output_name(), "Today");
    }
}
