// src/fetch/mod.rs
//! Getting the rendered AUP/UUP page.
//!
//! The portal lists one link per published snapshot, labelled with its UTC
//! validity time on the half hour (`19/10/2026 13:30`). A source walks back from
//! the newest possible label until one opens, within a bounded window.

pub mod bridge;

use chrono::{ DateTime, TimeDelta, Timelike, Utc };

use crate::config::consts::{ SLOT_LABEL_FORMAT, SLOT_MINUTES };
use crate::error::AupError;
use crate::progress::Progress;

pub use bridge::PlaywrightSource;

/// Anything that can hand over the HTML of the freshest snapshot.
pub trait PageSource {
    /// Rendered HTML of the newest snapshot inside `window`,
    /// or `AupError::FetchExhausted` when none of its slots is published.
    fn fetch(
        &mut self,
        window: &LookbackWindow,
        progress: Option<&mut (dyn Progress + '_)>,
    ) -> Result<String, AupError>;
}

/// Half-hour slots, newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookbackWindow {
    newest: DateTime<Utc>,
    slots: usize,
}

impl LookbackWindow {
    /// `slots` labels going back from `now` floored to the half hour.
    pub fn ending_at(now: DateTime<Utc>, slots: usize) -> Self {
        let minute = now.minute() - now.minute() % SLOT_MINUTES as u32;
        let newest = now
            .with_minute(minute)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        Self { newest, slots }
    }

    pub fn times(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.slots as i32).map(|i| self.newest - TimeDelta::minutes(SLOT_MINUTES * i as i64))
    }

    /// Link texts as the portal prints them.
    pub fn labels(&self) -> Vec<String> {
        self.times().map(|t| t.format(SLOT_LABEL_FORMAT).to_string()).collect()
    }
}

/// Walk `window` newest → oldest and return the first page `try_slot` opens.
/// `try_slot` answers `Ok(None)` for a slot that is not (yet) published.
pub fn first_available<F>(
    window: &LookbackWindow,
    mut progress: Option<&mut (dyn Progress + '_)>,
    mut try_slot: F,
) -> Result<String, AupError>
where
    F: FnMut(&str) -> Result<Option<String>, AupError>,
{
    let labels = window.labels();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(labels.len());
    }

    for label in &labels {
        let page = try_slot(label)?;
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(label);
        }
        match page {
            Some(html) => {
                logf!("Fetch: snapshot '{label}' ({} bytes)", html.len());
                if let Some(p) = progress.as_deref_mut() {
                    p.log(&format!("Downloading EU table: {label}"));
                    p.finish();
                }
                return Ok(html);
            }
            None => {
                logd!("Fetch: no snapshot '{label}'");
                if let Some(p) = progress.as_deref_mut() {
                    p.log(&format!("No EU table for '{label}'"));
                }
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    Err(AupError::FetchExhausted {
        newest: labels.first().cloned().unwrap_or_default(),
        oldest: labels.last().cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, h, m, s).unwrap()
    }

    #[test]
    fn window_floors_to_half_hour() {
        let w = LookbackWindow::ending_at(at(13, 47, 12), 3);
        assert_eq!(w.labels(), vec!["19/10/2026 13:30", "19/10/2026 13:00", "19/10/2026 12:30"]);

        let w = LookbackWindow::ending_at(at(0, 10, 0), 2);
        assert_eq!(w.labels(), vec!["19/10/2026 00:00", "18/10/2026 23:30"]);
    }

    #[test]
    fn default_window_covers_a_day() {
        let w = LookbackWindow::ending_at(at(13, 30, 0), crate::config::consts::LOOKBACK_SLOTS);
        let labels = w.labels();
        assert_eq!(labels.len(), 49);
        assert_eq!(labels.last().unwrap(), "18/10/2026 13:30");
    }

    #[test]
    fn first_available_stops_at_first_hit() {
        let w = LookbackWindow::ending_at(at(13, 47, 0), 5);
        let mut tried = Vec::new();
        let html = first_available(&w, None, |label| {
            tried.push(label.to_string());
            Ok((label == "19/10/2026 12:30").then(|| "<table/>".to_string()))
        })
        .unwrap();
        assert_eq!(html, "<table/>");
        assert_eq!(tried.len(), 3);
    }

    #[test]
    fn first_available_exhausts() {
        let w = LookbackWindow::ending_at(at(13, 47, 0), 2);
        let err = first_available(&w, None, |_| Ok(None)).unwrap_err();
        match err {
            AupError::FetchExhausted { newest, oldest } => {
                assert_eq!(newest, "19/10/2026 13:30");
                assert_eq!(oldest, "19/10/2026 13:00");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_available_propagates_bridge_errors() {
        let w = LookbackWindow::ending_at(at(13, 47, 0), 4);
        let err = first_available(&w, None, |_| Err(AupError::Bridge("gone".into()))).unwrap_err();
        assert!(matches!(err, AupError::Bridge(_)));
    }
}
