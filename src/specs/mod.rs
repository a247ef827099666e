// src/specs/mod.rs
//! # Scraping “specs” module
//!
//! Page-specific parsing: each spec knows **where the ground truth lives in one
//! page's HTML** and how to pull it out without caring how the page was obtained.
//!
//! ## What lives here
//! - **Pure HTML parsing** of saved/rendered pages (row text via `core::html`).
//! - **Row recipes**: which tokens make a row relevant and how they are normalised.
//! - **Light shaping** into small result types (`aup::RegionTable`).
//!
//! ## What does **not** live here
//! - **Fetching** (`fetch::PageSource`) and file handling (`file`).
//! - **KML merging** (`kml::merge`).
//!
//! ## Typical call chain
//! ```text
//! runner → fetch::PageSource::fetch → file::write_snapshot
//!        → specs::aup::parse → kml::merge
//! ```
//!
//! ## Testing notes
//! - Specs are testable **offline** against canned HTML.
pub mod aup;
