// src/kml/mod.rs
//! KML side of the pipeline: load the template, filter/annotate placemarks, write.
//!
//! Only the shape GE Pro produces is supported:
//! `kml > Document > Folder > Placemark { name, description? }`.

pub mod document;
pub mod merge;

pub use document::{ Element, KmlDocument, Node };
pub use merge::{ merge, merge_into, FolderAction, FolderReport, MergeOutput, MergeReport };

// Element local names
pub const DOCUMENT: &str = "Document";
pub const FOLDER: &str = "Folder";
pub const PLACEMARK: &str = "Placemark";
pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
