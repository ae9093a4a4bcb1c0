//! `reactnav-perception` – turns raw scanner and detector output into the
//! numbers the controller reasons about.
//!
//! # Modules
//!
//! - [`ingest`] – [`CycleInput`][ingest::CycleInput]: validates one scan
//!   frame plus target observation and decodes the wire shape.
//! - [`sector`] – [`min_in_window`][sector::min_in_window] and
//!   [`SectorMinima`][sector::SectorMinima]: nearest obstacle per sector.

pub mod ingest;
pub mod sector;

pub use ingest::{CycleInput, MAX_SCAN_RANGES};
pub use sector::{SectorMinima, min_in_window};
