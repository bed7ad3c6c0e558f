//! Sandbar survey report viewer: the data core behind the desktop app.
//!
//! Loads a report document, extracts per-combination scatter series with a
//! least-squares fit, and decides which combinations a filter selection shows.

pub mod config;
pub mod data;
