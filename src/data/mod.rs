//! Data layer: report loading, series extraction, filtering and layout.
//!
//! Architecture:
//! ```text
//!  binned.json / incremental.json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse document → Dataset (dates resolved to DateEntry)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  enumerate names once; FilterSelection per UI event
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  layout   │  site rows × quantity/bin columns → SeriesKeys
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  series   │  extract observations + least-squares fit per key
//!   └──────────┘
//! ```

pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod loader;
pub mod model;
pub mod series;
