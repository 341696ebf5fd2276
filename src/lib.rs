//! Extracts structured match, map and player records from vlr.gg.
//!
//! A run discovers each team's completed matches, loads every match page
//! once through a [`PageSession`], and derives player ratings and per-map
//! results from the rendered text. Records are written per team through an
//! [`OutputSink`].

pub use config::{PipelineConfig, TeamEntry, TeamRegistry};
pub use error::{Result, VlrError};
pub use pipeline::{CsvSink, MatchOrchestrator, OutputSink, RunSummary, TeamOutput};
pub use session::{HttpSession, HttpSessionFactory, PageElement, PageSession, SessionFactory, TimedSession};

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod session;
