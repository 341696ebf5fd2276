pub mod orchestrator;
pub mod sink;

pub use orchestrator::{scrape_match, scrape_team, MatchOrchestrator, RunSummary, TeamFailure};
pub use sink::{CsvSink, OutputSink, TeamOutput};
