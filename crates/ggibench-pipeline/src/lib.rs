//! ggibench-pipeline: Loads benchmark data, runs the seed → algorithm →
//! meaningfulness chain for every configured combination, and reports the
//! results.

pub mod providers;
pub mod report;
pub mod pipeline;

pub use providers::{DataProvider, FileDataProvider, MemoryDataProvider};
pub use report::{BenchmarkRun, RunReport, SeedReport};
pub use pipeline::Pipeline;
