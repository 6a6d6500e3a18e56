pub mod dataset;
pub mod log;
pub mod record;
pub mod runner;
pub mod summary;

pub mod prelude {
    pub use crate::dataset::{ExampleSource, HubDatasetSource, InMemorySource, Split};
    pub use crate::log::RunLog;
    pub use crate::record::{EvalRecord, SummaryEntry};
    pub use crate::runner::{EvalRunner, RunOptions, TaskReport, TaskState};
    pub use crate::summary::{summarize, summarize_all};
}
