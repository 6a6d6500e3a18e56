pub mod error;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod registry;
pub mod sample;
pub mod task;

pub mod prelude {
    pub use crate::error::{CallError, ConfigError, DataError, LexError, Result};
    pub use crate::model::{CompletionClient, ModelResponse};
    pub use crate::normalize::normalize;
    pub use crate::prompt::{build_prompt, Prompt, SYSTEM_INSTRUCTION};
    pub use crate::registry::TaskRegistry;
    pub use crate::sample::sample_shots;
    pub use crate::task::{DatasetRef, Example, NormRule, TaskConfig};
}
