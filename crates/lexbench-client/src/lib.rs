pub mod openrouter;
pub mod retry;
pub mod routing;

pub mod prelude {
    pub use crate::openrouter::{ClientConfig, OpenRouterClient};
    pub use crate::retry::RetryPolicy;
    pub use crate::routing::{ProviderPreferences, RoutingPolicy};
}
