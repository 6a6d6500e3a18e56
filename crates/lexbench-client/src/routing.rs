use serde::Serialize;

/// Substring that marks the prover model family.
pub const PROVER_MARKER: &str = "prover";

/// Providers known to serve the prover family reliably; other providers
/// routinely reject those requests, so the allow-list is pinned.
pub const PROVER_PROVIDERS: [&str; 2] = ["novita", "azure"];

/// OpenRouter `provider` request field: constrain candidate providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderPreferences {
    pub order: Vec<String>,
    pub allow_fallbacks: bool,
}

/// Per-call provider-routing decision, keyed on the model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPolicy {
    /// Pin the candidate provider set to [`PROVER_PROVIDERS`].
    Restricted,
    /// Send no provider constraint; the routing service chooses.
    Auto,
}

impl RoutingPolicy {
    /// Resolve the policy for a model identifier. Deterministic; no state.
    pub fn for_model(model_id: &str) -> Self {
        if model_id.to_lowercase().contains(PROVER_MARKER) {
            RoutingPolicy::Restricted
        } else {
            RoutingPolicy::Auto
        }
    }

    /// The `provider` field to send, if any.
    pub fn provider_preferences(&self) -> Option<ProviderPreferences> {
        match self {
            RoutingPolicy::Restricted => Some(ProviderPreferences {
                order: PROVER_PROVIDERS.iter().map(|p| p.to_string()).collect(),
                allow_fallbacks: true,
            }),
            RoutingPolicy::Auto => None,
        }
    }
}
