//! ld-providers — the provider adapter contract and its four
//! concrete external adapters.
//!
//! `LeadProvider` is an `#[async_trait]` trait object held as `Box<dyn
//! LeadProvider>`, `Send + Sync`, with each adapter owning its own
//! `reqwest::Client`: a `provider_name`, a static `priority`, `search`,
//! `health_check`, `close`.
//!
//! Every adapter's `search` is infallible: network and parse failures are
//! captured in [`ProviderResult::errors`], never returned as `Err`.
//! `ld-waterfall` relies on this to downgrade provider trouble to a warning
//! without a try/catch at the call site.

mod ai_ark;
mod clay;
mod jina;
mod spider;

pub use ai_ark::AiArkProvider;
pub use clay::ClayProvider;
pub use jina::JinaProvider;
pub use spider::SpiderProvider;

use ld_schemas::{ProviderResult, SearchCriteria};

#[async_trait::async_trait]
pub trait LeadProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Lower sorts earlier in the waterfall cascade.
    fn priority(&self) -> i32;

    async fn search(&self, criteria: &SearchCriteria) -> ProviderResult;

    async fn health_check(&self) -> bool;

    /// Releases any held connections. Most adapters hold nothing beyond a
    /// `reqwest::Client`, which is cheaply cloneable and cleans up on drop —
    /// overridden only by adapters that open longer-lived resources.
    async fn close(&self) {}
}

/// Builds the full set of known adapters from settings, in no particular
/// order — callers order by [`waterfall_provider_order`] or by
/// [`LeadProvider::priority`].
pub fn all_providers(settings: &ld_config::Settings) -> Vec<Box<dyn LeadProvider>> {
    vec![
        Box::new(AiArkProvider::new(settings)),
        Box::new(ClayProvider::new(settings)),
        Box::new(JinaProvider::new(settings)),
        Box::new(SpiderProvider::new(settings)),
    ]
}

/// Orders `providers` by the configured `waterfall_provider_order` name
/// list, dropping any provider not named in it. An explicit
/// `override_names` list (`providers_override`) takes
/// precedence and is honored in its own given order.
pub fn active_providers<'a>(
    providers: &'a [Box<dyn LeadProvider>],
    order: &[String],
    override_names: Option<&[String]>,
) -> Vec<&'a dyn LeadProvider> {
    let names: &[String] = override_names.filter(|o| !o.is_empty()).unwrap_or(order);
    let rank: std::collections::HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut active: Vec<&dyn LeadProvider> = providers
        .iter()
        .filter(|p| rank.contains_key(p.provider_name()))
        .map(|p| p.as_ref())
        .collect();

    active.sort_by_key(|p| rank[p.provider_name()]);
    active
}
