//! Static metadata for the model providers the assistant can talk to.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// Identifier used in `provider_preference` (e.g. "anthropic")
    pub id: &'static str,
    pub display_name: &'static str,
    /// Logo asset file name
    pub logo: &'static str,
    /// Runs on this machine (no network, no key)
    pub is_local: bool,
    pub requires_api_key: bool,
    pub supports_oauth: bool,
    /// Listed in the provider selector
    pub show_in_selector: bool,
}

const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "anthropic",
        display_name: "Anthropic",
        logo: "anthropic.svg",
        is_local: false,
        requires_api_key: true,
        supports_oauth: true,
        show_in_selector: true,
    },
    ProviderInfo {
        id: "openai",
        display_name: "OpenAI",
        logo: "openai.svg",
        is_local: false,
        requires_api_key: true,
        supports_oauth: true,
        show_in_selector: true,
    },
    ProviderInfo {
        id: "gemini",
        display_name: "Google Gemini",
        logo: "gemini.svg",
        is_local: false,
        requires_api_key: true,
        supports_oauth: false,
        show_in_selector: true,
    },
    ProviderInfo {
        id: "local",
        display_name: "Ollama (local)",
        logo: "ollama.svg",
        is_local: true,
        requires_api_key: false,
        supports_oauth: false,
        show_in_selector: true,
    },
    ProviderInfo {
        id: "external",
        display_name: "External command",
        logo: "terminal.svg",
        is_local: true,
        requires_api_key: false,
        supports_oauth: false,
        show_in_selector: false,
    },
];

pub fn all() -> &'static [ProviderInfo] {
    PROVIDERS
}

pub fn find(id: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Providers shown in the selector, in catalog order.
pub fn selectable() -> impl Iterator<Item = &'static ProviderInfo> {
    PROVIDERS.iter().filter(|p| p.show_in_selector)
}
