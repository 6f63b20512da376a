pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub env_var: &'static str,
    pub base_url: &'static str,
    pub default_model: &'static str,
}

/// OpenAI-compatible chat-completions endpoints the orchestrator can drive.
pub static PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "groq",
        name: "Groq",
        env_var: "GROQ_API_KEY",
        base_url: "https://api.groq.com/openai/v1",
        default_model: "llama-3.1-8b-instant",
    },
    ProviderInfo {
        id: "openai",
        name: "OpenAI",
        env_var: "OPENAI_API_KEY",
        base_url: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
    },
    ProviderInfo {
        id: "openrouter",
        name: "OpenRouter",
        env_var: "OPENROUTER_API_KEY",
        base_url: "https://openrouter.ai/api/v1",
        default_model: "meta-llama/llama-3.1-70b-instruct",
    },
    ProviderInfo {
        id: "local",
        name: "Local / Ollama",
        env_var: "",
        base_url: "http://localhost:11434/v1",
        default_model: "llama3.1:8b",
    },
];

pub const DEFAULT_PROVIDER: &str = "groq";

pub fn get_provider(id: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Whether the provider can run without an API key.
pub fn key_optional(id: &str) -> bool {
    get_provider(id).map(|p| p.env_var.is_empty()).unwrap_or(false)
}
