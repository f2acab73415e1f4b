pub mod mention;
pub mod platform;
pub mod provider_catalog;

pub mod settings {
    use serde::{Deserialize, Serialize};

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ModelProvider {
        pub local_model: String,              // e.g., "llama3.2:3b" for Ollama
        pub provider_preference: Vec<String>, // e.g., ["anthropic", "openai", "gemini", "local"]
        pub openai_model: String,
        pub anthropic_model: String,
        pub gemini_model: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AppSettings {
        pub allowed_dirs: Vec<String>,
        pub model: ModelProvider,
        pub enable_internet_research: bool,
        pub max_results: usize,
        #[serde(default)]
        pub dark_mode: bool,
        /// Whether user granted terminal command execution permission
        #[serde(default)]
        pub terminal_permission_granted: bool,
        #[serde(default = "default_true")]
        pub enable_mentions: bool,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                allowed_dirs: vec![],
                model: ModelProvider {
                    local_model: "llama3.2:3b".into(),
                    provider_preference: vec!["anthropic".into(), "openai".into(), "gemini".into(), "local".into()], // Try cloud providers first, fall back to local
                    openai_model: "gpt-4o-mini".into(),
                    anthropic_model: "claude-3-5-sonnet-20241022".into(),
                    gemini_model: "gemini-1.5-flash".into(),
                },
                enable_internet_research: false,
                max_results: 200,
                dark_mode: false,
                terminal_permission_granted: false,
                enable_mentions: true,
            }
        }
    }

    /// Result of a settings read or write across the host boundary.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SettingsResponse {
        pub success: bool,
        #[serde(default)]
        pub error: Option<String>,
        #[serde(default)]
        pub settings: Option<AppSettings>,
    }

    impl SettingsResponse {
        pub fn ok(settings: AppSettings) -> Self {
            Self {
                success: true,
                error: None,
                settings: Some(settings),
            }
        }

        pub fn failed(message: impl Into<String>) -> Self {
            Self {
                success: false,
                error: Some(message.into()),
                settings: None,
            }
        }
    }

    /// Settings error types
    #[derive(Debug, thiserror::Error)]
    pub enum SettingsError {
        #[error("Cannot {event} while {state}")]
        InvalidTransition { event: String, state: String },
    }
}

pub mod task_types {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TaskStatus {
        Pending,
        Running,
        Done,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TaskRecord {
        pub id: String,
        pub title: String,
        pub status: TaskStatus,
    }
}
