//! Feedback state for the "copy markdown" button.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// How long the button reads "Copied!" after a successful copy.
pub const COPIED_LABEL_SECS: i64 = 2;

/// Destination for copied text (the system clipboard in the app).
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CopyFeedback {
    #[default]
    Idle,
    Copied {
        at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl CopyFeedback {
    pub fn copy(&mut self, sink: &mut dyn ClipboardSink, markdown: &str, now: DateTime<Utc>) {
        *self = match sink.set_text(markdown) {
            Ok(()) => CopyFeedback::Copied { at: now },
            Err(e) => {
                warn!(error = %e, "Copy to clipboard failed");
                CopyFeedback::Failed {
                    message: e.to_string(),
                }
            }
        };
    }

    /// Drop an expired "Copied!" back to idle.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let CopyFeedback::Copied { at } = self {
            if now - *at >= Duration::seconds(COPIED_LABEL_SECS) {
                *self = CopyFeedback::Idle;
            }
        }
    }

    pub fn label(&self, now: DateTime<Utc>) -> &'static str {
        match self {
            CopyFeedback::Copied { at } if now - *at < Duration::seconds(COPIED_LABEL_SECS) => {
                "Copied!"
            }
            CopyFeedback::Failed { .. } => "Copy failed",
            _ => "Copy",
        }
    }
}
