//! Host-agnostic core of a chat-sidebar plugin backed by a remote
//! completion API.
//!
//! The host application supplies two capabilities — an [`EditorSurface`]
//! for the active document and a [`SettingsStore`] for the persisted
//! settings blob — and drives a [`ChatPanel`] through [`PanelCommand`]s
//! and the [`PanelLifecycle`] hooks. Everything else (bounded session
//! history, the completion round-trip with its failure taxonomy, keyword
//! editor actions, transcript rendering) lives here.

pub mod completion;
pub mod editor;
pub mod panel;
pub mod session;
pub mod settings;
pub mod transcript;

pub use completion::{CompletionClient, CompletionError, MAX_TOKENS};
pub use editor::{EditorAction, EditorSurface, TextBuffer, apply_action, detect_action};
pub use panel::{ChatPanel, PanelCommand, PanelLifecycle};
pub use session::{MAX_SAVED_SESSIONS, SessionManager};
pub use settings::{ChatSettings, ChatTheme, FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use transcript::{Role, Transcript, TranscriptEntry};

/// Install a console subscriber for the `tracing` events this crate emits,
/// filtered by `RUST_LOG`. Hosts that already run their own subscriber
/// skip this; calling it twice is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

