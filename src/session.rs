//! Session bookkeeping: the in-progress transcript buffer and the bounded
//! list of saved sessions.
//!
//! The manager owns the persisted [`ChatSettings`] record and the store
//! handle, so every mutation of the saved list goes through one persist
//! path. Persistence failures are logged and swallowed — a full disk must
//! not take the chat panel down with it.

use std::sync::Arc;

use crate::settings::{ChatSettings, SettingsStore};

/// Saved sessions beyond this count evict the oldest first.
pub const MAX_SAVED_SESSIONS: usize = 5;

pub struct SessionManager {
    store: Arc<dyn SettingsStore + Send + Sync>,
    settings: ChatSettings,
    /// Lines of the in-progress, unsaved session.
    current: Vec<String>,
}

impl SessionManager {
    /// Load settings through the store and start with an empty buffer.
    ///
    /// A hand-edited blob with more than [`MAX_SAVED_SESSIONS`] entries is
    /// trimmed here (oldest first) so the invariant holds from the start.
    pub fn new(store: Arc<dyn SettingsStore + Send + Sync>) -> Self {
        let mut settings = store.load();
        let excess = settings.chat_sessions.len().saturating_sub(MAX_SAVED_SESSIONS);
        if excess > 0 {
            settings.chat_sessions.drain(..excess);
            tracing::warn!(excess, "trimmed oversized saved-session list on load");
        }
        Self {
            store,
            settings,
            current: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Mutate settings fields (theme, greeting, …) and persist.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut ChatSettings)) {
        f(&mut self.settings);
        self.persist();
    }

    /// Append a user/reply pair to the current buffer. No validation;
    /// empty strings are allowed.
    pub fn append_exchange(&mut self, user: &str, reply: &str) {
        self.current.push(format!("User: {user}"));
        self.current.push(format!("GPT: {reply}"));
    }

    /// Push the current buffer onto the saved list, evict the oldest entry
    /// past the cap, clear the buffer, and persist. No-op when the buffer
    /// is empty.
    pub fn save_current_session(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let session = std::mem::take(&mut self.current);
        self.settings.chat_sessions.push(session);
        while self.settings.chat_sessions.len() > MAX_SAVED_SESSIONS {
            self.settings.chat_sessions.remove(0);
        }
        tracing::info!(saved = self.settings.chat_sessions.len(), "saved chat session");
        self.persist();
    }

    /// Lines of the saved session at `index`, or `None` when out of range.
    /// Callers treat `None` as a no-op.
    pub fn load_session(&self, index: usize) -> Option<&[String]> {
        self.settings.chat_sessions.get(index).map(Vec::as_slice)
    }

    /// Drop both the current buffer and every saved session, then persist.
    pub fn clear_sessions(&mut self) {
        self.current.clear();
        self.settings.chat_sessions.clear();
        tracing::info!("cleared all chat sessions");
        self.persist();
    }

    pub fn saved_count(&self) -> usize {
        self.settings.chat_sessions.len()
    }

    pub fn current_is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Dropdown labels for the saved sessions, oldest first.
    pub fn session_labels(&self) -> Vec<String> {
        (1..=self.settings.chat_sessions.len())
            .map(|n| format!("Chat Session {n}"))
            .collect()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            tracing::error!("failed to persist settings: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;

    fn manager() -> (SessionManager, Arc<MemorySettingsStore>) {
        let store = Arc::new(MemorySettingsStore::default());
        (SessionManager::new(store.clone()), store)
    }

    #[test]
    fn append_then_save_stores_one_session() {
        let (mut mgr, store) = manager();
        mgr.append_exchange("hi", "hello");
        mgr.save_current_session();

        assert_eq!(mgr.saved_count(), 1);
        assert!(mgr.current_is_empty());
        assert_eq!(
            mgr.load_session(0).unwrap(),
            &["User: hi".to_string(), "GPT: hello".to_string()]
        );
        // Persisted through the store, not just held in memory
        assert_eq!(store.load().chat_sessions.len(), 1);
    }

    #[test]
    fn save_empty_buffer_is_a_noop() {
        let (mut mgr, store) = manager();
        mgr.save_current_session();
        assert_eq!(mgr.saved_count(), 0);
        assert!(store.load().chat_sessions.is_empty());
    }

    #[test]
    fn sixth_session_evicts_the_first() {
        let (mut mgr, _store) = manager();
        for i in 1..=6 {
            mgr.append_exchange(&format!("msg {i}"), "ok");
            mgr.save_current_session();
        }

        assert_eq!(mgr.saved_count(), MAX_SAVED_SESSIONS);
        // Oldest (msg 1) evicted; list is msg 2..=6, most recent last
        assert_eq!(mgr.load_session(0).unwrap()[0], "User: msg 2");
        assert_eq!(
            mgr.load_session(MAX_SAVED_SESSIONS - 1).unwrap()[0],
            "User: msg 6"
        );
    }

    #[test]
    fn out_of_range_load_returns_none() {
        let (mut mgr, _store) = manager();
        mgr.append_exchange("a", "b");
        mgr.save_current_session();

        assert!(mgr.load_session(1).is_none());
        assert!(mgr.load_session(usize::MAX).is_none());
    }

    #[test]
    fn clear_then_save_single_session_yields_length_one() {
        let (mut mgr, store) = manager();
        for i in 0..4 {
            mgr.append_exchange(&format!("m{i}"), "r");
            mgr.save_current_session();
        }
        mgr.clear_sessions();
        assert_eq!(mgr.saved_count(), 0);
        assert!(store.load().chat_sessions.is_empty());

        mgr.append_exchange("fresh", "start");
        mgr.save_current_session();
        assert_eq!(mgr.saved_count(), 1);
        assert_eq!(store.load().chat_sessions.len(), 1);
    }

    #[test]
    fn clear_drops_unsaved_buffer_too() {
        let (mut mgr, _store) = manager();
        mgr.append_exchange("pending", "lines");
        mgr.clear_sessions();
        assert!(mgr.current_is_empty());

        // Nothing left to save afterwards
        mgr.save_current_session();
        assert_eq!(mgr.saved_count(), 0);
    }

    #[test]
    fn empty_strings_are_recorded_verbatim() {
        let (mut mgr, _store) = manager();
        mgr.append_exchange("", "");
        mgr.save_current_session();
        assert_eq!(
            mgr.load_session(0).unwrap(),
            &["User: ".to_string(), "GPT: ".to_string()]
        );
    }

    #[test]
    fn oversized_blob_is_trimmed_on_load() {
        let mut settings = ChatSettings::default();
        settings.chat_sessions = (0..8)
            .map(|i| vec![format!("User: old {i}")])
            .collect();
        let store = Arc::new(MemorySettingsStore::new(settings));

        let mgr = SessionManager::new(store);
        assert_eq!(mgr.saved_count(), MAX_SAVED_SESSIONS);
        // Oldest trimmed first
        assert_eq!(mgr.load_session(0).unwrap()[0], "User: old 3");
    }

    #[test]
    fn session_labels_are_one_based() {
        let (mut mgr, _store) = manager();
        mgr.append_exchange("a", "b");
        mgr.save_current_session();
        mgr.append_exchange("c", "d");
        mgr.save_current_session();

        assert_eq!(mgr.session_labels(), vec!["Chat Session 1", "Chat Session 2"]);
    }

    #[test]
    fn update_settings_persists() {
        let (mut mgr, store) = manager();
        mgr.update_settings(|s| s.default_greeting = "yo".to_string());
        assert_eq!(store.load().default_greeting, "yo");
    }
}
