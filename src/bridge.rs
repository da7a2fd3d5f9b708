//! Message protocol between the embedded consent UI and the host.
//!
//! The embedded page posts `write`/`read`/`ready` messages over a single
//! named channel; the host applies writes to the consent store, answers
//! reads through the surface's `onRead` callback, and tears the session down
//! on `ready`. Ordering (write before ready) is a protocol assumption of the
//! embedded page, not something the bridge enforces.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{SdkError, SdkResult};
use crate::logger::EventLogger;
use crate::storage::{ConsentStore, SharedStore};
use crate::webview::DialogSurface;

/// Messages the embedded consent UI posts to the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BridgeMessage {
    /// JSON object (as a string) of store entries to apply; a null value
    /// deletes its key.
    Write { data: String },
    /// Store key the UI wants echoed back through `onRead`.
    Read { data: String },
    /// The UI session is finished.
    Ready,
}

/// What a completed dialog session reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Whether at least one `write` was applied during the session.
    pub write_occurred: bool,
}

struct SessionState {
    write_seen: bool,
    completed: bool,
    completion: Option<oneshot::Sender<SessionOutcome>>,
}

/// Host side of one dialog session's bridge.
///
/// Cheap to clone; the host pumps every message posted by the embedded page
/// into [`BridgeHandle::handle_raw`].
#[derive(Clone)]
pub struct BridgeHandle {
    id: Arc<String>,
    store: SharedStore,
    surface: Arc<dyn DialogSurface>,
    logger: Arc<EventLogger>,
    state: Arc<Mutex<SessionState>>,
}

impl BridgeHandle {
    /// Starts a session and returns the handle plus a receiver resolving when
    /// the UI signals `ready`.
    pub fn new(
        store: SharedStore,
        surface: Arc<dyn DialogSurface>,
        logger: Arc<EventLogger>,
    ) -> (Self, oneshot::Receiver<SessionOutcome>) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            id: Arc::new(uuid::Uuid::new_v4().to_string()),
            store,
            surface,
            logger,
            state: Arc::new(Mutex::new(SessionState {
                write_seen: false,
                completed: false,
                completion: Some(tx),
            })),
        };
        handle
            .logger
            .debug(&format!("bridge session {} started", handle.id));
        (handle, rx)
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    /// Parses and dispatches a raw message. Unrecognized payloads are logged
    /// and dropped.
    pub fn handle_raw(&self, text: &str) {
        match serde_json::from_str::<BridgeMessage>(text) {
            Ok(message) => self.handle(message),
            Err(error) => self
                .logger
                .error(&format!("unrecognized bridge message: {error}")),
        }
    }

    pub fn handle(&self, message: BridgeMessage) {
        match message {
            BridgeMessage::Write { data } => self.on_write(&data),
            BridgeMessage::Read { data } => self.on_read(&data),
            BridgeMessage::Ready => self.on_ready(),
        }
    }

    fn on_write(&self, json_str: &str) {
        match apply_write(self.store.as_ref(), json_str) {
            Ok(applied) => {
                self.lock().write_seen = true;
                self.logger
                    .debug(&format!("bridge session {}: applied {applied} keys", self.id));
            }
            Err(error) => self
                .logger
                .error(&format!("bridge write rejected: {error}")),
        }
    }

    fn on_read(&self, key: &str) {
        let value = self.store.get(key);
        self.logger
            .debug(&format!("bridge session {}: read {key}", self.id));
        self.surface.notify_read(key, value.as_ref());
    }

    fn on_ready(&self) {
        let completion = {
            let mut state = self.lock();
            if state.completed {
                self.logger
                    .debug(&format!("bridge session {}: duplicate ready ignored", self.id));
                return;
            }
            state.completed = true;
            state
                .completion
                .take()
                .map(|tx| (tx, state.write_seen))
        };

        self.logger
            .info(&format!("bridge session {} finished", self.id));
        self.surface.close();
        if let Some((tx, write_occurred)) = completion {
            let _ = tx.send(SessionOutcome { write_occurred });
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies one `write` payload to the store.
///
/// Decoding failures reject the whole write before any key is touched; once
/// decoding succeeds each key is applied independently. Null values delete
/// their key, everything else is stored verbatim.
pub(crate) fn apply_write(store: &dyn ConsentStore, json_str: &str) -> SdkResult<usize> {
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| SdkError::Protocol(format!("bridge write is not valid JSON: {e}")))?;
    let Value::Object(entries) = value else {
        return Err(SdkError::Protocol(
            "bridge write top level is not an object".to_string(),
        ));
    };

    let mut applied = 0;
    for (key, value) in entries {
        if value.is_null() {
            store.remove(&key);
        } else {
            store.set(&key, value);
        }
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSurface {
        reads: Mutex<Vec<(String, Option<Value>)>>,
        closes: AtomicUsize,
    }

    impl DialogSurface for RecordingSurface {
        fn open(
            &self,
            _url: &str,
            _layout: &crate::webview::WebViewLayout,
            _bridge: BridgeHandle,
        ) -> SdkResult<()> {
            Ok(())
        }

        fn notify_read(&self, key: &str, value: Option<&Value>) {
            self.reads
                .lock()
                .expect("reads lock")
                .push((key.to_string(), value.cloned()));
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session() -> (
        Arc<MemoryStore>,
        Arc<RecordingSurface>,
        BridgeHandle,
        oneshot::Receiver<SessionOutcome>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let surface = Arc::new(RecordingSurface::default());
        let (handle, rx) = BridgeHandle::new(
            store.clone(),
            surface.clone(),
            Arc::new(EventLogger::new()),
        );
        (store, surface, handle, rx)
    }

    #[test]
    fn message_parsing() {
        let write: BridgeMessage =
            serde_json::from_str(r#"{"action":"write","data":"{\"a\":1}"}"#).expect("write");
        assert_eq!(
            write,
            BridgeMessage::Write {
                data: "{\"a\":1}".to_string()
            }
        );

        let read: BridgeMessage =
            serde_json::from_str(r#"{"action":"read","data":"IABTCF_TCString"}"#).expect("read");
        assert_eq!(
            read,
            BridgeMessage::Read {
                data: "IABTCF_TCString".to_string()
            }
        );

        let ready: BridgeMessage = serde_json::from_str(r#"{"action":"ready"}"#).expect("ready");
        assert_eq!(ready, BridgeMessage::Ready);
    }

    #[test]
    fn write_applies_values_and_deletes_nulls() {
        let store = MemoryStore::new();
        store.set("b", json!("old"));

        let applied = apply_write(&store, r#"{"a":"1","b":null}"#).expect("apply");
        assert_eq!(applied, 2);
        assert_eq!(store.get("a"), Some(json!("1")));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn write_stores_native_json_types() {
        let store = MemoryStore::new();
        apply_write(&store, r#"{"n":7,"flag":true,"s":"x"}"#).expect("apply");
        assert_eq!(store.get("n"), Some(json!(7)));
        assert_eq!(store.get("flag"), Some(json!(true)));
        assert_eq!(store.get("s"), Some(json!("x")));
    }

    #[test]
    fn malformed_write_is_rejected_atomically() {
        let store = MemoryStore::new();
        assert!(matches!(
            apply_write(&store, "not json"),
            Err(SdkError::Protocol(_))
        ));
        assert!(matches!(
            apply_write(&store, r#"[1,2]"#),
            Err(SdkError::Protocol(_))
        ));
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn ready_after_write_reports_write_occurred() {
        let (_store, surface, handle, rx) = session();

        handle.handle_raw(r#"{"action":"write","data":"{\"IABTCF_TCString\":\"CPz\"}"}"#);
        handle.handle_raw(r#"{"action":"ready"}"#);

        let outcome = rx.await.expect("outcome");
        assert!(outcome.write_occurred);
        assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ready_without_write_reports_no_write() {
        let (_store, _surface, handle, rx) = session();
        handle.handle(BridgeMessage::Ready);
        let outcome = rx.await.expect("outcome");
        assert!(!outcome.write_occurred);
    }

    #[tokio::test]
    async fn rejected_write_does_not_count() {
        let (store, _surface, handle, rx) = session();
        handle.handle(BridgeMessage::Write {
            data: "garbage".to_string(),
        });
        handle.handle(BridgeMessage::Ready);

        assert!(store.keys().is_empty());
        let outcome = rx.await.expect("outcome");
        assert!(!outcome.write_occurred);
    }

    #[tokio::test]
    async fn duplicate_ready_tears_down_once() {
        let (_store, surface, handle, rx) = session();
        handle.handle(BridgeMessage::Ready);
        handle.handle(BridgeMessage::Ready);

        assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
        assert!(rx.await.is_ok());
    }

    #[test]
    fn read_echoes_value_or_null() {
        let (store, surface, handle, _rx) = session();
        store.set("IABTCF_TCString", json!("CPz"));

        handle.handle(BridgeMessage::Read {
            data: "IABTCF_TCString".to_string(),
        });
        handle.handle(BridgeMessage::Read {
            data: "missing".to_string(),
        });

        let reads = surface.reads.lock().expect("reads");
        assert_eq!(reads[0], ("IABTCF_TCString".to_string(), Some(json!("CPz"))));
        assert_eq!(reads[1], ("missing".to_string(), None));
    }

    #[test]
    fn unrecognized_message_is_dropped() {
        let (store, surface, handle, _rx) = session();
        handle.handle_raw(r#"{"action":"explode"}"#);
        handle.handle_raw("not json at all");
        assert!(store.keys().is_empty());
        assert!(surface.reads.lock().expect("reads").is_empty());
    }
}
