//! Browser bindings for the chat page transcript.
//!
//! The page owns the network call; this side owns ordering, the pending
//! flag and the fallback reply.

use authchat_core::transcript::Transcript;
use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

/// Returns the version of the authchat_wasm package.
#[wasm_bindgen]
pub fn version() -> String {
    authchat_core::version().to_string()
}

fn from_js_millis(ms: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// In-memory transcript; lost on page reload.
#[wasm_bindgen]
#[derive(Default)]
pub struct ChatTranscript {
    inner: Transcript,
}

#[wasm_bindgen]
impl ChatTranscript {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to send, or `undefined` when nothing should be sent.
    #[wasm_bindgen(js_name = beginSubmit)]
    pub fn begin_submit(&mut self, input: &str, now_ms: f64) -> Option<String> {
        self.inner.begin_submit(input, from_js_millis(now_ms))
    }

    #[wasm_bindgen(js_name = completeOk)]
    pub fn complete_ok(&mut self, response: String, now_ms: f64) {
        self.inner
            .complete(Ok::<_, ()>(response), from_js_millis(now_ms));
    }

    #[wasm_bindgen(js_name = completeErr)]
    pub fn complete_err(&mut self, now_ms: f64) {
        self.inner
            .complete(Err::<String, _>(()), from_js_millis(now_ms));
    }

    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }

    /// Transcript entries as a JSON array.
    #[wasm_bindgen(js_name = messagesJson)]
    pub fn messages_json(&self) -> String {
        serde_json::to_string(self.inner.messages()).unwrap_or_else(|_| "[]".into())
    }
}
