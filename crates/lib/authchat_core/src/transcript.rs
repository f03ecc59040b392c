//! Chat transcript state machine backing the chat page.
//!
//! Append-only and in-memory. A submit appends the user's turn right away,
//! blocks further submits until the reply (or failure) is recorded, then
//! appends exactly one bot turn.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::models::chat::{ChatMessage, Sender};

/// Bot turn recorded when the chat call fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    pending: bool,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// A call is outstanding; the send control should be disabled.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start a submit.
    ///
    /// Returns the text to send, or `None` when nothing should go out: the
    /// input is blank or a call is already outstanding.
    pub fn begin_submit(&mut self, input: &str, now: DateTime<Utc>) -> Option<String> {
        if self.pending || input.trim().is_empty() {
            return None;
        }
        self.push(input.to_string(), Sender::User, now);
        self.pending = true;
        Some(input.to_string())
    }

    /// Record the outcome of the call started by `begin_submit`.
    ///
    /// Ignored when no call is outstanding.
    pub fn complete<E>(&mut self, outcome: Result<String, E>, now: DateTime<Utc>) {
        if !self.pending {
            return;
        }
        let content = outcome.unwrap_or_else(|_| FALLBACK_REPLY.to_string());
        self.push(content, Sender::Bot, now);
        self.pending = false;
    }

    /// Run a full submit against `send`. Returns whether a call was made.
    pub async fn submit<F, Fut, E>(&mut self, input: &str, send: F) -> bool
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let Some(message) = self.begin_submit(input, Utc::now()) else {
            return false;
        };
        let outcome = send(message).await;
        self.complete(outcome, Utc::now());
        true
    }

    fn push(&mut self, content: String, sender: Sender, now: DateTime<Utc>) {
        // Clocks can step backwards; keep the transcript ordered.
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: format!("{}-{}", timestamp.timestamp_millis(), self.next_id),
            content,
            sender,
            timestamp,
        });
    }
}
