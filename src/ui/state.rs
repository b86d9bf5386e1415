use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::common::ChatMessage;

// ========== Request progress ==========

/// Progress of a form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// Holds the message shown to the user; the form keeps its input.
    Failed(String),
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Progress of the one-time fetch a view does when it is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Single-slot outcome message: an error or a success, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

/// What a submit call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Another submission of the same form is still in flight.
    Busy,
    /// Rejected locally; nothing was sent.
    Invalid,
    Sent,
    Failed,
    /// Completed after the view was disposed; the result was dropped.
    Discarded,
}

// ========== View lifetime ==========

/// Tracks whether a view is still alive so late completions can be dropped.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    disposed: Arc<AtomicBool>,
}

impl Lifecycle {
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

// ========== Messages ==========

/// Message list in fetch/send order.
///
/// Both mutations rewrite the list as it stands when they run, so an initial
/// fetch and a send can complete in either order without losing each
/// other's effect.
#[derive(Debug, Clone, Default)]
pub struct MessageList {
    messages: Vec<ChatMessage>,
}

impl MessageList {
    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message this client sent, unless the list already has it.
    pub fn push_message(&mut self, message: ChatMessage) {
        if self.contains(message.id) {
            log::debug!("Message {} already listed", message.id);
            return;
        }
        self.messages.push(message);
    }

    /// Install the fetched history, keeping messages appended locally that
    /// the history does not include yet.
    pub fn push_history(&mut self, history: Vec<ChatMessage>) {
        let local: Vec<ChatMessage> = self
            .messages
            .drain(..)
            .filter(|message| !history.iter().any(|known| known.id == message.id))
            .collect();
        self.messages = history;
        self.messages.extend(local);
    }

    fn contains(&self, id: i64) -> bool {
        self.messages.iter().any(|message| message.id == id)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
