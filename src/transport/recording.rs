//! In-memory [`ChatTransport`] that records everything it is asked to do.

use super::{ChatTransport, DeliveryReceipt, OutboundMessage, TransportError};
use crate::model::{ChatId, MessageRef};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// A delivered message, as the recording transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    pub target: ChatId,
    pub message: OutboundMessage,
    pub message_ref: MessageRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edited {
    pub message_ref: MessageRef,
    pub text: String,
}

#[derive(Default)]
struct Journal {
    delivered: Vec<Delivered>,
    edits: Vec<Edited>,
    deleted: Vec<MessageRef>,
    /// Last message id handed out per chat.
    last_ids: HashMap<ChatId, i64>,
    failures: VecDeque<TransportError>,
}

impl Journal {
    fn take_failure(&mut self) -> Result<(), TransportError> {
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Assigns message ids per chat and keeps a journal of deliveries, edits and deletions.
#[derive(Default)]
pub struct RecordingTransport {
    journal: Mutex<Journal>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls of any kind fail with [`TransportError::Unreachable`].
    pub fn fail_next(&self, count: usize) {
        self.fail_next_with(count, TransportError::Unreachable("injected failure".into()));
    }

    /// Makes the next `count` calls of any kind fail with `error`.
    pub fn fail_next_with(&self, count: usize, error: TransportError) {
        let mut journal = self.journal();
        journal.failures.clear();
        journal.failures.extend(std::iter::repeat(error).take(count));
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.journal().delivered.clone()
    }

    pub fn delivered_to(&self, target: ChatId) -> Vec<Delivered> {
        self.journal()
            .delivered
            .iter()
            .filter(|d| d.target == target)
            .cloned()
            .collect()
    }

    pub fn edits(&self) -> Vec<Edited> {
        self.journal().edits.clone()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.journal().deleted.clone()
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn deliver(
        &self,
        target: ChatId,
        message: OutboundMessage,
    ) -> Result<DeliveryReceipt, TransportError> {
        let mut journal = self.journal();
        if let Err(e) = journal.take_failure() {
            warn!(%target, error = %e, "Delivery failed");
            return Err(e);
        }

        let next = journal.last_ids.entry(target).or_insert(0);
        *next += 1;
        let message_ref = MessageRef {
            chat_id: target,
            message_id: *next,
        };
        info!(%target, message_id = message_ref.message_id, text = %message.text, "Delivered");
        journal.delivered.push(Delivered {
            target,
            message,
            message_ref,
        });
        Ok(DeliveryReceipt { message_ref })
    }

    async fn edit_message(&self, message_ref: MessageRef, text: String) -> Result<(), TransportError> {
        let mut journal = self.journal();
        journal.take_failure()?;
        info!(%message_ref, %text, "Edited");
        journal.edits.push(Edited { message_ref, text });
        Ok(())
    }

    async fn delete_message(&self, message_ref: MessageRef) -> Result<(), TransportError> {
        let mut journal = self.journal();
        journal.take_failure()?;
        info!(%message_ref, "Deleted");
        journal.deleted.push(message_ref);
        Ok(())
    }
}
