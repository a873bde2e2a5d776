//! # Chat Transport Seam
//!
//! The core never talks to a chat API directly. It produces [`OutboundMessage`]s for a
//! [`ChatId`], hands them to a [`ChatTransport`], and consumes inbound [`RiderUpdate`]s and
//! [`DriverCallback`]s that an adapter has already parsed.
//!
//! - [`recording`] - in-memory transport used by tests and the console demo
//! - [`geocoder`] - reverse geocoding seam for location shares

pub mod geocoder;
pub mod recording;

pub use geocoder::*;
pub use recording::*;

pub use crate::model::{ChatId, GeoPoint, MessageRef};
use crate::model::{OrderId, RiderId};
use async_trait::async_trait;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The chat API refused the request (blocked bot, deleted message, bad markup).
    #[error("Rejected by chat API: {0}")]
    Rejected(String),
    #[error("Chat API unreachable: {0}")]
    Unreachable(String),
    #[error("Chat API timed out")]
    Timeout,
}

/// Acknowledgement of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_ref: MessageRef,
}

/// Structured data attached to an inline button and echoed back when it is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPayload {
    Accept { order_id: OrderId },
}

impl Display for CallbackPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackPayload::Accept { order_id } => write!(f, "accept:{}", order_id.0),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed callback payload: {0:?}")]
pub struct PayloadError(pub String);

impl FromStr for CallbackPayload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PayloadError(s.to_string());
        let (kind, value) = s.split_once(':').ok_or_else(malformed)?;
        match kind {
            "accept" => {
                let id = value.parse::<u64>().map_err(|_| malformed())?;
                Ok(CallbackPayload::Accept {
                    order_id: OrderId(id),
                })
            }
            _ => Err(malformed()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineButton {
    pub label: String,
    pub payload: CallbackPayload,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Keyboard {
    /// Leave whatever keyboard the chat currently shows.
    #[default]
    Keep,
    /// Remove the reply keyboard.
    Remove,
    /// Reply keyboard, one inner `Vec` per row.
    Reply(Vec<Vec<String>>),
    /// Buttons attached to the message itself.
    Inline(Vec<InlineButton>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Keyboard,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Keep,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn deliver(
        &self,
        target: ChatId,
        message: OutboundMessage,
    ) -> Result<DeliveryReceipt, TransportError>;

    /// Replaces the text of a posted message and drops its inline buttons.
    async fn edit_message(&self, message_ref: MessageRef, text: String) -> Result<(), TransportError>;

    async fn delete_message(&self, message_ref: MessageRef) -> Result<(), TransportError>;
}

/// Who sent a rider update, as reported by the chat API.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderProfile {
    pub rider_id: RiderId,
    pub display_name: String,
    pub profile_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiderPayload {
    Text(String),
    Location(GeoPoint),
}

/// One inbound message from a rider's private chat.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderUpdate {
    pub profile: RiderProfile,
    pub payload: RiderPayload,
}

impl RiderUpdate {
    pub fn text(profile: RiderProfile, text: impl Into<String>) -> Self {
        Self {
            profile,
            payload: RiderPayload::Text(text.into()),
        }
    }

    pub fn location(profile: RiderProfile, point: GeoPoint) -> Self {
        Self {
            profile,
            payload: RiderPayload::Location(point),
        }
    }
}

/// A button press in the driver channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverCallback {
    pub driver_name: String,
    /// The driver's private chat, for direct replies.
    pub driver_chat: ChatId,
    pub payload: CallbackPayload,
    /// The announcement the button belongs to, when the transport reports it.
    pub message_ref: Option<MessageRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_payload_parses_back() {
        let payload = CallbackPayload::Accept {
            order_id: OrderId(7),
        };
        assert_eq!(payload.to_string(), "accept:7");
        assert_eq!("accept:7".parse::<CallbackPayload>(), Ok(payload));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for raw in ["accept", "accept:", "accept:seven", "decline:7", "Принят! Водитель: Ivan"] {
            assert!(raw.parse::<CallbackPayload>().is_err(), "{raw} should not parse");
        }
    }
}
