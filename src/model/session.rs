//! Per-rider conversation state.

use crate::model::{ChatId, Locale, OrderId};
use minicbor::{Decode, Encode};
use std::fmt::Display;

/// A rider's chat user id. Private chats share the user's id, so this doubles as the reply target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
#[cbor(transparent)]
pub struct RiderId(#[n(0)] pub i64);

impl RiderId {
    pub fn chat(self) -> ChatId {
        ChatId(self.0)
    }
}

impl Display for RiderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rider_{}", self.0)
    }
}

/// Where the rider is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum Step {
    #[n(0)]
    Idle,
    #[n(1)]
    AwaitingPickup,
    #[n(2)]
    AwaitingDropoff,
    #[n(3)]
    AwaitingContact,
    #[n(4)]
    AwaitingComment,
    #[n(5)]
    AwaitingFreeformQuestion,
}

impl Step {
    /// Steps that collect fields of the session's active order.
    pub fn is_order_step(self) -> bool {
        matches!(
            self,
            Step::AwaitingPickup | Step::AwaitingDropoff | Step::AwaitingContact | Step::AwaitingComment
        )
    }

    /// The order step after this one. `AwaitingComment` closes the sequence instead.
    pub fn next_order_step(self) -> Option<Step> {
        match self {
            Step::AwaitingPickup => Some(Step::AwaitingDropoff),
            Step::AwaitingDropoff => Some(Step::AwaitingContact),
            Step::AwaitingContact => Some(Step::AwaitingComment),
            _ => None,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Idle => "idle",
            Step::AwaitingPickup => "awaiting_pickup",
            Step::AwaitingDropoff => "awaiting_dropoff",
            Step::AwaitingContact => "awaiting_contact",
            Step::AwaitingComment => "awaiting_comment",
            Step::AwaitingFreeformQuestion => "awaiting_freeform_question",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Session {
    #[n(0)]
    pub rider_id: RiderId,
    #[n(1)]
    pub display_name: String,
    #[n(2)]
    pub profile_link: Option<String>,
    #[n(3)]
    pub current_step: Step,
    /// Set exactly while `current_step` is an order step.
    #[n(4)]
    pub active_order_id: Option<OrderId>,
    /// Previously used contacts, oldest first, without duplicates.
    #[n(5)]
    pub contact_history: Vec<String>,
    #[n(6)]
    pub locale: Locale,
    /// Unix seconds.
    #[n(7)]
    pub created_at: i64,
}

impl Session {
    pub fn new(params: SessionCreate) -> Self {
        Self {
            rider_id: params.rider_id,
            display_name: params.display_name,
            profile_link: params.profile_link,
            current_step: Step::Idle,
            active_order_id: None,
            contact_history: Vec::new(),
            locale: params.locale,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_step == Step::Idle
    }
}

#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub rider_id: RiderId,
    pub display_name: String,
    pub profile_link: Option<String>,
    pub locale: Locale,
}

/// Profile refresh sent on `/start`.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub display_name: Option<String>,
    /// `Some(None)` clears a stored link.
    pub profile_link: Option<Option<String>>,
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone)]
pub enum SessionQuery {
    All,
    AtStep(Step),
}
