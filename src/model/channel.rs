//! Identifiers shared by the stores and the chat transport.

use minicbor::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A chat the transport can deliver to: a rider's private chat, the driver group, the admin chat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
#[serde(transparent)]
#[cbor(transparent)]
pub struct ChatId(#[n(0)] pub i64);

impl Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chat_{}", self.0)
    }
}

/// Handle to a message the transport has posted, needed to edit or delete it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct MessageRef {
    #[n(0)]
    pub chat_id: ChatId,
    #[n(1)]
    pub message_id: i64,
}

impl Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

/// A WGS84 coordinate pair from a location share.
#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct GeoPoint {
    #[n(0)]
    pub latitude: f64,
    #[n(1)]
    pub longitude: f64,
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
