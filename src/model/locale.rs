use minicbor::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Language a rider's prompts are rendered in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    #[n(0)]
    En,
    #[n(1)]
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];
}
