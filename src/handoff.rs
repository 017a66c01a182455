//! Messenger handoff: the finished transcript travels as a pre-filled
//! message in a deep link. Nothing comes back.

use serde::Serialize;
use crate::domain::transcript::OrderTranscript;

pub const DEFAULT_MESSENGER_ENDPOINT: &str = "https://m.me/887605727771882";

#[derive(Clone, Debug)]
pub struct MessengerHandoff { endpoint: String }

/// What the shopper's browser needs to open the chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Handoff {
    pub url: String,
    pub transcript: String,
}

impl MessengerHandoff {
    pub fn new(endpoint: impl Into<String>) -> Self { Self { endpoint: endpoint.into() } }
    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// `<endpoint>?text=<url-encoded transcript>`
    pub fn link(&self, transcript: &OrderTranscript) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}text={}", self.endpoint, sep, urlencoding::encode(transcript.as_str()))
    }

    pub fn prepare(&self, transcript: OrderTranscript) -> Handoff {
        Handoff { url: self.link(&transcript), transcript: transcript.into_string() }
    }
}

impl Default for MessengerHandoff {
    fn default() -> Self { Self::new(DEFAULT_MESSENGER_ENDPOINT) }
}
