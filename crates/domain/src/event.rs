//! Trigger event — an immutable, already-classified occurrence fed into the
//! engine by watcher processes (device insertion, URL navigation, process
//! activity).
//!
//! Events arrive on the wire as one JSON object:
//!
//! ```json
//! {"trigger": "usbPlugged", "payload": {"class": "mass_storage"}, "source": "udev"}
//! ```
//!
//! [`TriggerEvent::parse`] is the single validation gate: anything that
//! passes it is safe to hand to the matcher.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EventId;
use crate::time::{self, Timestamp};

/// Maximum accepted size of a raw event, in bytes.
pub const MAX_EVENT_BYTES: usize = 8 * 1024;

/// The closed set of trigger types the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerType {
    UsbPlugged,
    UsbRemoved,
    UrlVisited,
    ProcessStarted,
    ProcessStopped,
    ClipboardCopied,
}

impl TriggerType {
    /// Wire name of this trigger type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UsbPlugged => "usbPlugged",
            Self::UsbRemoved => "usbRemoved",
            Self::UrlVisited => "urlVisited",
            Self::ProcessStarted => "processStarted",
            Self::ProcessStopped => "processStopped",
            Self::ClipboardCopied => "clipboardCopied",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usbPlugged" => Ok(Self::UsbPlugged),
            "usbRemoved" => Ok(Self::UsbRemoved),
            "urlVisited" => Ok(Self::UrlVisited),
            "processStarted" => Ok(Self::ProcessStarted),
            "processStopped" => Ok(Self::ProcessStopped),
            "clipboardCopied" => Ok(Self::ClipboardCopied),
            other => Err(ValidationError::UnknownTrigger(other.to_string())),
        }
    }
}

/// Free-form, trigger-type-dependent payload fields.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// An ingested trigger event. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub id: EventId,
    pub trigger: TriggerType,
    pub payload: Payload,
    /// Arrival time, assigned at ingest.
    pub timestamp: Timestamp,
    /// Identifier of the producing source (watcher, socket peer, test).
    pub source: String,
}

/// Wire shape of an incoming event, before validation.
#[derive(Deserialize)]
struct WireEvent {
    trigger: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    #[serde(default)]
    source: Option<String>,
}

impl TriggerEvent {
    /// Construct an event from already-validated parts.
    #[must_use]
    pub fn new(trigger: TriggerType, payload: Payload, source: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            trigger,
            payload,
            timestamp: time::now(),
            source: source.into(),
        }
    }

    /// Parse and validate one raw JSON event.
    ///
    /// `default_source` is used when the wire object carries no `source`
    /// field (e.g. the socket peer name).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the input exceeds
    /// [`MAX_EVENT_BYTES`], is not valid JSON, names an unknown trigger
    /// type, or has a missing/non-object payload.
    pub fn parse(raw: &str, default_source: &str) -> Result<Self, ValidationError> {
        if raw.len() > MAX_EVENT_BYTES {
            return Err(ValidationError::EventTooLarge {
                limit: MAX_EVENT_BYTES,
            });
        }

        let wire: WireEvent = serde_json::from_str(raw)?;
        let trigger: TriggerType = wire.trigger.parse()?;
        let payload = match wire.payload {
            Some(serde_json::Value::Object(map)) => map,
            Some(_) | None => return Err(ValidationError::PayloadNotObject),
        };

        Ok(Self::new(
            trigger,
            payload,
            wire.source.unwrap_or_else(|| default_source.to_string()),
        ))
    }

    /// Borrow a payload field as a string, if present and a string.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(serde_json::Value::as_str)
    }
}
