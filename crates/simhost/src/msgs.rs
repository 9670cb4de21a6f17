//! Message types carried by the transport.
//!
//! Messages are plain serde structs tagged with a wire type name through the
//! [`Message`] trait. The transport owns the encoding; publishers and
//! subscribers only ever handle typed values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A type that can travel over the transport.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Wire type name, used to reject mismatched advertisements.
    const TYPE_NAME: &'static str;
}

/// Simulation timestamp split into seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Time {
    /// Whole seconds.
    pub sec: i64,
    /// Nanoseconds past `sec`.
    pub nsec: i32,
}

impl From<Duration> for Time {
    fn from(duration: Duration) -> Self {
        Self {
            sec: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            // subsec_nanos is always below 1e9
            nsec: i32::try_from(duration.subsec_nanos()).unwrap_or(i32::MAX),
        }
    }
}

/// One key with its values in a header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderData {
    /// Entry key, e.g. `frame_id` or `seq`.
    pub key: String,
    /// Entry values.
    pub value: Vec<String>,
}

impl HeaderData {
    /// Creates an entry with a single value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: vec![value.into()],
        }
    }
}

/// Common message header: a timestamp plus free-form key/value data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Time the data was produced.
    pub stamp: Time,
    /// Header entries in insertion order.
    pub data: Vec<HeaderData>,
}

impl Header {
    /// Returns the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.first())
            .map(String::as_str)
    }
}

/// A string payload with a header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringMsg {
    /// Message header.
    pub header: Header,
    /// Payload.
    pub data: String,
}

impl Message for StringMsg {
    const TYPE_NAME: &'static str = "gz.msgs.StringMsg";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_from_duration_splits_seconds() {
        let time = Time::from(Duration::from_millis(2_500));
        assert_eq!(time, Time { sec: 2, nsec: 500_000_000 });
    }

    #[test]
    fn header_get_returns_first_value() {
        let header = Header {
            stamp: Time::default(),
            data: vec![HeaderData::new("frame_id", "tag"), HeaderData::new("seq", "3")],
        };
        assert_eq!(header.get("frame_id"), Some("tag"));
        assert_eq!(header.get("seq"), Some("3"));
        assert_eq!(header.get("missing"), None);
    }
}
