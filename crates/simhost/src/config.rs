//! Parsed sensor configuration handed to plugins.
//!
//! The host turns its world description into [`SensorConfig`] values and
//! attaches them to sensor entities through
//! [`Component::CustomSensor`](crate::entity::Component::CustomSensor).
//! Plugins never see raw configuration text.
//!
//! A custom sensor names its implementation with `kind` and keeps its
//! implementation-specific settings in an extension element keyed
//! `gz:<kind>`:
//!
//! ```
//! use simhost::config::{SensorConfig, SensorElement};
//! use simhost::noise::NoiseConfig;
//!
//! let config = SensorConfig::new("reader", "rfid")
//!     .with_element("gz:rfid", SensorElement::with_noise(NoiseConfig::gaussian(0.0, 0.1)));
//!
//! assert_eq!(config.extension_key(), "gz:rfid");
//! assert!(config.extension().and_then(|e| e.noise.as_ref()).is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::noise::NoiseConfig;

/// Configuration of one custom sensor instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sensor name, unique within its parent scope.
    pub name: String,
    /// Custom sensor type tag, e.g. `rfid`.
    pub kind: String,
    /// Output topic. Empty means "let the host or sensor derive one".
    #[serde(default)]
    pub topic: String,
    /// Extension elements keyed by element name (`gz:<kind>`).
    #[serde(default)]
    pub elements: BTreeMap<String, SensorElement>,
}

/// Implementation-specific block of a custom sensor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorElement {
    /// Optional noise description.
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
}

impl SensorElement {
    /// Creates an element carrying only a noise block.
    #[must_use]
    pub fn with_noise(noise: NoiseConfig) -> Self {
        Self { noise: Some(noise) }
    }
}

impl SensorConfig {
    /// Creates a configuration with an empty topic and no extension elements.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            topic: String::new(),
            elements: BTreeMap::new(),
        }
    }

    /// Sets the output topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Adds (or replaces) an extension element.
    #[must_use]
    pub fn with_element(mut self, key: impl Into<String>, element: SensorElement) -> Self {
        self.elements.insert(key.into(), element);
        self
    }

    /// Key of this sensor's own extension element.
    #[must_use]
    pub fn extension_key(&self) -> String {
        format!("gz:{}", self.kind)
    }

    /// Returns this sensor's own extension element, if configured.
    #[must_use]
    pub fn extension(&self) -> Option<&SensorElement> {
        self.elements.get(&self.extension_key())
    }

    /// Returns an arbitrary extension element by key.
    #[must_use]
    pub fn element(&self, key: &str) -> Option<&SensorElement> {
        self.elements.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_empty_topic_and_no_elements() {
        let config = SensorConfig::new("tag", "rfid");
        assert!(config.topic.is_empty());
        assert!(config.extension().is_none());
    }

    #[test]
    fn extension_is_keyed_by_kind() {
        let config = SensorConfig::new("tag", "rfid")
            .with_element("gz:lidar", SensorElement::default());
        assert!(config.extension().is_none());
        assert!(config.element("gz:lidar").is_some());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{ "name": "tag", "kind": "rfid" }"#;
        let config: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, SensorConfig::new("tag", "rfid"));
    }

    #[test]
    fn deserializes_noise_block() {
        let json = r#"{
            "name": "tag",
            "kind": "rfid",
            "topic": "custom/topic",
            "elements": {
                "gz:rfid": { "noise": { "type": "gaussian", "mean": 0.5, "stddev": 0.1 } }
            }
        }"#;
        let config: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.topic, "custom/topic");
        let noise = config.extension().and_then(|e| e.noise.clone()).unwrap();
        assert_eq!(noise, NoiseConfig::gaussian(0.5, 0.1));
    }
}
