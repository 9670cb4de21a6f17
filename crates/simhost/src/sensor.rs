//! Sensor plumbing shared by sensor implementations.
//!
//! A sensor implementation embeds a [`SensorBase`] for the state every
//! sensor has (name, topic, parent, sequence counter) and implements the
//! [`Sensor`] trait. Systems build sensors through [`create_sensor`], which
//! constructs and loads in one step so that a sensor that failed to load is
//! never observable.

use std::time::Duration;

use crate::config::SensorConfig;
use crate::msgs::{Header, HeaderData};
use crate::transport::Node;

/// Header key carrying the per-sensor sequence number.
pub const SEQUENCE_KEY: &str = "seq";

/// Behaviour every sensor implementation provides.
pub trait Sensor: Send {
    /// Error returned by `load` and `update`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates an unloaded sensor that will communicate through `node`.
    fn new(node: Node) -> Self
    where
        Self: Sized;

    /// Initializes the sensor from its configuration. Called once.
    ///
    /// # Errors
    ///
    /// Implementation defined; a failed load leaves the sensor unusable.
    fn load(&mut self, config: &SensorConfig) -> Result<(), Self::Error>;

    /// Produces and publishes data for simulation time `now`.
    ///
    /// # Errors
    ///
    /// Implementation defined; a failed update publishes nothing.
    fn update(&mut self, now: Duration) -> Result<(), Self::Error>;

    /// Shared sensor state.
    fn base(&self) -> &SensorBase;

    /// Mutable shared sensor state.
    fn base_mut(&mut self) -> &mut SensorBase;

    /// Sensor name.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Output topic.
    fn topic(&self) -> &str {
        self.base().topic()
    }

    /// Name of the entity the sensor is attached to, if known.
    fn parent(&self) -> Option<&str> {
        self.base().parent()
    }

    /// Records the name of the entity the sensor is attached to.
    fn set_parent(&mut self, parent: impl Into<String>)
    where
        Self: Sized,
    {
        self.base_mut().set_parent(parent);
    }
}

/// State common to all sensors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorBase {
    name: String,
    topic: String,
    parent: Option<String>,
    sequence: u64,
}

impl SensorBase {
    /// Loads name and topic from `config`.
    ///
    /// An empty topic defaults to the scoped name with `::` turned into `/`,
    /// followed by `/<suffix>`.
    pub fn load_common(&mut self, config: &SensorConfig, suffix: &str) {
        self.name.clone_from(&config.name);
        self.topic = if config.topic.is_empty() {
            format!("{}/{suffix}", config.name.replace("::", "/"))
        } else {
            config.topic.clone()
        };
    }

    /// Sensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Parent entity name, if set.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Sets the parent entity name.
    pub fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    /// Last sequence number handed out; zero before the first message.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Advances the sequence counter and appends it to `header`.
    ///
    /// The first call yields `1`.
    pub fn add_sequence(&mut self, header: &mut Header) -> u64 {
        self.sequence += 1;
        header
            .data
            .push(HeaderData::new(SEQUENCE_KEY, self.sequence.to_string()));
        self.sequence
    }
}

/// Constructs a sensor of type `S` and loads it from `config`.
///
/// # Errors
///
/// Returns the sensor's load error; the half-built sensor is dropped, which
/// releases anything it acquired.
pub fn create_sensor<S: Sensor>(node: &Node, config: &SensorConfig) -> Result<S, S::Error> {
    let mut sensor = S::new(node.clone());
    sensor.load(config)?;
    Ok(sensor)
}
