//! The dummy RFID-like sensor.
//!
//! A [`DummySensor`] publishes a constant [`PAYLOAD`] on its topic every
//! time it is updated. It carries an optional noise model and the last known
//! world position of the entity it is attached to, neither of which affect
//! the payload yet.
//!
//! # Example
//!
//! ```
//! use dummysensor::DummySensor;
//! use simhost::config::SensorConfig;
//! use simhost::msgs::StringMsg;
//! use simhost::sensor::{create_sensor, Sensor};
//! use simhost::transport::Transport;
//! use std::time::Duration;
//!
//! let transport = Transport::new();
//! let node = transport.node();
//! let config = SensorConfig::new("box::base::tag", "rfid").with_topic("/tag");
//! let sub = node.subscribe::<StringMsg>("/tag").unwrap();
//!
//! let mut sensor: DummySensor = create_sensor(&node, &config).unwrap();
//! sensor.update(Duration::from_millis(10)).unwrap();
//!
//! let msg = sub.try_recv().unwrap().unwrap();
//! assert_eq!(msg.data, "Hello World!");
//! assert_eq!(msg.header.get("frame_id"), Some("box::base::tag"));
//! ```

use glam::DVec3;
use simhost::config::SensorConfig;
use simhost::msgs::{Header, HeaderData, StringMsg};
use simhost::noise::NoiseModel;
use simhost::sensor::{Sensor, SensorBase};
use simhost::transport::{Node, Publisher};
use std::time::Duration;
use tracing::{debug, error, trace};

use crate::error::SensorError;

/// Payload carried by every message.
pub const PAYLOAD: &str = "Hello World!";

/// Sensor kind this implementation handles.
pub const KIND: &str = "rfid";

/// Header key carrying the sensor name.
pub const FRAME_ID_KEY: &str = "frame_id";

/// A sensor that publishes a constant string.
#[derive(Debug)]
pub struct DummySensor {
    base: SensorBase,
    node: Node,
    publisher: Option<Publisher<StringMsg>>,
    noise: Option<NoiseModel>,
    position: DVec3,
}

impl DummySensor {
    /// Noise model loaded from configuration, if any.
    #[must_use]
    pub fn noise(&self) -> Option<&NoiseModel> {
        self.noise.as_ref()
    }

    /// Last world-frame position of the parent entity.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Stores the latest world-frame position of the parent entity.
    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    /// Sequence number of the last published message; zero before the first.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.base.sequence()
    }

    /// Returns `true` if the output channel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.publisher.as_ref().is_some_and(Publisher::valid)
    }

    /// Releases the output channel and destroys the sensor.
    pub fn close(mut self) {
        if let Some(mut publisher) = self.publisher.take() {
            publisher.unadvertise();
            debug!(sensor = %self.base.name(), topic = %self.base.topic(), "closed sensor");
        }
    }

    fn load_noise(&self, config: &SensorConfig) -> Result<Option<NoiseModel>, SensorError> {
        let Some(element) = config.extension() else {
            debug!(
                sensor = %config.name,
                "No custom configuration for [{}]",
                self.base.topic()
            );
            return Ok(None);
        };
        let Some(noise) = &element.noise else {
            debug!(sensor = %config.name, "No noise for [{}]", self.base.topic());
            return Ok(None);
        };

        NoiseModel::from_config(noise).map(Some).map_err(|err| {
            error!(sensor = %config.name, %err, "Failed to load noise");
            SensorError::from(err)
        })
    }
}

impl Sensor for DummySensor {
    type Error = SensorError;

    fn new(node: Node) -> Self {
        Self {
            base: SensorBase::default(),
            node,
            publisher: None,
            noise: None,
            position: DVec3::ZERO,
        }
    }

    fn load(&mut self, config: &SensorConfig) -> Result<(), SensorError> {
        if config.kind != KIND {
            error!(
                sensor = %config.name,
                "Trying to load [{KIND}] sensor, but got type [{}] instead",
                config.kind
            );
            return Err(SensorError::KindMismatch {
                expected: KIND,
                found: config.kind.clone(),
            });
        }

        self.base.load_common(config, KIND);
        let noise = self.load_noise(config)?;

        let topic = self.base.topic();
        let publisher = self.node.advertise::<StringMsg>(topic).map_err(|err| {
            error!(sensor = %config.name, topic, %err, "Unable to create publisher");
            SensorError::Advertise(err)
        })?;
        debug!(sensor = %config.name, topic, "Advertised");

        self.noise = noise;
        self.publisher = Some(publisher);
        Ok(())
    }

    fn update(&mut self, now: Duration) -> Result<(), SensorError> {
        let Some(publisher) = self.publisher.as_ref().filter(|publisher| publisher.valid()) else {
            error!(sensor = %self.base.name(), "Invalid publisher");
            return Err(SensorError::ChannelInvalid {
                sensor: self.base.name().to_owned(),
            });
        };

        let mut header = Header {
            stamp: now.into(),
            data: vec![HeaderData::new(FRAME_ID_KEY, self.base.name())],
        };
        let seq = self.base.add_sequence(&mut header);
        let msg = StringMsg {
            header,
            data: PAYLOAD.to_owned(),
        };

        publisher.publish(&msg).map_err(SensorError::Publish)?;
        trace!(sensor = %self.base.name(), topic = %publisher.topic(), seq, "published");
        Ok(())
    }

    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }
}
