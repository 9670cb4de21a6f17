//! Errors raised by the dummy sensor.

use simhost::noise::NoiseError;
use simhost::transport::TransportError;
use thiserror::Error;

/// Failure of a [`DummySensor`](crate::DummySensor) operation.
///
/// None of these are fatal to the host: the system logs them and carries
/// on with the remaining sensors.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The configuration asked for a different sensor kind.
    #[error("trying to load [{expected}] sensor, but got type [{found}] instead")]
    KindMismatch {
        /// Kind this implementation handles.
        expected: &'static str,
        /// Kind found in the configuration.
        found: String,
    },

    /// The noise block could not be turned into a noise model.
    #[error("failed to load noise: {0}")]
    Noise(#[from] NoiseError),

    /// The output channel could not be opened.
    #[error("failed to advertise output channel: {0}")]
    Advertise(#[source] TransportError),

    /// The output channel is not open.
    #[error("invalid output channel for sensor [{sensor}]")]
    ChannelInvalid {
        /// Scoped sensor name.
        sensor: String,
    },

    /// Publishing failed after the channel was found valid.
    #[error("failed to publish: {0}")]
    Publish(#[source] TransportError),
}

impl SensorError {
    /// Returns `true` for errors raised while loading the sensor.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::KindMismatch { .. } | Self::Noise(_) | Self::Advertise(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_names_both_kinds() {
        let err = SensorError::KindMismatch {
            expected: "rfid",
            found: "camera".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[rfid]"));
        assert!(msg.contains("[camera]"));
        assert!(err.is_load_error());
    }

    #[test]
    fn update_errors_are_not_load_errors() {
        let err = SensorError::ChannelInvalid { sensor: "box::tag".into() };
        assert!(!err.is_load_error());
        assert!(err.to_string().contains("box::tag"));
        assert!(!SensorError::Publish(TransportError::Closed).is_load_error());
    }

    #[test]
    fn noise_errors_convert() {
        let err: SensorError = NoiseError::MissingPrecision.into();
        assert!(matches!(err, SensorError::Noise(NoiseError::MissingPrecision)));
    }
}
