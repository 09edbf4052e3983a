//! Numeric constants driving the integration step.

use thiserror::Error;

/// Errors reported by [`PhysicsConfig::validate`].
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The angular velocity window must be a positive, finite duration.
    #[error("angular velocity window must be positive and finite, got {0} ms")]
    NonPositiveWindow(f32),
    /// A straightening threshold is negative or not finite.
    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidThreshold {
        /// Which threshold failed.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
}

/// Immutable tuning values shared by every step of a [`PhysicalObject`](crate::dynamics::PhysicalObject).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    /// Duration, in milliseconds, of the rotation stored in an angular velocity matrix.
    pub angular_velocity_window_ms: f32,
    /// Velocity matrix components this close to `0` or `±1` are snapped after each step.
    pub velocity_straighten_threshold: f32,
    /// Angular velocity matrix components this close to `0` or `±1` are snapped after each step.
    pub angular_velocity_straighten_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            angular_velocity_window_ms: 5.0,
            velocity_straighten_threshold: 1.0e-4,
            angular_velocity_straighten_threshold: 1.0e-5,
        }
    }
}

impl PhysicsConfig {
    /// Sets the angular velocity window, in milliseconds.
    pub fn with_angular_velocity_window_ms(mut self, window_ms: f32) -> Self {
        self.angular_velocity_window_ms = window_ms;
        self
    }

    /// Sets the velocity straightening threshold.
    pub fn with_velocity_straighten_threshold(mut self, threshold: f32) -> Self {
        self.velocity_straighten_threshold = threshold;
        self
    }

    /// Sets the angular velocity straightening threshold.
    pub fn with_angular_velocity_straighten_threshold(mut self, threshold: f32) -> Self {
        self.angular_velocity_straighten_threshold = threshold;
        self
    }

    /// The angular velocity window in seconds.
    pub fn angular_velocity_window_s(&self) -> f32 {
        self.angular_velocity_window_ms / 1000.0
    }

    /// Checks that every value is usable by the integrator.
    ///
    /// The simulation itself never validates; hosts loading a config from disk should call this
    /// once before handing it to any object.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.angular_velocity_window_ms;
        if !(window.is_finite() && window > 0.0) {
            tracing::debug!(window, "rejected physics config");
            return Err(ConfigError::NonPositiveWindow(window));
        }

        for (name, value) in [
            (
                "velocity_straighten_threshold",
                self.velocity_straighten_threshold,
            ),
            (
                "angular_velocity_straighten_threshold",
                self.angular_velocity_straighten_threshold,
            ),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                tracing::debug!(name, value, "rejected physics config");
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PhysicsConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.angular_velocity_window_s(), 0.005);
    }

    #[test]
    fn rejects_bad_window() {
        for window in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let config = PhysicsConfig::default().with_angular_velocity_window_ms(window);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NonPositiveWindow(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_threshold() {
        let config = PhysicsConfig::default().with_angular_velocity_straighten_threshold(-1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "angular_velocity_straighten_threshold",
                value: -1.0,
            })
        );
        let config = PhysicsConfig::default().with_velocity_straighten_threshold(f32::NAN);
        assert!(config.validate().is_err());
    }
}
