//! Transport configuration.

use std::time::Duration;

use mpp_core::CommError;

/// Settings shared by every endpoint of a universe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommConfig {
    /// How long a blocking receive waits for its message before reporting
    /// [`CommError::Timeout`]. Default: 30 s.
    pub collective_timeout: Duration,
    /// How often a blocked receive wakes to check the group abort flag.
    /// Default: 5 ms.
    pub poll_interval: Duration,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            collective_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(5),
        }
    }
}

impl CommConfig {
    /// Config with the given receive timeout and the default poll interval.
    pub fn with_timeout(collective_timeout: Duration) -> Self {
        Self {
            collective_timeout,
            ..Self::default()
        }
    }

    /// Check that both durations are non-zero and the poll interval does
    /// not exceed the timeout.
    pub fn validate(&self) -> Result<(), CommError> {
        if self.collective_timeout.is_zero() {
            return Err(CommError::InvalidConfig {
                reason: "collective_timeout must be non-zero".into(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(CommError::InvalidConfig {
                reason: "poll_interval must be non-zero".into(),
            });
        }
        if self.poll_interval > self.collective_timeout {
            return Err(CommError::InvalidConfig {
                reason: format!(
                    "poll_interval {:?} exceeds collective_timeout {:?}",
                    self.poll_interval, self.collective_timeout
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(CommConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = CommConfig::with_timeout(Duration::ZERO);
        assert!(matches!(
            cfg.validate(),
            Err(CommError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn poll_longer_than_timeout_rejected() {
        let cfg = CommConfig {
            collective_timeout: Duration::from_millis(10),
            poll_interval: Duration::from_millis(50),
        };
        assert!(cfg.validate().is_err());
    }
}
