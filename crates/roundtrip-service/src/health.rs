//! Restart-and-wait recovery for the conversion service.
//!
//! The service is a single shared process; requests are never in flight while
//! a restart happens because the pipeline is strictly sequential.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};

/// Liveness probing and restarting of a service instance.
pub trait ServiceControl {
    /// Issue a lightweight request; `Ok` means healthy.
    fn probe(&self) -> Result<()>;

    /// Restart the service process or container.
    fn restart(&self) -> Result<()>;
}

/// Poll budget applied after a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

impl HealthPolicy {
    /// Upper bound on time spent polling after a restart.
    #[must_use]
    pub fn total_max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Detects an unhealthy service, restarts it and waits for it to come back.
#[derive(Debug)]
pub struct ServiceHealthManager<C> {
    control: C,
    policy: HealthPolicy,
}

impl<C: ServiceControl> ServiceHealthManager<C> {
    pub fn new(control: C, policy: HealthPolicy) -> Self {
        Self { control, policy }
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Return once the service answers a probe.
    ///
    /// A healthy service is left alone. Otherwise the service is restarted
    /// and polled every `interval` up to `max_attempts` times.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Restart`] when the restart command fails and
    /// [`ServiceError::Unhealthy`] when the poll budget runs out.
    pub fn ensure_healthy(&self) -> Result<()> {
        match self.control.probe() {
            Ok(()) => {
                debug!("conversion service healthy");
                return Ok(());
            }
            Err(error) => warn!(%error, "conversion service unhealthy"),
        }

        self.control.restart()?;
        info!(
            max_wait_secs = self.policy.total_max_wait().as_secs(),
            "conversion service restarted, waiting for it to answer"
        );

        for attempt in 1..=self.policy.max_attempts {
            std::thread::sleep(self.policy.interval);
            match self.control.probe() {
                Ok(()) => {
                    info!(attempt, "conversion service healthy after restart");
                    return Ok(());
                }
                Err(error) => debug!(attempt, %error, "conversion service not ready"),
            }
        }

        Err(ServiceError::Unhealthy {
            attempts: self.policy.max_attempts,
        })
    }
}
