//! The conversion capability consumed by the pipeline.

use tracing::warn;

use roundtrip_model::{Direction, ServiceConfig};

use crate::client::ConverterClient;
use crate::error::Result;
use crate::health::{HealthPolicy, ServiceControl, ServiceHealthManager};
use crate::restart::RestartCommand;

/// A markup/shorthand converter that can be brought back to health.
pub trait ConversionService {
    /// Convert `content` in `direction` with the rules of `grammar`.
    fn convert(&self, content: &str, direction: Direction, grammar: &str) -> Result<String>;

    /// Block until the service is healthy, restarting it if needed.
    fn ensure_healthy(&self) -> Result<()>;
}

/// Probe and restart hooks for a running XSugar instance.
#[derive(Debug, Clone)]
pub struct XsugarControl {
    client: ConverterClient,
    restart: Option<RestartCommand>,
    probe_grammar: String,
}

impl XsugarControl {
    pub fn new(
        client: ConverterClient,
        restart: Option<RestartCommand>,
        probe_grammar: impl Into<String>,
    ) -> Self {
        Self {
            client,
            restart,
            probe_grammar: probe_grammar.into(),
        }
    }
}

impl ServiceControl for XsugarControl {
    fn probe(&self) -> Result<()> {
        self.client.probe(&self.probe_grammar)
    }

    fn restart(&self) -> Result<()> {
        match &self.restart {
            Some(command) => command.run(),
            None => {
                warn!("no restart command configured, waiting for the service to recover");
                Ok(())
            }
        }
    }
}

/// The networked conversion service with restart-and-wait recovery.
#[derive(Debug)]
pub struct XsugarService {
    client: ConverterClient,
    health: ServiceHealthManager<XsugarControl>,
}

impl XsugarService {
    pub fn new(client: ConverterClient, health: ServiceHealthManager<XsugarControl>) -> Self {
        Self { client, health }
    }

    /// Build the client, restart command and health policy from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = ConverterClient::new(config.endpoint.clone(), config.timeout())?;
        let control = XsugarControl::new(
            client.clone(),
            RestartCommand::from_argv(&config.restart_command),
            config.probe_grammar.clone(),
        );
        let policy = HealthPolicy {
            max_attempts: config.health_attempts,
            interval: config.health_interval(),
        };
        Ok(Self::new(client, ServiceHealthManager::new(control, policy)))
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

impl ConversionService for XsugarService {
    fn convert(&self, content: &str, direction: Direction, grammar: &str) -> Result<String> {
        self.client.convert(content, direction, grammar)
    }

    fn ensure_healthy(&self) -> Result<()> {
        self.health.ensure_healthy()
    }
}
