//! Conversion service access.
//!
//! [`ConversionService`] is the capability the pipeline depends on.
//! [`XsugarService`] implements it over HTTP and recovers a crashed service
//! through [`ServiceHealthManager`].

pub mod client;
pub mod error;
pub mod health;
pub mod restart;
pub mod service;

pub use client::ConverterClient;
pub use error::{Result, ServiceError};
pub use health::{HealthPolicy, ServiceControl, ServiceHealthManager};
pub use restart::RestartCommand;
pub use service::{ConversionService, XsugarControl, XsugarService};
