//! Core library for the weather clock.
//!
//! This crate defines:
//! - The persisted config record and its write-serialised store
//! - Location resolution (custom city, IP geolocation, default)
//! - QWeather and IP geolocation clients
//! - The weather update pipeline and its display state
//!
//! It is used by `weatherclock-cli`, but any front end can drive the pipeline.

pub mod clock;
pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;

pub use clock::ClockFace;
pub use config::{Config, ConfigStore};
pub use error::WeatherError;
pub use icon::map_icon;
pub use model::{DisplayState, LocationSource, PipelineConfig, ResolvedLocation, WeatherReading};
pub use pipeline::{PipelineState, WeatherPipeline};
pub use provider::{Connector, IpLocator, WeatherProvider};
