pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fixture;
pub mod mapper;
pub mod models;
pub mod params;

pub use crate::client::{CloudService, OpenStackService};
pub use crate::config::OpenStackCredentials;
pub use crate::fetcher::OpenStackFetcher;
pub use crate::fixture::FixtureService;
pub use crate::params::ImageProvenance;
