// rigctl-api: Async Rust client for the miner control API.

pub mod client;
pub mod error;
pub mod model;
pub mod outcome;
pub mod transport;

mod endpoints;

pub use client::{MinerClient, RequestOptions};
pub use error::Error;
pub use model::{CurtailMode, LoginResponse, MinerAddr, Profile};
pub use outcome::RequestOutcome;
pub use transport::TransportConfig;
