//! Beef-chart Client SDK.
//!
//! This crate provides a client library for front-ends and admin tools that
//! talk to the beef-chart API.
//!
//! # Example
//!
//! ```no_run
//! use beef_chart_client::BeefChartClient;
//!
//! # async fn example() -> Result<(), beef_chart_client::ClientError> {
//! let client = BeefChartClient::new("http://beef-chart:8080")?;
//!
//! let token = client.nonce().await?;
//! for point in client.fetch_series(&token.nonce).await? {
//!     println!("{}: {:.2} €/kg", point.name, point.value);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{BeefChartClient, ClientOptions};
pub use error::ClientError;
pub use types::*;
