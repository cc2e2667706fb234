//! TalentGate client SDK.
//!
//! This crate provides a client library for platform services to interact
//! with the TalentGate credit API. The AI-analysis service gates each
//! profile analysis with [`TalentGateClient::consume`]; the checkout service
//! replenishes accounts after payment.
//!
//! # Example
//!
//! ```no_run
//! use talentgate_client::{ClientError, TalentGateClient};
//!
//! # async fn example() -> Result<(), ClientError> {
//! let client = TalentGateClient::new(
//!     "http://talentgate.platform.svc:8080",
//!     "your-service-api-key",
//! );
//!
//! // Gate a profile analysis
//! match client.consume("user-uuid", "profile:alice").await {
//!     Ok(outcome) => println!("Proceed, balance now {}", outcome.new_balance),
//!     Err(ClientError::InsufficientCredits { balance }) => {
//!         println!("Out of credits (balance {balance}), send the user to checkout");
//!     }
//!     Err(err) => return Err(err),
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

pub use client::{ClientOptions, TalentGateClient};
pub use error::ClientError;
pub use types::*;
