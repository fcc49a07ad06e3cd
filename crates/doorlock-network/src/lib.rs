//! Network layer for the door lock controller.
//!
//! This crate keeps the device online and talks to the verification server:
//!
//! - **LinkManager**: bounded wait for connectivity on a polled interface.
//! - **VerificationClient**: posts a captured frame as base64 JSON and folds
//!   every failure into a displayable [`VerificationOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use doorlock_core::{LinkState, ServerConfig};
//! use doorlock_network::{VerificationClient, Verifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VerificationClient::new(&ServerConfig::default())?;
//!
//! let jpeg = std::fs::read("face.jpg")?;
//! let outcome = client.verify(LinkState::Connected, &jpeg).await;
//! println!("{}: {}", outcome.subject_label, outcome.authorized);
//! # Ok(())
//! # }
//! ```
//!
//! [`VerificationOutcome`]: doorlock_core::VerificationOutcome

mod client;
mod link;

pub use client::{
    VerificationClient, VerificationRequest, VerificationResponse, VerifyError, Verifier,
};
pub use link::LinkManager;
