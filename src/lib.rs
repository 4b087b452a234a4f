//! Payment intent gateway split in two independently deployable services:
//!
//! - `paypal-server` creates PayPal checkout orders ([paypal])
//! - `gpay-server` builds UPI deep links for GPay-style apps ([upi])
//!
//! Both run requests through the same [intent::IntentGateway] pipeline.
#![doc = include_str!("../README.md")]

/// HTTP endpoints
pub mod api;
pub mod config;
/// Intent pipeline: validation, token acquisition, order creation
pub mod intent;
/// Secret masking for logged payloads
pub mod mask;
/// PayPal REST API integration
pub mod paypal;
pub mod server;
pub mod state;
pub mod token;
pub mod upi;
