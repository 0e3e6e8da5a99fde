//! KYC Onboarding Library
//!
//! Guides an operator through onboarding a customer: identity fields, a
//! mandatory identity document and any number of supporting documents, each
//! uploaded, quality-scored and verified against the KYC backend before the
//! customer and documents are created in one call.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers, routes).
//! - `core`: Wizard domain namespace (form, slots, step controller, submission).
//! - `integrations`: KYC backend namespace (client, wire models).
//! - `backend_models`: Wire types exchanged with the KYC backend.
//! - `circuit_breaker`: Circuit breaker guarding backend calls.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `form`: Customer field store and validation.
//! - `handlers`: HTTP request handlers hosting wizard sessions.
//! - `kyc_client`: KYC backend client.
//! - `messages`: Operator-facing slot and wizard messages.
//! - `models`: Core data models.
//! - `onboarding`: Async wizard handle that runs remote calls.
//! - `routes`: Router assembly and middleware.
//! - `slot`: Document slot state machine.
//! - `submission`: Creation payload assembly.
//! - `wizard`: Wizard session and step controller.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod backend_models;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod kyc_client;
pub mod messages;
pub mod models;
pub mod onboarding;
pub mod routes;
pub mod slot;
pub mod submission;
pub mod wizard;
