//! # Eventra API Server Library
//!
//! Core functionality for the Eventra API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `google`: Google identity verification
//! - `mailer`: Outbound mail seam
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod google;
pub mod mailer;
pub mod routes;
