//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate unit-of-work and repository calls into use-case APIs.
//! - Keep the console layer decoupled from storage details.

pub mod book_service;
