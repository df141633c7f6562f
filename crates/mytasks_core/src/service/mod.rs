//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into register/login/add/list APIs.
//! - Keep presentation adapters decoupled from storage details.

pub mod auth_service;
pub mod task_service;
