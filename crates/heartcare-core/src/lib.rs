// ABOUTME: Core types and constants for the HeartCare risk-management backend
// ABOUTME: Foundation crate with unified error handling and domain constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # HeartCare Core
//!
//! Foundation crate providing shared types and constants for the HeartCare
//! backend. It changes rarely, so the rest of the workspace can compile
//! incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `AppResult`
//! - **constants**: Application-wide constants organized by domain

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration defaults organized by domain
pub mod constants;
