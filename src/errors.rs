// ABOUTME: Re-exports the unified error types from heartcare-core
// ABOUTME: Keeps `crate::errors` paths stable for server modules and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Unified error handling, re-exported from `heartcare_core::errors`

pub use heartcare_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
