// ABOUTME: Re-exports domain-separated constants from heartcare-core
// ABOUTME: Server modules import constants through `crate::constants`
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants, re-exported from `heartcare_core::constants`

pub use heartcare_core::constants::{defaults, endpoints, env_config, limits, service_names};
