// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Test Modules

mod address_parsing;
mod snapshot_consistency;
