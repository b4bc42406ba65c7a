// ABOUTME: Utility modules shared across routes and services
// ABOUTME: Contains the outbound HTTP client builders and purchase date arithmetic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Purchase date parsing, ownership day counts, and month windows
pub mod dates;
/// HTTP client configuration for identity provider calls
pub mod http_client;
/// QR code rendering for the login page
pub mod qr;
