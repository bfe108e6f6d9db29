// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

/// Definitions pertaining the user's brokerage accounts.
pub mod account;
/// Definitions pertaining instruments, i.e., tradeable securities.
pub mod instrument;
/// Definitions for creating, retrieving, and canceling individual
/// orders.
pub mod order;
/// Definitions for listing orders.
pub mod orders;
/// Definitions for the envelope of paginated responses.
pub mod page;
/// Definitions pertaining the user's positions.
pub mod position;
/// Definitions for retrieving quotes.
pub mod quote;
/// Definitions pertaining the logged in user.
pub mod user;

/// The base URL of the API.
pub(crate) const API_BASE_URL: &str = "https://api.robinhood.com";
