// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

/// Definitions for the encrypted on-disk token cache.
pub mod cache;
/// Definitions for the OAuth token endpoints.
pub mod oauth;
/// Definitions pertaining the sources of verification codes.
pub mod responder;
/// Support for time based one-time passwords.
pub mod totp;
/// Definitions for the device verification workflow.
pub mod workflow;

mod session;

pub use session::Session;
