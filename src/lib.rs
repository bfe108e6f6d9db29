// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(clippy::unreadable_literal)]
#![warn(
  bad_style,
  dead_code,
  future_incompatible,
  improper_ctypes,
  late_bound_lifetime_arguments,
  missing_copy_implementations,
  missing_debug_implementations,
  missing_docs,
  no_mangle_generic_items,
  non_shorthand_field_patterns,
  nonstandard_style,
  overflowing_literals,
  path_statements,
  patterns_in_fns_without_body,
  renamed_and_removed_lints,
  rust_2018_compatibility,
  rust_2018_idioms,
  stable_features,
  trivial_bounds,
  trivial_numeric_casts,
  type_alias_bounds,
  unconditional_recursion,
  unreachable_code,
  unreachable_patterns,
  unstable_features,
  unstable_name_collisions,
  unused,
  unused_comparisons,
  unused_import_braces,
  unused_lifetimes,
  unused_qualifications,
  unused_results,
  while_true
)]

//! A crate for interacting with Robinhood's (unofficial) brokerage
//! API.
//!
//! The entry point is the [`Client`]. It is configured with an
//! [`ApiInfo`] object, logs in via [`Client::login`] (running through
//! multi factor authentication and device verification as necessary),
//! and then issues requests against the endpoints defined in the
//! [`api`] module.

#[macro_use]
mod endpoint;

/// A module comprising the endpoints of the brokerage API, e.g., for
/// retrieving account information, quotes, and for managing orders.
pub mod api;

/// A module comprising authentication related functionality: the
/// OAuth token endpoint, the device verification workflow, and the
/// on-disk token cache.
pub mod auth;

mod api_info;
mod client;
mod error;
#[cfg(test)]
mod test_util;
mod util;

use std::borrow::Cow;

pub use crate::api_info::ApiInfo;
pub use crate::client::Builder;
pub use crate::client::Client;
pub use crate::endpoint::ApiError;
pub use crate::endpoint::Body;
pub use crate::endpoint::ConversionError;
pub use crate::endpoint::Endpoint;
pub use crate::error::Error;
pub use crate::error::RequestError;

type Str = Cow<'static, str>;
