// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Deserialize;

use url::Url;


/// A page of results as returned by list endpoints.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Page<T> {
  /// The URL of the next page, if any.
  #[serde(rename = "next", default)]
  pub next: Option<String>,
  /// The URL of the previous page, if any.
  #[serde(rename = "previous", default)]
  pub previous: Option<String>,
  /// The items on this page.
  #[serde(rename = "results")]
  pub results: Vec<T>,
}

impl<T> Page<T> {
  /// Retrieve the cursor pointing to the next page, if any.
  pub fn next_cursor(&self) -> Option<String> {
    let next = Url::parse(self.next.as_deref()?).ok()?;
    let cursor = next
      .query_pairs()
      .find(|(key, _)| key == "cursor")
      .map(|(_, value)| value.into_owned());
    cursor
  }
}


/// A trait for the inputs of endpoints returning [`Page`]s, allowing
/// for subsequent pages to be requested.
pub trait Paginated {
  /// Create a copy of the input requesting the page the given cursor
  /// points to.
  fn with_cursor(&self, cursor: String) -> Self;
}
