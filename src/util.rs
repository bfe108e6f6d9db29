// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Deserialize;
use serde::Deserializer;
use serde::Serializer;


/// Deserialize an optional string, mapping empty strings to `None`.
pub(crate) fn empty_str_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let string = Option::<String>::deserialize(deserializer)?;
  Ok(string.filter(|string| !string.is_empty()))
}


/// Serialize a slice of strings into a comma-separated string combining
/// the individual strings.
pub(crate) fn string_slice_to_str<S>(slice: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  if !slice.is_empty() {
    // `serde_urlencoded` seemingly does not know how to handle a
    // `Vec`. So what we do is we concatenate all elements, separating
    // each by comma.
    serializer.serialize_str(&slice.join(","))
  } else {
    serializer.serialize_none()
  }
}
