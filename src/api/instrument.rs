// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::ops::Deref;

use chrono::NaiveDate;

use serde::Deserialize;
use serde::Serialize;
use serde_urlencoded::to_string as to_query;

use uuid::Uuid;

use crate::api::page::Page;
use crate::api::page::Paginated;
use crate::endpoint::ConversionError;
use crate::util::empty_str_as_none;
use crate::Str;


/// An ID uniquely identifying an instrument.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Id(pub Uuid);

impl Deref for Id {
  type Target = Uuid;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}


/// The trading state of an instrument.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum State {
  /// The instrument is actively traded.
  #[serde(rename = "active")]
  Active,
  /// The instrument is not currently traded.
  #[serde(rename = "inactive")]
  Inactive,
  /// The instrument was delisted.
  #[serde(rename = "unlisted")]
  Unlisted,
  /// Any other state.
  #[serde(other)]
  Unknown,
}


/// The type of an instrument.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum Type {
  /// A common stock.
  #[serde(rename = "stock")]
  Stock,
  /// An exchange traded product.
  #[serde(rename = "etp")]
  Etp,
  /// An American depositary receipt.
  #[serde(rename = "adr")]
  Adr,
  /// A real estate investment trust.
  #[serde(rename = "reit")]
  Reit,
  /// Any other type.
  #[serde(other)]
  Unknown,
}


/// A tradeable security.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Instrument {
  /// The instrument's ID.
  #[serde(rename = "id")]
  pub id: Id,
  /// The URL identifying the instrument. Orders reference instruments
  /// by it.
  #[serde(rename = "url")]
  pub url: String,
  /// The URL of the instrument's quote.
  #[serde(rename = "quote")]
  pub quote: String,
  /// The instrument's ticker symbol.
  #[serde(rename = "symbol")]
  pub symbol: String,
  /// The instrument's full name.
  #[serde(rename = "name")]
  pub name: String,
  /// The instrument's short name, if any.
  #[serde(rename = "simple_name", default, deserialize_with = "empty_str_as_none")]
  pub simple_name: Option<String>,
  /// The instrument's state.
  #[serde(rename = "state")]
  pub state: State,
  /// Whether the instrument can be traded.
  #[serde(rename = "tradeable")]
  pub tradeable: bool,
  /// The instrument's type.
  #[serde(rename = "type")]
  pub type_: Type,
  /// The date the instrument was listed.
  #[serde(rename = "list_date", default)]
  pub list_date: Option<NaiveDate>,
}


/// A GET request to be made to the /instruments/ endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ListReq {
  /// The symbol to look up.
  #[serde(rename = "symbol", skip_serializing_if = "Option::is_none")]
  pub symbol: Option<String>,
  /// The cursor of the page to retrieve.
  #[serde(rename = "cursor", skip_serializing_if = "Option::is_none")]
  pub cursor: Option<String>,
}

impl ListReq {
  /// Create a request looking up the instrument with the given symbol.
  pub fn symbol(symbol: impl ToString) -> Self {
    Self {
      symbol: Some(symbol.to_string()),
      cursor: None,
    }
  }
}

impl Paginated for ListReq {
  fn with_cursor(&self, cursor: String) -> Self {
    Self {
      cursor: Some(cursor),
      ..self.clone()
    }
  }
}


Endpoint! {
  /// The representation of a GET request to the /instruments/
  /// endpoint.
  pub List(ListReq),
  Ok => Page<Instrument>, [
    /// The instruments were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  fn path(_input: &Self::Input) -> Str {
    "/instruments/".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(Some(to_query(input)?.into()))
  }
}


Endpoint! {
  /// The representation of a GET request to the
  /// /instruments/<instrument-id>/ endpoint.
  pub Get(Id),
  Ok => Instrument, [
    /// The instrument was retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, [
    /// No instrument was found with the given ID.
    /* 404 */ NOT_FOUND => NotFound,
  ]

  fn path(input: &Self::Input) -> Str {
    format!("/instruments/{}/", input.as_hyphenated()).into()
  }
}
