// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Utc;

use num_decimal::Num;

use serde::Deserialize;
use serde::Serialize;
use serde_urlencoded::to_string as to_query;

use url::Url;

use uuid::Uuid;

use crate::api::instrument;
use crate::api::page::Page;
use crate::api::page::Paginated;
use crate::endpoint::ConversionError;
use crate::Str;


/// A position in an instrument.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Position {
  /// The URL identifying the position.
  #[serde(rename = "url")]
  pub url: String,
  /// The URL of the instrument held.
  #[serde(rename = "instrument")]
  pub instrument: String,
  /// The URL of the account holding the position.
  #[serde(rename = "account")]
  pub account: String,
  /// The number of the account holding the position.
  #[serde(rename = "account_number")]
  pub account_number: String,
  /// The number of shares held.
  #[serde(rename = "quantity")]
  pub quantity: Num,
  /// The average price paid per share.
  #[serde(rename = "average_buy_price")]
  pub average_buy_price: Num,
  /// The number of shares reserved by pending sell orders.
  #[serde(rename = "shares_held_for_sells")]
  pub shares_held_for_sells: Num,
  /// The time the position was opened.
  #[serde(rename = "created_at")]
  pub created_at: DateTime<Utc>,
  /// The time the position was last updated.
  #[serde(rename = "updated_at")]
  pub updated_at: DateTime<Utc>,
}

impl Position {
  /// Retrieve the ID of the instrument held, as contained in its URL.
  pub fn instrument_id(&self) -> Option<instrument::Id> {
    let url = Url::parse(&self.instrument).ok()?;
    let id = url.path_segments()?.filter(|segment| !segment.is_empty()).last()?;
    Uuid::parse_str(id).ok().map(instrument::Id)
  }
}


/// A GET request to be made to the /positions/ endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ListReq {
  /// Whether to only list positions with a non-zero quantity.
  #[serde(rename = "nonzero")]
  pub nonzero: bool,
  /// The cursor of the page to retrieve.
  #[serde(rename = "cursor", skip_serializing_if = "Option::is_none")]
  pub cursor: Option<String>,
}

impl Default for ListReq {
  fn default() -> Self {
    Self {
      nonzero: true,
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
  /// The representation of a GET request to the /positions/ endpoint.
  pub List(ListReq),
  Ok => Page<Position>, [
    /// The positions were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  fn path(_input: &Self::Input) -> Str {
    "/positions/".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(Some(to_query(input)?.into()))
  }
}
