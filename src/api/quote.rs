// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use num_decimal::Num;

use serde::Deserialize;
use serde::Serialize;
use serde_json::from_slice as from_json;
use serde_urlencoded::to_string as to_query;

use crate::endpoint::ConversionError;
use crate::util::string_slice_to_str;
use crate::Str;


/// A quote for a single instrument.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct Quote {
  /// The instrument's ticker symbol.
  #[serde(rename = "symbol")]
  pub symbol: String,
  /// The best ask price.
  #[serde(rename = "ask_price")]
  pub ask_price: Num,
  /// The number of shares offered at the ask price.
  #[serde(rename = "ask_size")]
  pub ask_size: u64,
  /// The best bid price.
  #[serde(rename = "bid_price")]
  pub bid_price: Num,
  /// The number of shares bid for at the bid price.
  #[serde(rename = "bid_size")]
  pub bid_size: u64,
  /// The price of the last trade during regular trading hours.
  #[serde(rename = "last_trade_price")]
  pub last_trade_price: Num,
  /// The price of the last trade during extended hours, if any.
  #[serde(rename = "last_extended_hours_trade_price", default)]
  pub last_extended_hours_trade_price: Option<Num>,
  /// The closing price of the previous trading day.
  #[serde(rename = "previous_close")]
  pub previous_close: Num,
  /// The closing price of the previous trading day, adjusted for
  /// corporate actions.
  #[serde(rename = "adjusted_previous_close")]
  pub adjusted_previous_close: Num,
  /// The date of the previous trading day.
  #[serde(rename = "previous_close_date", default)]
  pub previous_close_date: Option<NaiveDate>,
  /// Whether trading in the instrument is halted.
  #[serde(rename = "trading_halted")]
  pub trading_halted: bool,
  /// Whether the instrument was traded today.
  #[serde(rename = "has_traded")]
  pub has_traded: bool,
  /// The time the quote was last updated.
  #[serde(rename = "updated_at")]
  pub updated_at: DateTime<Utc>,
  /// The URL of the quoted instrument.
  #[serde(rename = "instrument")]
  pub instrument: String,
}


Endpoint! {
  /// The representation of a GET request to the /quotes/<symbol>/
  /// endpoint.
  pub Get(String),
  Ok => Quote, [
    /// The quote was retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, [
    /// No instrument was found for the given symbol.
    /* 404 */ NOT_FOUND => NotFound,
  ]

  fn path(input: &Self::Input) -> Str {
    format!("/quotes/{input}/").into()
  }
}


/// A GET request to be made to the /quotes/ endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ListReq {
  /// The symbols to retrieve quotes for.
  #[serde(rename = "symbols", serialize_with = "string_slice_to_str")]
  pub symbols: Vec<String>,
}

impl ListReq {
  /// Create a request for quotes for the given symbols.
  pub fn new<I, S>(symbols: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: ToString,
  {
    Self {
      symbols: symbols.into_iter().map(|symbol| symbol.to_string()).collect(),
    }
  }
}


/// The quotes as reported by the /quotes/ endpoint, with unknown
/// symbols being reported as `null`.
#[derive(Deserialize)]
struct Quotes {
  #[serde(rename = "results")]
  results: Vec<Option<Quote>>,
}


EndpointNoParse! {
  /// The representation of a GET request to the /quotes/ endpoint.
  ///
  /// Symbols for which no quote is available are silently skipped.
  pub List(ListReq),
  Ok => Vec<Quote>, [
    /// The quotes were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, [
    /// The request was invalid, e.g., because no symbols were
    /// provided.
    /* 400 */ BAD_REQUEST => InvalidInput,
  ]

  fn path(_input: &Self::Input) -> Str {
    "/quotes/".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(Some(to_query(input)?.into()))
  }

  fn parse(body: &[u8]) -> Result<Self::Output, ConversionError> {
    let quotes = from_json::<Quotes>(body)?;
    Ok(quotes.results.into_iter().flatten().collect())
  }
}
