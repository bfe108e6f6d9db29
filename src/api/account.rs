// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Utc;

use num_decimal::Num;

use serde::Deserialize;

use crate::api::page::Page;
use crate::Str;


/// The type of an account.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum Type {
  /// A cash account.
  #[serde(rename = "cash")]
  Cash,
  /// A margin account.
  #[serde(rename = "margin")]
  Margin,
  /// Any other account type.
  #[serde(other)]
  Unknown,
}


/// A brokerage account.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Account {
  /// The URL identifying the account. Orders reference accounts by it.
  #[serde(rename = "url")]
  pub url: String,
  /// The account number.
  #[serde(rename = "account_number")]
  pub account_number: String,
  /// The account's type.
  #[serde(rename = "type")]
  pub type_: Type,
  /// The funds available for buying securities.
  #[serde(rename = "buying_power")]
  pub buying_power: Num,
  /// The cash held in the account.
  #[serde(rename = "cash")]
  pub cash: Num,
  /// The cash that can be withdrawn.
  #[serde(rename = "cash_available_for_withdrawal")]
  pub cash_available_for_withdrawal: Num,
  /// Whether the account was deactivated.
  #[serde(rename = "deactivated")]
  pub deactivated: bool,
  /// The URL of the account's portfolio.
  #[serde(rename = "portfolio")]
  pub portfolio: String,
  /// The URL of the account's positions.
  #[serde(rename = "positions")]
  pub positions: String,
  /// The time the account was created.
  #[serde(rename = "created_at")]
  pub created_at: DateTime<Utc>,
  /// The time the account was last updated.
  #[serde(rename = "updated_at")]
  pub updated_at: DateTime<Utc>,
}


Endpoint! {
  /// The representation of a GET request to the /accounts/ endpoint.
  pub List(()),
  Ok => Page<Account>, [
    /// The accounts were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  fn path(_input: &Self::Input) -> Str {
    "/accounts/".into()
  }
}
