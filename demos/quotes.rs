// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use robinhood::api::account;
use robinhood::api::quote;
use robinhood::ApiInfo;
use robinhood::Client;

#[tokio::main]
async fn main() {
  // Requires the following environment variables to be present:
  // - RH_USERNAME -> your user name
  // - RH_PASSWORD -> your password
  //
  // Optionally, the following variables are honored:
  // - RH_MFA_SECRET -> the base32 secret of your authenticator app
  // - RH_DEVICE_TOKEN -> a device token to reuse across logins
  // - RH_TOKEN_CACHE -> the path to the encrypted token cache
  //
  // Verification codes not covered by RH_MFA_SECRET are read from
  // the terminal.
  let api_info = ApiInfo::from_env().unwrap();
  let client = Client::new(api_info);
  client.login().await.unwrap();

  let accounts = client.issue::<account::List>(&()).await.unwrap();
  accounts.results.iter().for_each(|account| {
    println!(
      "Account {}: buying power {}",
      account.account_number, account.buying_power
    )
  });

  let request = quote::ListReq::new(["AAPL", "MSFT"]);
  let quotes = client.issue::<quote::List>(&request).await.unwrap();
  quotes.iter().for_each(|quote| {
    println!(
      "Latest quote for {}: Ask {}/{} Bid {}/{} Last {}",
      quote.symbol,
      quote.ask_price,
      quote.ask_size,
      quote.bid_price,
      quote.bid_size,
      quote.last_trade_price
    )
  });
}
