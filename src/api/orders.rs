// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Utc;

use serde::Serialize;
use serde_urlencoded::to_string as to_query;

use crate::api::order::Order;
use crate::api::page::Page;
use crate::api::page::Paginated;
use crate::endpoint::ConversionError;
use crate::Str;


/// A GET request to be made to the /orders/ endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ListReq {
  /// Only list orders updated at or after the given time.
  #[serde(rename = "updated_at[gte]", skip_serializing_if = "Option::is_none")]
  pub updated_since: Option<DateTime<Utc>>,
  /// The cursor of the page to retrieve.
  #[serde(rename = "cursor", skip_serializing_if = "Option::is_none")]
  pub cursor: Option<String>,
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
  /// The representation of a GET request to the /orders/ endpoint.
  ///
  /// Orders are reported most recent first.
  pub List(ListReq),
  Ok => Page<Order>, [
    /// The orders were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  fn path(_input: &Self::Input) -> Str {
    "/orders/".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(Some(to_query(input)?.into()))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use chrono::TimeZone as _;

  use mockito::Matcher;
  use mockito::Server;

  use test_log::test;

  use crate::api::order::State;
  use crate::test_util::logged_in_client;
  use crate::Endpoint as _;

  const ORDER: &str = r#"{
    "id": "dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0",
    "url": "https://api.robinhood.com/orders/dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0/",
    "account": "https://api.robinhood.com/accounts/5RY82436/",
    "cancel": null,
    "instrument": "https://api.robinhood.com/instruments/450dfc6d-5510-4d40-abfb-f633b7d9be3e/",
    "cumulative_quantity": "1.00000000",
    "average_price": "149.98000000",
    "fees": "0.00",
    "state": "filled",
    "type": "market",
    "side": "buy",
    "time_in_force": "gfd",
    "trigger": "immediate",
    "price": "151.00000000",
    "stop_price": null,
    "quantity": "1.00000000",
    "created_at": "2021-03-01T16:00:00.123456Z",
    "updated_at": "2021-03-01T16:00:01.654321Z",
    "extended_hours": false
  }"#;


  /// Check that the list request is encoded as expected.
  #[test]
  fn encode_list_request() {
    let request = ListReq::default();
    assert_eq!(List::query(&request).unwrap().unwrap(), "");

    let request = ListReq {
      updated_since: Some(Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()),
      cursor: None,
    };
    let query = List::query(&request).unwrap().unwrap();
    assert!(query.starts_with("updated_at%5Bgte%5D=2021-03-01T00%3A00%3A00"), "{query}");
  }

  /// Check that we can list orders across multiple pages.
  #[test(tokio::test)]
  async fn request_orders() {
    let mut server = Server::new_async().await;
    let second = server
      .mock("GET", "/orders/")
      .match_query(Matcher::UrlEncoded("cursor".to_string(), "page2".to_string()))
      .with_status(200)
      .with_body(format!(
        r#"{{"next": null, "previous": null, "results": [{ORDER}]}}"#
      ))
      .create_async()
      .await;
    let first = server
      .mock("GET", "/orders/")
      .with_status(200)
      .with_body(format!(
        r#"{{"next": "{}/orders/?cursor=page2", "previous": null, "results": [{ORDER}]}}"#,
        server.url()
      ))
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let orders = client.issue_all::<List, _>(&ListReq::default()).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|order| order.state == State::Filled));
    assert!(!orders[0].is_cancelable());

    first.assert_async().await;
    second.assert_async().await;
  }
}
