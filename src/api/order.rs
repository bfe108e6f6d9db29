// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::ops::Deref;

use chrono::DateTime;
use chrono::Utc;

use http::Method;

use num_decimal::Num;

use serde::Deserialize;
use serde::Serialize;

use uuid::Uuid;

use crate::api::instrument::Instrument;
use crate::endpoint::Body;
use crate::endpoint::ConversionError;
use crate::Str;


/// An ID uniquely identifying an order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Id(pub Uuid);

impl Deref for Id {
  type Target = Uuid;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}


/// The state an order can be in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum State {
  /// The order was received but not yet sent to the exchange.
  #[serde(rename = "queued")]
  Queued,
  /// The order awaits confirmation.
  #[serde(rename = "unconfirmed")]
  Unconfirmed,
  /// The order was confirmed and is working.
  #[serde(rename = "confirmed")]
  Confirmed,
  /// The order was partially filled.
  #[serde(rename = "partially_filled")]
  PartiallyFilled,
  /// The order was filled completely.
  #[serde(rename = "filled")]
  Filled,
  /// The order was rejected.
  #[serde(rename = "rejected")]
  Rejected,
  /// The order was canceled.
  #[serde(rename = "cancelled", alias = "canceled")]
  Canceled,
  /// The order failed.
  #[serde(rename = "failed")]
  Failed,
  /// Any other state.
  #[serde(other)]
  Unknown,
}

impl State {
  /// Check whether the state is a final one, i.e., whether the order
  /// will not change anymore.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      Self::Filled | Self::Rejected | Self::Canceled | Self::Failed
    )
  }
}


/// The side an order is on.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Side {
  /// Buy an asset.
  #[serde(rename = "buy")]
  Buy,
  /// Sell an asset.
  #[serde(rename = "sell")]
  Sell,
}


/// The type of an order.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Type {
  /// A market order.
  #[default]
  #[serde(rename = "market")]
  Market,
  /// A limit order.
  #[serde(rename = "limit")]
  Limit,
}


/// What triggers an order.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Trigger {
  /// The order is placed immediately.
  #[default]
  #[serde(rename = "immediate")]
  Immediate,
  /// The order is placed once the stop price is reached.
  #[serde(rename = "stop")]
  Stop,
}


/// A description of how long an order is valid.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TimeInForce {
  /// The order is good for the day.
  #[default]
  #[serde(rename = "gfd")]
  Day,
  /// The order is good until canceled.
  #[serde(rename = "gtc")]
  UntilCanceled,
  /// Any unfilled portion of the order is canceled immediately.
  #[serde(rename = "ioc")]
  ImmediateOrCancel,
  /// The order executes at market open.
  #[serde(rename = "opg")]
  UntilMarketOpen,
}


/// A helper for initializing `OrderReq` objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderReqInit {
  /// See `OrderReq::type_`.
  pub type_: Type,
  /// See `OrderReq::trigger`.
  pub trigger: Trigger,
  /// See `OrderReq::time_in_force`.
  pub time_in_force: TimeInForce,
  /// See `OrderReq::price`.
  pub price: Option<Num>,
  /// See `OrderReq::stop_price`.
  pub stop_price: Option<Num>,
  /// See `OrderReq::extended_hours`.
  pub extended_hours: bool,
  /// The type is non-exhaustive and open to extension.
  #[doc(hidden)]
  pub _non_exhaustive: (),
}

impl OrderReqInit {
  /// Create an `OrderReq` from an `OrderReqInit`.
  ///
  /// The provided account is the URL of the account to place the
  /// order in.
  pub fn init<A>(self, account: A, instrument: &Instrument, side: Side, quantity: Num) -> OrderReq
  where
    A: Into<String>,
  {
    OrderReq {
      account: account.into(),
      instrument: instrument.url.clone(),
      symbol: instrument.symbol.clone(),
      side,
      type_: self.type_,
      trigger: self.trigger,
      time_in_force: self.time_in_force,
      price: self.price,
      stop_price: self.stop_price,
      quantity,
      ref_id: Uuid::new_v4(),
      extended_hours: self.extended_hours,
    }
  }
}


/// A POST request to be made to the /orders/ endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderReq {
  /// The URL of the account to place the order in.
  #[serde(rename = "account")]
  pub account: String,
  /// The URL of the instrument to trade.
  #[serde(rename = "instrument")]
  pub instrument: String,
  /// The symbol of the instrument to trade.
  #[serde(rename = "symbol")]
  pub symbol: String,
  /// The side the order is on.
  #[serde(rename = "side")]
  pub side: Side,
  /// The type of the order.
  #[serde(rename = "type")]
  pub type_: Type,
  /// What triggers the order.
  #[serde(rename = "trigger")]
  pub trigger: Trigger,
  /// How long the order will be valid.
  #[serde(rename = "time_in_force")]
  pub time_in_force: TimeInForce,
  /// The limit price.
  #[serde(rename = "price", skip_serializing_if = "Option::is_none")]
  pub price: Option<Num>,
  /// The stop price.
  #[serde(rename = "stop_price", skip_serializing_if = "Option::is_none")]
  pub stop_price: Option<Num>,
  /// The number of shares to trade.
  #[serde(rename = "quantity")]
  pub quantity: Num,
  /// A client chosen ID, protecting against duplicate submission.
  #[serde(rename = "ref_id")]
  pub ref_id: Uuid,
  /// Whether the order is eligible for execution outside regular
  /// trading hours.
  #[serde(rename = "extended_hours")]
  pub extended_hours: bool,
}


/// A single order.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Order {
  /// The order's ID.
  #[serde(rename = "id")]
  pub id: Id,
  /// The client chosen ID the order was submitted with.
  #[serde(rename = "ref_id", default)]
  pub ref_id: Option<Uuid>,
  /// The URL identifying the order.
  #[serde(rename = "url")]
  pub url: String,
  /// The URL of the account the order was placed in.
  #[serde(rename = "account")]
  pub account: String,
  /// The URL of the instrument traded.
  #[serde(rename = "instrument")]
  pub instrument: String,
  /// The URL for canceling the order, if it can still be canceled.
  #[serde(rename = "cancel", default)]
  pub cancel: Option<String>,
  /// The side the order is on.
  #[serde(rename = "side")]
  pub side: Side,
  /// The type of the order.
  #[serde(rename = "type")]
  pub type_: Type,
  /// What triggers the order.
  #[serde(rename = "trigger")]
  pub trigger: Trigger,
  /// How long the order is valid.
  #[serde(rename = "time_in_force")]
  pub time_in_force: TimeInForce,
  /// The order's state.
  #[serde(rename = "state")]
  pub state: State,
  /// The limit price.
  #[serde(rename = "price", default)]
  pub price: Option<Num>,
  /// The stop price.
  #[serde(rename = "stop_price", default)]
  pub stop_price: Option<Num>,
  /// The number of shares requested.
  #[serde(rename = "quantity")]
  pub quantity: Num,
  /// The number of shares filled.
  #[serde(rename = "cumulative_quantity")]
  pub cumulative_quantity: Num,
  /// The average price of the fills, if any.
  #[serde(rename = "average_price", default)]
  pub average_price: Option<Num>,
  /// The fees charged.
  #[serde(rename = "fees")]
  pub fees: Num,
  /// Whether the order is eligible for execution outside regular
  /// trading hours.
  #[serde(rename = "extended_hours")]
  pub extended_hours: bool,
  /// The time the order was created.
  #[serde(rename = "created_at")]
  pub created_at: DateTime<Utc>,
  /// The time the order was last updated.
  #[serde(rename = "updated_at")]
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Check whether the order can still be canceled.
  #[inline]
  pub fn is_cancelable(&self) -> bool {
    self.cancel.is_some()
  }
}


Endpoint! {
  /// The representation of a GET request to the /orders/<order-id>/
  /// endpoint.
  pub Get(Id),
  Ok => Order, [
    /// The order object for the given ID was retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, [
    /// No order was found with the given ID.
    /* 404 */ NOT_FOUND => NotFound,
  ]

  fn path(input: &Self::Input) -> Str {
    format!("/orders/{}/", input.as_hyphenated()).into()
  }
}


Endpoint! {
  /// The representation of a POST request to the /orders/ endpoint.
  pub Post(OrderReq),
  Ok => Order, [
    /// The order was submitted successfully.
    /* 200 */ OK,
    /// The order was submitted successfully.
    /* 201 */ CREATED,
  ],
  Err => PostError, [
    /// Some data in the request was invalid.
    /* 400 */ BAD_REQUEST => InvalidInput,
    /// Not enough funds are available to submit the order.
    /* 403 */ FORBIDDEN => InsufficientFunds,
  ]

  fn method() -> Method {
    Method::POST
  }

  fn path(_input: &Self::Input) -> Str {
    "/orders/".into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::json(input)?))
  }
}


EndpointNoParse! {
  /// The representation of a POST request to the
  /// /orders/<order-id>/cancel/ endpoint.
  pub Cancel(Id),
  Ok => (), [
    /// The order was canceled successfully.
    /* 200 */ OK,
  ],
  Err => CancelError, [
    /// The order can no longer be canceled.
    /* 400 */ BAD_REQUEST => NotCancelable,
    /// No order was found with the given ID.
    /* 404 */ NOT_FOUND => NotFound,
  ]

  fn method() -> Method {
    Method::POST
  }

  fn path(input: &Self::Input) -> Str {
    format!("/orders/{}/cancel/", input.as_hyphenated()).into()
  }

  fn parse(_body: &[u8]) -> Result<Self::Output, ConversionError> {
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use mockito::Matcher;
  use mockito::Server;

  use serde_json::from_str as from_json;
  use serde_json::json;
  use serde_json::to_string as to_json;
  use serde_json::Value;

  use test_log::test;

  use crate::api::instrument;
  use crate::test_util::logged_in_client;
  use crate::Endpoint as _;
  use crate::RequestError;

  const ORDER_ID: &str = "dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0";

  const ORDER: &str = r#"{
    "id": "dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0",
    "ref_id": "5d8b7d8e-42f6-4e0c-95a0-5c5b0f5e6a8c",
    "url": "https://api.robinhood.com/orders/dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0/",
    "account": "https://api.robinhood.com/accounts/5RY82436/",
    "position": "https://api.robinhood.com/positions/5RY82436/450dfc6d-5510-4d40-abfb-f633b7d9be3e/",
    "cancel": "https://api.robinhood.com/orders/dbf7a1b3-9ce2-4bb4-8e0c-5e2e4c36e7a0/cancel/",
    "instrument": "https://api.robinhood.com/instruments/450dfc6d-5510-4d40-abfb-f633b7d9be3e/",
    "instrument_id": "450dfc6d-5510-4d40-abfb-f633b7d9be3e",
    "cumulative_quantity": "0.00000000",
    "average_price": null,
    "fees": "0.00",
    "state": "confirmed",
    "pending_cancel_open_agent": null,
    "type": "limit",
    "side": "buy",
    "time_in_force": "gfd",
    "trigger": "immediate",
    "price": "100.00000000",
    "stop_price": null,
    "quantity": "1.00000000",
    "reject_reason": null,
    "created_at": "2021-03-01T16:00:00.123456Z",
    "updated_at": "2021-03-01T16:00:01.654321Z",
    "last_transaction_at": "2021-03-01T16:00:01.654321Z",
    "executions": [],
    "extended_hours": false,
    "override_dtbp_checks": false,
    "override_day_trade_checks": false
  }"#;

  fn instrument() -> Instrument {
    Instrument {
      id: instrument::Id(Uuid::parse_str("450dfc6d-5510-4d40-abfb-f633b7d9be3e").unwrap()),
      url: "https://api.robinhood.com/instruments/450dfc6d-5510-4d40-abfb-f633b7d9be3e/"
        .to_string(),
      quote: "https://api.robinhood.com/quotes/AAPL/".to_string(),
      symbol: "AAPL".to_string(),
      name: "Apple Inc. Common Stock".to_string(),
      simple_name: Some("Apple".to_string()),
      state: instrument::State::Active,
      tradeable: true,
      type_: instrument::Type::Stock,
      list_date: None,
    }
  }


  #[test]
  fn emit_side() {
    assert_eq!(to_json(&Side::Buy).unwrap(), r#""buy""#);
    assert_eq!(to_json(&Side::Sell).unwrap(), r#""sell""#);
  }

  #[test]
  fn emit_time_in_force() {
    assert_eq!(to_json(&TimeInForce::Day).unwrap(), r#""gfd""#);
    assert_eq!(to_json(&TimeInForce::UntilCanceled).unwrap(), r#""gtc""#);
  }

  /// Check that we can parse a reference order.
  #[test]
  fn parse_reference_order() {
    let id = Id(Uuid::parse_str(ORDER_ID).unwrap());
    let order = from_json::<Order>(ORDER).unwrap();
    assert_eq!(order.id, id);
    assert_eq!(order.side, Side::Buy);
    assert_eq!(order.type_, Type::Limit);
    assert_eq!(order.state, State::Confirmed);
    assert_eq!(order.price, Some(Num::new(100, 1)));
    assert_eq!(order.quantity, Num::new(1, 1));
    assert_eq!(order.average_price, None);
    assert!(order.is_cancelable());
    assert!(!order.state.is_terminal());
  }

  /// Check that both spellings of the canceled state and unknown states
  /// are understood.
  #[test]
  fn parse_order_states() {
    for (state, expected) in [
      ("cancelled", State::Canceled),
      ("canceled", State::Canceled),
      ("pending_cancel", State::Unknown),
    ] {
      let order = ORDER.replace(r#""state": "confirmed""#, &format!(r#""state": "{state}""#));
      let order = from_json::<Order>(&order).unwrap();
      assert_eq!(order.state, expected);
    }
  }

  /// Check that an order request is initialized and encoded as
  /// expected.
  #[test]
  fn encode_order_request() {
    let request = OrderReqInit {
      type_: Type::Limit,
      price: Some(Num::new(15025, 100)),
      ..Default::default()
    }
    .init(
      "https://api.robinhood.com/accounts/5RY82436/",
      &instrument(),
      Side::Buy,
      Num::new(2, 1),
    );
    assert_eq!(request.symbol, "AAPL");
    assert_eq!(request.trigger, Trigger::Immediate);
    assert_eq!(request.time_in_force, TimeInForce::Day);

    let body = Post::body(&request).unwrap().unwrap();
    assert_eq!(body.content_type(), "application/json");
    let value = serde_json::from_slice::<Value>(body.as_bytes()).unwrap();
    assert_eq!(value["symbol"], "AAPL");
    assert_eq!(value["side"], "buy");
    assert_eq!(value["type"], "limit");
    assert_eq!(value["trigger"], "immediate");
    assert_eq!(value["time_in_force"], "gfd");
    assert_eq!(value["extended_hours"], false);
    assert_eq!(value["ref_id"], request.ref_id.to_string());
    assert!(value.get("price").is_some());
    assert!(value.get("stop_price").is_none());
  }

  /// Check that we can submit an order.
  #[test(tokio::test)]
  async fn submit_order() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/orders/")
      .match_header("content-type", "application/json")
      .match_body(Matcher::PartialJson(json!({
        "symbol": "AAPL",
        "side": "buy",
        "type": "market",
      })))
      .with_status(201)
      .with_body(ORDER)
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let request = OrderReqInit::default().init(
      "https://api.robinhood.com/accounts/5RY82436/",
      &instrument(),
      Side::Buy,
      Num::new(1, 1),
    );
    let order = client.issue::<Post>(&request).await.unwrap();
    assert_eq!(order.id.to_string(), ORDER_ID);
    mock.assert_async().await;
  }

  /// Check that an order exceeding the buying power is reported as
  /// such.
  #[test(tokio::test)]
  async fn submit_unsatisfiable_order() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/orders/")
      .with_status(403)
      .with_body(r#"{"detail": "You can only purchase 0 shares of AAPL."}"#)
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let request = OrderReqInit::default().init(
      "https://api.robinhood.com/accounts/5RY82436/",
      &instrument(),
      Side::Buy,
      Num::new(100000, 1),
    );
    let err = client.issue::<Post>(&request).await.unwrap_err();
    match err {
      RequestError::Endpoint(PostError::InsufficientFunds(Ok(message))) => {
        assert_eq!(message.message(), Some("You can only purchase 0 shares of AAPL."))
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }

  /// Check that we can retrieve an order by its ID.
  #[test(tokio::test)]
  async fn retrieve_order_by_id() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", format!("/orders/{ORDER_ID}/").as_str())
      .with_status(200)
      .with_body(ORDER)
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let id = Id(Uuid::parse_str(ORDER_ID).unwrap());
    let order = client.issue::<Get>(&id).await.unwrap();
    assert_eq!(order.id, id);
  }

  /// Check that canceling an order that can no longer be canceled is
  /// reported as such.
  #[test(tokio::test)]
  async fn cancel_order() {
    let mut server = Server::new_async().await;
    let ok = server
      .mock("POST", format!("/orders/{ORDER_ID}/cancel/").as_str())
      .with_status(200)
      .with_body("{}")
      .expect(1)
      .create_async()
      .await;
    let _filled = server
      .mock("POST", format!("/orders/{ORDER_ID}/cancel/").as_str())
      .with_status(400)
      .with_body(r#"{"detail": "Order cannot be cancelled."}"#)
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let id = Id(Uuid::parse_str(ORDER_ID).unwrap());
    let () = client.issue::<Cancel>(&id).await.unwrap();
    ok.assert_async().await;

    let err = client.issue::<Cancel>(&id).await.unwrap_err();
    match err {
      RequestError::Endpoint(CancelError::NotCancelable(_)) => (),
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }
}
