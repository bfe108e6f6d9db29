// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Utc;

use serde::Deserialize;

use uuid::Uuid;

use crate::Str;


/// Information about the logged in user.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct User {
  /// The user's ID.
  #[serde(rename = "id")]
  pub id: Uuid,
  /// The user's login name.
  #[serde(rename = "username")]
  pub username: String,
  /// The user's email address.
  #[serde(rename = "email")]
  pub email: String,
  /// The user's first name.
  #[serde(rename = "first_name")]
  pub first_name: String,
  /// The user's last name.
  #[serde(rename = "last_name")]
  pub last_name: String,
  /// The time the user signed up.
  #[serde(rename = "created_at")]
  pub created_at: DateTime<Utc>,
}


Endpoint! {
  /// The representation of a GET request to the /user/ endpoint.
  pub Get(()),
  Ok => User, [
    /// The user information was retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, []

  fn path(_input: &Self::Input) -> Str {
    "/user/".into()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use chrono::TimeZone as _;

  use mockito::Server;

  use serde_json::from_str as from_json;

  use test_log::test;

  use crate::test_util::logged_in_client;

  const USER: &str = r#"{
    "url": "https://api.robinhood.com/user/",
    "id": "8e620d87-d864-4297-828b-c9b7662f2c2b",
    "id_info": "https://api.robinhood.com/user/id/",
    "username": "jdoe",
    "email": "jdoe@example.com",
    "email_verified": true,
    "first_name": "John",
    "last_name": "Doe",
    "origin": {"locality": "US"},
    "profile_name": "jdoe",
    "created_at": "2018-05-16T19:01:44.151421-04:00"
  }"#;


  /// Check that we can parse the reference user from the
  /// documentation.
  #[test]
  fn parse_reference_user() {
    let user = from_json::<User>(USER).unwrap();
    assert_eq!(
      user.id,
      Uuid::parse_str("8e620d87-d864-4297-828b-c9b7662f2c2b").unwrap()
    );
    assert_eq!(user.username, "jdoe");
    assert_eq!(user.first_name, "John");
    assert_eq!(
      user.created_at,
      Utc
        .with_ymd_and_hms(2018, 5, 16, 23, 1, 44)
        .unwrap()
        .checked_add_signed(chrono::Duration::microseconds(151421))
        .unwrap()
    );
  }

  /// Check that we can retrieve the user.
  #[test(tokio::test)]
  async fn request_user() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/user/")
      .match_header("authorization", "Bearer access-token")
      .with_status(200)
      .with_body(USER)
      .create_async()
      .await;

    let client = logged_in_client(&server.url());
    let user = client.issue::<Get>(&()).await.unwrap();
    assert_eq!(user.email, "jdoe@example.com");
  }
}
