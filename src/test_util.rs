// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use async_trait::async_trait;

use chrono::Duration as ChronoDuration;
use chrono::Utc;

use crate::auth::oauth::Token;
use crate::auth::responder::Channel;
use crate::auth::responder::ChallengeResponder;
use crate::auth::workflow::WorkflowConfig;
use crate::auth::Session;
use crate::ApiInfo;
use crate::Client;
use crate::Error;


/// Workflow timing suitable for tests running against a mock server.
pub(crate) const FAST_WORKFLOW: WorkflowConfig = WorkflowConfig {
  timeout: Duration::from_secs(5),
  poll_interval: Duration::from_millis(5),
  max_retries: 3,
};


/// A responder always handing out the same code.
#[derive(Debug)]
pub(crate) struct FixedResponder(pub &'static str);

#[async_trait]
impl ChallengeResponder for FixedResponder {
  async fn respond(&self, _channel: Channel) -> Result<String, Error> {
    Ok(self.0.to_string())
  }
}


/// Create a token with the given access token.
pub(crate) fn token(access_token: &str) -> Token {
  Token {
    access_token: access_token.to_string(),
    refresh_token: "refresh".to_string(),
    expires_in: 86400,
    token_type: "Bearer".to_string(),
    scope: "internal".to_string(),
  }
}

/// Create a session that has expired already.
pub(crate) fn expired_session() -> Session {
  Session::from_parts(token("expired-token"), Utc::now() - ChronoDuration::seconds(1))
}

/// Create the `ApiInfo` used for talking to a mock server.
pub(crate) fn test_api_info(url: &str) -> ApiInfo {
  ApiInfo::from_parts(url, "user", "pass")
    .unwrap()
    .with_device_token("device")
}

/// Create a client without session talking to a mock server.
pub(crate) fn test_client(url: &str) -> Client {
  Client::builder()
    .workflow(FAST_WORKFLOW)
    .responder(FixedResponder("000000"))
    .build(test_api_info(url))
}

/// Create a client with a valid session talking to a mock server.
pub(crate) fn logged_in_client(url: &str) -> Client {
  let client = test_client(url);
  client.set_session(Session::new(token("access-token"), Utc::now()));
  client
}
