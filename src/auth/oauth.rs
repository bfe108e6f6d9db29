// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use http::Method;

use serde::Deserialize;
use serde::Serialize;

use crate::endpoint::ApiError;
use crate::endpoint::Body;
use crate::endpoint::ConversionError;
use crate::Str;

/// The client ID of Robinhood's web application.
pub(crate) const CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";
/// The lifetime we request for tokens, in seconds.
const EXPIRES_IN: u64 = 86400;
/// The OAuth scope we request.
const SCOPE: &str = "internal";
/// The channel through which we want to receive verification
/// challenges.
const CHALLENGE_TYPE: &str = "sms";


/// A bearer token along with the information needed to refresh it.
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct Token {
  /// The token to present with every authenticated request.
  #[serde(rename = "access_token")]
  pub access_token: String,
  /// The token used for acquiring a new access token.
  #[serde(rename = "refresh_token")]
  pub refresh_token: String,
  /// The lifetime of the access token, in seconds.
  #[serde(rename = "expires_in")]
  pub expires_in: u64,
  /// The type of the token, usually "Bearer".
  #[serde(rename = "token_type")]
  pub token_type: String,
  /// The scope the token is valid for.
  #[serde(rename = "scope")]
  pub scope: String,
}

impl Debug for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Token")
      .field("access_token", &"<masked>")
      .field("refresh_token", &"<masked>")
      .field("expires_in", &self.expires_in)
      .field("token_type", &self.token_type)
      .field("scope", &self.scope)
      .finish()
  }
}


/// The grant being requested from the token endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum GrantType {
  /// Authenticate using user name and password.
  #[serde(rename = "password")]
  Password,
  /// Exchange a refresh token for a new access token.
  #[serde(rename = "refresh_token")]
  RefreshToken,
}


/// A request to the token endpoint.
#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct TokenReq {
  #[serde(rename = "client_id")]
  client_id: &'static str,
  #[serde(rename = "expires_in")]
  expires_in: u64,
  #[serde(rename = "grant_type")]
  grant_type: GrantType,
  #[serde(rename = "scope")]
  scope: &'static str,
  #[serde(rename = "username", skip_serializing_if = "Option::is_none")]
  username: Option<String>,
  #[serde(rename = "password", skip_serializing_if = "Option::is_none")]
  password: Option<String>,
  #[serde(rename = "device_token", skip_serializing_if = "Option::is_none")]
  device_token: Option<String>,
  #[serde(rename = "challenge_type", skip_serializing_if = "Option::is_none")]
  challenge_type: Option<&'static str>,
  #[serde(rename = "mfa_code", skip_serializing_if = "Option::is_none")]
  mfa_code: Option<String>,
  #[serde(rename = "refresh_token", skip_serializing_if = "Option::is_none")]
  refresh_token: Option<String>,
}

impl TokenReq {
  fn new(grant_type: GrantType) -> Self {
    Self {
      client_id: CLIENT_ID,
      expires_in: EXPIRES_IN,
      grant_type,
      scope: SCOPE,
      username: None,
      password: None,
      device_token: None,
      challenge_type: None,
      mfa_code: None,
      refresh_token: None,
    }
  }

  /// Create a request for a password grant.
  pub fn password(
    username: impl ToString,
    password: impl ToString,
    device_token: impl ToString,
  ) -> Self {
    Self {
      username: Some(username.to_string()),
      password: Some(password.to_string()),
      device_token: Some(device_token.to_string()),
      challenge_type: Some(CHALLENGE_TYPE),
      ..Self::new(GrantType::Password)
    }
  }

  /// Create a request for a refresh grant.
  pub fn refresh(refresh_token: impl ToString) -> Self {
    Self {
      refresh_token: Some(refresh_token.to_string()),
      ..Self::new(GrantType::RefreshToken)
    }
  }

  /// Attach a multi factor authentication code to the request.
  pub fn with_mfa_code(mut self, code: impl ToString) -> Self {
    self.mfa_code = Some(code.to_string());
    self
  }

  /// Retrieve the grant type being requested.
  #[inline]
  pub fn grant_type(&self) -> GrantType {
    self.grant_type
  }
}

impl Debug for TokenReq {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    let mask = |value: &Option<String>| value.as_ref().map(|_| "<masked>");

    f.debug_struct("TokenReq")
      .field("grant_type", &self.grant_type)
      .field("username", &self.username)
      .field("password", &mask(&self.password))
      .field("device_token", &self.device_token)
      .field("mfa_code", &mask(&self.mfa_code))
      .field("refresh_token", &mask(&self.refresh_token))
      .finish()
  }
}


/// A reference to a device verification workflow.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct WorkflowRef {
  /// The workflow's ID.
  #[serde(rename = "id")]
  pub id: String,
  /// The workflow's status, if reported.
  #[serde(rename = "workflow_status", default)]
  pub status: Option<String>,
}


/// The response of the token endpoint.
///
/// Depending on the state of the account and device the endpoint
/// either hands out a token, asks for further verification, or rejects
/// the request. All of these cases share the same loosely defined
/// object.
#[derive(Clone, Default, Deserialize, PartialEq)]
pub struct LoginResponse {
  #[serde(rename = "access_token", default)]
  access_token: Option<String>,
  #[serde(rename = "refresh_token", default)]
  refresh_token: Option<String>,
  #[serde(rename = "expires_in", default)]
  expires_in: Option<u64>,
  #[serde(rename = "token_type", default)]
  token_type: Option<String>,
  #[serde(rename = "scope", default)]
  scope: Option<String>,
  #[serde(rename = "mfa_required", default)]
  mfa_required: Option<bool>,
  #[serde(rename = "mfa_type", default)]
  mfa_type: Option<String>,
  #[serde(rename = "verification_workflow", default)]
  verification_workflow: Option<WorkflowRef>,
  #[serde(flatten)]
  error: ApiError,
}

impl LoginResponse {
  /// Classify the response.
  pub fn into_outcome(self) -> Outcome {
    if let Some(access_token) = self.access_token {
      Outcome::Authenticated(Token {
        access_token,
        refresh_token: self.refresh_token.unwrap_or_default(),
        expires_in: self.expires_in.unwrap_or(EXPIRES_IN),
        token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        scope: self.scope.unwrap_or_else(|| SCOPE.to_string()),
      })
    } else if let Some(workflow) = self.verification_workflow {
      Outcome::Workflow(workflow.id)
    } else if self.mfa_required.unwrap_or(false) {
      Outcome::MfaRequired(self.mfa_type)
    } else {
      Outcome::Rejected(self.error.message().map(str::to_string))
    }
  }
}

impl Debug for LoginResponse {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("LoginResponse")
      .field("access_token", &self.access_token.as_ref().map(|_| "<masked>"))
      .field("mfa_required", &self.mfa_required)
      .field("mfa_type", &self.mfa_type)
      .field("verification_workflow", &self.verification_workflow)
      .field("error", &self.error)
      .finish()
  }
}


/// The classified result of a token request.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
  /// A token was handed out.
  Authenticated(Token),
  /// The device has to be verified by running through the workflow
  /// with the given ID.
  Workflow(String),
  /// A multi factor authentication code is required. The type of the
  /// code (e.g., "sms" or "app") is included, if reported.
  MfaRequired(Option<String>),
  /// The request was rejected, with an optional message.
  Rejected(Option<String>),
}


Endpoint! {
  /// The representation of a POST request to the /oauth2/token/
  /// endpoint.
  pub Post(TokenReq),
  Ok => LoginResponse, [
    /// The request was processed.
    /* 200 */ OK,
    /// The request was rejected, e.g., because of invalid
    /// credentials.
    /* 400 */ BAD_REQUEST,
    /// Additional verification is required.
    /* 403 */ FORBIDDEN,
  ],
  Err => PostError, []

  fn method() -> Method {
    Method::POST
  }

  fn path(_input: &Self::Input) -> Str {
    "/oauth2/token/".into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::form(input)?))
  }

  fn authenticated() -> bool {
    false
  }

  fn sensitive() -> bool {
    true
  }
}


/// A request to revoke a token.
#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct RevokeReq {
  #[serde(rename = "client_id")]
  client_id: &'static str,
  #[serde(rename = "token")]
  token: String,
}

impl RevokeReq {
  /// Create a request revoking the given token.
  pub fn new(token: impl ToString) -> Self {
    Self {
      client_id: CLIENT_ID,
      token: token.to_string(),
    }
  }
}

impl Debug for RevokeReq {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("RevokeReq")
      .field("token", &"<masked>")
      .finish()
  }
}


EndpointNoParse! {
  /// The representation of a POST request to the
  /// /oauth2/revoke_token/ endpoint.
  pub Revoke(RevokeReq),
  Ok => (), [
    /// The token was revoked.
    /* 200 */ OK,
  ],
  Err => RevokeError, []

  fn method() -> Method {
    Method::POST
  }

  fn path(_input: &Self::Input) -> Str {
    "/oauth2/revoke_token/".into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::form(input)?))
  }

  fn authenticated() -> bool {
    false
  }

  fn sensitive() -> bool {
    true
  }

  fn parse(_body: &[u8]) -> Result<Self::Output, ConversionError> {
    Ok(())
  }
}
