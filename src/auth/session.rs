// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::auth::oauth;
use crate::auth::oauth::Outcome;
use crate::auth::oauth::RevokeReq;
use crate::auth::oauth::Token;
use crate::auth::oauth::TokenReq;
use crate::auth::responder::Channel;
use crate::auth::totp::Totp;
use crate::auth::workflow::verify;
use crate::Client;
use crate::Error;

/// The number of seconds before expiry at which a token is refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;
/// The prefix of all login failure messages.
const LOGIN_FAILURE: &str = "Failed to login, no verification workflow found";


/// An authenticated session: a token and the point in time at which it
/// expires.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
  token: Token,
  expires_at: DateTime<Utc>,
}

impl Session {
  /// Create a session for a token that was issued at the given time.
  pub fn new(token: Token, issued_at: DateTime<Utc>) -> Self {
    let lifetime = i64::try_from(token.expires_in).unwrap_or(i64::MAX);
    let expires_at = issued_at
      .checked_add_signed(Duration::seconds(lifetime.min(i64::MAX / 1000)))
      .unwrap_or(DateTime::<Utc>::MAX_UTC);

    Self { token, expires_at }
  }

  /// Create a session from a token and its absolute expiry time.
  pub fn from_parts(token: Token, expires_at: DateTime<Utc>) -> Self {
    Self { token, expires_at }
  }

  /// Retrieve the session's token.
  #[inline]
  pub fn token(&self) -> &Token {
    &self.token
  }

  /// Retrieve the point in time at which the session's access token
  /// expires.
  #[inline]
  pub fn expires_at(&self) -> DateTime<Utc> {
    self.expires_at
  }

  /// Check whether the session's access token is expired at the given
  /// time.
  #[inline]
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }

  /// Check whether the access token should be refreshed before being
  /// used at the given time.
  #[inline]
  pub(crate) fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
    now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
  }
}


/// Create the error reported for a token request not resulting in a
/// token.
fn login_failure(outcome: Outcome) -> Error {
  let message = match outcome {
    Outcome::Rejected(Some(message)) => format!("{LOGIN_FAILURE}: {message}"),
    _ => LOGIN_FAILURE.to_string(),
  };
  Error::Authentication(message.into())
}


impl Client {
  /// Log in, establishing a session.
  ///
  /// A still valid session found in the token cache is reused without
  /// contacting the API. Otherwise the configured credentials are
  /// used, running through multi factor authentication and device
  /// verification as requested by the API.
  #[instrument(level = "debug", skip(self))]
  pub async fn login(&self) -> Result<(), Error> {
    if let Some(cache) = self.token_cache() {
      match cache.load().await {
        Ok(Some(session)) => {
          info!(expires_at = %session.expires_at(), "reusing cached login");
          self.set_session(session);
          return Ok(())
        },
        Ok(None) => debug!("no usable cached login found"),
        Err(err) => warn!("ignoring token cache: {err}"),
      }
    }

    let token = self.login_with_password().await?;
    self.adopt(token).await;
    info!("logged in");
    Ok(())
  }

  /// Refresh the session's access token.
  #[instrument(level = "debug", skip(self))]
  pub async fn refresh(&self) -> Result<(), Error> {
    let _guard = self.refresh_lock.lock().await;
    self.refresh_locked().await
  }

  /// Refresh the session if it is about to expire.
  ///
  /// Concurrent callers are serialized and only the first one actually
  /// refreshes.
  pub(crate) async fn refresh_expiring(&self) -> Result<(), Error> {
    let _guard = self.refresh_lock.lock().await;
    match self.session() {
      Some(session) if !session.needs_refresh(Utc::now()) => Ok(()),
      Some(_) => self.refresh_locked().await,
      None => Err(Error::NotAuthenticated),
    }
  }

  async fn refresh_locked(&self) -> Result<(), Error> {
    let refresh_token = self
      .session()
      .map(|session| session.token().refresh_token.clone())
      .ok_or(Error::NotAuthenticated)?;

    if refresh_token.is_empty() {
      return Err(Error::Authentication(
        "no refresh token available; log in again".into(),
      ))
    }

    let request = TokenReq::refresh(refresh_token);
    match self.request_token(&request).await? {
      Outcome::Authenticated(token) => {
        self.adopt(token).await;
        debug!("refreshed session");
        Ok(())
      },
      outcome => {
        let message = match outcome {
          Outcome::Rejected(Some(message)) => format!("Failed to refresh the session: {message}"),
          _ => "Failed to refresh the session".to_string(),
        };
        Err(Error::Authentication(message.into()))
      },
    }
  }

  /// Log out, revoking the refresh token and removing any cached
  /// login.
  #[instrument(level = "debug", skip(self))]
  pub async fn logout(&self) -> Result<(), Error> {
    let session = self.take_session();
    if let Some(cache) = self.token_cache() {
      cache.remove().await?;
    }

    if let Some(session) = session {
      let request = RevokeReq::new(&session.token().refresh_token);
      if let Err(err) = self.issue_with::<oauth::Revoke>(&request, None).await {
        warn!("failed to revoke refresh token: {}", Error::from(err));
      }
    }
    info!("logged out");
    Ok(())
  }

  /// Retrieve the access token to use for a request, refreshing the
  /// session first if necessary.
  pub(crate) async fn access_token(&self) -> Result<String, Error> {
    {
      let session = self.session().ok_or(Error::NotAuthenticated)?;
      if !session.needs_refresh(Utc::now()) {
        return Ok(session.token().access_token.clone())
      }
    }

    self.refresh_expiring().await?;
    self
      .session()
      .map(|session| session.token().access_token.clone())
      .ok_or(Error::NotAuthenticated)
  }

  async fn request_token(&self, request: &TokenReq) -> Result<Outcome, Error> {
    let response = self.issue_with::<oauth::Post>(request, None).await?;
    Ok(response.into_outcome())
  }

  async fn login_with_password(&self) -> Result<Token, Error> {
    let api_info = self.api_info();
    let request = TokenReq::password(
      &api_info.username,
      &api_info.password,
      &api_info.device_token,
    );

    match self.request_token(&request).await? {
      Outcome::Authenticated(token) => Ok(token),
      Outcome::Workflow(id) => {
        info!(workflow = %id, "device verification required");
        let () = verify(self, &api_info.device_token, &id).await?;
        match self.request_token(&request).await? {
          Outcome::Authenticated(token) => Ok(token),
          outcome => Err(login_failure(outcome)),
        }
      },
      Outcome::MfaRequired(kind) => {
        debug!(kind = ?kind, "multi factor authentication required");
        let code = self.mfa_code(kind.as_deref()).await?;
        let request = request.with_mfa_code(code);
        match self.request_token(&request).await? {
          Outcome::Authenticated(token) => Ok(token),
          _ => Err(Error::Authentication(
            "Failed to login, multi factor authentication code was rejected".into(),
          )),
        }
      },
      outcome => Err(login_failure(outcome)),
    }
  }

  /// Retrieve a multi factor authentication code, generating it from
  /// the configured secret if possible.
  async fn mfa_code(&self, kind: Option<&str>) -> Result<String, Error> {
    match &self.api_info().mfa_secret {
      Some(secret) => Ok(Totp::from_base32(secret)?.now()),
      None => {
        let channel = match kind {
          Some("sms") => Channel::Sms,
          Some("email") => Channel::Email,
          _ => Channel::Authenticator,
        };
        self.responder().respond(channel).await
      },
    }
  }

  /// Install a newly acquired token as the current session and persist
  /// it.
  async fn adopt(&self, token: Token) {
    let session = Session::new(token, Utc::now());
    if let Some(cache) = self.token_cache() {
      if let Err(err) = cache.save(&session).await {
        warn!("failed to cache login: {err}");
      }
    }
    self.set_session(session);
  }
}
