// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::env::var_os;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

use chrono::DateTime;
use chrono::TimeZone as _;
use chrono::Utc;

use fernet::Fernet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::from_slice as from_json;
use serde_json::to_vec as to_json;

use sha2::Digest as _;
use sha2::Sha256;

use tokio::fs::create_dir_all;
use tokio::fs::read_to_string;
use tokio::fs::remove_file;
use tokio::fs::write;

use tracing::debug;

use crate::auth::oauth::Token;
use crate::auth::Session;
use crate::Error;


/// The representation of a cached login.
#[derive(Debug, Deserialize, Serialize)]
struct Entry {
  /// The token.
  #[serde(rename = "login")]
  login: Token,
  /// The expiry time of the token, as Unix timestamp.
  #[serde(rename = "expiry")]
  expiry: i64,
  /// The expiry time in human readable form.
  #[serde(rename = "expiration_dt")]
  expiration_dt: DateTime<Utc>,
}


/// An encrypted on-disk cache of a login.
///
/// The cache is encrypted with a key derived from the user's
/// credentials, meaning that it can only be used when logging in as
/// the same user.
#[derive(Clone)]
pub struct TokenCache {
  path: PathBuf,
  key: String,
}

impl TokenCache {
  /// Create a cache stored at the given path, for the given
  /// credentials.
  pub fn new(path: impl Into<PathBuf>, username: &str, password: &str) -> Self {
    let digest = Sha256::new()
      .chain_update(username.as_bytes())
      .chain_update(password.as_bytes())
      .finalize();

    Self {
      path: path.into(),
      key: URL_SAFE.encode(digest),
    }
  }

  /// Retrieve the default location of the cache,
  /// `~/.robinhood/login.token`.
  pub fn default_path() -> Option<PathBuf> {
    var_os("HOME").map(|home| PathBuf::from(home).join(".robinhood").join("login.token"))
  }

  /// Retrieve the path of the cache file.
  #[inline]
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn fernet(&self) -> Result<Fernet, Error> {
    Fernet::new(&self.key).ok_or_else(|| Error::Str("invalid token cache key".into()))
  }

  /// Load the cached session.
  ///
  /// `None` is returned if there is no cached login or if it has
  /// expired.
  pub async fn load(&self) -> Result<Option<Session>, Error> {
    self.load_at(Utc::now()).await
  }

  async fn load_at(&self, now: DateTime<Utc>) -> Result<Option<Session>, Error> {
    let data = match read_to_string(&self.path).await {
      Ok(data) => data,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(err.into()),
    };

    let data = data.trim();
    if data.is_empty() {
      return Ok(None)
    }

    let plain = self
      .fernet()?
      .decrypt(data)
      .map_err(|_| Error::InvalidCacheFile("failed to decrypt data".into()))?;
    let entry = from_json::<Entry>(&plain)
      .map_err(|err| Error::InvalidCacheFile(format!("malformed data: {err}").into()))?;
    let expires_at = Utc
      .timestamp_opt(entry.expiry, 0)
      .single()
      .ok_or_else(|| Error::InvalidCacheFile("invalid expiry time".into()))?;

    if expires_at <= now {
      debug!(expires_at = %expires_at, "cached login has expired");
      return Ok(None)
    }

    Ok(Some(Session::from_parts(entry.login, expires_at)))
  }

  /// Store a session in the cache, creating the parent directories as
  /// necessary.
  pub async fn save(&self, session: &Session) -> Result<(), Error> {
    let entry = Entry {
      login: session.token().clone(),
      expiry: session.expires_at().timestamp(),
      expiration_dt: session.expires_at(),
    };
    let json = to_json(&entry)?;
    let encrypted = self.fernet()?.encrypt(&json);

    if let Some(parent) = self.path.parent() {
      let () = create_dir_all(parent).await?;
    }
    let () = write(&self.path, encrypted).await?;

    debug!(
      path = %self.path.display(),
      expires_at = %session.expires_at(),
      "cached login"
    );
    Ok(())
  }

  /// Remove the cache file, if it exists.
  pub async fn remove(&self) -> Result<(), Error> {
    match remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
      Err(err) => Err(err.into()),
    }
  }
}

impl Debug for TokenCache {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("TokenCache")
      .field("path", &self.path)
      .field("key", &"<masked>")
      .finish()
  }
}
