// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::env::var_os;
use std::ffi::OsString;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::path::PathBuf;

use url::Url;

use uuid::Uuid;

use crate::api::API_BASE_URL;
use crate::Error;

/// The base URL to the API to use.
const ENV_API_URL: &str = "RH_API_BASE_URL";
/// The environment variable representing the user name.
const ENV_USERNAME: &str = "RH_USERNAME";
/// The environment variable representing the password.
const ENV_PASSWORD: &str = "RH_PASSWORD";
/// The environment variable representing the base32 encoded secret
/// used for generating time based one-time passwords.
const ENV_MFA_SECRET: &str = "RH_MFA_SECRET";
/// The environment variable representing the device token.
const ENV_DEVICE_TOKEN: &str = "RH_DEVICE_TOKEN";
/// The environment variable pointing to the token cache file.
const ENV_TOKEN_CACHE: &str = "RH_TOKEN_CACHE";


/// Retrieve an optional environment variable as a `String`.
fn optional_var(name: &str) -> Result<Option<String>, Error> {
  var_os(name)
    .map(OsString::into_string)
    .transpose()
    .map_err(|_| Error::Str(format!("{name} environment variable is not a valid string").into()))
}

/// Retrieve a required environment variable as a `String`.
fn required_var(name: &str) -> Result<String, Error> {
  optional_var(name)?
    .ok_or_else(|| Error::Str(format!("{name} environment variable not found").into()))
}


/// An object encapsulating the information used for working with the
/// Robinhood API.
#[derive(Clone, PartialEq)]
pub struct ApiInfo {
  /// The base URL for the API.
  pub(crate) api_base_url: Url,
  /// The user name to log in with.
  pub(crate) username: String,
  /// The password to log in with.
  pub(crate) password: String,
  /// The base32 encoded secret of an authenticator app, if multi
  /// factor authentication codes should be generated automatically.
  pub(crate) mfa_secret: Option<String>,
  /// The token identifying this "device" towards Robinhood.
  ///
  /// Reusing the same token across logins avoids repeated device
  /// verification.
  pub(crate) device_token: String,
  /// The path to the encrypted token cache, if any.
  pub(crate) token_cache: Option<PathBuf>,
}

impl ApiInfo {
  /// Create an `ApiInfo` from the required data.
  ///
  /// A random device token is generated. Use
  /// [`with_device_token`][Self::with_device_token] to provide a
  /// persistent one.
  ///
  /// # Errors
  /// - [`Error::Url`](crate::Error::Url) If `api_base_url` cannot be
  ///   parsed into a [`url::Url`](url::Url).
  pub fn from_parts(
    api_base_url: impl AsRef<str>,
    username: impl ToString,
    password: impl ToString,
  ) -> Result<Self, Error> {
    Ok(Self {
      api_base_url: Url::parse(api_base_url.as_ref())?,
      username: username.to_string(),
      password: password.to_string(),
      mfa_secret: None,
      device_token: Uuid::new_v4().to_string(),
      token_cache: None,
    })
  }

  /// Create an `ApiInfo` object with information from the environment.
  ///
  /// This constructor retrieves API related information from the
  /// environment and performs some preliminary validation on it. The
  /// following information is used:
  /// - the API base URL is retrieved from the RH_API_BASE_URL variable
  ///   (defaulting to the production API)
  /// - the user name is retrieved from the RH_USERNAME variable
  /// - the password is retrieved from the RH_PASSWORD variable
  /// - the optional authenticator secret is retrieved from the
  ///   RH_MFA_SECRET variable
  /// - the optional device token is retrieved from the RH_DEVICE_TOKEN
  ///   variable (a random one is generated if absent)
  /// - the optional token cache path is retrieved from the
  ///   RH_TOKEN_CACHE variable
  pub fn from_env() -> Result<Self, Error> {
    let api_base_url = optional_var(ENV_API_URL)?.unwrap_or_else(|| API_BASE_URL.to_string());
    let api_base_url = Url::parse(&api_base_url)?;
    let username = required_var(ENV_USERNAME)?;
    let password = required_var(ENV_PASSWORD)?;
    let mfa_secret = optional_var(ENV_MFA_SECRET)?;
    let device_token =
      optional_var(ENV_DEVICE_TOKEN)?.unwrap_or_else(|| Uuid::new_v4().to_string());
    let token_cache = optional_var(ENV_TOKEN_CACHE)?.map(PathBuf::from);

    Ok(Self {
      api_base_url,
      username,
      password,
      mfa_secret,
      device_token,
      token_cache,
    })
  }

  /// Set the base32 encoded authenticator secret used for answering
  /// multi factor authentication requests.
  pub fn with_mfa_secret(mut self, secret: impl ToString) -> Self {
    self.mfa_secret = Some(secret.to_string());
    self
  }

  /// Set the device token to identify as.
  pub fn with_device_token(mut self, token: impl ToString) -> Self {
    self.device_token = token.to_string();
    self
  }

  /// Set the path of the encrypted token cache.
  pub fn with_token_cache(mut self, path: impl Into<PathBuf>) -> Self {
    self.token_cache = Some(path.into());
    self
  }

  /// Retrieve the base URL of the API.
  #[inline]
  pub fn api_base_url(&self) -> &Url {
    &self.api_base_url
  }

  /// Retrieve the user name.
  #[inline]
  pub fn username(&self) -> &str {
    &self.username
  }

  /// Retrieve the device token.
  #[inline]
  pub fn device_token(&self) -> &str {
    &self.device_token
  }

  /// Retrieve the path of the token cache, if one is configured.
  #[inline]
  pub fn token_cache(&self) -> Option<&PathBuf> {
    self.token_cache.as_ref()
  }
}

impl Debug for ApiInfo {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ApiInfo")
      .field("api_base_url", &self.api_base_url.as_str())
      .field("username", &self.username)
      .field("password", &"<masked>")
      .field("mfa_secret", &self.mfa_secret.as_ref().map(|_| "<masked>"))
      .field("device_token", &self.device_token)
      .field("token_cache", &self.token_cache)
      .finish()
  }
}
