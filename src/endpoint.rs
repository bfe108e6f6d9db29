// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use http::Method;
use http::StatusCode;

use hyper::body::Bytes;

use serde::Deserialize;
use serde::Serialize;
use serde_json::from_slice as from_json;
use serde_json::to_vec as to_json;
use serde_urlencoded::to_string as to_form;

use thiserror::Error;

use crate::Str;

/// The content type used for JSON encoded request bodies.
const CONTENT_TYPE_JSON: &str = "application/json";
/// The content type used for form encoded request bodies.
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded; charset=utf-8";


/// An error as reported when converting between Rust objects and their
/// wire representation.
#[derive(Debug, Error)]
pub enum ConversionError {
  /// A JSON conversion error.
  #[error("a JSON conversion failed")]
  Json(
    #[from]
    #[source]
    serde_json::Error,
  ),
  /// An error while URL-encoding a query or form.
  #[error("failed to URL-encode data")]
  UrlEncode(
    #[from]
    #[source]
    serde_urlencoded::ser::Error,
  ),
  /// An URL parsing error.
  #[error("failed to parse the URL")]
  Url(
    #[from]
    #[source]
    url::ParseError,
  ),
}


/// An error message as reported by the Robinhood API.
///
/// Depending on the endpoint errors are reported either in the form of
/// a `detail` message or as an OAuth style `error` with an optional
/// description.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ApiError {
  /// A human readable error message.
  #[serde(rename = "detail", default)]
  pub detail: Option<String>,
  /// An error code, as used by the OAuth endpoints.
  #[serde(rename = "error", default)]
  pub error: Option<String>,
  /// A description accompanying `error`.
  #[serde(rename = "error_description", default)]
  pub description: Option<String>,
}

impl ApiError {
  /// Retrieve the most descriptive message contained in the error, if
  /// any.
  pub fn message(&self) -> Option<&str> {
    self
      .detail
      .as_deref()
      .or(self.description.as_deref())
      .or(self.error.as_deref())
  }
}

impl Display for ApiError {
  fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
    match (self.message(), &self.error) {
      (Some(message), Some(error)) if message != error => write!(fmt, "{message} ({error})"),
      (Some(message), _) => fmt.write_str(message),
      (None, _) => fmt.write_str("no error message provided"),
    }
  }
}


/// Format the message accompanying an erroneous HTTP status.
pub(crate) fn format_message(message: &Result<ApiError, Vec<u8>>) -> String {
  match message {
    Ok(err) => err.to_string(),
    Err(body) => String::from_utf8_lossy(body).into_owned(),
  }
}


/// The body of a request, along with its content type.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
  content_type: &'static str,
  bytes: Bytes,
}

impl Body {
  /// Create a JSON encoded body from the given value.
  pub fn json<T>(value: &T) -> Result<Self, ConversionError>
  where
    T: Serialize + ?Sized,
  {
    Ok(Self {
      content_type: CONTENT_TYPE_JSON,
      bytes: Bytes::from(to_json(value)?),
    })
  }

  /// Create a form encoded body from the given value.
  pub fn form<T>(value: &T) -> Result<Self, ConversionError>
  where
    T: Serialize + ?Sized,
  {
    Ok(Self {
      content_type: CONTENT_TYPE_FORM,
      bytes: Bytes::from(to_form(value)?),
    })
  }

  /// Retrieve the body's content type.
  #[inline]
  pub fn content_type(&self) -> &'static str {
    self.content_type
  }

  /// Retrieve the raw bytes making up the body.
  #[inline]
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  #[inline]
  pub(crate) fn into_bytes(self) -> Bytes {
    self.bytes
  }
}


/// A trait describing an HTTP endpoint.
///
/// An endpoint for our intents and purposes is basically a path and an
/// HTTP request method (e.g., GET or POST). The path will be combined
/// with an "authority" (scheme, host, and port) into a full URL. Query
/// parameters and request bodies are supported as well.
///
/// Implementations are typically created through the `Endpoint!` and
/// `EndpointNoParse!` macros.
pub trait Endpoint {
  /// The type of data being passed in as part of a request to this
  /// endpoint.
  type Input;
  /// The type of data being returned in the response from this
  /// endpoint.
  type Output;
  /// The type of error this endpoint can report.
  type Error;

  /// Retrieve the base URL to use.
  ///
  /// By default the base URL of the client's `ApiInfo` is used.
  fn base_url() -> Option<Str> {
    None
  }

  /// Retrieve the HTTP method to use.
  ///
  /// The default method being used is GET.
  fn method() -> Method {
    Method::GET
  }

  /// Inquire the path the request should go to.
  fn path(input: &Self::Input) -> Str;

  /// Inquire the query the request should use.
  ///
  /// By default no query is emitted.
  #[allow(unused)]
  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(None)
  }

  /// Retrieve the request's body.
  ///
  /// By default no body is sent.
  #[allow(unused)]
  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(None)
  }

  /// Check whether the request requires a bearer token.
  fn authenticated() -> bool {
    true
  }

  /// Check whether the request body contains credentials and should
  /// not be traced.
  fn sensitive() -> bool {
    false
  }

  /// Parse the body of a successful response into the final result.
  fn parse(body: &[u8]) -> Result<Self::Output, ConversionError>;

  /// Parse the body of an unsuccessful response into an `ApiError`.
  fn parse_err(body: &[u8]) -> Result<ApiError, Vec<u8>> {
    from_json::<ApiError>(body).map_err(|_| body.to_vec())
  }

  /// Evaluate an HTTP status and body, converting it into the output
  /// or an error.
  fn evaluate(status: StatusCode, body: &[u8]) -> Result<Self::Output, Self::Error>;
}


/// A macro used for defining the properties for a request to a
/// particular HTTP endpoint, parsing successful responses as JSON.
macro_rules! Endpoint {
  ( $(#[$docs:meta])* $pub:vis $name:ident($in:ty),
    Ok => $out:ty, [$($(#[$ok_docs:meta])* $ok_status:ident,)*],
    Err => $err:ident, [$($(#[$err_docs:meta])* $err_status:ident => $variant:ident,)*]
    $($defs:tt)* ) => {

    EndpointNoParse! {
      $(#[$docs])* $pub $name($in),
      Ok => $out, [$($(#[$ok_docs])* $ok_status,)*],
      Err => $err, [$($(#[$err_docs])* $err_status => $variant,)*]

      $($defs)*

      fn parse(
        body: &[u8],
      ) -> ::std::result::Result<Self::Output, crate::endpoint::ConversionError> {
        ::serde_json::from_slice::<Self::Output>(body)
          .map_err(crate::endpoint::ConversionError::from)
      }
    }
  };
}

/// A macro used for defining the properties for a request to a
/// particular HTTP endpoint, with the definition providing a custom
/// `parse` function.
macro_rules! EndpointNoParse {
  ( $(#[$docs:meta])* $pub:vis $name:ident($in:ty),
    Ok => $out:ty, [$($(#[$ok_docs:meta])* $ok_status:ident,)*],
    Err => $err:ident, [$($(#[$err_docs:meta])* $err_status:ident => $variant:ident,)*]
    $($defs:tt)* ) => {

    EndpointDefImpl! {
      $(#[$docs])* $pub $name($in),
      Ok => $out, [$($ok_status,)*],
      Err => $err, [
        // Every request can result in an authentication failure or fall
        // prey to the rate limit and so we include these variants into
        // all our error definitions.
        /// Authentication failed for the request.
        /* 401 */ UNAUTHORIZED => AuthenticationFailed,
        /// The rate limit was exceeded, causing the request to be
        /// denied.
        /* 429 */ TOO_MANY_REQUESTS => RateLimitExceeded,
        $($(#[$err_docs])* $err_status => $variant,)*
      ]

      $($defs)*
    }
  };
}

macro_rules! EndpointDefImpl {
  ( $(#[$docs:meta])* $pub:vis $name:ident($in:ty),
    Ok => $out:ty, [$($ok_status:ident,)*],
    Err => $err:ident, [$($(#[$err_docs:meta])* $err_status:ident => $variant:ident,)*]
    $($defs:tt)* ) => {

    $(#[$docs])*
    #[derive(Clone, Copy, Debug)]
    $pub enum $name {}

    #[allow(unused_qualifications)]
    impl crate::endpoint::Endpoint for $name {
      type Input = $in;
      type Output = $out;
      type Error = $err;

      $($defs)*

      fn evaluate(
        status: ::http::StatusCode,
        body: &[u8],
      ) -> ::std::result::Result<Self::Output, Self::Error> {
        match status {
          $(
            ::http::StatusCode::$ok_status => {
              <Self as crate::endpoint::Endpoint>::parse(body).map_err($err::Conversion)
            },
          )*
          status => {
            let message = <Self as crate::endpoint::Endpoint>::parse_err(body);
            match status {
              $(
                ::http::StatusCode::$err_status => Err($err::$variant(message)),
              )*
              _ => Err($err::UnexpectedStatus(status, message)),
            }
          },
        }
      }
    }

    /// An enum representing the various errors this endpoint may
    /// encounter.
    #[allow(unused_qualifications)]
    #[derive(Debug)]
    $pub enum $err {
      $(
        $(#[$err_docs])*
        $variant(::std::result::Result<crate::endpoint::ApiError, ::std::vec::Vec<u8>>),
      )*
      /// An HTTP status not present in the endpoint's definition was
      /// encountered.
      UnexpectedStatus(
        ::http::StatusCode,
        ::std::result::Result<crate::endpoint::ApiError, ::std::vec::Vec<u8>>,
      ),
      /// The response body could not be converted.
      Conversion(crate::endpoint::ConversionError),
    }

    #[allow(unused_qualifications)]
    impl ::std::fmt::Display for $err {
      fn fmt(&self, fmt: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
          $(
            $err::$variant(message) => {
              let status = ::http::StatusCode::$err_status;
              let message = crate::endpoint::format_message(message);
              write!(fmt, "HTTP status {}: {}", status, message)
            },
          )*
          $err::UnexpectedStatus(status, message) => {
            let message = crate::endpoint::format_message(message);
            write!(fmt, "unexpected HTTP status {}: {}", status, message)
          },
          $err::Conversion(..) => fmt.write_str("failed to convert the response"),
        }
      }
    }

    #[allow(unused_qualifications)]
    impl ::std::error::Error for $err {
      fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
        match self {
          $err::Conversion(err) => Some(err),
          _ => None,
        }
      }
    }

    #[allow(unused_qualifications)]
    impl ::std::convert::From<$err> for crate::Error {
      fn from(src: $err) -> Self {
        match src {
          $(
            $err::$variant(message) => crate::Error::HttpStatus(
              ::http::StatusCode::$err_status,
              crate::endpoint::format_message(&message),
            ),
          )*
          $err::UnexpectedStatus(status, message) => {
            crate::Error::HttpStatus(status, crate::endpoint::format_message(&message))
          },
          $err::Conversion(err) => crate::Error::Conversion(err),
        }
      }
    }
  };
}
