// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Error as IoError;

use http::Error as HttpError;
use http::StatusCode as HttpStatusCode;
use hyper::Error as HyperError;
use hyper_util::client::legacy::Error as HyperUtilError;
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError;

use crate::endpoint::ConversionError;
use crate::Str;


/// An error encountered while issuing a request.
#[derive(Debug, Error)]
pub enum RequestError<E> {
  /// An endpoint reported error.
  #[error("the endpoint reported an error")]
  Endpoint(#[source] E),
  /// The request could not be assembled.
  #[error("failed to create the request")]
  Request(#[source] ConversionError),
  /// An error reported by the `http` crate while building the request.
  #[error("encountered an HTTP related error")]
  Http(
    #[from]
    #[source]
    HttpError,
  ),
  /// An error reported by the `hyper` crate.
  #[error("the hyper crate reported an error")]
  Hyper(
    #[from]
    #[source]
    HyperError,
  ),
  /// An error reported by the `hyper-util` HTTP client.
  #[error("the HTTP client reported an error")]
  Client(
    #[from]
    #[source]
    HyperUtilError,
  ),
  /// An I/O error, e.g., while decompressing the response.
  #[error("encountered an I/O error")]
  Io(
    #[from]
    #[source]
    IoError,
  ),
  /// The request did not complete within the configured timeout.
  #[error("the request timed out")]
  TimedOut,
  /// The endpoint requires authentication but no session exists.
  #[error("no active session; log in first")]
  NotAuthenticated,
  /// The session could not be refreshed before issuing the request.
  #[error("failed to refresh the session")]
  Session(#[source] Box<Error>),
}


/// The error type as used by this crate.
#[derive(Debug, Error)]
pub enum Error {
  /// Authentication with the API failed.
  #[error("{0}")]
  Authentication(Str),
  /// A wire conversion error.
  #[error("failed to convert data to or from its wire representation")]
  Conversion(
    #[from]
    #[source]
    ConversionError,
  ),
  /// An HTTP related error.
  #[error("encountered an HTTP related error")]
  Http(
    #[from]
    #[source]
    HttpError,
  ),
  /// We encountered an HTTP status code that either represents a
  /// failure or is not supported.
  #[error("encountered an unexpected HTTP status {0}: {1}")]
  HttpStatus(HttpStatusCode, String),
  /// An error reported by the `hyper` crate.
  #[error("the hyper crate reported an error")]
  Hyper(
    #[from]
    #[source]
    HyperError,
  ),
  /// An error reported by the `hyper-util` HTTP client.
  #[error("the HTTP client reported an error")]
  Client(
    #[from]
    #[source]
    HyperUtilError,
  ),
  /// The token cache file could not be decrypted or is malformed.
  #[error("cached login file is invalid or corrupted: {0}")]
  InvalidCacheFile(Str),
  /// An I/O error.
  #[error("encountered an I/O error")]
  Io(
    #[from]
    #[source]
    IoError,
  ),
  /// A JSON conversion error.
  #[error("a JSON conversion failed")]
  Json(
    #[from]
    #[source]
    JsonError,
  ),
  /// The operation requires an active session.
  #[error("no active session; log in first")]
  NotAuthenticated,
  /// An error directly originating in this crate.
  #[error("{0}")]
  Str(Str),
  /// A request did not complete within the configured timeout.
  #[error("the request timed out")]
  TimedOut,
  /// An URL parsing error.
  #[error("failed to parse the URL")]
  Url(
    #[from]
    #[source]
    ParseError,
  ),
  /// The device verification workflow did not complete.
  #[error("device verification failed: {0}")]
  Workflow(Str),
}

impl<E> From<RequestError<E>> for Error
where
  E: Into<Error>,
{
  fn from(src: RequestError<E>) -> Self {
    match src {
      RequestError::Endpoint(err) => err.into(),
      RequestError::Request(err) => Error::Conversion(err),
      RequestError::Http(err) => Error::Http(err),
      RequestError::Hyper(err) => Error::Hyper(err),
      RequestError::Client(err) => Error::Client(err),
      RequestError::Io(err) => Error::Io(err),
      RequestError::TimedOut => Error::TimedOut,
      RequestError::NotAuthenticated => Error::NotAuthenticated,
      RequestError::Session(err) => *err,
    }
  }
}
