// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::from_utf8;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use http::header::ACCEPT;
use http::header::AUTHORIZATION;
use http::header::CONTENT_TYPE;
use http::header::USER_AGENT;
use http::request::Builder as HttpRequestBuilder;
use http::HeaderMap;
use http::HeaderValue;
use http::Request;
use http::Response;
use http_body_util::BodyExt;
use http_body_util::Full;

use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::Error as HyperError;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Builder as HttpClientBuilder;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::timeout;

use tracing::debug;
use tracing::span;
use tracing::trace;
use tracing::warn;
use tracing::Level;
use tracing_futures::Instrument;

use url::Url;

use crate::api::page::Page;
use crate::api::page::Paginated;
use crate::api_info::ApiInfo;
use crate::auth::cache::TokenCache;
use crate::auth::responder::ChallengeResponder;
use crate::auth::responder::StdinResponder;
use crate::auth::workflow::WorkflowConfig;
use crate::auth::Session;
use crate::endpoint::Endpoint;
use crate::error::RequestError;
use crate::Error;

/// The `User-Agent` we identify as.
const USER_AGENT_VALUE: &str = concat!("robinhood-rs/", env!("CARGO_PKG_VERSION"));
/// The default timeout for a single request, including retrieval of
/// the response body.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(16);


/// A type providing a debug representation of HTTP headers, with
/// sensitive data being masked out.
struct DebugHeaders<'h> {
  headers: &'h HeaderMap<HeaderValue>,
}

impl Debug for DebugHeaders<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    static MASKED: HeaderValue = HeaderValue::from_static("<masked>");

    f.debug_map()
      .entries(self.headers.iter().map(|(k, v)| {
        if k == AUTHORIZATION {
          (k, &MASKED)
        } else {
          (k, v)
        }
      }))
      .finish()
  }
}


/// A type providing a debug representation of an HTTP request, with
/// sensitive data being masked out.
struct DebugRequest<'r> {
  request: &'r Request<Full<Bytes>>,
  /// Whether the body contains credentials.
  mask_body: bool,
}

impl Debug for DebugRequest<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    // Note that we do not print URL and method, because we assume they
    // are already included as identifiers in the span of the usage
    // site.
    let mut debug = f.debug_struct("Request");
    let _ = debug.field("version", &self.request.version()).field(
      "headers",
      &DebugHeaders {
        headers: self.request.headers(),
      },
    );

    if self.mask_body {
      let _ = debug.field("body", &"<masked>");
    } else {
      let _ = debug.field("body", self.request.body());
    }
    debug.finish()
  }
}


/// A builder for creating customized `Client` objects.
#[derive(Debug)]
pub struct Builder {
  builder: HttpClientBuilder,
  timeout: Duration,
  workflow: WorkflowConfig,
  responder: Arc<dyn ChallengeResponder>,
  cache_tokens: bool,
}

impl Builder {
  /// Adjust the maximum number of idle connections per host.
  #[inline]
  pub fn max_idle_per_host(&mut self, max_idle: usize) -> &mut Self {
    let _ = self.builder.pool_max_idle_per_host(max_idle);
    self
  }

  /// Adjust the timeout for individual requests.
  #[inline]
  pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
    self.timeout = timeout;
    self
  }

  /// Adjust the timing of the device verification workflow.
  #[inline]
  pub fn workflow(&mut self, workflow: WorkflowConfig) -> &mut Self {
    self.workflow = workflow;
    self
  }

  /// Set the source of verification codes requested during login.
  ///
  /// By default codes are read from standard input.
  #[inline]
  pub fn responder<R>(&mut self, responder: R) -> &mut Self
  where
    R: ChallengeResponder + 'static,
  {
    self.responder = Arc::new(responder);
    self
  }

  /// Set whether to cache tokens at the default location
  /// (`~/.robinhood/login.token`) if the `ApiInfo` does not name a
  /// cache file.
  #[inline]
  pub fn cache_tokens(&mut self, cache: bool) -> &mut Self {
    self.cache_tokens = cache;
    self
  }

  /// Build the final `Client` object.
  pub fn build(&self, api_info: ApiInfo) -> Client {
    let https = HttpsConnector::new();
    let client = self.builder.build(https);
    let cache = api_info
      .token_cache
      .clone()
      .or_else(|| {
        if self.cache_tokens {
          TokenCache::default_path()
        } else {
          None
        }
      })
      .map(|path| TokenCache::new(path, &api_info.username, &api_info.password));

    Client {
      api_info,
      client,
      timeout: self.timeout,
      workflow: self.workflow,
      responder: Arc::clone(&self.responder),
      cache,
      session: Mutex::new(None),
      refresh_lock: AsyncMutex::new(()),
    }
  }
}

impl Default for Builder {
  #[cfg(test)]
  fn default() -> Self {
    // Tests run against short lived mock servers; keeping idle
    // connections around only keeps spawned tasks alive past the
    // server. They also must never touch the user's real token cache.
    let mut builder = HttpClient::builder(TokioExecutor::new());
    let _ = builder.pool_max_idle_per_host(0);

    Self {
      builder,
      timeout: DEFAULT_TIMEOUT,
      workflow: WorkflowConfig::default(),
      responder: Arc::new(StdinResponder),
      cache_tokens: false,
    }
  }

  #[cfg(not(test))]
  #[inline]
  fn default() -> Self {
    Self {
      builder: HttpClient::builder(TokioExecutor::new()),
      timeout: DEFAULT_TIMEOUT,
      workflow: WorkflowConfig::default(),
      responder: Arc::new(StdinResponder),
      cache_tokens: true,
    }
  }
}


/// A `Client` is the entity used by clients of this module for
/// interacting with the Robinhood API.
///
/// It owns the session: after a successful [`login`][Client::login]
/// every request to an authenticated endpoint carries the session's
/// bearer token, and a token about to expire is refreshed
/// transparently before it is used.
#[derive(Debug)]
pub struct Client {
  api_info: ApiInfo,
  client: HttpClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
  timeout: Duration,
  workflow: WorkflowConfig,
  responder: Arc<dyn ChallengeResponder>,
  cache: Option<TokenCache>,
  session: Mutex<Option<Session>>,
  /// A lock serializing token refreshes.
  pub(crate) refresh_lock: AsyncMutex<()>,
}

impl Client {
  /// Instantiate a new `Builder` which allows for creating a customized `Client`.
  #[inline]
  pub fn builder() -> Builder {
    Builder::default()
  }

  /// Create a new `Client` using the given API information.
  #[inline]
  pub fn new(api_info: ApiInfo) -> Self {
    Builder::default().build(api_info)
  }

  /// Add "gzip" as an accepted encoding to the request.
  #[cfg(feature = "gzip")]
  fn maybe_add_gzip_header(request: &mut Request<Full<Bytes>>) {
    use http::header::ACCEPT_ENCODING;

    let _ = request
      .headers_mut()
      .insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
  }

  /// An implementation stub not actually doing anything.
  #[cfg(not(feature = "gzip"))]
  fn maybe_add_gzip_header(_request: &mut Request<Full<Bytes>>) {}

  /// Create a `Request` to the endpoint.
  fn request<R>(
    &self,
    input: &R::Input,
    token: Option<&str>,
  ) -> Result<Request<Full<Bytes>>, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    let mut url = match R::base_url() {
      Some(url) => Url::parse(url.as_ref()).map_err(|err| RequestError::Request(err.into()))?,
      None => self.api_info.api_base_url.clone(),
    };

    url.set_path(&R::path(input));
    let query = R::query(input).map_err(RequestError::Request)?;
    url.set_query(query.as_deref().filter(|query| !query.is_empty()));

    let mut builder = HttpRequestBuilder::new()
      .method(R::method())
      .uri(url.as_str())
      .header(ACCEPT, "application/json")
      .header(USER_AGENT, USER_AGENT_VALUE);

    if let Some(token) = token {
      builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match R::body(input).map_err(RequestError::Request)? {
      Some(body) => {
        builder = builder.header(CONTENT_TYPE, body.content_type());
        body.into_bytes()
      },
      None => Bytes::new(),
    };

    let mut request = builder.body(Full::new(body))?;
    Self::maybe_add_gzip_header(&mut request);
    Ok(request)
  }

  async fn retrieve_raw_body(response: Incoming) -> Result<Bytes, HyperError> {
    // We unconditionally wait for the full body to be received
    // before even evaluating the header. All responses of interest
    // are small JSON documents.
    let bytes = BodyExt::collect(response).await?.to_bytes();
    Ok(bytes)
  }

  /// Retrieve the HTTP body, possible uncompressing it if it was gzip
  /// encoded.
  #[cfg(feature = "gzip")]
  async fn retrieve_body<E>(response: Response<Incoming>) -> Result<Bytes, RequestError<E>> {
    use async_compression::futures::bufread::GzipDecoder;
    use futures::AsyncReadExt as _;
    use http::header::CONTENT_ENCODING;

    let (parts, body) = response.into_parts();
    let encoding = parts.headers.get(CONTENT_ENCODING);

    let bytes = Self::retrieve_raw_body(body).await?;
    let bytes = match encoding {
      Some(value) if value == HeaderValue::from_static("gzip") => {
        let mut buffer = Vec::new();
        let _count = GzipDecoder::new(&*bytes).read_to_end(&mut buffer).await?;
        buffer.into()
      },
      _ => bytes,
    };

    Ok(bytes)
  }

  /// Retrieve the HTTP body.
  #[cfg(not(feature = "gzip"))]
  async fn retrieve_body<E>(response: Response<Incoming>) -> Result<Bytes, RequestError<E>> {
    let bytes = Self::retrieve_raw_body(response.into_body()).await?;
    Ok(bytes)
  }

  /// Create and issue a request and decode the response.
  ///
  /// Requests to authenticated endpoints require an active session. If
  /// the session's token is about to expire it is refreshed first.
  pub async fn issue<R>(&self, input: &R::Input) -> Result<R::Output, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    let token = if R::authenticated() {
      let token = self.access_token().await.map_err(|err| match err {
        Error::NotAuthenticated => RequestError::NotAuthenticated,
        err => RequestError::Session(Box::new(err)),
      })?;
      Some(token)
    } else {
      None
    };

    self.issue_with::<R>(input, token.as_deref()).await
  }

  /// Issue a request to a paginated endpoint, following the cursors of
  /// all subsequent pages and concatenating their results.
  pub async fn issue_all<R, T>(&self, input: &R::Input) -> Result<Vec<T>, RequestError<R::Error>>
  where
    R: Endpoint<Output = Page<T>>,
    R::Input: Paginated,
  {
    let mut page = self.issue::<R>(input).await?;
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    loop {
      let cursor = page.next_cursor();
      items.append(&mut page.results);

      match cursor {
        Some(cursor) if !seen.insert(cursor.clone()) => {
          warn!(cursor = %cursor, "pagination cursor repeated; stopping");
          break Ok(items)
        },
        Some(cursor) => {
          debug!(items = items.len(), "retrieving next page");
          let next = input.with_cursor(cursor);
          page = self.issue::<R>(&next).await?;
        },
        None => break Ok(items),
      }
    }
  }

  /// Issue a request using the provided bearer token, if any.
  pub(crate) async fn issue_with<R>(
    &self,
    input: &R::Input,
    token: Option<&str>,
  ) -> Result<R::Output, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    let request = self.request::<R>(input, token)?;
    let span = span!(
      Level::INFO,
      "issue",
      method = %request.method(),
      uri = %request.uri()
    );
    self.issue_::<R>(request).instrument(span).await
  }

  /// Issue a request.
  #[allow(clippy::cognitive_complexity)]
  async fn issue_<R>(
    &self,
    request: Request<Full<Bytes>>,
  ) -> Result<R::Output, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    debug!("requesting");
    trace!(
      request = ?DebugRequest {
        request: &request,
        mask_body: R::sensitive(),
      }
    );

    let exchange = async {
      let response = self.client.request(request).await?;
      let status = response.status();
      debug!(status = ?status);

      let bytes = Self::retrieve_body::<R::Error>(response).await?;
      Ok::<_, RequestError<R::Error>>((status, bytes))
    };

    let (status, bytes) = timeout(self.timeout, exchange)
      .await
      .map_err(|_| RequestError::TimedOut)??;

    let body = bytes.as_ref();
    if R::sensitive() {
      trace!(body = "<masked>");
    } else {
      match from_utf8(body) {
        Ok(s) => trace!(body = %s),
        Err(_) => trace!(body = ?body),
      }
    }

    R::evaluate(status, body).map_err(RequestError::Endpoint)
  }

  fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
    self.session.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Retrieve a copy of the current session, if any.
  #[inline]
  pub fn session(&self) -> Option<Session> {
    self.lock_session().clone()
  }

  /// Install a session, e.g., one persisted by other means.
  #[inline]
  pub fn set_session(&self, session: Session) {
    *self.lock_session() = Some(session);
  }

  /// Remove the current session, returning it.
  #[inline]
  pub(crate) fn take_session(&self) -> Option<Session> {
    self.lock_session().take()
  }

  /// Check whether the client has an active session.
  #[inline]
  pub fn is_authenticated(&self) -> bool {
    self.lock_session().is_some()
  }

  /// Retrieve the `ApiInfo` object used by this `Client` instance.
  #[inline]
  pub fn api_info(&self) -> &ApiInfo {
    &self.api_info
  }

  /// Retrieve the token cache, if one is configured.
  #[inline]
  pub fn token_cache(&self) -> Option<&TokenCache> {
    self.cache.as_ref()
  }

  #[inline]
  pub(crate) fn workflow_config(&self) -> &WorkflowConfig {
    &self.workflow
  }

  #[inline]
  pub(crate) fn responder(&self) -> &dyn ChallengeResponder {
    &*self.responder
  }
}
