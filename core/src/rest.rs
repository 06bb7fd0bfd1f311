// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Building blocks for the HTTP layer of the services.
//!
//! Each service exposes an `app` function that assembles its `Router`, and each API lives in a
//! file of its own named after the resource and the method it handles, such as
//! `bookings_post.rs`.  The tests of an API sit next to its handler and obtain the method and
//! path under test from a local `route` function so that they cannot accidentally exercise a
//! different API.
//!
//! Failed requests are answered with an `ErrorResponse` JSON document whose status code is
//! derived from the `RestError` variant.  Rejections produced by axum's own extractors (bad
//! paths, bad JSON) keep axum's plain text bodies.

use crate::driver::DriverError;
use crate::model::ModelError;
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::http::header::AsHeaderName;
use axum::http::{self, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Errors reported to the clients of the REST APIs.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// The request clashes with existing data, like a second review for the same booking.
    #[error("{0}")]
    Conflict(String),

    /// The caller is known but is not allowed to do what it asked for.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Something went wrong on our side or in a service we depend on.
    #[error("{0}")]
    InternalError(String),

    /// The request is malformed or violates a business rule.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request refers to an entity that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request carried a body where none was expected.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// The caller could not be identified.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl RestError {
    /// Returns the HTTP status code that represents this error.
    fn status(&self) -> http::StatusCode {
        match self {
            RestError::Conflict(_) => http::StatusCode::CONFLICT,
            RestError::Forbidden(_) => http::StatusCode::FORBIDDEN,
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
            RestError::Unauthorized(_) => http::StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        let message = e.to_string();
        match e {
            DriverError::AlreadyExists(_) => RestError::Conflict(message),
            DriverError::BackendError(_) => RestError::InternalError(message),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(message),
            DriverError::NotFound(_) => RestError::NotFound(message),
            DriverError::Unauthorized(_) => RestError::Forbidden(message),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(e: serde_json::Error) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { message: self.to_string() })).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// JSON document sent back to the client when a request fails.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Human-readable description of the failure.
    pub(crate) message: String,
}

/// Response for APIs that create a new entity: a 201 status code with the JSON representation of
/// the entity.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (http::StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Extractor for APIs that do not take a request body.
///
/// Rejecting unexpected content lets these APIs grow a body in the future without older clients
/// silently sending data that used to be ignored.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if !req.into_body().is_end_stream() {
            return Err(RestError::PayloadNotEmpty);
        }
        Ok(EmptyBody {})
    }
}

/// Gets the value of the header `name` from `headers`, failing if the header is repeated.
pub fn get_unique_header<K: AsHeaderName + Copy>(
    headers: &HeaderMap,
    name: K,
) -> RestResult<Option<&HeaderValue>> {
    let mut values = headers.get_all(name).iter();
    match (values.next(), values.next()) {
        (value, None) => Ok(value),
        (_, Some(_)) => Err(RestError::InvalidRequest(format!(
            "Header {} cannot have more than one value",
            name.as_str()
        ))),
    }
}

/// Same as `get_unique_header` but also requires the value to be printable ASCII.
pub fn get_unique_header_str<K: AsHeaderName + Copy>(
    headers: &HeaderMap,
    name: K,
) -> RestResult<Option<&str>> {
    match get_unique_header(headers, name)? {
        Some(value) => match value.to_str() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(RestError::InvalidRequest(format!(
                "Header {} must only contain printable ASCII characters",
                name.as_str()
            ))),
        },
        None => Ok(None),
    }
}

/// Helpers to exercise a `Router` in tests without starting a server.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderName;
    use axum::Router;
    use bytes::Bytes;
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Largest response body that the checkers are willing to read.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a request that is sent to the router exactly once.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router that will process the request.
        app: Router,

        /// The request being assembled.
        builder: http::request::Builder,
    }

    impl OneShotBuilder {
        /// Starts a request to the `method`/`uri` pair served by `app`.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Appends `query`, serialized as a URL-encoded form, to the URI of the request.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            let uri = self.builder.uri_ref().expect("URI set at construction time").to_string();
            assert!(!uri.contains('?'), "URI already has a query: {}", uri);
            assert!(!uri.contains('#'), "URI has a fragment: {}", uri);
            let query = serde_urlencoded::to_string(query).expect("Query must be a flat map");
            self.builder = self.builder.uri(format!("{}?{}", uri, query));
            self
        }

        /// Adds the header `name` with `value` to the request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Sends the request with `body` labeled as `content_type`, if any.
        async fn send(self, content_type: Option<&str>, body: Body) -> ResponseChecker {
            let mut builder = self.builder;
            if let Some(content_type) = content_type {
                builder = builder.header(http::header::CONTENT_TYPE, content_type);
            }
            let request = builder.body(body).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Sends the request without a body.
        pub async fn send_empty(self) -> ResponseChecker {
            self.send(None, Body::empty()).await
        }

        /// Sends the request with an opaque binary body.
        pub async fn send_bytes(self, bytes: Bytes) -> ResponseChecker {
            self.send(Some(mime::APPLICATION_OCTET_STREAM.as_ref()), Body::from(bytes)).await
        }

        /// Sends the request with a plain text body.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            self.send(Some(mime::TEXT_PLAIN.as_ref()), Body::from(text.into())).await
        }

        /// Sends the request with `request` serialized as JSON.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let body = serde_json::to_vec(&request).unwrap();
            self.send(Some(mime::APPLICATION_JSON.as_ref()), Body::from(body)).await
        }
    }

    /// Response produced by the router for a `OneShotBuilder`.
    type HttpResponse = hyper::Response<Body>;

    /// Assertions on the response to a `OneShotBuilder` request.
    ///
    /// Every `expect_*` method that consumes the checker first validates the status code, which
    /// defaults to 200 unless changed with `expect_status`.
    #[must_use]
    pub struct ResponseChecker {
        /// The response under inspection.
        response: HttpResponse,

        /// Status code that the response must carry.
        exp_status: http::StatusCode,
    }

    impl From<HttpResponse> for ResponseChecker {
        fn from(response: HttpResponse) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Requires the response to carry `status` instead of 200.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Checks the status code and reads the whole body.
        async fn into_body(self) -> Bytes {
            assert_eq!(self.exp_status, self.response.status());
            axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap()
        }

        /// Checks the status code and reads the whole body as text.
        async fn into_text(self) -> String {
            String::from_utf8(self.into_body().await.to_vec()).unwrap()
        }

        /// Expects the response to have no body.
        pub async fn expect_empty(self) {
            let body = self.into_text().await;
            assert!(body.is_empty(), "Expected an empty body but got {}", body);
        }

        /// Expects the body to be an `ErrorResponse` whose message matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Errors always carry a message");

            let body = self.into_text().await;
            let response: ErrorResponse = match serde_json::from_str(&body) {
                Ok(response) => response,
                Err(e) => panic!("Body is not an ErrorResponse ({}): {}", e, body),
            };
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&response.message),
                "Error message '{}' does not match '{}'",
                response.message,
                exp_re
            );
        }

        /// Expects the body to be the JSON representation of a `T` and returns it.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            let body = self.into_body().await;
            match serde_json::from_slice::<T>(&body) {
                Ok(value) => value,
                Err(e) => panic!("Cannot parse body ({}): {}", e, String::from_utf8_lossy(&body)),
            }
        }

        /// Expects the body to be plain text, as produced by axum's rejections, that matches
        /// `exp_re`.
        pub async fn expect_text(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Use expect_empty to check for empty bodies");

            let body = self.into_text().await;
            assert!(
                serde_json::from_str::<ErrorResponse>(&body).is_err(),
                "Use expect_error to check ErrorResponse bodies"
            );
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "Body '{}' does not match '{}'", body, exp_re);
        }
    }

    /// Generates a test to verify that an API that expects JSON fails when it gets something else.
    ///
    /// Headers to add to the requests, such as those identifying the caller, can be given after
    /// the route as `; name => value` pairs.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr $(, $query:expr)? $(; $name:expr => $value:expr)* ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    $( .with_header($name, $value) )*
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_text("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    $( .with_header($name, $value) )*
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_text("expected ident")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Generates a test to verify that an API that does not expect a payload rejects one.
    ///
    /// Accepts the same extra headers as `test_payload_must_be_json`.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr $(, $query:expr)? $(; $name:expr => $value:expr)* ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    $( .with_header($name, $value) )*
                    .send_text("should not be here")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}
