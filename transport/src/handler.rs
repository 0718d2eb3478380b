// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::{Bytes, BytesMut};
use cirrus_core::{Error, Result};
use log::trace;

use crate::promise::Promise;
use crate::{InboundResponse, ResponseHead};

/// One event read from the connection.
#[derive(Debug)]
pub enum ResponsePart {
    /// Status line and headers.
    Head(ResponseHead),
    /// A body chunk.
    Body(Bytes),
    /// End of the response.
    End,
}

/// Parse state of one response.
///
/// ```text
///  Ready ──Head──▶ ParsingBody ──Body──▶ ParsingBody
///    ▲                  │
///    └──────End─────────┘
/// ```
///
/// Every other transition is a protocol violation.
#[derive(Debug, Default)]
pub enum ParseState {
    /// Waiting for a response head.
    #[default]
    Ready,
    /// Head received, accumulating body chunks.
    ParsingBody {
        /// The received head.
        head: ResponseHead,
        /// `None` until the first body chunk arrives.
        body: Option<BytesMut>,
    },
}

impl ParseState {
    /// Feed one event into the state machine.
    ///
    /// Returns the complete response once `End` arrives. A violation
    /// returns an error and leaves the state at `Ready`.
    pub fn advance(&mut self, part: ResponsePart) -> Result<Option<InboundResponse>> {
        match (std::mem::take(self), part) {
            (ParseState::Ready, ResponsePart::Head(head)) => {
                *self = ParseState::ParsingBody { head, body: None };
                Ok(None)
            }
            (ParseState::ParsingBody { .. }, ResponsePart::Head(_)) => Err(Error::malformed_head(
                "received a response head while parsing a body",
            )),
            (ParseState::Ready, ResponsePart::Body(_)) => Err(Error::malformed_body(
                "received body bytes before any response head",
            )),
            (ParseState::ParsingBody { head, body }, ResponsePart::Body(chunk)) => {
                let mut body = body.unwrap_or_default();
                body.extend_from_slice(&chunk);
                *self = ParseState::ParsingBody {
                    head,
                    body: Some(body),
                };
                Ok(None)
            }
            (ParseState::Ready, ResponsePart::End) => Err(Error::malformed_head(
                "response ended before any response head",
            )),
            (ParseState::ParsingBody { head, body }, ResponsePart::End) => Ok(Some(
                InboundResponse::new(head, body.map(BytesMut::freeze)),
            )),
        }
    }
}

/// Drives a [`ParseState`] for one call and fulfills its promise.
///
/// Events arriving after the promise is fulfilled are dropped.
#[derive(Debug)]
pub struct ResponseHandler {
    state: ParseState,
    promise: Promise<InboundResponse>,
}

impl ResponseHandler {
    /// Create a handler that fulfills `promise`.
    pub fn new(promise: Promise<InboundResponse>) -> Self {
        Self {
            state: ParseState::Ready,
            promise,
        }
    }

    /// Handle one event read from the connection.
    pub fn handle(&mut self, part: ResponsePart) {
        if self.promise.is_fulfilled() {
            trace!("dropping response event after completion: {part:?}");
            return;
        }

        match &part {
            ResponsePart::Head(head) => trace!("received response head: {}", head.status),
            ResponsePart::Body(chunk) => trace!("received {} body bytes", chunk.len()),
            ResponsePart::End => trace!("received end of response"),
        }

        match self.state.advance(part) {
            Ok(None) => {}
            Ok(Some(resp)) => self.promise.succeed(resp),
            Err(err) => self.promise.fail(err),
        }
    }

    /// Fail the call with an error from the connection.
    pub fn fail(&mut self, err: Error) {
        if self.promise.is_fulfilled() {
            trace!("dropping connection error after completion: {err}");
            return;
        }
        self.state = ParseState::Ready;
        self.promise.fail(err);
    }

    /// Whether the call has been fulfilled.
    pub fn is_complete(&self) -> bool {
        self.promise.is_fulfilled()
    }

    /// Current parse state.
    pub fn state(&self) -> &ParseState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise;
    use cirrus_core::ErrorKind;
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    fn head() -> ResponsePart {
        ResponsePart::Head(ResponseHead::new(StatusCode::OK))
    }

    fn body(v: &'static [u8]) -> ResponsePart {
        ResponsePart::Body(Bytes::from_static(v))
    }

    #[tokio::test]
    async fn test_body_chunks_are_concatenated() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(head());
        handler.handle(body(b"ab"));
        handler.handle(body(b"cd"));
        assert!(!handler.is_complete());
        handler.handle(ResponsePart::End);

        assert!(handler.is_complete());
        assert!(matches!(handler.state(), ParseState::Ready));
        let resp = pending.await.expect("response must complete");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), b"abcd");
    }

    #[tokio::test]
    async fn test_body_before_head_is_malformed_body() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(body(b"ab"));
        // Later events must not panic or refulfill.
        handler.handle(head());
        handler.handle(ResponsePart::End);

        let err = pending.await.expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::MalformedBody);
    }

    #[tokio::test]
    async fn test_second_head_is_malformed_head() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(head());
        handler.handle(head());

        let err = pending.await.expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::MalformedHead);
    }

    #[tokio::test]
    async fn test_end_before_head_is_malformed_head() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(ResponsePart::End);

        let err = pending.await.expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::MalformedHead);
    }

    #[tokio::test]
    async fn test_no_body_frames_yield_absent_body() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(head());
        handler.handle(ResponsePart::End);

        let resp = pending.await.expect("response must complete");
        assert!(!resp.body_received());
    }

    #[tokio::test]
    async fn test_empty_body_frame_yields_empty_body() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(head());
        handler.handle(body(b""));
        handler.handle(ResponsePart::End);

        let resp = pending.await.expect("response must complete");
        assert!(resp.body_received());
        assert!(resp.body().is_empty());
    }

    #[tokio::test]
    async fn test_connection_error_after_completion_is_dropped() {
        let (p, pending) = promise::channel();
        let mut handler = ResponseHandler::new(p);

        handler.handle(head());
        handler.handle(ResponsePart::End);
        handler.fail(Error::transport("connection reset"));
        handler.handle(body(b"late"));

        assert!(pending.await.is_ok());
    }

    #[test]
    fn test_violation_resets_state() {
        let mut state = ParseState::Ready;
        state.advance(head()).expect("head is accepted");
        assert!(matches!(state, ParseState::ParsingBody { body: None, .. }));

        let err = state.advance(head()).expect_err("second head is rejected");
        assert_eq!(err.kind(), ErrorKind::MalformedHead);
        assert!(matches!(state, ParseState::Ready));
    }
}
