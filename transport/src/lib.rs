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

//! HTTP/1.1 transport for cirrus.
//!
//! Every call opens its own connection on an [`EventLoopGroup`], streams
//! the response through a small parse state machine and resolves a
//! [`PendingResponse`] exactly once.
//!
//! ```no_run
//! use bytes::Bytes;
//! use cirrus_transport::{EventLoopGroup, HttpClient};
//!
//! # async fn example() -> cirrus_core::Result<()> {
//! let group = EventLoopGroup::new(0)?;
//! let client = HttpClient::new(&group)?;
//!
//! let req = http::Request::get("https://s3.amazonaws.com/").body(Bytes::new())?;
//! let resp = client.call(req).await?;
//! println!("{} {:?}", resp.status(), resp.content_type());
//!
//! group.shutdown().await
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod client;
pub use client::{HttpClient, HttpClientBuilder, OutboundRequest, DEFAULT_USER_AGENT};

mod event_loop;
pub use event_loop::{EventLoopGroup, EventLoopHandle};

mod handler;
pub use handler::{ParseState, ResponseHandler, ResponsePart};

mod promise;
pub use promise::{channel, Pending, PendingResponse, Promise};

mod response;
pub use response::{InboundResponse, ResponseHead};
