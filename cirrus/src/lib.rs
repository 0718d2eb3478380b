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

//! Sign AWS API requests with SigV4 and send them without effort.
//!
//! cirrus ties three pieces together:
//!
//! - [`cirrus_core`]: errors, the credential and signing traits, and the
//!   [`Signer`] that refreshes credentials on demand.
//! - [`aws`]: the SigV4 request signer and credential providers.
//! - [`transport`]: an HTTP/1.1 client running on an explicitly owned
//!   [`EventLoopGroup`].
//!
//! ```no_run
//! use cirrus::{Client, Config, EventLoopGroup, ImdsCredentialProvider};
//! use http::Method;
//!
//! # async fn example() -> cirrus::Result<()> {
//! let group = EventLoopGroup::new(0)?;
//! let client = Client::new(Config::new("s3"), &group, ImdsCredentialProvider::new())?;
//!
//! let url = client
//!     .signed_url(Method::GET, "https://examplebucket.s3.amazonaws.com/test.txt".parse()?)
//!     .await?;
//! println!("{url}");
//!
//! group.shutdown().await
//! # }
//! ```

pub use cirrus_core::*;

/// AWS SigV4 signing.
pub mod aws {
    pub use cirrus_aws_v4::*;
}

/// HTTP transport.
pub mod transport {
    pub use cirrus_transport::*;
}

pub use cirrus_aws_v4::{Credential, ImdsCredentialProvider, RequestSigner, StaticCredentialProvider};
pub use cirrus_transport::{EventLoopGroup, InboundResponse, OutboundRequest, PendingResponse};

mod body;
pub use body::Body;

mod client;
pub use client::Client;

mod config;
pub use config::{Config, MAX_PRESIGN_EXPIRES};
