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

use std::time::Duration;

use cirrus_core::{Error, Result};
use cirrus_transport::DEFAULT_USER_AGENT;

/// Longest validity a presigned url may have.
pub const MAX_PRESIGN_EXPIRES: Duration = Duration::from_secs(7 * 24 * 3600);

/// Config for [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct Config {
    /// Region to sign for, `us-east-1` by default.
    pub region: String,
    /// Service to sign for, for example `s3` or `iam`.
    pub service: String,
    /// Connect timeout of every call, 5 seconds by default.
    pub connect_timeout: Duration,
    /// `User-Agent` sent with every call.
    pub user_agent: String,
    /// Validity of urls built by [`Client::signed_url`](crate::Client::signed_url),
    /// 24 hours by default.
    pub presign_expires: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            service: String::new(),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            presign_expires: Duration::from_secs(86400),
        }
    }
}

impl Config {
    /// Create a config for `service` with everything else left default.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Default::default()
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Check that the config can sign requests.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        if self.service.trim().is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        check_presign_expires(self.presign_expires).map_err(|err| {
            Error::config_invalid("presign_expires is out of range").with_source(err)
        })
    }
}

pub(crate) fn check_presign_expires(expires: Duration) -> Result<()> {
    if expires.as_secs() == 0 || expires > MAX_PRESIGN_EXPIRES {
        return Err(Error::request_invalid(
            "presigned url expiry must be between 1 second and 7 days",
        )
        .with_context(format!("expires: {}s", expires.as_secs())));
    }
    Ok(())
}
