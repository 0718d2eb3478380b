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

use cirrus_core::time::{now, DateTime};
use cirrus_core::utils::Redact;
use cirrus_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credentials within this many seconds of their expiration are refreshed.
const EXPIRATION_MARGIN_SECS: i64 = 120;

/// Credential that holds the access_key and secret_key.
///
/// A credential is an immutable value: refreshing produces a new one that
/// replaces the old one wholesale.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expiration: Option<DateTime>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl Credential {
    /// Create a long lived credential from an access key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    /// Attach a session token, as issued with temporary credentials.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set the time after which this credential is no longer accepted.
    pub fn with_expiration(mut self, expiration: DateTime) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Access key id for aws services.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key for aws services.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Session token for aws services.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Expiration time for this credential.
    pub fn expiration(&self) -> Option<DateTime> {
        self.expiration
    }

    /// Both keys are unset.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_empty() && self.secret_access_key.is_empty()
    }

    /// The credential expires within the next 120 seconds, or already has.
    ///
    /// Credentials without an expiration never expire.
    pub fn near_expiration(&self) -> bool {
        self.expiration
            .is_some_and(|t| now() + chrono::TimeDelta::seconds(EXPIRATION_MARGIN_SECS) >= t)
    }
}

impl SigningCredential for Credential {
    /// Both keys are set and the credential is not about to expire.
    ///
    /// A credential with only one key is never valid.
    fn is_valid(&self) -> bool {
        !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.near_expiration()
    }
}
