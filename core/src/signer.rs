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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential, SigningMethod};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// It keeps the last credential it loaded and only asks the provider for a
/// new one when the held credential is no longer valid. Clones share the
/// same credential slot.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed the signer with a credential so the first signing does not need
    /// a refresh.
    pub fn with_credential(self, credential: K) -> Self {
        *self.credential.lock().expect("lock poisoned") = Some(credential);
        self
    }

    /// Return a valid credential, refreshing it from the provider first if
    /// the held one is missing, empty or about to expire.
    ///
    /// Concurrent callers may refresh at the same time; the last refresh to
    /// finish wins.
    pub async fn credential(&self) -> Result<K> {
        let held = self.credential.lock().expect("lock poisoned").clone();
        if let Some(cred) = held.filter(|c| c.is_valid()) {
            return Ok(cred);
        }

        log::debug!("credential missing or expiring, refreshing from {:?}", self.loader);
        let fresh = self
            .loader
            .provide_credential(&self.ctx)
            .await
            .map_err(|err| {
                log::warn!("credential refresh failed: {err}");
                Error::credential_refresh("failed to refresh credential").with_source(err)
            })?
            .ok_or_else(|| {
                log::warn!("credential provider {:?} returned no credential", self.loader);
                Error::credential_refresh("credential provider returned no credential")
            })?;

        *self.credential.lock().expect("lock poisoned") = Some(fresh.clone());
        Ok(fresh)
    }

    /// Signing request.
    ///
    /// `body` must be the exact bytes that will be sent with the request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        body: &[u8],
        method: SigningMethod,
    ) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, body, Some(&cred), method)
            .await
    }
}
