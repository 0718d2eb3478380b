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

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use cirrus_core::{Error, Result};
use tokio::sync::oneshot;

use crate::InboundResponse;

/// Create a connected promise and pending result.
pub fn channel<T>() -> (Promise<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Promise { tx: Some(tx) }, Pending { rx })
}

/// Write side of a single-fulfillment result.
///
/// # Panics
///
/// Fulfilling a promise twice is a programming error and panics.
#[derive(Debug)]
pub struct Promise<T> {
    tx: Option<oneshot::Sender<Result<T>>>,
}

impl<T> Promise<T> {
    /// Fulfill with a value.
    pub fn succeed(&mut self, value: T) {
        self.complete(Ok(value))
    }

    /// Fulfill with a failure.
    pub fn fail(&mut self, err: Error) {
        self.complete(Err(err))
    }

    /// Fulfill with the given result.
    pub fn complete(&mut self, result: Result<T>) {
        let Some(tx) = self.tx.take() else {
            panic!("promise fulfilled twice");
        };
        // The receiver may be gone if the caller stopped waiting.
        let _ = tx.send(result);
    }

    /// Whether the promise has been fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        self.tx.is_none()
    }
}

/// Read side of a single-fulfillment result.
///
/// A promise dropped without being fulfilled resolves to a
/// [`Transport`](cirrus_core::ErrorKind::Transport) error.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(res) => res,
            Err(_) => Err(Error::transport(
                "request was dropped before it completed",
            )),
        })
    }
}

/// Pending result of one HTTP call.
pub type PendingResponse = Pending<InboundResponse>;
