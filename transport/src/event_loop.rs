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

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use cirrus_core::{Error, Result};
use log::{debug, warn};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot;

/// How long a graceful shutdown waits for the runtime's own tasks after
/// all calls have drained.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A pool of event-loop threads that runs every call of the clients
/// created from it.
///
/// The group must be shut down explicitly with
/// [`EventLoopGroup::shutdown_gracefully`] or [`EventLoopGroup::shutdown`].
/// A group dropped without shutdown is stopped in the background and
/// its in-flight calls are cancelled.
pub struct EventLoopGroup {
    runtime: Option<Runtime>,
    state: Arc<GroupState>,
}

impl Debug for EventLoopGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoopGroup")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EventLoopGroup {
    /// Start a group with `worker_threads` threads, `0` for one per core.
    pub fn new(worker_threads: usize) -> Result<Self> {
        let worker_threads = match worker_threads {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("cirrus-event-loop")
            .enable_all()
            .build()
            .map_err(|e| {
                Error::transport("failed to start event loop group")
                    .with_source(e)
                    .with_context(format!("worker_threads: {worker_threads}"))
            })?;
        debug!("event loop group started with {worker_threads} threads");

        Ok(Self {
            runtime: Some(runtime),
            state: Arc::new(GroupState::default()),
        })
    }

    /// Handle used by clients to run calls on this group.
    pub fn handle(&self) -> Result<EventLoopHandle> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| Error::transport("event loop group is shut down"))?;

        Ok(EventLoopHandle {
            runtime: runtime.handle().clone(),
            state: self.state.clone(),
        })
    }

    /// Whether the group still accepts new calls.
    pub fn is_open(&self) -> bool {
        !self.state.lock().closed
    }

    /// Shut the group down and call `callback` once done.
    ///
    /// New calls are refused immediately. The group then waits for every
    /// in-flight call to finish, stops its threads, and finally invokes
    /// `callback` on a helper thread.
    pub fn shutdown_gracefully<F>(mut self, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.state.close();
        let runtime = self.runtime.take();
        let state = self.state.clone();

        let spawned = std::thread::Builder::new()
            .name("cirrus-shutdown".to_string())
            .spawn(move || {
                state.wait_drained();
                if let Some(runtime) = runtime {
                    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
                }
                debug!("event loop group shut down");
                callback(Ok(()));
            });

        if let Err(err) = spawned {
            warn!("failed to spawn shutdown thread, in-flight calls are cancelled: {err}");
        }
    }

    /// Shut the group down and wait for it to finish.
    ///
    /// Must not be awaited from a task running on this group.
    pub async fn shutdown(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.shutdown_gracefully(move |res| {
            let _ = tx.send(res);
        });

        rx.await
            .map_err(|_| Error::transport("event loop group shutdown did not complete"))?
    }
}

impl Drop for EventLoopGroup {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            self.state.close();
            runtime.shutdown_background();
            debug!("event loop group dropped without shutdown");
        }
    }
}

/// A cloneable handle that runs calls on an [`EventLoopGroup`].
#[derive(Clone, Debug)]
pub struct EventLoopHandle {
    runtime: Handle,
    state: Arc<GroupState>,
}

impl EventLoopHandle {
    /// Run `fut` on the group.
    ///
    /// Returns a `Transport` error if the group has been shut down.
    pub fn spawn<F>(&self, fut: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.state.enter()?;
        self.runtime.spawn(async move {
            let _guard = guard;
            fut.await
        });
        Ok(())
    }

    /// Number of calls currently running on the group.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }
}

#[derive(Debug, Default)]
struct GroupState {
    counters: Mutex<Counters>,
    drained: Condvar,
}

#[derive(Debug, Default)]
struct Counters {
    closed: bool,
    in_flight: usize,
}

impl GroupState {
    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.counters.lock().expect("lock poisoned")
    }

    fn enter(self: &Arc<Self>) -> Result<InFlight> {
        let mut counters = self.lock();
        if counters.closed {
            return Err(Error::transport("event loop group is shut down"));
        }
        counters.in_flight += 1;
        Ok(InFlight {
            state: self.clone(),
        })
    }

    fn close(&self) {
        self.lock().closed = true;
    }

    fn wait_drained(&self) {
        let counters = self.lock();
        let _counters = self
            .drained
            .wait_while(counters, |c| c.in_flight > 0)
            .expect("lock poisoned");
    }
}

/// Marks one call in flight until dropped.
struct InFlight {
    state: Arc<GroupState>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut counters = self.state.lock();
        counters.in_flight -= 1;
        if counters.in_flight == 0 {
            self.state.drained.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::ErrorKind;

    #[tokio::test]
    async fn test_spawn_runs_on_group() {
        let group = EventLoopGroup::new(1).expect("group must start");
        let handle = group.handle().expect("group is open");

        let (tx, rx) = oneshot::channel();
        handle
            .spawn(async move {
                let _ = tx.send(std::thread::current().name().map(str::to_string));
            })
            .expect("spawn must succeed");

        let name = rx.await.expect("task must run");
        assert_eq!(name.as_deref(), Some("cirrus-event-loop"));
        group.shutdown().await.expect("shutdown must succeed");
    }

    #[tokio::test]
    async fn test_spawn_after_shutdown_fails() {
        let group = EventLoopGroup::new(1).expect("group must start");
        let handle = group.handle().expect("group is open");
        group.shutdown().await.expect("shutdown must succeed");

        let err = handle.spawn(async {}).expect_err("group is closed");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_shutdown_drains_in_flight_work() {
        let group = EventLoopGroup::new(2).expect("group must start");
        let handle = group.handle().expect("group is open");

        let (tx, rx) = oneshot::channel();
        handle
            .spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let _ = tx.send(());
            })
            .expect("spawn must succeed");
        assert_eq!(handle.in_flight(), 1);

        group.shutdown().await.expect("shutdown must succeed");
        assert_eq!(handle.in_flight(), 0);
        rx.await.expect("in-flight work must finish before shutdown");
    }

    #[test]
    fn test_shutdown_gracefully_invokes_callback() {
        let group = EventLoopGroup::new(0).expect("group must start");
        assert!(group.is_open());

        let (tx, rx) = std::sync::mpsc::channel();
        group.shutdown_gracefully(move |res| {
            let _ = tx.send(res.is_ok());
        });

        let ok = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("callback must be invoked");
        assert!(ok);
    }

    #[tokio::test]
    async fn test_drop_without_shutdown() {
        let group = EventLoopGroup::new(1).expect("group must start");
        let handle = group.handle().expect("group is open");
        drop(group);

        let err = handle.spawn(async {}).expect_err("group is closed");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
