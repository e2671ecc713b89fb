//! Dedicated thread that owns a [`Dispatcher`].
//!
//! Shell handlers are thread-affine (COM apartments on Windows) and the
//! handler registry has no locking, so every call is funneled to one OS thread.
//! Async callers submit calls over a channel and await a one-shot reply.

use crate::config::{DispatcherOptions, LauncherConfig};
use crate::dispatcher::Dispatcher;
use crate::error::{LauncherError, Result};
use crate::outcome::MethodOutcome;
use crate::platform::ShellBackend;
use serde_json::Value;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

struct Call {
    method: String,
    params: Value,
    reply: oneshot::Sender<MethodOutcome>,
}

/// Handle to the dispatcher thread.
pub struct DispatcherWorker {
    sender: mpsc::UnboundedSender<Call>,
    thread: JoinHandle<()>,
}

impl DispatcherWorker {
    /// Start the worker. `make_backend` runs on the worker thread, so any
    /// per-thread OS initialization happens there.
    pub async fn spawn<B, F>(make_backend: F, options: DispatcherOptions) -> Result<Self>
    where
        B: ShellBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Call>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        let thread = std::thread::Builder::new()
            .name(LauncherConfig::WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let backend = match make_backend() {
                    Ok(backend) => backend,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let mut dispatcher = Dispatcher::with_options(backend, options);
                let _ = ready_tx.send(Ok(()));
                info!(
                    "Shell dispatcher started (strict application match: {})",
                    options.strict_application_match
                );

                while let Some(call) = receiver.blocking_recv() {
                    let outcome = dispatcher.dispatch(&call.method, &call.params);
                    if call.reply.send(outcome).is_err() {
                        debug!("Caller dropped before {} completed", call.method);
                    }
                }
                debug!("Shell dispatcher stopped");
            })
            .map_err(|e| LauncherError::Io {
                message: format!("spawn dispatcher thread: {}", e),
                path: None,
                source: Some(e),
            })?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { sender, thread }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LauncherError::Other(
                "Dispatcher thread exited during startup".to_string(),
            )),
        }
    }

    /// Start a worker on this platform's native shell.
    #[cfg(any(windows, unix))]
    pub async fn spawn_native(options: DispatcherOptions) -> Result<Self> {
        Self::spawn(crate::platform::NativeShell::new, options).await
    }

    /// Dispatch one call on the worker thread and wait for its outcome.
    pub async fn call(&self, method: &str, params: Value) -> MethodOutcome {
        let (reply, response) = oneshot::channel();
        let call = Call {
            method: method.to_string(),
            params,
            reply,
        };
        if self.sender.send(call).is_err() {
            return worker_stopped();
        }
        response.await.unwrap_or_else(|_| worker_stopped())
    }

    /// Stop accepting calls and wait for the thread to release its handlers.
    pub fn shutdown(self) {
        let Self { sender, thread } = self;
        drop(sender);
        if thread.join().is_err() {
            debug!("Shell dispatcher thread panicked");
        }
    }
}

fn worker_stopped() -> MethodOutcome {
    LauncherError::Other("Shell dispatcher is not running".to_string()).into()
}
