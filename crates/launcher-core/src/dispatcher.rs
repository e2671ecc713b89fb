//! Shell command dispatcher.
//!
//! Decodes a method call, runs the matching shell operation on the backend and
//! encodes the result. Calls must be serialized; see [`crate::worker`] for
//! the thread that owns a dispatcher in the RPC server.

use crate::config::DispatcherOptions;
use crate::encoding::WideString;
use crate::error::{LauncherError, Result};
use crate::outcome::{AssociatedApplication, MethodOutcome};
use crate::platform::{AssociationHandler, ShellBackend, ShellStatus};
use crate::registry::{HandlerLookup, HandlerRegistry};
use crate::request::{file_extension, ShellRequest};
use serde_json::Value;
use tracing::{debug, warn};

/// Routes method calls to a [`ShellBackend`] and owns the handler registry.
pub struct Dispatcher<B: ShellBackend> {
    // Declared before `backend` so handlers are released while the backend
    // (and on Windows, COM) is still alive.
    registry: HandlerRegistry<B::Handler>,
    backend: B,
    options: DispatcherOptions,
}

impl<B: ShellBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, DispatcherOptions::default())
    }

    pub fn with_options(backend: B, options: DispatcherOptions) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            backend,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &HandlerRegistry<B::Handler> {
        &self.registry
    }

    pub fn options(&self) -> DispatcherOptions {
        self.options
    }

    /// Handle one call from the host framework.
    pub fn dispatch(&mut self, method: &str, params: &Value) -> MethodOutcome {
        debug!("Shell call: {}({})", method, params);

        let request = match ShellRequest::parse(method, params) {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!("Method not implemented: {}", method);
                return MethodOutcome::NotImplemented;
            }
            Err(e) => {
                debug!("Rejected {} arguments: {}", method, e);
                return e.into();
            }
        };

        match self.handle(request) {
            Ok(value) => MethodOutcome::Success(value),
            Err(e) => {
                warn!("{} failed: {}", method, e);
                e.into()
            }
        }
    }

    /// Run an already validated request.
    pub fn handle(&mut self, request: ShellRequest) -> Result<Value> {
        match request {
            ShellRequest::Reveal { file_path } => self.reveal(&file_path),
            ShellRequest::Launch { file_path } => self.launch(&file_path),
            ShellRequest::LaunchWith {
                file_path,
                application_path,
            } => self.launch_with(&file_path, &application_path),
            ShellRequest::ListApplications { file_path } => self.list_applications(&file_path),
        }
    }

    fn reveal(&self, file_path: &str) -> Result<Value> {
        let native = WideString::from_utf8(file_path)?;
        let status = self.backend.reveal(&native)?;
        check_status(file_path, status)
    }

    fn launch(&self, file_path: &str) -> Result<Value> {
        let native = WideString::from_utf8(file_path)?;
        let status = self.backend.open(&native)?;
        check_status(file_path, status)
    }

    fn launch_with(&self, file_path: &str, application_path: &str) -> Result<Value> {
        let native_app = WideString::from_utf8(application_path)?;
        let handler = match self.registry.lookup(&native_app) {
            HandlerLookup::Found(handler) => handler,
            HandlerLookup::NotFound if self.options.strict_application_match => {
                return Err(LauncherError::ApplicationNotFound {
                    path: file_path.to_string(),
                    application: application_path.to_string(),
                });
            }
            HandlerLookup::NotFound => {
                warn!(
                    "No listed application matches {} ({} listed); nothing launched for {}",
                    application_path,
                    self.registry.len(),
                    file_path
                );
                return Ok(Value::Bool(true));
            }
        };

        let native_file = WideString::from_utf8(file_path)?;
        self.backend.invoke_handler(handler, &native_file)?;
        debug!("Invoked {} for {}", application_path, file_path);
        Ok(Value::Bool(true))
    }

    fn list_applications(&mut self, file_path: &str) -> Result<Value> {
        let extension = file_extension(file_path).ok_or_else(|| LauncherError::MissingExtension {
            path: file_path.to_string(),
        })?;
        let native_ext = WideString::from_utf8(extension)?;

        // Registry stays untouched when the OS call fails.
        let handlers = self.backend.associated_handlers(&native_ext)?;

        let released = self.registry.clear();
        debug!(
            "Released {} handlers, {} candidates for .{}",
            released,
            handlers.len(),
            extension
        );

        let mut applications = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let (name, url, identity) = match describe(&handler) {
                Ok(described) => described,
                Err(e) => {
                    warn!("Skipping handler for .{}: {}", extension, e);
                    continue;
                }
            };
            if name.is_empty() || url.is_empty() {
                debug!("Skipping handler with empty name or identity for .{}", extension);
                continue;
            }
            applications.push(AssociatedApplication {
                name,
                url,
                icon: None,
            });
            self.registry.push(identity, handler);
        }

        if applications.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::to_value(applications)?)
    }
}

/// Display name and identity in caller text, plus the native identity.
fn describe<H: AssociationHandler>(handler: &H) -> Result<(String, String, WideString)> {
    let name = handler.display_name()?.to_utf8()?;
    let identity = handler.identity()?;
    Ok((name, identity.to_utf8()?, identity))
}

/// Apply the shell status threshold.
fn check_status(file_path: &str, status: ShellStatus) -> Result<Value> {
    if !status.is_success() {
        return Err(LauncherError::Open {
            path: file_path.to_string(),
            code: status.code(),
        });
    }
    Ok(Value::Bool(true))
}
