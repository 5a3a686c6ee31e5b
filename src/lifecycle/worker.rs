//! Async front end for the blocking controller.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CommandErrorKind, DaemonError, DaemonResult};
use crate::scm::CreateSpec;

use super::controller::ServiceController;
use super::stage::ServiceStage;

/// Runs controller operations on the blocking thread pool, one at a time.
///
/// Lifecycle operations sleep and poll; running them here keeps async
/// callers responsive. The gate serializes operations so a start and a
/// stop on the same service never interleave.
pub struct ServiceWorker {
    controller: Arc<ServiceController>,
    gate: Mutex<()>,
}

impl ServiceWorker {
    pub fn new(controller: Arc<ServiceController>) -> Self {
        Self {
            controller,
            gate: Mutex::new(()),
        }
    }

    pub fn controller(&self) -> &Arc<ServiceController> {
        &self.controller
    }

    pub async fn create_and_start(&self, spec: CreateSpec) -> DaemonResult<()> {
        self.run(move |controller| controller.create_and_start(&spec))
            .await
    }

    pub async fn stop(&self) -> DaemonResult<()> {
        self.run(|controller| controller.stop()).await
    }

    pub async fn status(&self) -> DaemonResult<ServiceStage> {
        self.run(|controller| Ok(controller.status())).await
    }

    async fn run<T, F>(&self, operation: F) -> DaemonResult<T>
    where
        F: FnOnce(&ServiceController) -> DaemonResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let _guard = self.gate.lock().await;
        debug!(service = %self.controller.service_name(), "Running lifecycle operation");

        let controller = Arc::clone(&self.controller);
        tokio::task::spawn_blocking(move || operation(&controller))
            .await
            .map_err(|e| DaemonError::Command {
                kind: CommandErrorKind::ExecutionFailed {
                    message: format!("Lifecycle operation panicked: {}", e),
                },
            })?
    }
}
