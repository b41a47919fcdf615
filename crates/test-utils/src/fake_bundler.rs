use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use assetpipe::errors::{PipelineError, Result};
use assetpipe::tasks::Bundler;

/// A bundler that never spawns a process:
/// - records every entry it was asked to bundle
/// - answers with a fixed script, or a fixed error
/// - optionally holds every answer until its gate has a permit.
#[derive(Debug, Clone)]
pub struct FakeBundler {
    output: std::result::Result<String, String>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeBundler {
    pub fn ok(script: &str) -> Self {
        Self {
            output: Ok(script.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Hold each call after recording it, until `gate` has a permit.
    /// The permit is returned, so one `add_permits(1)` opens the gate for good.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Entries bundled so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl Bundler for FakeBundler {
    fn bundle<'a>(
        &'a self,
        entry: &'a Path,
        _root: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(entry.to_path_buf());
            if let Some(gate) = &self.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| PipelineError::BundleError(e.to_string()))?;
            }
            self.output
                .clone()
                .map_err(PipelineError::BundleError)
        })
    }
}
