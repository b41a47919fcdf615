// src/tasks/bundler.rs

//! Script bundler seam.
//!
//! Bundling (module resolution, transpiling) is done by an external tool.
//! [`CommandBundler`] runs it as a child process through the platform shell
//! and reads the bundle from stdout; tests plug in their own [`Bundler`].

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};

/// Placeholder replaced with the entry path in the bundler command.
pub const ENTRY_PLACEHOLDER: &str = "{entry}";

/// Produces a single bundled script for an entry file.
pub trait Bundler: Send + Sync {
    /// Bundle `entry` and all of its transitive imports.
    ///
    /// `root` is the project root; the bundler runs with it as working
    /// directory.
    fn bundle<'a>(
        &'a self,
        entry: &'a Path,
        root: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Runs a shell command template such as
/// `npx --yes esbuild {entry} --bundle --target=es2015`.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    template: String,
}

impl CommandBundler {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The command line for a given entry.
    pub fn command_line(&self, entry: &Path) -> String {
        let quoted = format!("\"{}\"", entry.display());
        self.template.replace(ENTRY_PLACEHOLDER, &quoted)
    }
}

impl Bundler for CommandBundler {
    fn bundle<'a>(
        &'a self,
        entry: &'a Path,
        root: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let line = self.command_line(entry);
            info!(cmd = %line, "running bundler");

            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&line);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&line);
                c
            };

            cmd.current_dir(root)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let output = cmd
                .output()
                .await
                .map_err(|e| PipelineError::BundleError(format!("spawning `{line}`: {e}")))?;

            let stderr = String::from_utf8_lossy(&output.stderr);
            for l in stderr.lines() {
                debug!("bundler stderr: {}", l);
            }

            if !output.status.success() {
                let code = output.status.code().unwrap_or(-1);
                return Err(PipelineError::BundleError(format!(
                    "`{line}` exited with code {code}: {}",
                    stderr.trim()
                )));
            }

            String::from_utf8(output.stdout)
                .map_err(|e| PipelineError::BundleError(format!("bundle is not UTF-8: {e}")))
        })
    }
}
