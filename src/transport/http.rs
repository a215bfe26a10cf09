use std::thread;

use reqwest::Client;
use tokio::runtime::{Builder, Handle, Runtime};

use super::Emitter;
use crate::config::HttpConfig;
use crate::error::EmitError;
use crate::lineage::event::RunEvent;

/// Posts events as JSON to an OpenLineage HTTP collector.
///
/// `emit` is synchronous: the async client is driven by a private
/// current-thread runtime. Inside a host tokio runtime the post runs on a
/// scoped helper thread, since a runtime cannot be entered from within another.
pub struct HttpEmitter {
    client: Client,
    target: String,
    api_key: Option<String>,
    // Only `None` once dropped.
    runtime: Option<Runtime>,
}

impl HttpEmitter {
    pub fn new(config: &HttpConfig) -> Result<Self, EmitError> {
        let client = Client::builder()
            .timeout(config.timeout) // no emission outlives this
            .build()
            .map_err(|e| EmitError::Transport(e.to_string()))?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| EmitError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            target: config.target(),
            api_key: config.api_key.clone(),
            runtime: Some(runtime),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn post(&self, event: &RunEvent) -> Result<(), EmitError> {
        let mut request = self.client.post(&self.target).json(event);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmitError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmitError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    fn block_on_post(&self, runtime: &Runtime, event: &RunEvent) -> Result<(), EmitError> {
        if Handle::try_current().is_err() {
            return runtime.block_on(self.post(event));
        }

        thread::scope(|s| {
            s.spawn(|| runtime.block_on(self.post(event)))
                .join()
                .unwrap_or_else(|_| {
                    Err(EmitError::Transport("emission thread panicked".to_string()))
                })
        })
    }
}

impl Emitter for HttpEmitter {
    fn emit(&self, event: &RunEvent) -> Result<(), EmitError> {
        match &self.runtime {
            Some(runtime) => self.block_on_post(runtime, event),
            None => Err(EmitError::Transport("emitter is shut down".to_string())),
        }
    }
}

impl Drop for HttpEmitter {
    fn drop(&mut self) {
        // A plain runtime drop panics when it happens inside async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for HttpEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmitter")
            .field("target", &self.target)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
