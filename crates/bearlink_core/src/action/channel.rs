use super::{ActionError, ActionRequest, ActionResult};
use log::{error, info};
use std::time::Instant;

/// Destination for write actions.
pub trait ActionChannel {
    /// Hands `request` to the host app. Returns once dispatch is accepted.
    fn dispatch(&self, request: &ActionRequest) -> ActionResult<()>;
}

/// Opens callback URLs with the platform's registered URL handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemActionChannel {
    scheme: String,
}

impl SystemActionChannel {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl ActionChannel for SystemActionChannel {
    fn dispatch(&self, request: &ActionRequest) -> ActionResult<()> {
        let started_at = Instant::now();
        let url = request.to_url(&self.scheme);

        match open::that(&url) {
            Ok(()) => {
                info!(
                    "event=action_dispatch module=action status=ok action={} params={} duration_ms={}",
                    request.action,
                    request.params.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=action_dispatch module=action status=error action={} duration_ms={} error={}",
                    request.action,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(ActionError::DispatchFailed {
                    action: request.action,
                    params: request.params.clone(),
                    source: err,
                })
            }
        }
    }
}
