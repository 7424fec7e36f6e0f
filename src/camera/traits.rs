use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::errors::SnapshotError;

/// Everything one capture needs. Built fresh from the settings on each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParams {
    pub input_url: String,
    pub tool_path: String,
    pub transport: String,
    pub timeout: Duration,
    pub extra_args: Vec<String>,
    pub allow_last_good: bool,
}

#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Short identifier stamped on every frame this source produces.
    fn name(&self) -> &'static str;

    /// Produce one still image. Must not retry and must enforce `params.timeout`.
    async fn capture(&self, params: &CaptureParams) -> Result<Bytes, SnapshotError>;
}
