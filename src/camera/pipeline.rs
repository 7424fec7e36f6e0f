use std::{sync::Arc, time::SystemTime};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// One captured image plus the metadata pipeline stages can read and extend.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Bytes,
    pub captured_at: SystemTime,
    pub source: String,
    pub meta: Map<String, Value>,
}

impl Frame {
    pub fn new(data: Bytes, source: impl Into<String>) -> Self {
        Self {
            data,
            captured_at: SystemTime::now(),
            source: source.into(),
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Transform stage. May inspect the frame, rewrite it, or reject it.
#[async_trait]
pub trait FrameProcessor: Send + Sync {
    fn name(&self) -> &str;
    async fn process(&self, frame: Frame) -> Result<Frame>;
}

/// Side-effect stage (storage, publishing, metrics). Failures never reach the caller.
#[async_trait]
pub trait FrameSink: Send + Sync {
    fn name(&self) -> &str;
    async fn consume(&self, frame: &Frame) -> Result<()>;
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame processor {stage} failed: {source:#}")]
    Processor {
        stage: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Ordered processors followed by ordered sinks.
///
/// Stages are registered while the pipeline is being assembled; once it is
/// handed to the snapshot coordinator it is only ever read.
#[derive(Default, Clone)]
pub struct FramePipeline {
    processors: Vec<Arc<dyn FrameProcessor>>,
    sinks: Vec<Arc<dyn FrameSink>>,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processor(&mut self, processor: impl FrameProcessor + 'static) {
        self.processors.push(Arc::new(processor));
    }

    pub fn add_sink(&mut self, sink: impl FrameSink + 'static) {
        self.sinks.push(Arc::new(sink));
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty() && self.sinks.is_empty()
    }

    pub async fn run(&self, frame: Frame) -> Result<Frame, PipelineError> {
        let mut current = frame;
        for processor in &self.processors {
            current = processor
                .process(current)
                .await
                .map_err(|source| PipelineError::Processor {
                    stage: processor.name().to_string(),
                    source,
                })?;
        }

        for sink in &self.sinks {
            if let Err(err) = sink.consume(&current).await {
                warn!("pipeline sink {} failed: {err:#}", sink.name());
            }
        }

        Ok(current)
    }
}

/// Logs every frame that makes it through the pipeline.
pub struct FrameLogSink;

#[async_trait]
impl FrameSink for FrameLogSink {
    fn name(&self) -> &str {
        "frame-log"
    }

    async fn consume(&self, frame: &Frame) -> Result<()> {
        let meta = Value::Object(frame.meta.clone());
        debug!(
            "frame captured: source={} bytes={} meta={meta}",
            frame.source,
            frame.data.len()
        );
        Ok(())
    }
}
