use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::{
    sync::Notify,
    time::{Instant, timeout},
};
use tracing::{debug, warn};

use super::{
    jpeg::is_complete_jpeg,
    pipeline::{Frame, FramePipeline},
    redact::redact_url_credentials,
    traits::{CaptureParams, CaptureSource},
};
use crate::core::errors::SnapshotError;

/// Extra time a joining caller waits beyond the capture timeout.
pub const JOIN_GRACE: Duration = Duration::from_millis(500);
/// Upper bound between in-flight re-checks while joining.
pub const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Join deadline used when `timeout + JOIN_GRACE` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub params: CaptureParams,
    /// Zero or negative disables caching.
    pub cache_ttl_ms: i64,
}

impl SnapshotRequest {
    fn cache_ttl(&self) -> Option<Duration> {
        u64::try_from(self.cache_ttl_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStatus {
    pub in_flight: bool,
    pub last_error: Option<String>,
    pub cache_age_ms: Option<u64>,
    pub last_good_age_ms: Option<u64>,
}

#[derive(Clone)]
struct CachedJpeg {
    data: Bytes,
    captured_at: Instant,
}

impl CachedJpeg {
    fn age_ms(&self, now: Instant) -> u64 {
        u64::try_from(now.duration_since(self.captured_at).as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Default)]
struct CacheState {
    current: Option<CachedJpeg>,
    last_good: Option<CachedJpeg>,
    in_flight: bool,
    last_error: Option<String>,
}

impl CacheState {
    fn fresh(&self, ttl: Option<Duration>, now: Instant) -> Option<Bytes> {
        let ttl = ttl?;
        let cached = self.current.as_ref()?;
        (now.duration_since(cached.captured_at) <= ttl).then(|| cached.data.clone())
    }
}

/// Serves "the current snapshot": TTL cache, single-flight capture and
/// last-good fallback around one [`CaptureSource`].
///
/// Create one per process and share it; all cache and in-flight state lives
/// behind a single mutex.
pub struct SnapshotCoordinator {
    source: Arc<dyn CaptureSource>,
    pipeline: Option<FramePipeline>,
    state: Mutex<CacheState>,
    capture_done: Notify,
}

/// Clears the in-flight claim and wakes joiners, even if the capture future is dropped.
struct InFlightClaim<'a> {
    coordinator: &'a SnapshotCoordinator,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.coordinator.state.lock().in_flight = false;
        self.coordinator.capture_done.notify_waiters();
    }
}

enum Admission {
    Cached(Bytes),
    Claimed,
}

impl SnapshotCoordinator {
    pub fn new(source: Arc<dyn CaptureSource>, pipeline: Option<FramePipeline>) -> Self {
        Self {
            source,
            pipeline,
            state: Mutex::new(CacheState::default()),
            capture_done: Notify::new(),
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    pub fn status(&self) -> CoordinatorStatus {
        let now = Instant::now();
        let state = self.state.lock();
        CoordinatorStatus {
            in_flight: state.in_flight,
            last_error: state.last_error.clone(),
            cache_age_ms: state.current.as_ref().map(|c| c.age_ms(now)),
            last_good_age_ms: state.last_good.as_ref().map(|c| c.age_ms(now)),
        }
    }

    pub async fn get_snapshot(&self, request: &SnapshotRequest) -> Result<Bytes, SnapshotError> {
        if let Admission::Cached(data) = self.admit(request).await {
            return Ok(data);
        }

        let _claim = InFlightClaim { coordinator: self };
        let outcome = self.acquire(&request.params).await;
        self.settle(outcome, request.params.allow_last_good)
    }

    /// Returns a fresh cached frame, or takes the in-flight claim. A caller that
    /// finds a capture running waits for it (bounded), then re-checks the cache
    /// and claims for itself if the result is not usable.
    async fn admit(&self, request: &SnapshotRequest) -> Admission {
        let ttl = request.cache_ttl();
        let started = Instant::now();
        let deadline = request
            .params
            .timeout
            .checked_add(JOIN_GRACE)
            .and_then(|budget| started.checked_add(budget))
            .unwrap_or_else(|| started + FAR_FUTURE);

        loop {
            let notified = self.capture_done.notified();
            tokio::pin!(notified);

            {
                let mut state = self.state.lock();
                let now = Instant::now();
                if let Some(data) = state.fresh(ttl, now) {
                    return Admission::Cached(data);
                }
                if !state.in_flight || now >= deadline {
                    state.in_flight = true;
                    return Admission::Claimed;
                }
                // Register before unlocking so a release in between is not missed.
                notified.as_mut().enable();
            }

            let _ = timeout(JOIN_POLL_INTERVAL, notified).await;
        }
    }

    async fn acquire(&self, params: &CaptureParams) -> Result<Bytes, SnapshotError> {
        let data = self.source.capture(params).await?;
        if !is_complete_jpeg(&data) {
            return Err(SnapshotError::Acquire(format!(
                "{} output was not a complete JPEG",
                self.source.name()
            )));
        }

        let Some(pipeline) = self.pipeline.as_ref().filter(|p| !p.is_empty()) else {
            return Ok(data);
        };

        let frame = Frame::new(data, self.source.name())
            .with_meta("input", redact_url_credentials(params.input_url.trim()));
        let frame = pipeline.run(frame).await?;
        Ok(frame.data)
    }

    fn settle(
        &self,
        outcome: Result<Bytes, SnapshotError>,
        allow_last_good: bool,
    ) -> Result<Bytes, SnapshotError> {
        let mut state = self.state.lock();
        match outcome {
            Ok(data) => {
                let entry = CachedJpeg {
                    data: data.clone(),
                    captured_at: Instant::now(),
                };
                state.current = Some(entry.clone());
                state.last_good = Some(entry);
                state.last_error = None;
                debug!("snapshot cached ({} bytes)", data.len());
                Ok(data)
            }
            Err(err) => {
                state.last_error = Some(err.to_string());
                match &state.last_good {
                    Some(good) if allow_last_good => {
                        warn!("snapshot capture failed, serving last good frame: {err}");
                        Ok(good.data.clone())
                    }
                    _ => Err(err),
                }
            }
        }
    }
}
