//! Window extraction entry points
//!
//! [`Extractor`] builds one window at a time on the calling thread.
//! [`extract_windows`] fans a list of windows out to blocking workers with a
//! concurrency bound and a per-window wall-clock budget.

use crate::config::ExtractionConfig;
use crate::element::Element;
use crate::errors::ExtractionError;
use crate::hit_test::{merge_hit_test, probe_point, MergeOutcome};
use crate::provider::AttributeProvider;
use crate::serializer::{to_serialized, TreeEnvelope};
use crate::tree_builder::TreeBuilder;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A window that produced no tree
#[derive(Debug)]
pub struct WindowFailure {
    /// Position of the window in the submitted handle list
    pub index: usize,
    pub reason: ExtractionError,
}

/// Outcome of a multi-window extraction
#[derive(Debug, Default)]
pub struct WindowExtraction {
    /// Finished trees in completion order
    pub windows: Vec<Element>,
    pub failures: Vec<WindowFailure>,
    /// Capture start, milliseconds since the Unix epoch
    pub started_at: i64,
    pub duration: Duration,
}

impl WindowExtraction {
    pub fn envelope(&self) -> TreeEnvelope {
        self.envelope_for(&self.windows)
    }

    /// Envelope carrying this extraction's timing around a chosen subset of
    /// windows, e.g. only the main one.
    pub fn envelope_for(&self, windows: &[Element]) -> TreeEnvelope {
        TreeEnvelope::new(
            self.started_at,
            self.duration.as_millis() as u64,
            windows.iter().map(to_serialized).collect(),
        )
    }

    pub fn main_window(&self) -> Option<&Element> {
        select_main_window(&self.windows)
    }
}

/// Synchronous single-window extraction
pub struct Extractor<'a, P: AttributeProvider> {
    provider: &'a P,
    config: &'a ExtractionConfig,
    cancel: CancellationToken,
}

impl<'a, P: AttributeProvider> Extractor<'a, P> {
    pub fn new(provider: &'a P, config: &'a ExtractionConfig) -> Self {
        Self {
            provider,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the tree for one window, merging the hit-tested root when
    /// enabled. A failed merge never fails the window.
    #[instrument(level = "debug", skip(self))]
    pub fn extract_window(&self, handle: &P::Handle) -> Result<Element, ExtractionError> {
        let builder =
            TreeBuilder::new(self.provider, self.config).with_cancellation(self.cancel.clone());
        let mut window = builder.build(handle)?;

        if self.config.hit_test {
            match probe_point(&window, self.config.hit_test_offset) {
                Some(point) => match merge_hit_test(&builder, &mut window, point)? {
                    MergeOutcome::Merged => {
                        info!("[extract] Merged hit-tested content into {:?}", handle)
                    }
                    outcome => debug!("[extract] Hit test for {:?}: {:?}", handle, outcome),
                },
                None => debug!("[extract] {:?} has no origin to probe from", handle),
            }
        }
        Ok(window)
    }

    /// Extract windows one after another, in order. Failures are collected.
    pub fn extract_all(&self, handles: &[P::Handle]) -> WindowExtraction {
        let started_at = Utc::now().timestamp_millis();
        let start_time = Instant::now();
        let mut result = WindowExtraction {
            started_at,
            ..Default::default()
        };
        for (index, handle) in handles.iter().enumerate() {
            match self.extract_window(handle) {
                Ok(window) => result.windows.push(window),
                Err(reason) => {
                    warn!("[extract] Window {} ({:?}) failed: {}", index, handle, reason);
                    result.failures.push(WindowFailure { index, reason });
                }
            }
        }
        result.duration = start_time.elapsed();
        result
    }
}

/// Extract several windows concurrently.
///
/// At most `max_concurrent_windows` workers run at once. Each worker gets
/// `window_timeout_ms` from the moment it starts; on expiry its cancellation
/// token fires, whatever it built is dropped, and the window is reported as
/// [`ExtractionError::TimedOut`]. Nothing is retried.
#[instrument(skip(provider, handles, config), fields(windows = handles.len()))]
pub async fn extract_windows<P>(
    provider: Arc<P>,
    handles: Vec<P::Handle>,
    config: &ExtractionConfig,
) -> WindowExtraction
where
    P: AttributeProvider + 'static,
{
    let started_at = Utc::now().timestamp_millis();
    let start_time = Instant::now();
    let config = Arc::new(config.clone());
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_windows.max(1)));
    let budget = config.window_timeout();

    let mut set = JoinSet::new();
    for (index, handle) in handles.into_iter().enumerate() {
        let provider = Arc::clone(&provider);
        let config = Arc::clone(&config);
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (index, Err(ExtractionError::Worker(e.to_string()))),
            };
            let token = CancellationToken::new();
            let worker_token = token.clone();
            let worker = tokio::task::spawn_blocking(move || {
                Extractor::new(provider.as_ref(), config.as_ref())
                    .with_cancellation(worker_token)
                    .extract_window(&handle)
            });
            let outcome = match tokio::time::timeout(budget, worker).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => Err(ExtractionError::Worker(join_error.to_string())),
                Err(_) => {
                    // the worker stops at its next node boundary
                    token.cancel();
                    Err(ExtractionError::TimedOut(budget))
                }
            };
            (index, outcome)
        });
    }

    let mut result = WindowExtraction {
        started_at,
        ..Default::default()
    };
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(window))) => result.windows.push(window),
            Ok((index, Err(reason))) => {
                warn!("[extract] Window {} failed: {}", index, reason);
                result.failures.push(WindowFailure { index, reason });
            }
            Err(e) => warn!("[extract] Extraction task panicked: {}", e),
        }
    }
    result.duration = start_time.elapsed();

    info!(
        "[extract] Extracted {} windows ({} failed) in {:?}",
        result.windows.len(),
        result.failures.len(),
        result.duration
    );
    result
}

/// The window with the most descendants; ties keep the earliest.
pub fn select_main_window(windows: &[Element]) -> Option<&Element> {
    let mut best: Option<(&Element, usize)> = None;
    for window in windows {
        let count = window.descendant_count();
        if best.map_or(true, |(_, most)| count > most) {
            best = Some((window, count));
        }
    }
    best.map(|(window, _)| window)
}
