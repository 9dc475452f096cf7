//! `Pipeline` — drives a log source through the processor into sinks.

use futures::StreamExt;
use logcodec_core::RawLog;
use logcodec_evm::AbiHandle;
use logcodec_feem::{DecodedEvent, MapError};
use logcodec_observability::PipelineInstruments;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::dedup::Deduplicator;
use crate::error::{PipelineError, SinkError, StreamError};
use crate::processor::{LogProcessor, Outcome, SkipReason};
use crate::sink::{open_sink, EventSink};
use crate::source::LogSource;

/// Metrics snapshot for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineMetrics {
    pub received: u64,
    pub emitted: u64,
    pub unmatched: u64,
    pub decode_errors: u64,
    pub unhandled: u64,
    pub duplicates: u64,
    /// Source entries that were not valid logs
    pub malformed: u64,
    pub reconnections: u64,
}

/// Upper bound on the backoff exponent: 64x the initial delay.
const MAX_BACKOFF_SHIFT: u32 = 6;

/// The streaming pipeline.
///
/// # Usage
/// ```no_run
/// # async fn example() -> Result<(), logcodec_pipeline::PipelineError> {
/// use logcodec_pipeline::{source::source_from_config, Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::load("config/pipeline.example.yaml")?;
/// let source = source_from_config(&config)?;
/// let mut pipeline = Pipeline::from_config(&config).await?;
/// let metrics = pipeline.run(source.as_ref()).await?;
/// println!("{} events", metrics.emitted);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    processor: LogProcessor,
    dedup: Deduplicator,
    sink: Box<dyn EventSink>,
    duplicate_sink: Option<Box<dyn EventSink>>,
    max_retries: u32,
    backoff_ms: u64,
    metrics: Arc<Mutex<PipelineMetrics>>,
    instruments: PipelineInstruments,
}

impl Pipeline {
    pub fn new(processor: LogProcessor, sink: Box<dyn EventSink>) -> Self {
        Self {
            processor,
            dedup: Deduplicator::disabled(),
            sink,
            duplicate_sink: None,
            max_retries: 0,
            backoff_ms: 0,
            metrics: Arc::new(Mutex::new(PipelineMetrics::default())),
            instruments: PipelineInstruments::global(),
        }
    }

    /// Load the ABI, open the sinks and apply every setting of `config`.
    pub async fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let abi = AbiHandle::load(&config.abi_path)?;
        info!(
            abi = abi.origin(),
            events = abi.matchable_events().count(),
            anonymous = abi.anonymous_count(),
            "ABI loaded"
        );
        let processor = LogProcessor::new(Arc::new(abi)).with_contract(config.contract()?);

        let mut pipeline = Self::new(processor, open_sink(&config.sink, false).await?);
        if let Some(dup) = &config.duplicate_sink {
            pipeline = pipeline.with_duplicate_sink(open_sink(dup, true).await?);
        }
        if config.dedup.enabled {
            pipeline = pipeline.with_dedup(Deduplicator::new(config.dedup.window));
        }
        let (max_retries, backoff_ms) = config.retry_policy();
        Ok(pipeline.with_retry(max_retries, backoff_ms))
    }

    pub fn with_dedup(mut self, dedup: Deduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    /// Route repeated events here instead of dropping them.
    pub fn with_duplicate_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.duplicate_sink = Some(sink);
        self
    }

    /// Reconnection policy for live sources.
    pub fn with_retry(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_ms = backoff_ms;
        self
    }

    pub fn with_instruments(mut self, instruments: PipelineInstruments) -> Self {
        self.instruments = instruments;
        self
    }

    /// Returns a snapshot of current metrics.
    pub fn metrics(&self) -> PipelineMetrics {
        self.lock_metrics().clone()
    }

    /// Shared handle for observing metrics while `run` is in progress.
    pub fn metrics_handle(&self) -> Arc<Mutex<PipelineMetrics>> {
        Arc::clone(&self.metrics)
    }

    /// Run until the source is exhausted (finite sources) or reconnection
    /// attempts run out (live sources).
    pub async fn run(&mut self, source: &dyn LogSource) -> Result<PipelineMetrics, PipelineError> {
        self.run_until(source, std::future::pending()).await
    }

    /// Like `run`, but also stops cleanly when `shutdown` completes.
    /// Sinks are flushed on every exit path that reaches the end.
    pub async fn run_until<F>(
        &mut self,
        source: &dyn LogSource,
        shutdown: F,
    ) -> Result<PipelineMetrics, PipelineError>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        info!(source = source.name(), live = source.is_live(), "pipeline starting");

        let mut retry = 0u32;
        let result = loop {
            let opened = tokio::select! {
                _ = &mut shutdown => break Ok(()),
                opened = source.open() => opened,
            };

            match opened {
                Err(e) if !source.is_live() => break Err(e.into()),
                Err(e) => {
                    warn!(source = source.name(), error = %e, "source connect error");
                }
                Ok(mut stream) => {
                    let mut delivered = false;
                    let mut stopped = false;
                    loop {
                        let item = tokio::select! {
                            _ = &mut shutdown => { stopped = true; break }
                            item = stream.next() => item,
                        };
                        match item {
                            None => break,
                            Some(Ok(log)) => {
                                delivered = true;
                                if let Err(e) = self.handle(log).await {
                                    return self.finish(Err(e.into())).await;
                                }
                            }
                            Some(Err(StreamError::Malformed { origin, reason })) => {
                                warn!(%origin, %reason, "skipping malformed log");
                                self.lock_metrics().malformed += 1;
                            }
                            Some(Err(e)) => {
                                warn!(source = source.name(), error = %e, "stream error");
                                break;
                            }
                        }
                    }
                    if stopped {
                        info!("shutdown requested");
                        break Ok(());
                    }
                    if !source.is_live() {
                        break Ok(());
                    }
                    if delivered {
                        retry = 0;
                    }
                    info!(source = source.name(), "stream closed, reconnecting");
                }
            }

            retry += 1;
            if retry > self.max_retries {
                break Err(PipelineError::RetriesExhausted {
                    source_name: source.name().to_string(),
                    attempts: self.max_retries,
                });
            }
            self.lock_metrics().reconnections += 1;
            let delay = self.backoff_ms.saturating_mul(1 << retry.min(MAX_BACKOFF_SHIFT));
            debug!(retry, delay_ms = delay, "backing off");
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }
        };

        self.finish(result).await
    }

    async fn finish(
        &mut self,
        result: Result<(), PipelineError>,
    ) -> Result<PipelineMetrics, PipelineError> {
        let flushed = self.flush().await;
        let metrics = self.metrics();
        info!(
            received = metrics.received,
            emitted = metrics.emitted,
            unmatched = metrics.unmatched,
            decode_errors = metrics.decode_errors,
            unhandled = metrics.unhandled,
            duplicates = metrics.duplicates,
            "pipeline stopped"
        );
        result?;
        flushed?;
        Ok(metrics)
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush().await?;
        if let Some(dup) = self.duplicate_sink.as_mut() {
            dup.flush().await?;
        }
        Ok(())
    }

    /// Process one log. Only sink failures are returned.
    async fn handle(&mut self, log: RawLog) -> Result<(), SinkError> {
        self.lock_metrics().received += 1;
        self.instruments.record_received();

        let started = Instant::now();
        let outcome = self.processor.process(&log);
        self.instruments
            .record_latency(started.elapsed().as_secs_f64() * 1_000.0);

        match outcome {
            Outcome::NoMatch => {
                self.lock_metrics().unmatched += 1;
                self.instruments.record_unmatched();
            }
            Outcome::Skipped(reason) => {
                match &reason {
                    SkipReason::Decode(_) => self.lock_metrics().decode_errors += 1,
                    SkipReason::Unhandled(e) => {
                        self.lock_metrics().unhandled += 1;
                        let MapError::Unhandled { event, .. } = e;
                        self.instruments.record_unhandled(event);
                    }
                }
                self.instruments.record_error(reason.label());
            }
            Outcome::Emitted(event) => self.route(event).await?,
        }
        Ok(())
    }

    async fn route(&mut self, event: DecodedEvent) -> Result<(), SinkError> {
        let key = event.dedup_key();
        if self.dedup.observe(&key) {
            self.sink.write(&event).await?;
            self.lock_metrics().emitted += 1;
            self.instruments.record_emitted(event.event_name());
            return Ok(());
        }

        self.lock_metrics().duplicates += 1;
        self.instruments.record_duplicate(event.event_name());
        match self.duplicate_sink.as_mut() {
            Some(dup) => dup.write(&event).await?,
            None => debug!(log = %key, "dropping duplicate event"),
        }
        Ok(())
    }

    fn lock_metrics(&self) -> std::sync::MutexGuard<'_, PipelineMetrics> {
        self.metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
