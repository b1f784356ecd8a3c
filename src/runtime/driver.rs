//! Frame driver task

use crate::dom::DocumentTree;
use crate::engine::{EngineSummary, MotionEngine, TeardownReport};
use crate::input::InputEvent;
use crate::render::RenderSink;
use crate::utils::MetricsCollector;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// Document shared between the host and the driver
pub type SharedTree = Arc<RwLock<DocumentTree>>;

/// What the driver hands back when it stops
#[derive(Debug)]
pub struct DriverOutcome<S> {
    /// Engine state after teardown
    pub summary: EngineSummary,
    /// What teardown released
    pub teardown: TeardownReport,
    /// The sink, returned to the caller
    pub sink: S,
}

/// Frame driver
///
/// Ticks a [`MotionEngine`] on a fixed interval, forwards input from a
/// channel and runs the classifier rescan on its own slower timer.
pub struct FrameDriver;

impl FrameDriver {
    /// Spawn the driver on the current tokio runtime
    pub fn spawn<S>(engine: MotionEngine, tree: SharedTree, sink: S) -> DriverHandle<S>
    where
        S: RenderSink + Send + 'static,
    {
        let runtime = engine.config().runtime.clone();
        let rescan_ms = engine.config().classifier.rescan_interval_ms;
        let metrics = engine.metrics();

        let (input_tx, input_rx) = mpsc::channel(runtime.input_buffer.max(1));
        let cancel = CancellationToken::new();

        let frame_interval = Duration::from_secs_f64(runtime.frame_interval_ms / 1000.0)
            .max(Duration::from_millis(1));
        let rescan_interval = Duration::from_millis(rescan_ms);

        info!(
            "Starting frame driver: frame interval {:.2}ms, rescan every {}ms",
            runtime.frame_interval_ms, rescan_ms
        );

        let task = tokio::spawn(run(
            engine,
            tree,
            sink,
            input_rx,
            cancel.clone(),
            frame_interval,
            rescan_interval,
        ));

        DriverHandle {
            input: input_tx,
            cancel,
            task: Some(task),
            metrics,
        }
    }
}

async fn run<S>(
    mut engine: MotionEngine,
    tree: SharedTree,
    mut sink: S,
    mut input_rx: mpsc::Receiver<InputEvent>,
    cancel: CancellationToken,
    frame_interval: Duration,
    rescan_interval: Duration,
) -> DriverOutcome<S>
where
    S: RenderSink + Send + 'static,
{
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Mount already scanned; the first rescan is one period away
    let mut rescan = interval_at(Instant::now() + rescan_interval, rescan_interval);
    rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Frame driver cancelled");
                break;
            }

            Some(event) = input_rx.recv() => {
                trace!("Driver input: {:?}", event);
                let tree = tree.read();
                engine.handle_event(event, &*tree);
            }

            now = frames.tick() => {
                let dt = now.saturating_duration_since(last_frame);
                last_frame = now;
                engine.tick(dt.as_secs_f32() * 1000.0, &mut sink);
            }

            _ = rescan.tick() => {
                let tree = tree.read();
                if let Some(report) = engine.rescan(&*tree) {
                    trace!("Periodic rescan: {} registered", report.registered);
                }
            }
        }
    }

    let teardown = engine.teardown(&mut sink);
    info!("Frame driver stopped after {} frames", engine.frames());

    DriverOutcome {
        summary: engine.summary(),
        teardown,
        sink,
    }
}

/// Handle to a running frame driver
pub struct DriverHandle<S> {
    input: mpsc::Sender<InputEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<DriverOutcome<S>>>,
    metrics: Arc<MetricsCollector>,
}

impl<S> DriverHandle<S> {
    /// Forward an event, waiting for channel space
    ///
    /// Returns `false` once the driver has stopped.
    pub async fn send(&self, event: InputEvent) -> bool {
        self.input.send(event).await.is_ok()
    }

    /// Forward an event without waiting; dropped when the channel is full
    pub fn try_send(&self, event: InputEvent) -> bool {
        match self.input.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("Driver input channel full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Sender for host-side event listeners
    pub fn input_sender(&self) -> mpsc::Sender<InputEvent> {
        self.input.clone()
    }

    /// Engine metrics, readable while the driver runs
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Driver task still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the driver and tear the engine down
    ///
    /// The first call returns the outcome; later calls return `None`.
    pub async fn shutdown(&mut self) -> Option<DriverOutcome<S>> {
        let task = self.task.take()?;
        self.cancel.cancel();
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Frame driver task failed: {}", e);
                None
            }
        }
    }
}

impl<S> Drop for DriverHandle<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::dom::{ElementDescriptor, ElementId, ElementTag};
    use crate::engine::StaticProbe;
    use crate::render::{RecordingSink, RenderTarget};
    use crate::utils::metric_names;

    fn start(config: MotionConfig) -> (DriverHandle<RecordingSink>, SharedTree) {
        let mut document = DocumentTree::new();
        document.insert(ElementId(1), ElementDescriptor::with_tag(ElementTag::Button));
        let tree: SharedTree = Arc::new(RwLock::new(document));

        let engine = {
            let guard = tree.read();
            MotionEngine::mount(config, &StaticProbe::desktop(), &*guard).unwrap()
        };
        let handle = FrameDriver::spawn(engine, Arc::clone(&tree), RecordingSink::new());
        (handle, tree)
    }

    fn fast_config() -> MotionConfig {
        let mut config = MotionConfig::default();
        config.runtime.frame_interval_ms = 4.0;
        config.classifier.rescan_interval_ms = 20;
        config.particles.seed = Some(1);
        config
    }

    #[tokio::test]
    async fn test_driver_ticks_and_forwards_input() {
        let (mut handle, _tree) = start(fast_config());

        assert!(
            handle
                .send(InputEvent::PointerMove {
                    x: 40.0,
                    y: 40.0,
                    timestamp_ms: 0.0,
                })
                .await
        );
        assert!(handle.send(InputEvent::PointerOver { target: ElementId(1) }).await);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(handle.is_running());

        let frames = handle
            .metrics()
            .get_counter(metric_names::FRAMES_TICKED)
            .unwrap_or(0);
        assert!(frames > 0);

        let outcome = handle.shutdown().await.unwrap();
        assert!(!outcome.summary.mounted);
        assert_eq!(outcome.summary.active_subscriptions, 0);
        assert_eq!(outcome.summary.mode, crate::cursor::CursorMode::Button);
        assert_eq!(outcome.teardown.subscriptions_released, 10);
        assert!(outcome.sink.style(RenderTarget::CursorDot).is_none());
        assert!(outcome.sink.releases() > 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (mut handle, _tree) = start(fast_config());
        assert!(handle.shutdown().await.is_some());
        assert!(handle.shutdown().await.is_none());
        assert!(!handle.is_running());
        assert!(!handle.try_send(InputEvent::PointerUp { timestamp_ms: 0.0 }));
    }

    #[tokio::test]
    async fn test_periodic_rescan_sees_inserted_element() {
        let (mut handle, tree) = start(fast_config());
        tree.write().insert(
            ElementId(2),
            ElementDescriptor::with_tag(ElementTag::Input),
        );
        tokio::time::sleep(Duration::from_millis(80)).await;

        let outcome = handle.shutdown().await.unwrap();
        assert!(outcome.summary.classifier_scans >= 2);
    }
}
