//! Async frame driver
//!
//! Runs a mounted [`MotionEngine`](crate::engine::MotionEngine) on tokio
//! the way a browser runs the page: a frame callback at a fixed interval,
//! passive event listeners feeding a channel, and a slow rescan timer.
//!
//! # Task Layout
//!
//! ```text
//! host listeners ──mpsc──┐
//!                        ▼
//!                 ┌─────────────┐   frame interval   ┌──────────────┐
//!                 │ FrameDriver │ ─────────────────> │ engine.tick  │──> RenderSink
//!                 │   select!   │   rescan interval  ├──────────────┤
//!                 │             │ ─────────────────> │ engine.rescan│
//!                 └─────────────┘                    └──────────────┘
//!                        ▲
//! DriverHandle::shutdown ┘ (CancellationToken)
//! ```
//!
//! Everything touching the engine runs on the one driver task, so the
//! engine itself needs no locking. The document is the only state shared
//! with the host and sits behind a `parking_lot::RwLock`.
//!
//! # Example
//!
//! ```no_run
//! use campus_motion::config::MotionConfig;
//! use campus_motion::dom::DocumentTree;
//! use campus_motion::engine::{MotionEngine, StaticProbe};
//! use campus_motion::render::NullSink;
//! use campus_motion::runtime::FrameDriver;
//! use parking_lot::RwLock;
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let tree = Arc::new(RwLock::new(DocumentTree::new()));
//! let engine = MotionEngine::mount(MotionConfig::default(), &StaticProbe::desktop(), &*tree.read())?;
//! let mut handle = FrameDriver::spawn(engine, tree, NullSink);
//! // ... forward events with handle.send(...)
//! let outcome = handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod driver;

pub use driver::{DriverHandle, DriverOutcome, FrameDriver, SharedTree};
