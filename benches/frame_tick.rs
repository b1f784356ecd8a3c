//! Frame Tick Benchmarks
//!
//! Measures one engine tick with a full trail, a busy particle pool and
//! pinned sections mid-crossfade.

use campus_motion::config::MotionConfig;
use campus_motion::dom::{DocumentTree, ElementDescriptor, ElementId, ElementTag};
use campus_motion::engine::{MotionEngine, StaticProbe};
use campus_motion::input::InputEvent;
use campus_motion::render::{NullSink, RecordingSink};
use campus_motion::scroll::{PinnedSection, ScrollFrame, SectionDescriptor};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const FRAME_MS: f32 = 1000.0 / 60.0;

fn document(elements: u32) -> DocumentTree {
    let mut tree = DocumentTree::new();
    tree.insert(ElementId(0), ElementDescriptor::default());
    for id in 1..elements {
        let tag = match id % 3 {
            0 => ElementTag::Button,
            1 => ElementTag::Anchor,
            _ => ElementTag::Other,
        };
        tree.insert(
            ElementId(id),
            ElementDescriptor::with_tag(tag).parent(ElementId(id / 2)),
        );
    }
    tree
}

fn config(trail_capacity: usize) -> MotionConfig {
    let mut config = MotionConfig::default();
    config.trail_capacity = trail_capacity;
    config.particles.seed = Some(1);
    for s in 0..3 {
        let start = s as f32 * 2000.0;
        config.scroll.sections.push(SectionDescriptor {
            range: PinnedSection::new(start, start + 1500.0),
            frames: (0..6).map(|i| ScrollFrame::text(i, "frame")).collect(),
        });
    }
    config
}

/// Engine with a saturated trail and particle pool
fn loaded_engine(trail_capacity: usize, tree: &DocumentTree) -> MotionEngine {
    let mut engine = MotionEngine::mount(config(trail_capacity), &StaticProbe::desktop(), tree)
        .expect("mount");
    let mut sink = NullSink;
    for i in 0..120 {
        let t = i as f64 * FRAME_MS as f64;
        engine.handle_event(
            InputEvent::PointerMove {
                x: 200.0 + (i as f32 * 0.2).sin() * 150.0,
                y: 300.0 + (i as f32 * 0.3).cos() * 150.0,
                timestamp_ms: t,
            },
            tree,
        );
        engine.handle_event(
            InputEvent::Scroll {
                offset: i as f32 * 40.0,
                timestamp_ms: t,
            },
            tree,
        );
        if i % 10 == 0 {
            engine.handle_event(InputEvent::PointerDown { timestamp_ms: t }, tree);
            engine.handle_event(InputEvent::PointerUp { timestamp_ms: t }, tree);
        }
        engine.tick(FRAME_MS, &mut sink);
    }
    engine
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    let tree = document(200);

    for trail in [12usize, 32, 64] {
        group.bench_with_input(BenchmarkId::new("null_sink", trail), &trail, |b, &trail| {
            let mut engine = loaded_engine(trail, &tree);
            let mut sink = NullSink;
            let mut i = 0u32;
            b.iter(|| {
                i = i.wrapping_add(1);
                engine.handle_event(
                    InputEvent::PointerMove {
                        x: 400.0 + (i % 97) as f32,
                        y: 300.0 + (i % 53) as f32,
                        timestamp_ms: engine.clock_ms(),
                    },
                    &tree,
                );
                black_box(engine.tick(FRAME_MS, &mut sink))
            });
        });
    }

    group.bench_function("recording_sink", |b| {
        let mut engine = loaded_engine(32, &tree);
        let mut sink = RecordingSink::new();
        b.iter(|| black_box(engine.tick(FRAME_MS, &mut sink)));
    });

    group.finish();
}

fn bench_rescan(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier_rescan");

    for elements in [100u32, 1000, 5000] {
        let tree = document(elements);
        group.bench_with_input(BenchmarkId::from_parameter(elements), &tree, |b, tree| {
            let mut engine = MotionEngine::mount(MotionConfig::default(), &StaticProbe::desktop(), tree)
                .expect("mount");
            b.iter(|| black_box(engine.rescan(tree)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_rescan);
criterion_main!(benches);
