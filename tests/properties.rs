//! Property tests for the motion primitives

use campus_motion::cursor::{SpringFollower, SpringProfile, TrailBuffer};
use campus_motion::geometry::Position;
use campus_motion::particles::{ParticleConfig, ParticlePool};
use campus_motion::scroll::{frame_index, PinnedSection, ScrollFrame, ScrollSequencer, SequencerConfig};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = Position> {
    (-2000.0f32..2000.0, -2000.0f32..2000.0).prop_map(|(x, y)| Position::new(x, y))
}

fn sequencer(frames: usize) -> ScrollSequencer {
    ScrollSequencer::new(
        PinnedSection::new(0.0, 1000.0),
        (0..frames).map(|i| ScrollFrame::text(i, "frame")).collect(),
        SequencerConfig::default(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn trail_is_bounded_fifo(
        capacity in 1usize..=64,
        ops in prop::collection::vec((position(), any::<bool>()), 0..200),
    ) {
        let mut trail = TrailBuffer::new(capacity, 2.0, 30);
        for (point, age) in ops {
            trail.push(point);
            if age {
                trail.tick();
            }
            prop_assert!(trail.len() <= capacity);

            // Oldest first means ids ascend and ages do not
            let entries: Vec<_> = trail.iter().collect();
            for pair in entries.windows(2) {
                prop_assert!(pair[0].id < pair[1].id);
                prop_assert!(pair[0].age_ticks >= pair[1].age_ticks);
            }
        }
    }

    #[test]
    fn frame_index_is_monotonic(
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
        frames in 1usize..32,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(frame_index(lo, frames) <= frame_index(hi, frames));
        prop_assert!(frame_index(hi, frames) < frames);
        prop_assert_eq!(frame_index(1.0, frames), frames - 1);
    }

    #[test]
    fn active_frame_depends_only_on_final_scroll(
        frames in 1usize..12,
        path in prop::collection::vec(-200.0f32..1200.0, 1..60),
    ) {
        let mut scrubbed = sequencer(frames);
        for &offset in &path {
            scrubbed.update_scroll(offset);
            scrubbed.tick(16.0, true);
        }

        let last = path[path.len() - 1];
        let mut direct = sequencer(frames);
        direct.update_scroll(last);

        prop_assert_eq!(scrubbed.active_index(), direct.active_index());
        prop_assert_eq!(
            scrubbed.active_index(),
            frame_index(PinnedSection::new(0.0, 1000.0).progress(last), frames)
        );
    }

    #[test]
    fn scrub_sequence_mirrors(
        frames in 2usize..12,
        steps in 2usize..80,
    ) {
        let offsets: Vec<f32> = (0..=steps)
            .map(|i| i as f32 * 1000.0 / steps as f32)
            .collect();

        let mut forward_seq = sequencer(frames);
        let forward: Vec<usize> = offsets
            .iter()
            .map(|&o| {
                forward_seq.update_scroll(o);
                forward_seq.active_index()
            })
            .collect();

        let mut backward_seq = sequencer(frames);
        backward_seq.update_scroll(1000.0);
        let mut backward: Vec<usize> = offsets
            .iter()
            .rev()
            .map(|&o| {
                backward_seq.update_scroll(o);
                backward_seq.active_index()
            })
            .collect();
        backward.reverse();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn follower_never_overshoots_and_settles(
        stiffness in 50.0f32..600.0,
        mass in 0.5f32..3.0,
        start in position(),
        target in position(),
        dt in 8.0f32..50.0,
    ) {
        let mut follower =
            SpringFollower::new(SpringProfile::critically_damped(stiffness, mass), start);
        follower.set_target(target);

        // Ten seconds of frames
        let steps = (10_000.0 / dt).ceil() as usize;
        let mut distance = start.distance_to(target);
        for _ in 0..steps {
            follower.step(dt);
            let next = follower.position().distance_to(target);
            prop_assert!(next <= distance + 1e-3);
            distance = next;
        }
        prop_assert!(follower.is_settled());
    }

    #[test]
    fn particle_pool_respects_capacity(
        max_particles in 1usize..128,
        seed in any::<u64>(),
        rounds in prop::collection::vec((0usize..20, 1.0f32..100.0), 1..50),
    ) {
        let config = ParticleConfig {
            max_particles,
            seed: Some(seed),
            ..Default::default()
        };
        let mut pool = ParticlePool::new(config);
        for (emits, dt) in rounds {
            for _ in 0..emits {
                pool.emit(Position::new(640.0, 360.0));
                pool.maybe_emit(Position::new(640.0, 360.0), 1.0);
            }
            prop_assert!(pool.len() <= max_particles);
            pool.tick(dt);
            prop_assert!(pool.iter().all(|p| !p.is_expired()));
        }
    }
}
