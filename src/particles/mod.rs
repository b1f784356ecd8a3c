//! Decorative sparkle particles
//!
//! # Emission triggers
//!
//! | Trigger | Rate |
//! |---------|------|
//! | Scroll burst | per-tick probability × tier factor × scroll activity |
//! | Click | `click_burst` × tier factor, at once |
//!
//! Both paths go through [`ParticlePool::emit`], which drops the emission
//! when the pool is full. The pool is the only owner of particle state; the
//! engine only sees ids, which double as render handles and are released
//! when the pool reports them removed.

mod burst;
mod pool;

pub use burst::ScrollBurst;
pub use pool::{Particle, ParticleConfig, ParticlePool, ParticleStats};
