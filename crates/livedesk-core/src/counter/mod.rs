//! Simulated live-visitor counter: day-keyed state, jittered increments,
//! and the self-rescheduling timer.

pub mod engine;
pub mod repository;

pub use engine::CounterEngine;
pub use repository::CounterRepository;
