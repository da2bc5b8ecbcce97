//! Real-time track simulation coupling the population to its fitness scores.
//!
//! One generation's evaluation is a [`TrackRun`]: every genotype is decoded
//! into an agent controlling a constant-speed vehicle on a checkpoint
//! corridor [`Track`]. Each tick the vehicles sense, decide, steer, and have
//! their completion score recomputed against the ordered checkpoint
//! sequence. A vehicle dies when it leaves the corridor or goes too long
//! without capturing a checkpoint; once every vehicle is dead, the scored
//! population goes back to the genetic algorithm.

pub mod geometry;
pub mod run;
pub mod track;
pub mod vehicle;

pub use self::{
    geometry::Vec2,
    run::{CHECKPOINT_TIMEOUT_SECS, RunError, TickReport, TrackRun},
    track::{SENSOR_COUNT, Track, TrackError},
    vehicle::{CONTROL_COUNT, Vehicle},
};
