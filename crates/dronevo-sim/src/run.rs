use dronevo_brain::{Agent, ParameterCountError};
use dronevo_genetics::Genotype;

use crate::{
    geometry::Vec2,
    track::{SENSOR_COUNT, Track},
    vehicle::{CONTROL_COUNT, Vehicle},
};

/// Maximum simulated seconds between two checkpoint captures before a
/// vehicle dies.
pub const CHECKPOINT_TIMEOUT_SECS: f32 = 7.0;

/// Why a [`TrackRun`] could not be set up.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RunError {
    #[display("{_0}")]
    Decode(ParameterCountError),
    #[display("topology consumes {actual} sensor readings, track produces {expected}")]
    SensorWidthMismatch { expected: usize, actual: usize },
    #[display("topology produces {actual} control signals, vehicle consumes {expected}")]
    ControlWidthMismatch { expected: usize, actual: usize },
}

/// One agent-controlled vehicle racing in the current generation.
#[derive(Debug)]
pub struct RaceVehicle {
    agent: Agent,
    vehicle: Vehicle,
    /// Next checkpoint to capture; starts at 1 (checkpoint 0 is the start).
    checkpoint_index: usize,
    time_since_checkpoint: f32,
}

impl RaceVehicle {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.agent.is_alive()
    }

    /// Track-completion score in `[0, 1]`, mirrored into the genotype's
    /// evaluation every tick.
    #[must_use]
    pub fn completion(&self) -> f32 {
        self.agent.genotype().evaluation()
    }

    #[must_use]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    #[must_use]
    pub fn checkpoint_index(&self) -> usize {
        self.checkpoint_index
    }
}

/// At-most-once notifications raised by one simulation tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Vehicles that died during this tick, by index.
    pub died: Vec<usize>,
    /// New best-vehicle index, present only when the pointer moved.
    pub best_changed: Option<usize>,
    /// The generation is over: every vehicle is dead and all evaluations
    /// are final.
    pub all_dead: bool,
}

/// Runs one generation's real-time evaluation on a track.
///
/// Spawns one vehicle per genotype at the track's start pose and steps them
/// tick by tick until every vehicle has died, continuously maintaining each
/// genotype's evaluation and a pointer to the best vehicle so far.
///
/// Pausing is the caller's concern: withholding [`tick`](Self::tick) calls
/// freezes the simulation without touching per-vehicle state, and resuming
/// continues timers where they left off.
#[derive(Debug)]
pub struct TrackRun<'t> {
    track: &'t Track,
    racers: Vec<RaceVehicle>,
    alive_count: usize,
    best_index: Option<usize>,
}

impl<'t> TrackRun<'t> {
    /// Decodes every genotype into an agent and spawns its vehicle. The
    /// topology must agree with the track's sensor count and the vehicle's
    /// control count, and every genotype must decode against it.
    pub fn new(
        track: &'t Track,
        population: Vec<Genotype>,
        topology: &[usize],
    ) -> Result<Self, RunError> {
        let inputs = *topology.first().expect("topology is never empty");
        if inputs != SENSOR_COUNT {
            return Err(RunError::SensorWidthMismatch {
                expected: SENSOR_COUNT,
                actual: inputs,
            });
        }
        let outputs = *topology.last().expect("topology is never empty");
        if outputs != CONTROL_COUNT {
            return Err(RunError::ControlWidthMismatch {
                expected: CONTROL_COUNT,
                actual: outputs,
            });
        }

        let (start, heading) = track.start_pose();
        let racers = population
            .into_iter()
            .map(|genotype| {
                let agent = Agent::new(genotype, topology).map_err(RunError::Decode)?;
                Ok(RaceVehicle {
                    agent,
                    vehicle: Vehicle::new(start, heading),
                    checkpoint_index: 1,
                    time_since_checkpoint: 0.0,
                })
            })
            .collect::<Result<Vec<_>, RunError>>()?;

        let alive_count = racers.len();
        Ok(Self {
            track,
            racers,
            alive_count,
            best_index: None,
        })
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    #[must_use]
    pub fn racers(&self) -> &[RaceVehicle] {
        &self.racers
    }

    /// The alive-or-last-known vehicle with the highest completion score.
    #[must_use]
    pub fn best_vehicle(&self) -> Option<&RaceVehicle> {
        self.best_index.map(|index| &self.racers[index])
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// For every still-alive vehicle: read sensors, ask the agent for
    /// controls, steer and integrate, recompute the completion score, and
    /// check the death conditions (leaving the corridor, or exceeding
    /// [`CHECKPOINT_TIMEOUT_SECS`] since the last capture). Death is
    /// terminal for the rest of the generation: the vehicle is immobilized,
    /// its agent killed, and its evaluation frozen at the final score.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        for (index, racer) in self.racers.iter_mut().enumerate() {
            if !racer.agent.is_alive() {
                continue;
            }

            let readings = self
                .track
                .sense(racer.vehicle.position(), racer.vehicle.heading());
            if let Some(controls) = racer.agent.decide(&readings) {
                racer.vehicle.apply_controls(&controls, dt);
            }
            racer.time_since_checkpoint += dt;

            let score = completion_score(
                self.track,
                racer.vehicle.position(),
                &mut racer.checkpoint_index,
                &mut racer.time_since_checkpoint,
            );
            racer.agent.genotype_mut().set_evaluation(score);

            let crashed = !self.track.contains(racer.vehicle.position());
            let timed_out = racer.time_since_checkpoint > CHECKPOINT_TIMEOUT_SECS;
            if (crashed || timed_out) && racer.agent.kill() {
                racer.vehicle.stop();
                self.alive_count -= 1;
                report.died.push(index);
            }
        }

        // single writer for the best pointer: strictly higher score wins,
        // and the pointer survives its vehicle's death (last known best)
        let previous_best = self.best_index;
        for (index, racer) in self.racers.iter().enumerate() {
            let beats_current = match self.best_index {
                Some(best) => racer.completion() > self.racers[best].completion(),
                None => true,
            };
            if beats_current {
                self.best_index = Some(index);
            }
        }
        if self.best_index != previous_best {
            report.best_changed = self.best_index;
        }

        report.all_dead = self.alive_count == 0;
        report
    }

    /// Hands the scored genotypes back in spawn order. All evaluations are
    /// written before this returns, so the genetic algorithm observes a
    /// fully-scored population.
    #[must_use]
    pub fn into_population(self) -> Vec<Genotype> {
        self.racers
            .into_iter()
            .map(|racer| racer.agent.into_genotype())
            .collect()
    }

    /// Hard restart: every agent is revived and every vehicle goes back to
    /// the start pose with its checkpoint progress cleared. The next
    /// generation of ticks must be started explicitly by the caller.
    pub fn restart(&mut self) {
        let (start, heading) = self.track.start_pose();
        for racer in &mut self.racers {
            racer.agent.reset();
            racer.vehicle.respawn(start, heading);
            racer.checkpoint_index = 1;
            racer.time_since_checkpoint = 0.0;
            racer.agent.genotype_mut().set_evaluation(0.0);
        }
        self.alive_count = self.racers.len();
        self.best_index = None;
    }
}

/// Completion score for a vehicle position against the ordered checkpoint
/// sequence.
///
/// Runs the capture check as a bounded loop (a single tick may capture
/// several checkpoints if geometry allows): while the position lies within
/// the current checkpoint's capture radius, advance the index and reset the
/// capture timer. Once every checkpoint is captured the score is exactly 1;
/// otherwise it is the accumulated reward of the last captured checkpoint
/// plus the distance-shaped share of the next one.
fn completion_score(
    track: &Track,
    position: Vec2,
    checkpoint_index: &mut usize,
    time_since_checkpoint: &mut f32,
) -> f32 {
    let checkpoints = track.checkpoints();
    loop {
        if *checkpoint_index >= checkpoints.len() {
            return 1.0;
        }
        let checkpoint = &checkpoints[*checkpoint_index];
        let distance = position.distance(checkpoint.position());
        if distance <= checkpoint.capture_radius() {
            *checkpoint_index += 1;
            *time_since_checkpoint = 0.0;
            continue;
        }
        return checkpoints[*checkpoint_index - 1].accumulated_reward()
            + checkpoint.reward_share(distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    // input width must match SENSOR_COUNT, output width CONTROL_COUNT
    const TOPOLOGY: [usize; 2] = [5, 2];
    const PARAMETER_COUNT: usize = 5 * 2 + 2;

    fn straight_track() -> Track {
        let waypoints = [
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(12.0, 0.0),
            Vec2::new(18.0, 0.0),
        ];
        Track::new(&waypoints, 1.5, 4.0).unwrap()
    }

    /// All-zero parameters make every control 0.5, so the vehicle flies
    /// straight down the corridor.
    fn straight_flier() -> Genotype {
        Genotype::new(vec![0.0; PARAMETER_COUNT])
    }

    /// A heavy bias on the steer-left output makes the vehicle circle.
    fn circler() -> Genotype {
        let mut parameters = vec![0.0; PARAMETER_COUNT];
        parameters[10] = 10.0; // bias of control 0
        Genotype::new(parameters)
    }

    fn run_to_completion(run: &mut TrackRun<'_>) -> usize {
        for ticks in 1..=20_000 {
            if run.tick(DT).all_dead {
                return ticks;
            }
        }
        panic!("generation did not terminate");
    }

    #[test]
    fn test_topology_width_mismatches_are_fatal() {
        let track = straight_track();
        let err = TrackRun::new(&track, vec![straight_flier()], &[4, 2]).unwrap_err();
        assert!(matches!(
            err,
            RunError::SensorWidthMismatch {
                expected: SENSOR_COUNT,
                actual: 4
            }
        ));
        let err = TrackRun::new(&track, vec![straight_flier()], &[5, 3]).unwrap_err();
        assert!(matches!(
            err,
            RunError::ControlWidthMismatch {
                expected: CONTROL_COUNT,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_genotype_decode_failure_is_fatal() {
        let track = straight_track();
        let err = TrackRun::new(&track, vec![Genotype::new(vec![0.0; 3])], &TOPOLOGY).unwrap_err();
        assert!(matches!(err, RunError::Decode(_)));
    }

    #[test]
    fn test_straight_flier_completes_the_track() {
        let track = straight_track();
        let mut run = TrackRun::new(&track, vec![straight_flier()], &TOPOLOGY).unwrap();
        run_to_completion(&mut run);
        let population = run.into_population();
        assert!((population[0].evaluation() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_monotone_for_forward_progress() {
        let track = straight_track();
        let mut run = TrackRun::new(&track, vec![straight_flier()], &TOPOLOGY).unwrap();
        let mut last = 0.0;
        while !run.tick(DT).all_dead {
            let score = run.racers()[0].completion();
            if run.racers()[0].is_alive() {
                assert!(
                    score >= last - 1e-6,
                    "score regressed from {last} to {score}"
                );
                last = score;
            }
        }
    }

    #[test]
    fn test_passed_checkpoints_no_longer_matter() {
        let track = straight_track();
        let mut run = TrackRun::new(&track, vec![straight_flier()], &TOPOLOGY).unwrap();
        // fly until the second checkpoint (index 2) is the target
        while run.racers()[0].checkpoint_index() < 2 {
            run.tick(DT);
        }
        // score must already include checkpoint 1's full share
        let share = track.checkpoints()[1].accumulated_reward();
        assert!(run.racers()[0].completion() >= share - 1e-6);
    }

    #[test]
    fn test_timeout_death_far_from_next_checkpoint() {
        // next checkpoint 100 units away; at speed 3 the vehicle cannot
        // reach it within the 7 second timeout
        let track = Track::new(
            &[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
            1.0,
            4.0,
        )
        .unwrap();
        let mut run = TrackRun::new(&track, vec![straight_flier()], &TOPOLOGY).unwrap();
        let ticks = run_to_completion(&mut run);
        #[expect(clippy::cast_precision_loss)]
        let elapsed = ticks as f32 * DT;
        assert!((elapsed - CHECKPOINT_TIMEOUT_SECS).abs() < 0.1);
        let population = run.into_population();
        assert!(population[0].evaluation() > 0.0);
        assert!(population[0].evaluation() < 1.0);
    }

    #[test]
    fn test_wall_collision_kills_before_timeout() {
        // an L-shaped corridor; the straight flier overshoots the corner
        let track = Track::new(
            &[Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(5.0, 14.0)],
            1.0,
            2.0,
        )
        .unwrap();
        let mut run = TrackRun::new(&track, vec![straight_flier()], &TOPOLOGY).unwrap();
        let ticks = run_to_completion(&mut run);
        #[expect(clippy::cast_precision_loss)]
        let elapsed = ticks as f32 * DT;
        assert!(elapsed < CHECKPOINT_TIMEOUT_SECS);
        let population = run.into_population();
        assert!(population[0].evaluation() < 1.0);
    }

    #[test]
    fn test_death_notification_fires_once_per_vehicle() {
        let track = straight_track();
        let mut run =
            TrackRun::new(&track, vec![straight_flier(), circler()], &TOPOLOGY).unwrap();
        let mut deaths = Vec::new();
        for _ in 0..20_000 {
            let report = run.tick(DT);
            deaths.extend(report.died.iter().copied());
            if report.all_dead {
                break;
            }
        }
        deaths.sort_unstable();
        assert_eq!(deaths, vec![0, 1]);
    }

    #[test]
    fn test_best_vehicle_tracks_highest_score() {
        let track = straight_track();
        let mut run =
            TrackRun::new(&track, vec![circler(), straight_flier()], &TOPOLOGY).unwrap();
        run_to_completion(&mut run);
        // the straight flier finishes the track, the circler does not
        assert!(run.racers()[1].completion() > run.racers()[0].completion());
        let best = run.best_vehicle().unwrap();
        assert!((best.completion() - run.racers()[1].completion()).abs() < 1e-6);
    }

    #[test]
    fn test_restart_revives_the_field() {
        let track = straight_track();
        let mut run = TrackRun::new(&track, vec![straight_flier(), circler()], &TOPOLOGY).unwrap();
        run_to_completion(&mut run);
        assert_eq!(run.alive_count(), 0);

        run.restart();
        assert_eq!(run.alive_count(), 2);
        for racer in run.racers() {
            assert!(racer.is_alive());
            assert_eq!(racer.checkpoint_index(), 1);
            assert_eq!(racer.completion(), 0.0);
        }
        // the field races again after a restart
        assert!(!run.tick(DT).all_dead);
    }
}
