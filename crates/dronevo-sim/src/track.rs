use crate::geometry::{Vec2, segment_distance};

/// Number of sensor readings the track produces per vehicle: five distance
/// rays fanned across the vehicle's heading.
pub const SENSOR_COUNT: usize = 5;

/// Maximum distance a sensor ray can detect, in track units.
pub const SENSOR_RANGE: f32 = 5.0;

const SENSOR_ANGLES: [f32; SENSOR_COUNT] = [
    -std::f32::consts::FRAC_PI_3,
    -std::f32::consts::FRAC_PI_6,
    0.0,
    std::f32::consts::FRAC_PI_6,
    std::f32::consts::FRAC_PI_3,
];

const RAY_STEP: f32 = 0.1;

/// An ordered track waypoint with its precomputed distance and reward-share
/// metadata. Checkpoint 0 is the start and is never captured.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    position: Vec2,
    capture_radius: f32,
    distance_to_previous: f32,
    accumulated_distance: f32,
    reward_value: f32,
    accumulated_reward: f32,
}

impl Checkpoint {
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn capture_radius(&self) -> f32 {
        self.capture_radius
    }

    #[must_use]
    pub fn distance_to_previous(&self) -> f32 {
        self.distance_to_previous
    }

    #[must_use]
    pub fn accumulated_distance(&self) -> f32 {
        self.accumulated_distance
    }

    /// This checkpoint's share of the total track reward, in `[0, 1]`.
    #[must_use]
    pub fn reward_value(&self) -> f32 {
        self.reward_value
    }

    /// Total reward earned once this checkpoint is captured.
    #[must_use]
    pub fn accumulated_reward(&self) -> f32 {
        self.accumulated_reward
    }

    /// Maps remaining distance to this checkpoint into a fraction of its
    /// reward share: a linear falloff that reaches the full share at zero
    /// distance and zero at `distance_to_previous` or beyond.
    #[must_use]
    pub fn reward_share(&self, distance: f32) -> f32 {
        let falloff = 1.0 - distance / self.distance_to_previous;
        (self.reward_value * falloff).clamp(0.0, self.reward_value)
    }
}

/// Invalid checkpoint layout.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrackError {
    #[display("a track needs at least 2 checkpoints, got {len}")]
    TooFewCheckpoints { len: usize },
    #[display("zero-length segment before checkpoint {index}")]
    ZeroLengthSegment { index: usize },
}

/// A checkpoint corridor: an ordered waypoint polyline with a fixed
/// half-width. Vehicles are inside the track while they stay within
/// `half_width` of the centerline; sensors measure distance to the corridor
/// walls along rays.
///
/// The checkpoint sequence and its reward metadata are built once and are
/// immutable for the lifetime of the track.
#[derive(Debug, Clone)]
pub struct Track {
    checkpoints: Vec<Checkpoint>,
    half_width: f32,
    length: f32,
    start_heading: f32,
}

impl Track {
    /// Builds a track from waypoints, precomputing each checkpoint's
    /// distance to its predecessor, accumulated distance, reward share, and
    /// accumulated reward. The shares sum to 1 over the whole track.
    pub fn new(
        waypoints: &[Vec2],
        capture_radius: f32,
        half_width: f32,
    ) -> Result<Self, TrackError> {
        assert!(capture_radius > 0.0 && half_width > 0.0);
        if waypoints.len() < 2 {
            return Err(TrackError::TooFewCheckpoints {
                len: waypoints.len(),
            });
        }

        let mut checkpoints = Vec::with_capacity(waypoints.len());
        checkpoints.push(Checkpoint {
            position: waypoints[0],
            capture_radius,
            distance_to_previous: 0.0,
            accumulated_distance: 0.0,
            reward_value: 0.0,
            accumulated_reward: 0.0,
        });
        for (index, &position) in waypoints.iter().enumerate().skip(1) {
            let distance_to_previous = position.distance(waypoints[index - 1]);
            if distance_to_previous <= 0.0 {
                return Err(TrackError::ZeroLengthSegment { index });
            }
            let previous = &checkpoints[index - 1];
            checkpoints.push(Checkpoint {
                position,
                capture_radius,
                distance_to_previous,
                accumulated_distance: previous.accumulated_distance + distance_to_previous,
                reward_value: 0.0,
                accumulated_reward: 0.0,
            });
        }

        let length = checkpoints
            .last()
            .expect("at least two checkpoints")
            .accumulated_distance;
        for index in 1..checkpoints.len() {
            let previous_reward = checkpoints[index - 1].accumulated_reward;
            let checkpoint = &mut checkpoints[index];
            checkpoint.reward_value =
                checkpoint.accumulated_distance / length - previous_reward;
            checkpoint.accumulated_reward = previous_reward + checkpoint.reward_value;
        }

        let first_segment = waypoints[1] - waypoints[0];
        Ok(Self {
            checkpoints,
            half_width,
            length,
            start_heading: first_segment.y.atan2(first_segment.x),
        })
    }

    /// A built-in track by identifier, or `None` for an unknown id.
    #[must_use]
    pub fn builtin(id: &str) -> Option<Self> {
        let waypoints: Vec<Vec2> = match id {
            "oval" => {
                let radius = 15.0;
                (0..12)
                    .map(|i| {
                        #[expect(clippy::cast_precision_loss)]
                        let angle = std::f32::consts::TAU * i as f32 / 12.0;
                        Vec2::new(radius * angle.cos(), radius * angle.sin())
                    })
                    .collect()
            }
            "slalom" => [
                (0.0, 0.0),
                (10.0, 4.0),
                (20.0, -4.0),
                (30.0, 4.0),
                (40.0, -4.0),
                (50.0, 0.0),
            ]
            .into_iter()
            .map(|(x, y)| Vec2::new(x, y))
            .collect(),
            _ => return None,
        };
        Some(Self::new(&waypoints, 2.5, 4.0).expect("built-in track layouts are valid"))
    }

    /// Identifiers accepted by [`builtin`](Self::builtin).
    #[must_use]
    pub fn builtin_ids() -> &'static [&'static str] {
        &["oval", "slalom"]
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Accumulated centerline distance of the whole track.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Pose every vehicle spawns at: the first checkpoint, facing along the
    /// first segment.
    #[must_use]
    pub fn start_pose(&self) -> (Vec2, f32) {
        (self.checkpoints[0].position, self.start_heading)
    }

    /// Shortest distance from a point to the track centerline.
    #[must_use]
    pub fn centerline_offset(&self, point: Vec2) -> f32 {
        self.checkpoints
            .windows(2)
            .map(|pair| segment_distance(point, pair[0].position, pair[1].position))
            .fold(f32::INFINITY, f32::min)
    }

    /// Whether a point lies inside the corridor.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.centerline_offset(point) <= self.half_width
    }

    /// Reads the sensor suite for a vehicle pose: one wall distance per ray,
    /// normalized to `[0, 1]` by the sensor range.
    #[must_use]
    pub fn sense(&self, position: Vec2, heading: f32) -> Vec<f32> {
        SENSOR_ANGLES
            .iter()
            .map(|&angle| {
                let direction = Vec2::from_angle(heading + angle);
                let mut travelled = RAY_STEP;
                while travelled < SENSOR_RANGE {
                    if !self.contains(position + direction * travelled) {
                        break;
                    }
                    travelled += RAY_STEP;
                }
                travelled.min(SENSOR_RANGE) / SENSOR_RANGE
            })
            .collect()
    }
}
