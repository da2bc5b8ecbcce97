use crate::geometry::Vec2;

/// Number of control signals a vehicle consumes: steer-left and steer-right
/// intensities, each in `(0, 1)`.
pub const CONTROL_COUNT: usize = 2;

/// Forward speed of every vehicle, in track units per second.
pub const VEHICLE_SPEED: f32 = 3.0;

/// Maximum turn rate at full steering input, radians per second.
const TURN_RATE: f32 = 1.75;

/// A simulated vehicle: constant forward speed, heading steered by the
/// control vector. Kinematics only; collision and sensing live on the track.
#[derive(Debug, Clone)]
pub struct Vehicle {
    position: Vec2,
    heading: f32,
    speed: f32,
}

impl Vehicle {
    #[must_use]
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: VEHICLE_SPEED,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Heading angle in radians from the positive x axis.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Applies one tick of control: net steering is steer-left minus
    /// steer-right, then the vehicle advances along its heading.
    ///
    /// # Panics
    ///
    /// Panics if `controls` does not supply [`CONTROL_COUNT`] signals.
    pub fn apply_controls(&mut self, controls: &[f32], dt: f32) {
        assert_eq!(controls.len(), CONTROL_COUNT, "control width mismatch");
        let steer = controls[0] - controls[1];
        self.heading += steer * TURN_RATE * dt;
        self.position = self.position + Vec2::from_angle(self.heading) * (self.speed * dt);
    }

    /// Immobilizes the vehicle for the rest of the generation.
    pub fn stop(&mut self) {
        self.speed = 0.0;
    }

    /// Puts the vehicle back at a spawn pose at full speed.
    pub fn respawn(&mut self, position: Vec2, heading: f32) {
        self.position = position;
        self.heading = heading;
        self.speed = VEHICLE_SPEED;
    }
}
