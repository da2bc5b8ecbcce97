/// A 2D point or direction in track space.
#[derive(
    Debug, Clone, Copy, PartialEq, derive_more::Add, derive_more::Sub, derive_more::Mul,
)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from the positive x axis.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

/// Distance from `p` to the closed segment `a`..`b`.
#[must_use]
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    let t = if len2 > 0.0 {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Vec2::new(0.0, 0.0).distance(Vec2::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_segment_distance_projects_onto_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        // above the middle: perpendicular distance
        assert_eq!(segment_distance(Vec2::new(5.0, 2.0), a, b), 2.0);
        // beyond the end: distance to the endpoint
        assert_eq!(segment_distance(Vec2::new(13.0, 4.0), a, b), 5.0);
        // degenerate segment
        assert_eq!(segment_distance(Vec2::new(3.0, 4.0), a, a), 5.0);
    }
}
