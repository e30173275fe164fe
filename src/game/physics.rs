//! Collision and integration primitives
//!
//! Everything here is pure: callers pass positions and velocities in and get
//! corrected values back. Degenerate geometry (coincident centers, a center
//! buried inside a wall) never divides by zero.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Distances below this are treated as zero
pub const EPSILON: f32 = 1e-6;

/// 2D vector in field units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit vector, or `None` for a (near) zero vector
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len > EPSILON {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Closest point inside the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Distance from `p` to the rectangle (zero when inside)
    #[cfg(test)]
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }
}

/// One solid wall block and the direction that points back into the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub rect: Rect,
    pub inward: Vec2,
}

/// Overlap between two circles; `normal` points from the first to the second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub distance: f32,
    /// How far the circles overlap
    pub penetration: f32,
}

/// Physics system for circle bodies on a walled field
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Check whether two circles overlap
    pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
        let d = b - a;
        let combined = radius_a + radius_b;
        d.dot(d) < combined * combined
    }

    /// Contact data for two overlapping circles.
    ///
    /// Returns `None` when they don't touch, and also when the centers
    /// coincide, since no collision normal exists then.
    pub fn circle_contact(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> Option<Contact> {
        if !Self::circles_overlap(a, radius_a, b, radius_b) {
            return None;
        }
        let d = b - a;
        let distance = d.length();
        if distance <= EPSILON {
            return None;
        }
        Some(Contact {
            normal: d * (1.0 / distance),
            distance,
            penetration: radius_a + radius_b - distance,
        })
    }

    /// Impulse response between two bodies along `normal` (pointing from
    /// body 1 to body 2). Returns the new velocities, or `None` when the
    /// bodies already separate along the normal.
    pub fn resolve_impulse(
        mass1: f32,
        vel1: Vec2,
        mass2: f32,
        vel2: Vec2,
        normal: Vec2,
        restitution: f32,
    ) -> Option<(Vec2, Vec2)> {
        let closing = (vel2 - vel1).dot(normal);
        if closing > 0.0 {
            return None;
        }

        let inv1 = 1.0 / mass1;
        let inv2 = 1.0 / mass2;
        let j = -(1.0 + restitution) * closing / (inv1 + inv2);

        Some((vel1 - normal * (j * inv1), vel2 + normal * (j * inv2)))
    }

    /// Push a circle out of any wall it overlaps and reflect the normal
    /// velocity component, scaled by `restitution`.
    ///
    /// Returns the collision normal of the last wall hit, if any.
    pub fn reflect_off_walls(
        pos: &mut Vec2,
        vel: &mut Vec2,
        radius: f32,
        walls: &[WallSegment],
        restitution: f32,
    ) -> Option<Vec2> {
        let mut hit = None;

        for wall in walls {
            let closest = wall.rect.closest_point(*pos);
            let delta = *pos - closest;
            let distance = delta.length();
            if distance >= radius {
                continue;
            }

            let normal = if distance > EPSILON {
                *pos = closest + delta * (radius / distance);
                delta * (1.0 / distance)
            } else {
                // Center is inside the block: move out through its inner face
                *pos = Self::push_through_face(*pos, radius, wall);
                wall.inward
            };

            let vn = vel.dot(normal);
            if vn < 0.0 {
                *vel = *vel - normal * ((1.0 + restitution) * vn);
            }
            hit = Some(normal);
        }

        hit
    }

    fn push_through_face(pos: Vec2, radius: f32, wall: &WallSegment) -> Vec2 {
        let r = &wall.rect;
        let mut out = pos;
        if wall.inward.x > 0.0 {
            out.x = r.max.x + radius;
        } else if wall.inward.x < 0.0 {
            out.x = r.min.x - radius;
        }
        if wall.inward.y > 0.0 {
            out.y = r.max.y + radius;
        } else if wall.inward.y < 0.0 {
            out.y = r.min.y - radius;
        }
        out
    }

    /// Scale a velocity down to `max` if it exceeds it
    pub fn clamp_speed(vel: Vec2, max: f32) -> Vec2 {
        let speed = vel.length();
        if speed > max && speed > EPSILON {
            vel * (max / speed)
        } else {
            vel
        }
    }

    /// Scale a non-zero velocity up to `min` if it's slower
    pub fn enforce_min_speed(vel: Vec2, min: f32) -> Vec2 {
        let speed = vel.length();
        if speed > EPSILON && speed < min {
            vel * (min / speed)
        } else {
            vel
        }
    }
}
