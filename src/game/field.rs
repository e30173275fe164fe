//! Field geometry: walls, goal mouths and kickoff spots

use crate::config::FieldConfig;
use crate::ws::protocol::Side;

use super::physics::{Rect, Vec2, WallSegment};

/// Immutable field layout built once per room
#[derive(Debug, Clone)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// Goal mouth rectangles, indexed by the side that defends them
    pub goals: [Rect; 2],
    /// Walls with openings at the goal mouths (ball collisions)
    walls: Vec<WallSegment>,
    /// Closed boundary (player collisions)
    solid_walls: Vec<WallSegment>,
}

impl Field {
    pub fn new(config: &FieldConfig) -> Self {
        let (w, h, t) = (config.width, config.height, config.wall_thickness);
        let goal_top = (h - config.goal_size) / 2.0;
        let goal_bottom = goal_top + config.goal_size;

        let goals = [
            Rect::new(0.0, goal_top, t, config.goal_size),
            Rect::new(w - t, goal_top, t, config.goal_size),
        ];

        let right = Vec2::new(1.0, 0.0);
        let left = Vec2::new(-1.0, 0.0);
        let down = Vec2::new(0.0, 1.0);
        let up = Vec2::new(0.0, -1.0);

        let top_wall = WallSegment { rect: Rect::new(0.0, 0.0, w, t), inward: down };
        let bottom_wall = WallSegment { rect: Rect::new(0.0, h - t, w, t), inward: up };

        let walls = vec![
            top_wall,
            bottom_wall,
            WallSegment { rect: Rect::new(0.0, 0.0, t, goal_top), inward: right },
            WallSegment { rect: Rect::new(0.0, goal_bottom, t, h - goal_bottom), inward: right },
            WallSegment { rect: Rect::new(w - t, 0.0, t, goal_top), inward: left },
            WallSegment { rect: Rect::new(w - t, goal_bottom, t, h - goal_bottom), inward: left },
        ];

        let solid_walls = vec![
            top_wall,
            bottom_wall,
            WallSegment { rect: Rect::new(0.0, 0.0, t, h), inward: right },
            WallSegment { rect: Rect::new(w - t, 0.0, t, h), inward: left },
        ];

        Self {
            width: w,
            height: h,
            wall_thickness: t,
            goals,
            walls,
            solid_walls,
        }
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn solid_walls(&self) -> &[WallSegment] {
        &self.solid_walls
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Kickoff spot: a quarter of the way in from the player's own goal
    pub fn kickoff_position(&self, side: Side) -> Vec2 {
        let x = match side {
            Side::Left => self.width * 0.25,
            Side::Right => self.width * 0.75,
        };
        Vec2::new(x, self.height / 2.0)
    }

    /// Whether `y` lies within the goal mouths' vertical span (inclusive)
    pub fn in_goal_span(&self, y: f32) -> bool {
        let mouth = &self.goals[0];
        y >= mouth.min.y && y <= mouth.max.y
    }

    /// The side credited with a goal if a ball at `pos` has crossed a goal
    /// line. The goal line is the inner face of the side wall.
    pub fn goal_scored_by(&self, pos: Vec2, radius: f32) -> Option<Side> {
        if !self.in_goal_span(pos.y) {
            return None;
        }
        if pos.x - radius <= self.wall_thickness {
            Some(Side::Right)
        } else if pos.x + radius >= self.width - self.wall_thickness {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// Keep a ball center inside `[radius, size - radius]` on both axes,
    /// except horizontally while it's inside a goal mouth's span.
    pub fn confine(&self, pos: &mut Vec2, radius: f32) {
        pos.y = pos.y.clamp(radius, self.height - radius);
        if !self.in_goal_span(pos.y) {
            pos.x = pos.x.clamp(radius, self.width - radius);
        }
    }

    /// If `pos` sits within `threshold` of a corner (measured from the inner
    /// wall faces), the unit directions pointing away from that corner.
    pub fn corner_escape(&self, pos: Vec2, threshold: f32) -> Option<(f32, f32)> {
        let t = self.wall_thickness;
        let sx = if pos.x < t + threshold {
            1.0
        } else if pos.x > self.width - t - threshold {
            -1.0
        } else {
            return None;
        };
        let sy = if pos.y < t + threshold {
            1.0
        } else if pos.y > self.height - t - threshold {
            -1.0
        } else {
            return None;
        };
        Some((sx, sy))
    }
}
