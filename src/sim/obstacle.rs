//! Static obstacle field
//!
//! Buildings are laid out once per run from fixed footprint data and never
//! move. Everything else asks the field whether a body would collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, Rect};
use crate::consts::{OBSTACLE_INSET, SAFE_ZONE_SIZE};

/// A single static collision body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Rect(Rect),
    Circle(Circle),
}

impl Obstacle {
    /// Does `body` overlap this obstacle?
    pub fn collides(&self, body: &Rect) -> bool {
        match self {
            Obstacle::Rect(rect) => rect.inflate(-OBSTACLE_INSET, -OBSTACLE_INSET).intersects(body),
            Obstacle::Circle(circle) => circle.intersects_rect(body),
        }
    }

    /// Axis-aligned bounds (circles report their bounding square)
    pub fn bounds(&self) -> Rect {
        match self {
            Obstacle::Rect(rect) => *rect,
            Obstacle::Circle(circle) => circle.bounds(),
        }
    }
}

/// Building footprints (x, y, width, height)
const TOWN_BUILDINGS: [(f32, f32, f32, f32); 9] = [
    (300.0, 200.0, 250.0, 250.0),   // House 1
    (800.0, 200.0, 300.0, 250.0),   // House 2
    (1400.0, 200.0, 300.0, 250.0),  // House 3
    (2000.0, 200.0, 250.0, 250.0),  // House 4
    (500.0, 600.0, 350.0, 300.0),   // Warehouse
    (1400.0, 600.0, 350.0, 300.0),  // Store
    (300.0, 1200.0, 300.0, 300.0),  // Tavern
    (1000.0, 1200.0, 400.0, 300.0), // Market
    (1800.0, 1200.0, 350.0, 300.0), // Town hall
];

/// Round footprints (center x, center y, radius)
const TOWN_WELLS: [(f32, f32, f32); 2] = [
    (1240.0, 490.0, 40.0), // Town well
    (700.0, 1080.0, 30.0), // Fountain
];

/// Read-only set of obstacles for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Lay out the town, skipping any footprint that would overlap the
    /// safe zone centered on the player spawn
    pub fn town(player_spawn: Vec2) -> Self {
        let safe_zone = Rect::centered(player_spawn, SAFE_ZONE_SIZE, SAFE_ZONE_SIZE);

        let buildings = TOWN_BUILDINGS
            .iter()
            .map(|&(x, y, w, h)| Obstacle::Rect(Rect::new(x, y, w, h)));
        let wells = TOWN_WELLS
            .iter()
            .map(|&(x, y, r)| Obstacle::Circle(Circle::new(Vec2::new(x, y), r)));

        let mut skipped = 0;
        let obstacles: Vec<Obstacle> = buildings
            .chain(wells)
            .filter(|obstacle| {
                let blocked = match obstacle {
                    Obstacle::Rect(rect) => rect.intersects(&safe_zone),
                    Obstacle::Circle(circle) => circle.intersects_rect(&safe_zone),
                };
                if blocked {
                    skipped += 1;
                }
                !blocked
            })
            .collect();

        log::info!(
            "Town layout: {} obstacles ({} skipped for spawn safe zone)",
            obstacles.len(),
            skipped
        );
        Self { obstacles }
    }

    /// Does `body` overlap any obstacle?
    pub fn collides(&self, body: &Rect) -> bool {
        self.obstacles.iter().any(|o| o.collides(body))
    }

    /// Move `body` by `delta` one axis at a time, undoing each axis move
    /// that would end inside an obstacle. Returns the distance actually
    /// travelled.
    pub fn slide(&self, body: &mut Rect, delta: Vec2) -> Vec2 {
        let start = Vec2::new(body.x, body.y);

        body.x += delta.x;
        if self.collides(body) {
            body.x = start.x;
        }

        body.y += delta.y;
        if self.collides(body) {
            body.y = start.y;
        }

        Vec2::new(body.x, body.y) - start
    }

    /// First obstacle overlapping `body`
    pub fn first_collision(&self, body: &Rect) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.collides(body))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_layout_keeps_all_when_spawn_is_clear() {
        let field = ObstacleField::town(Vec2::new(1220.0, 920.0));
        assert_eq!(field.len(), TOWN_BUILDINGS.len() + TOWN_WELLS.len());
    }

    #[test]
    fn test_town_layout_skips_safe_zone() {
        // Spawn right on top of the warehouse
        let field = ObstacleField::town(Vec2::new(675.0, 750.0));
        assert_eq!(field.len(), TOWN_BUILDINGS.len() + TOWN_WELLS.len() - 1);
        assert!(!field.collides(&Rect::centered(Vec2::new(675.0, 750.0), 40.0, 40.0)));
    }

    #[test]
    fn test_rect_obstacle_inset_allows_seam_sliding() {
        let field = ObstacleField::new(vec![Obstacle::Rect(Rect::new(100.0, 100.0, 100.0, 100.0))]);
        // Body flush against the left wall, overlapping by less than the inset
        let body = Rect::new(60.0, 120.0, 40.4, 20.0);
        assert!(!field.collides(&body));
        let body = Rect::new(60.0, 120.0, 45.0, 20.0);
        assert!(field.collides(&body));
    }

    #[test]
    fn test_slide_reverts_blocked_axis_only() {
        let field = ObstacleField::new(vec![Obstacle::Rect(Rect::new(100.0, 0.0, 50.0, 500.0))]);
        let mut body = Rect::new(58.0, 100.0, 40.0, 40.0);
        // Moving right is blocked by the wall, moving down is not
        let moved = field.slide(&mut body, Vec2::new(5.0, 5.0));
        assert_eq!(moved, Vec2::new(0.0, 5.0));
        assert_eq!(body.x, 58.0);
        assert_eq!(body.y, 105.0);
    }

    #[test]
    fn test_circle_obstacle_collides() {
        let field = ObstacleField::new(vec![Obstacle::Circle(Circle::new(Vec2::new(0.0, 0.0), 20.0))]);
        assert!(field.collides(&Rect::new(15.0, -5.0, 10.0, 10.0)));
        assert!(!field.collides(&Rect::new(30.0, -5.0, 10.0, 10.0)));
        assert!(field.first_collision(&Rect::new(-5.0, -5.0, 10.0, 10.0)).is_some());
    }
}
