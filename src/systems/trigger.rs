use std::collections::HashSet;

use glam::DVec2;
use hecs::{Entity, World};

use crate::components::{BodyCategory, Bounds, ContactEvent, ContactKind, Transform2d, Velocity};
use crate::water::WaterSurface;

/// The box around the water that reports bodies crossing into and out of it.
#[derive(Debug, Default)]
pub struct TriggerVolume {
    inside: HashSet<Entity>,
}

impl TriggerVolume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.inside.contains(&entity)
    }

    /// World-space `(min, max)` of the volume: the surface edge horizontally,
    /// water bottom to water line vertically.
    pub fn bounds(surface: &WaterSurface) -> (DVec2, DVec2) {
        let (left, right) = surface.edge_endpoints();
        (
            DVec2::new(left.x, surface.bottom_level()),
            DVec2::new(right.x, surface.surface_level()),
        )
    }

    /// Diff this step's overlaps against the last one. Events come out in a
    /// stable order: enters and stays in query order, then exits by id.
    /// A despawned body simply disappears without an exit.
    pub fn update(&mut self, world: &World, surface: &WaterSurface) -> Vec<ContactEvent> {
        let (min, max) = Self::bounds(surface);
        let mut events = Vec::new();
        let mut now_inside = HashSet::new();

        for (entity, (transform, bounds, category, velocity)) in world
            .query::<(&Transform2d, &Bounds, &BodyCategory, Option<&Velocity>)>()
            .iter()
        {
            let body_min = bounds.min(transform.position);
            let body_max = bounds.max(transform.position);
            let overlaps = body_min.x < max.x
                && body_max.x > min.x
                && body_min.y < max.y
                && body_max.y > min.y;
            if !overlaps {
                continue;
            }
            now_inside.insert(entity);
            let kind = if self.inside.contains(&entity) {
                ContactKind::Stay
            } else {
                ContactKind::Enter {
                    vertical_velocity: velocity.map(|v| v.0.y).unwrap_or(0.0),
                    x: transform.position.x,
                }
            };
            events.push(ContactEvent {
                entity,
                category: *category,
                kind,
            });
        }

        let mut left: Vec<Entity> = self
            .inside
            .difference(&now_inside)
            .copied()
            .filter(|e| world.contains(*e))
            .collect();
        left.sort_by_key(|e| e.to_bits());
        for entity in left {
            let Ok(category) = world.get::<&BodyCategory>(entity).map(|c| *c) else {
                continue;
            };
            events.push(ContactEvent {
                entity,
                category,
                kind: ContactKind::Exit,
            });
        }

        self.inside = now_inside;
        events
    }
}
