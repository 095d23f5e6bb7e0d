//! Deterministic in-memory world for controller tests
//!
//! Every collider is an axis-aligned box; bodies move one axis at a time and
//! stop flush against whatever they hit.

use glam::Vec2;
use shapeshift_core::Aabb;
use shapeshift_physics::{
    Body, BodyMover, ColliderControl, ColliderId, Contact, LayerMask, MoveOutcome, PhysicsQuery,
    RayHit, SurfaceInfo,
};

const EPSILON: f32 = 1e-5;

struct Collider {
    id: ColliderId,
    bounds: Aabb,
    layers: LayerMask,
    surface: Option<SurfaceInfo>,
    enabled: bool,
}

pub(crate) struct BoxWorld {
    colliders: Vec<Collider>,
    next_id: u64,
    pub gravity: Vec2,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 1,
            gravity: Vec2::new(0.0, -9.81),
        }
    }

    pub fn add_box(
        &mut self,
        min: Vec2,
        max: Vec2,
        layers: LayerMask,
        surface: Option<SurfaceInfo>,
    ) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(Collider {
            id,
            bounds: Aabb::new(min, max),
            layers,
            surface,
            enabled: true,
        });
        id
    }

    /// Wide ground slab whose top is at `y`
    pub fn add_floor(&mut self, y: f32) -> ColliderId {
        self.add_box(
            Vec2::new(-1000.0, y - 10.0),
            Vec2::new(1000.0, y),
            LayerMask::GROUND,
            None,
        )
    }

    fn live(&self, mask: LayerMask) -> impl Iterator<Item = &Collider> {
        self.colliders
            .iter()
            .filter(move |c| c.enabled && c.layers.intersects(mask))
    }

    fn solid_overlap(a: &Aabb, b: &Aabb) -> bool {
        a.min.x < b.max.x - EPSILON
            && a.max.x > b.min.x + EPSILON
            && a.min.y < b.max.y - EPSILON
            && a.max.y > b.min.y + EPSILON
    }
}

fn ray_box(origin: Vec2, dir: Vec2, bounds: &Aabb) -> Option<(f32, Vec2)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = if axis == 0 {
            (origin.x, dir.x, bounds.min.x, bounds.max.x)
        } else {
            (origin.y, dir.y, bounds.min.y, bounds.max.y)
        };
        if d.abs() < EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let mut t0 = (lo - o) / d;
        let mut t1 = (hi - o) / d;
        let face = -d.signum();
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_min {
            t_min = t0;
            normal = if axis == 0 {
                Vec2::new(face, 0.0)
            } else {
                Vec2::new(0.0, face)
            };
        }
        t_max = t_max.min(t1);
    }

    if t_max < t_min.max(0.0) {
        return None;
    }
    if t_min < 0.0 {
        // Origin inside the box
        return Some((0.0, -dir));
    }
    Some((t_min, normal))
}

impl PhysicsQuery for BoxWorld {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        self.live(mask)
            .filter_map(|c| {
                ray_box(origin, dir, &c.bounds)
                    .filter(|(t, _)| *t <= max_distance)
                    .map(|(t, normal)| RayHit {
                        collider: c.id,
                        distance: t,
                        point: origin + dir * t,
                        normal,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlaps(&self, bounds: Aabb, mask: LayerMask) -> bool {
        self.live(mask).any(|c| Self::solid_overlap(&c.bounds, &bounds))
    }

    fn surface(&self, collider: ColliderId) -> Option<SurfaceInfo> {
        self.colliders
            .iter()
            .find(|c| c.id == collider)
            .and_then(|c| c.surface.clone())
    }

    fn collider_bounds(&self, collider: ColliderId) -> Option<Aabb> {
        self.colliders
            .iter()
            .find(|c| c.id == collider)
            .map(|c| c.bounds)
    }

    fn is_collider_enabled(&self, collider: ColliderId) -> bool {
        self.colliders
            .iter()
            .any(|c| c.id == collider && c.enabled)
    }
}

impl ColliderControl for BoxWorld {
    fn set_collider_enabled(&mut self, collider: ColliderId, enabled: bool) -> bool {
        match self.colliders.iter_mut().find(|c| c.id == collider) {
            Some(c) => {
                c.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl BodyMover for BoxWorld {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn move_body(&mut self, body: &mut Body, dt: f32) -> MoveOutcome {
        if !body.enabled {
            return MoveOutcome::default();
        }
        let mask = LayerMask::ALL.without(body.excluded_layers);
        let half = body.shape.half_extents();
        let delta = body.velocity * dt;
        let mut contacts = Vec::new();

        for axis in 0..2 {
            let step = if axis == 0 { delta.x } else { delta.y };
            if step == 0.0 {
                continue;
            }
            let mut next = body.position;
            if axis == 0 {
                next.x += step;
            } else {
                next.y += step;
            }
            let swept = Aabb::from_center(next, half);
            for c in self.live(mask) {
                if !Self::solid_overlap(&swept, &c.bounds) {
                    continue;
                }
                let (resolved, normal) = match (axis, step > 0.0) {
                    (0, true) => (c.bounds.min.x - half.x, Vec2::NEG_X),
                    (0, false) => (c.bounds.max.x + half.x, Vec2::X),
                    (_, true) => (c.bounds.min.y - half.y, Vec2::NEG_Y),
                    (_, false) => (c.bounds.max.y + half.y, Vec2::Y),
                };
                if axis == 0 {
                    next.x = if step > 0.0 { next.x.min(resolved) } else { next.x.max(resolved) };
                } else {
                    next.y = if step > 0.0 { next.y.min(resolved) } else { next.y.max(resolved) };
                }
                contacts.push(Contact {
                    collider: c.id,
                    normal,
                });
            }
            body.position = next;
        }

        let mut grounded = false;
        for contact in &contacts {
            body.resolve_contact(contact.normal);
            grounded |= contact.normal.y > 0.7;
        }
        MoveOutcome { grounded, contacts }
    }
}
