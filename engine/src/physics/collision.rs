//! Collision Queries
//!
//! The movement core never owns world geometry. Everything it needs to know
//! about the level goes through [`CollisionQuery`]: overlap boxes for
//! ground/wall contact, rays for corner correction, and a swept move for the
//! end-of-tick body step. [`TileWorld`] is the reference provider built from
//! axis-aligned solids.

use super::types::{Aabb, Side, Vec2};

/// Gap left between a resolved body and the solid it was stopped by.
///
/// Keeps grazing rays along the body's edges from reporting the surface it
/// rests on, while staying well inside the contact probes.
pub const SKIN: f32 = 0.005;

/// Result of a ray query against solid geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space point where the ray entered the solid
    pub point: Vec2,
    /// Distance travelled along the ray (0.0 when starting inside a solid)
    pub distance: f32,
    /// Normal of the face that was entered
    pub normal: Vec2,
}

/// Outcome of [`CollisionQuery::move_and_collide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Motion actually applied to the body
    pub motion: Vec2,
    /// Horizontal motion was cut short by a solid
    pub blocked_x: bool,
    /// Vertical motion was cut short by a solid
    pub blocked_y: bool,
}

impl Sweep {
    /// Unobstructed motion.
    pub fn free(motion: Vec2) -> Self {
        Self {
            motion,
            blocked_x: false,
            blocked_y: false,
        }
    }
}

/// Contact box below the body used for ground detection.
///
/// Slightly narrower than the body so that hugging a wall never reads as
/// standing on it.
pub fn ground_probe(position: Vec2, body_size: Vec2) -> Aabb {
    Aabb::from_center_size(
        position - Vec2::new(0.0, body_size.y * 0.5),
        Vec2::new(body_size.x / 1.1, body_size.y * 0.05),
    )
}

/// Contact box on one side of the body used for wall detection.
pub fn wall_probe(position: Vec2, body_size: Vec2, side: Side) -> Aabb {
    Aabb::from_center_size(
        position + Vec2::new(side.sign() * body_size.x * 0.5, 0.0),
        Vec2::new(body_size.y * 0.05, body_size.y / 1.1),
    )
}

/// Geometry queries answered for the movement core.
///
/// Implementations must be pure with respect to the current world geometry:
/// the same query in the same tick gives the same answer. Missing geometry is
/// simply "no contact".
pub trait CollisionQuery {
    /// Whether any solid strictly overlaps `area`.
    fn overlaps_solid(&self, area: Aabb) -> bool;

    /// Cast a ray against solids. `direction` must be normalized.
    ///
    /// A ray starting inside a solid reports a hit at distance 0.
    fn raycast_solid(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;

    /// Cast a ray against respawn trigger zones, returning the zone's
    /// respawn point.
    fn raycast_respawn(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32) -> Option<Vec2> {
        None
    }

    /// Move `body` by `motion`, stopping at solids.
    fn move_and_collide(&self, _body: Aabb, motion: Vec2) -> Sweep {
        Sweep::free(motion)
    }

    /// Is there solid ground directly under a body of `body_size` centered
    /// at `position`?
    fn is_grounded_below(&self, position: Vec2, body_size: Vec2) -> bool {
        self.overlaps_solid(ground_probe(position, body_size))
    }

    /// Is the body touching a wall on `side`?
    fn is_wall_contact(&self, position: Vec2, body_size: Vec2, side: Side) -> bool {
        self.overlaps_solid(wall_probe(position, body_size, side))
    }
}

/// Ray-AABB intersection (slab method).
///
/// Rays that only graze a face or a corner do not hit. A ray whose origin is
/// strictly inside the box hits at distance 0.
///
/// # Arguments
/// * `origin` - Ray origin in world space
/// * `direction` - Normalized ray direction
/// * `max_distance` - Maximum distance along the ray
/// * `aabb` - Box to test against
pub fn ray_aabb_intersect(
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    aabb: &Aabb,
) -> Option<RayHit> {
    if aabb.contains_point(origin) {
        return Some(RayHit {
            point: origin,
            distance: 0.0,
            normal: -direction,
        });
    }

    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if d.abs() < f32::EPSILON {
            // Parallel to this slab: must be strictly between the faces
            if o <= lo || o >= hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t0, t1) = if inv > 0.0 {
            ((lo - o) * inv, (hi - o) * inv)
        } else {
            ((hi - o) * inv, (lo - o) * inv)
        };

        if t0 >= t_enter {
            t_enter = t0;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t1);
    }

    if t_enter < t_exit && t_enter <= max_distance {
        Some(RayHit {
            point: origin + direction * t_enter,
            distance: t_enter,
            normal,
        })
    } else {
        None
    }
}

/// Handle to a solid registered in a [`TileWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolidId(pub u32);

#[derive(Debug, Clone, Copy)]
struct Solid {
    id: SolidId,
    bounds: Aabb,
}

/// Trigger box that moves the respawn point when the character passes
/// through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnZone {
    pub bounds: Aabb,
    /// Where the character reappears after dying
    pub point: Vec2,
}

/// Level geometry made of axis-aligned solids and respawn trigger zones.
#[derive(Debug, Clone, Default)]
pub struct TileWorld {
    solids: Vec<Solid>,
    respawn_zones: Vec<RespawnZone>,
    next_id: u32,
}

impl TileWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a solid box and return its handle.
    pub fn add_solid(&mut self, bounds: Aabb) -> SolidId {
        let id = SolidId(self.next_id);
        self.next_id += 1;
        self.solids.push(Solid { id, bounds });
        id
    }

    /// Add a respawn trigger zone.
    pub fn add_respawn_zone(&mut self, bounds: Aabb, point: Vec2) {
        self.respawn_zones.push(RespawnZone { bounds, point });
    }

    /// Current bounds of a solid.
    pub fn solid(&self, id: SolidId) -> Option<Aabb> {
        self.solids.iter().find(|s| s.id == id).map(|s| s.bounds)
    }

    /// Move a solid (moving platforms). Returns false for unknown handles.
    pub fn translate_solid(&mut self, id: SolidId, delta: Vec2) -> bool {
        match self.solids.iter_mut().find(|s| s.id == id) {
            Some(solid) => {
                solid.bounds = solid.bounds.translated(delta);
                true
            }
            None => false,
        }
    }

    /// Iterate over all solid bounds.
    pub fn solids(&self) -> impl Iterator<Item = &Aabb> {
        self.solids.iter().map(|s| &s.bounds)
    }

    pub fn respawn_zones(&self) -> &[RespawnZone] {
        &self.respawn_zones
    }

    /// Whether a body stands on the given solid (its ground probe overlaps it).
    pub fn is_standing_on(&self, id: SolidId, position: Vec2, body_size: Vec2) -> bool {
        self.solid(id)
            .is_some_and(|bounds| bounds.overlaps(&ground_probe(position, body_size)))
    }

    fn clip_x(body: &Aabb, dx: f32, solid: &Aabb) -> f32 {
        if body.max.y <= solid.min.y || body.min.y >= solid.max.y {
            return dx;
        }
        if dx > 0.0 && body.max.x <= solid.min.x {
            dx.min((solid.min.x - body.max.x - SKIN).max(0.0))
        } else if dx < 0.0 && body.min.x >= solid.max.x {
            dx.max((solid.max.x - body.min.x + SKIN).min(0.0))
        } else {
            dx
        }
    }

    fn clip_y(body: &Aabb, dy: f32, solid: &Aabb) -> f32 {
        if body.max.x <= solid.min.x || body.min.x >= solid.max.x {
            return dy;
        }
        if dy > 0.0 && body.max.y <= solid.min.y {
            dy.min((solid.min.y - body.max.y - SKIN).max(0.0))
        } else if dy < 0.0 && body.min.y >= solid.max.y {
            dy.max((solid.max.y - body.min.y + SKIN).min(0.0))
        } else {
            dy
        }
    }
}

impl CollisionQuery for TileWorld {
    fn overlaps_solid(&self, area: Aabb) -> bool {
        self.solids.iter().any(|s| s.bounds.overlaps(&area))
    }

    fn raycast_solid(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self.solids
            .iter()
            .filter_map(|s| ray_aabb_intersect(origin, direction, max_distance, &s.bounds))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn raycast_respawn(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<Vec2> {
        self.respawn_zones
            .iter()
            .filter_map(|zone| {
                ray_aabb_intersect(origin, direction, max_distance, &zone.bounds)
                    .map(|hit| (hit.distance, zone.point))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, point)| point)
    }

    fn move_and_collide(&self, body: Aabb, motion: Vec2) -> Sweep {
        // Resolve X then Y so that sliding along floors and walls works
        let dx = self
            .solids
            .iter()
            .fold(motion.x, |dx, s| Self::clip_x(&body, dx, &s.bounds));
        let moved = body.translated(Vec2::new(dx, 0.0));
        let dy = self
            .solids
            .iter()
            .fold(motion.y, |dy, s| Self::clip_y(&moved, dy, &s.bounds));

        Sweep {
            motion: Vec2::new(dx, dy),
            blocked_x: dx != motion.x,
            blocked_y: dy != motion.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_world() -> TileWorld {
        let mut world = TileWorld::new();
        world.add_solid(Aabb::new(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)));
        world
    }

    #[test]
    fn test_ray_hits_box_face() {
        let aabb = Aabb::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        let hit = ray_aabb_intersect(Vec2::ZERO, Vec2::X, 5.0, &aabb).expect("should hit");
        assert!((hit.distance - 1.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_ray_out_of_range_misses() {
        let aabb = Aabb::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        assert!(ray_aabb_intersect(Vec2::ZERO, Vec2::X, 0.5, &aabb).is_none());
    }

    #[test]
    fn test_grazing_ray_misses() {
        // Ray runs exactly along the top face
        let aabb = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 0.0));
        assert!(ray_aabb_intersect(Vec2::new(-2.0, 0.0), Vec2::X, 5.0, &aabb).is_none());
    }

    #[test]
    fn test_ray_from_inside_hits_at_zero() {
        let aabb = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let hit = ray_aabb_intersect(Vec2::ZERO, Vec2::NEG_Y, 0.1, &aabb).expect("inside");
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_ground_and_wall_contact() {
        let mut world = floor_world();
        world.add_solid(Aabb::new(Vec2::new(0.5 + SKIN, 0.0), Vec2::new(1.5, 5.0)));
        let size = Vec2::ONE;
        let position = Vec2::new(0.0, 0.5 + SKIN);

        assert!(world.is_grounded_below(position, size));
        assert!(world.is_wall_contact(position, size, Side::Right));
        assert!(!world.is_wall_contact(position, size, Side::Left));
    }

    #[test]
    fn test_empty_world_has_no_contact() {
        let world = TileWorld::new();
        assert!(!world.is_grounded_below(Vec2::ZERO, Vec2::ONE));
        assert!(world.raycast_solid(Vec2::ZERO, Vec2::NEG_Y, 100.0).is_none());
        let sweep = world.move_and_collide(Aabb::from_center_size(Vec2::ZERO, Vec2::ONE), Vec2::new(3.0, -2.0));
        assert_eq!(sweep, Sweep::free(Vec2::new(3.0, -2.0)));
    }

    #[test]
    fn test_move_and_collide_lands_on_floor() {
        let world = floor_world();
        let body = Aabb::from_center_size(Vec2::new(0.0, 1.0), Vec2::ONE);
        let sweep = world.move_and_collide(body, Vec2::new(0.25, -2.0));

        assert!(sweep.blocked_y);
        assert!(!sweep.blocked_x);
        assert!((sweep.motion.x - 0.25).abs() < 1e-6);
        // Bottom was at 0.5, floor top at 0.0
        assert!((sweep.motion.y - (-0.5 + SKIN)).abs() < 1e-6);
    }

    #[test]
    fn test_move_and_collide_stops_at_wall() {
        let mut world = TileWorld::new();
        world.add_solid(Aabb::new(Vec2::new(2.0, -5.0), Vec2::new(3.0, 5.0)));
        let body = Aabb::from_center_size(Vec2::ZERO, Vec2::ONE);
        let sweep = world.move_and_collide(body, Vec2::new(4.0, 0.0));

        assert!(sweep.blocked_x);
        assert!((sweep.motion.x - (1.5 - SKIN)).abs() < 1e-6);
    }

    #[test]
    fn test_translate_solid_and_standing_on() {
        let mut world = TileWorld::new();
        let id = world.add_solid(Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 0.0)));
        let position = Vec2::new(0.0, 0.5 + SKIN);
        assert!(world.is_standing_on(id, position, Vec2::ONE));

        assert!(world.translate_solid(id, Vec2::new(5.0, 0.0)));
        assert!(!world.is_standing_on(id, position, Vec2::ONE));
        assert!(!world.translate_solid(SolidId(99), Vec2::ONE));
    }

    #[test]
    fn test_respawn_zone_raycast() {
        let mut world = TileWorld::new();
        world.add_respawn_zone(
            Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
            Vec2::new(0.0, 3.0),
        );
        assert_eq!(world.raycast_respawn(Vec2::ZERO, Vec2::Y, 0.1), Some(Vec2::new(0.0, 3.0)));
        assert_eq!(world.raycast_respawn(Vec2::new(5.0, 0.0), Vec2::Y, 0.1), None);
    }
}
