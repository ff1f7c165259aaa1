//! Per-frame bean integration: attraction, gravity, Euler step, friction, wall and floor
//! reflection, expiry.
//!
//! Units are page pixels and frames. The order inside [`step`] is fixed:
//! gravity is added before the position update and friction is applied after it.

use bevy::math::Vec2;

use super::bean::Bean;

/// Visible area in page pixels (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Everything a single step needs, resolved once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub gravity: f32,
    pub friction: f32,
    pub restitution: f32,
    pub bean_size: f32,
    pub attraction_radius: f32,
    pub attraction_falloff: f32,
    pub max_age: u32,
    pub offscreen_margin: f32,
}

/// What happened to a bean during one step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub hit_wall: bool,
    pub hit_floor: bool,
    pub expired: bool,
}

/// Velocity change pulling a bean at `position` toward `pointer`.
///
/// Magnitude is `(radius - distance) / falloff` inside the radius, zero outside.
/// A pointer exactly on the bean has no direction and contributes nothing.
pub fn attraction(position: Vec2, pointer: Vec2, radius: f32, falloff: f32) -> Vec2 {
    let delta = pointer - position;
    let distance = delta.length();
    if distance >= radius || distance <= f32::EPSILON || falloff <= 0.0 {
        return Vec2::ZERO;
    }
    let force = (radius - distance) / falloff;
    delta / distance * force
}

pub fn step(
    bean: &mut Bean,
    pointer: Option<Vec2>,
    viewport: Viewport,
    params: &StepParams,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    bean.age = bean.age.saturating_add(1);

    if let Some(pointer) = pointer {
        bean.velocity += attraction(
            bean.position,
            pointer,
            params.attraction_radius,
            params.attraction_falloff,
        );
    }

    bean.velocity.y += params.gravity;
    bean.position += bean.velocity;
    bean.velocity *= params.friction;

    let max_x = (viewport.width - params.bean_size).max(0.0);
    if bean.position.x <= 0.0 || bean.position.x >= max_x {
        bean.velocity.x *= -params.restitution;
        bean.position.x = bean.position.x.clamp(0.0, max_x);
        bean.bounces += 1;
        outcome.hit_wall = true;
    }

    let floor = viewport.height - params.bean_size;
    if bean.position.y >= floor {
        bean.velocity.y *= -params.restitution;
        bean.position.y = floor;
        outcome.hit_floor = true;
    }

    outcome.expired = bean.age > params.max_age
        || bean.position.y > viewport.height + params.offscreen_margin;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::bean::{BeanCategory, BeanId};

    fn params() -> StepParams {
        StepParams {
            gravity: 0.5,
            friction: 0.99,
            restitution: 0.7,
            bean_size: 20.0,
            attraction_radius: 100.0,
            attraction_falloff: 1000.0,
            max_age: 1000,
            offscreen_margin: 100.0,
        }
    }

    fn bean_at(x: f32, y: f32, vx: f32, vy: f32) -> Bean {
        Bean::new(
            BeanId(1),
            Vec2::new(x, y),
            Vec2::new(vx, vy),
            BeanCategory::Normal,
        )
    }

    #[test]
    fn attraction_points_at_pointer_and_fades_with_distance() {
        let near = attraction(Vec2::ZERO, Vec2::new(10.0, 0.0), 100.0, 1000.0);
        let far = attraction(Vec2::ZERO, Vec2::new(90.0, 0.0), 100.0, 1000.0);
        assert!((near.x - 0.09).abs() < 1e-6);
        assert!((far.x - 0.01).abs() < 1e-6);
        assert_eq!(near.y, 0.0);
        assert_eq!(
            attraction(Vec2::ZERO, Vec2::new(100.0, 0.0), 100.0, 1000.0),
            Vec2::ZERO
        );
    }

    #[test]
    fn coincident_pointer_adds_nothing() {
        let p = Vec2::new(42.0, 17.0);
        assert_eq!(attraction(p, p, 100.0, 1000.0), Vec2::ZERO);
    }

    #[test]
    fn gravity_integrate_friction_order() {
        let mut bean = bean_at(100.0, 0.0, 0.0, 1.0);
        let out = step(&mut bean, None, Viewport::new(800.0, 600.0), &params());
        assert_eq!(out, StepOutcome::default());
        // vy: 1.0 + 0.5 = 1.5 -> y moves 1.5, then damped to 1.485
        assert!((bean.position.y - 1.5).abs() < 1e-6);
        assert!((bean.velocity.y - 1.485).abs() < 1e-6);
        assert_eq!(bean.age, 1);
    }

    #[test]
    fn right_wall_reflects_and_clamps() {
        let mut bean = bean_at(775.0, 100.0, 10.0, 0.0);
        let out = step(&mut bean, None, Viewport::new(800.0, 600.0), &params());
        assert!(out.hit_wall);
        assert_eq!(bean.position.x, 780.0);
        assert!((bean.velocity.x - (-10.0 * 0.99 * 0.7)).abs() < 1e-5);
        assert_eq!(bean.bounces, 1);
    }

    #[test]
    fn floor_reflects_and_clamps() {
        let mut bean = bean_at(100.0, 575.0, 0.0, 10.0);
        let out = step(&mut bean, None, Viewport::new(800.0, 600.0), &params());
        assert!(out.hit_floor);
        assert!(!out.expired);
        assert_eq!(bean.position.y, 580.0);
        assert!((bean.velocity.y - (-(10.5 * 0.99) * 0.7)).abs() < 1e-5);
        assert_eq!(bean.bounces, 0, "floor hits are not wall bounces");
    }

    #[test]
    fn expires_past_age_ceiling() {
        let mut bean = bean_at(100.0, 100.0, 0.0, 0.0);
        bean.age = 1000;
        let out = step(&mut bean, None, Viewport::new(800.0, 600.0), &params());
        assert!(out.expired);
    }

    #[test]
    fn narrow_viewport_does_not_panic_on_clamp() {
        let mut bean = bean_at(3.0, 3.0, 1.0, 0.0);
        let out = step(&mut bean, None, Viewport::new(10.0, 10.0), &params());
        assert!(out.hit_wall);
        assert_eq!(bean.position.x, 0.0);
    }
}
