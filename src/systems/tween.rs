//! Tween animation system.
//!
//! [`tween_rect_system`] advances every [`TweenRect`] by the frame delta from
//! [`WorldTime`] and writes the eased rectangle into the entity's
//! [`ScreenRect`]. Finished tweens stop at their destination and stay
//! attached until the owner removes them.

use crate::components::screenrect::{Rect, ScreenRect};
use crate::components::tween::{Easing, TweenRect};
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub(crate) fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
    }
}

pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate every edge of a rectangle.
pub(crate) fn lerp_rect(a: Rect, b: Rect, t: f32) -> Rect {
    Rect {
        left: lerp_f32(a.left, b.left, t),
        top: lerp_f32(a.top, b.top, t),
        width: lerp_f32(a.width, b.width, t),
        height: lerp_f32(a.height, b.height, t),
    }
}

/// Animate entity rectangles based on [`TweenRect`] components.
pub fn tween_rect_system(
    world_time: Res<WorldTime>,
    mut query: Query<(&mut ScreenRect, &mut TweenRect)>,
) {
    let dt = world_time.delta.max(0.0);
    for (mut sr, mut tw) in query.iter_mut() {
        if !tw.playing {
            continue;
        }
        tw.time += dt;
        if tw.duration <= 0.0 || tw.time >= tw.duration {
            tw.time = tw.duration.max(0.0);
            tw.playing = false;
            sr.rect = tw.to;
            continue;
        }
        let t = ease(tw.easing, tw.time / tw.duration);
        sr.rect = lerp_rect(tw.from, tw.to, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    #[test]
    fn test_ease_endpoints() {
        for easing in ALL {
            assert!(approx_eq(ease(easing, 0.0), 0.0), "{:?} at 0", easing);
            assert!(approx_eq(ease(easing, 1.0), 1.0), "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_ease_clamps_input() {
        for easing in ALL {
            assert!(approx_eq(ease(easing, -2.0), 0.0));
            assert!(approx_eq(ease(easing, 3.0), 1.0));
        }
    }

    #[test]
    fn test_ease_midpoints() {
        assert!(approx_eq(ease(Easing::Linear, 0.5), 0.5));
        assert!(approx_eq(ease(Easing::QuadIn, 0.5), 0.25));
        assert!(approx_eq(ease(Easing::QuadOut, 0.5), 0.75));
        assert!(approx_eq(ease(Easing::CubicOut, 0.5), 0.875));
        assert!(approx_eq(ease(Easing::QuadInOut, 0.5), 0.5));
        assert!(approx_eq(ease(Easing::CubicInOut, 0.5), 0.5));
    }

    #[test]
    fn test_lerp_rect() {
        let a = Rect::new(0.0, 0.0, 10.0, 20.0);
        let b = Rect::new(100.0, 50.0, 30.0, 40.0);
        assert_eq!(lerp_rect(a, b, 0.5), Rect::new(50.0, 25.0, 20.0, 30.0));
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(tween_rect_system);
        schedule.run(world);
    }

    #[test]
    fn test_tween_progresses_and_stops() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.5,
            ..Default::default()
        });
        let from = Rect::new(0.0, 0.0, 10.0, 10.0);
        let to = Rect::new(100.0, 0.0, 10.0, 10.0);
        let e = world
            .spawn((ScreenRect::new(from), TweenRect::new(from, to, 1.0)))
            .id();

        run(&mut world);
        let rect = world.get::<ScreenRect>(e).unwrap().rect;
        assert!(approx_eq(rect.left, 50.0));
        assert!(world.get::<TweenRect>(e).unwrap().playing);

        run(&mut world);
        run(&mut world);
        assert_eq!(world.get::<ScreenRect>(e).unwrap().rect, to);
        let tw = world.get::<TweenRect>(e).unwrap();
        assert!(!tw.playing);
        assert!(approx_eq(tw.time, 1.0));
    }

    #[test]
    fn test_stopped_tween_is_left_alone() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.5,
            ..Default::default()
        });
        let from = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut tw = TweenRect::new(from, Rect::new(9.0, 9.0, 1.0, 1.0), 1.0);
        tw.playing = false;
        let e = world.spawn((ScreenRect::new(from), tw)).id();

        run(&mut world);
        assert_eq!(world.get::<ScreenRect>(e).unwrap().rect, from);
    }
}
