//! Advances the clocks of active ambient effects.

use bevy_ecs::prelude::*;

use crate::components::ambient::AmbientEffects;
use crate::resources::worldtime::WorldTime;

pub fn ambient_effect_system(world_time: Res<WorldTime>, mut query: Query<&mut AmbientEffects>) {
    let dt = world_time.delta.max(0.0);
    if dt == 0.0 {
        return;
    }
    for mut effects in query.iter_mut() {
        if !effects.is_empty() {
            effects.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_effects_accumulate_time() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.25,
            ..Default::default()
        });
        let mut fx = AmbientEffects::default();
        fx.set("pulse", true);
        let e = world.spawn(fx).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(ambient_effect_system);
        schedule.run(&mut world);
        schedule.run(&mut world);

        let fx = world.get::<AmbientEffects>(e).unwrap();
        assert_eq!(fx.elapsed("pulse"), Some(0.5));
        assert_eq!(fx.elapsed("glow"), None);
    }
}
