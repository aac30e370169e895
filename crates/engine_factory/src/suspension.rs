//! Suspending entities far from the viewer.

use engine_entity::World;
use engine_math::Transform;
use glam::Vec3;
use tracing::debug;

/// Suspend every entity whose transform lies farther than `radius` from
/// `center` and resume the rest. Entities flagged as never suspendable, or
/// never suspendable by distance, and entities without a transform always
/// stay resumed. Returns how many entities are suspended afterwards.
pub fn apply_distance_suspension(world: &World, center: Vec3, radius: f32) -> usize {
    let mut suspended = 0;
    for entity in world.entities() {
        if !entity.is_active() {
            continue;
        }
        let exempt = entity.cannot_suspend() || entity.cannot_suspend_by_distance();
        let far = !exempt
            && entity
                .get::<Transform>(Transform::KEY)
                .is_some_and(|transform| transform.position.get().distance(center) > radius);
        entity.set_suspended(far);
        if far {
            suspended += 1;
        }
    }
    debug!(suspended, radius, "distance suspension applied");
    suspended
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use engine_entity::Entity;

    use super::*;

    fn placed(world: &mut World, kind: &str, at: Vec3) -> Rc<Entity> {
        let entity = world.allocate(kind);
        entity
            .try_get_or_insert_default::<Transform>(Transform::KEY)
            .unwrap()
            .position
            .set(at);
        world.add(Rc::clone(&entity));
        entity
    }

    #[test]
    fn test_far_entities_suspend_and_resume() {
        let mut world = World::default();
        let near = placed(&mut world, "Near", Vec3::new(10.0, 0.0, 0.0));
        let far = placed(&mut world, "Far", Vec3::new(500.0, 0.0, 0.0));

        assert_eq!(apply_distance_suspension(&world, Vec3::ZERO, 100.0), 1);
        assert!(!near.is_suspended());
        assert!(far.is_suspended());

        assert_eq!(apply_distance_suspension(&world, Vec3::new(450.0, 0.0, 0.0), 100.0), 1);
        assert!(near.is_suspended());
        assert!(!far.is_suspended());
    }

    #[test]
    fn test_flagged_entities_never_suspend() {
        let mut world = World::default();
        let fog = placed(&mut world, "Fog", Vec3::new(500.0, 0.0, 0.0));
        fog.set_cannot_suspend_by_distance(true);
        let bank = placed(&mut world, "SoundBank", Vec3::new(500.0, 0.0, 0.0));
        bank.set_cannot_suspend(true);
        let bare = world.allocate("Bare");
        world.add(Rc::clone(&bare));

        assert_eq!(apply_distance_suspension(&world, Vec3::ZERO, 100.0), 0);
        assert!(!fog.is_suspended());
        assert!(!bank.is_suspended());
        assert!(!bare.is_suspended());
    }
}
