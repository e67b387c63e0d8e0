use hecs::World;

use crate::{component::{door::DoorUserInput, playerinput::PlayerInput, transform3d::Transform3D}, math::Vector3, InputState, TimeData};

pub const PLAYER_MOVE_SPEED: f32 = 100.0;

/// System which walks the player around and forwards use presses to the door system
pub fn player_input_update(input: &InputState, time: &TimeData, world: &mut World) {
    for (_, (transform, door_input, _)) in world.query_mut::<(&mut Transform3D, &mut DoorUserInput, &PlayerInput)>() {
        let velocity = Vector3::new(input.move_x, input.move_y, 0.0) * PLAYER_MOVE_SPEED;
        transform.position = transform.position + (velocity * time.delta_time);

        // a press stays pending until the door system consumes it
        door_input.use_pressed |= input.use_pressed;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{component::door::{Door, DoorUser}, sound::testing::RecordingPlayer, system::door_system::door_system_update, DoorRng};

    fn frame(dt: f32) -> TimeData {
        TimeData { delta_time: dt }
    }

    #[test]
    fn input_moves_only_the_player() {
        let mut world = World::new();
        let player = world.spawn((Transform3D::default(), DoorUserInput::default(), PlayerInput {}));
        let npc = world.spawn((Transform3D::default(), DoorUserInput::default()));

        let mut input = InputState::default();
        input.update(1.0, -1.0, false);
        player_input_update(&input, &frame(0.5), &mut world);

        let pos = world.get::<&Transform3D>(player).unwrap().position;
        assert_eq!(pos, Vector3::new(50.0, -50.0, 0.0));
        assert_eq!(world.get::<&Transform3D>(npc).unwrap().position, Vector3::zero());
    }

    #[test]
    fn held_button_uses_a_door_once() {
        let mut world = World::new();
        let mut audio = RecordingPlayer::default();
        let mut rng = DoorRng::seed_from_u64(1);
        let door = world.spawn((Door::default(), Transform3D::default().with_position(Vector3::new(0.0, 40.0, 0.0))));
        world.spawn((
            Transform3D::default(),
            DoorUser { reach: 64.0 },
            DoorUserInput::default(),
            PlayerInput {},
        ));

        let mut input = InputState::default();
        for _ in 0..4 {
            input.update(0.0, 0.0, true);
            player_input_update(&input, &frame(0.1), &mut world);
            door_system_update(&frame(0.1), &mut world, &mut audio, &mut rng);
        }
        assert!(world.get::<&Door>(door).unwrap().open);

        input.update(0.0, 0.0, false);
        input.update(0.0, 0.0, true);
        player_input_update(&input, &frame(0.1), &mut world);
        door_system_update(&frame(0.1), &mut world, &mut audio, &mut rng);
        assert!(!world.get::<&Door>(door).unwrap().open);
    }
}
