/// Marks the entity driven by the local gamepad
pub struct PlayerInput {
}
