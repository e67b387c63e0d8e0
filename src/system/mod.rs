pub mod door_system;
pub mod player_system;
