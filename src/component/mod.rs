pub mod door;
pub mod playerinput;
pub mod transform3d;
