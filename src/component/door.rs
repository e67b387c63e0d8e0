use hecs::Entity;

use crate::{common::axis_angle, curve::AnimationCurve, math::{Quaternion, Vector3}};

pub const MAX_SOUND_VOLUME: f32 = 20.0;

/// Upper bound on shake jitter in degrees
pub const MAX_SHAKE_INTENSITY: f32 = 180.0;

/// Local axis a door swings around
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DoorAxis {
    X,
    #[default]
    Y,
    Z,
}

impl DoorAxis {
    pub fn unit_vector(self) -> Vector3 {
        match self {
            DoorAxis::X => Vector3::new(1.0, 0.0, 0.0),
            DoorAxis::Y => Vector3::new(0.0, 1.0, 0.0),
            DoorAxis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }

    pub fn rotation(self, degrees: f32) -> Quaternion {
        axis_angle(self.unit_vector(), degrees)
    }
}

/// Timing & shape of the open and close swings
#[derive(Clone, Debug)]
pub struct DoorAnimation {
    pub open_curve: AnimationCurve,
    pub close_curve: AnimationCurve,
    pub open_duration: f32,
    pub close_duration: f32,
    pub open_angle: f32,
}

impl Default for DoorAnimation {
    fn default() -> Self {
        DoorAnimation {
            open_curve: AnimationCurve::linear(0.0, 0.0, 1.0, 1.0),
            close_curve: AnimationCurve::linear(0.0, 0.0, 1.0, 1.0),
            open_duration: 1.0,
            close_duration: 1.0,
            open_angle: 90.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Open,
    Close,
    CloseEnd,
    LockedReject,
    Unlock,
}

impl SoundCue {
    pub const ALL: [SoundCue; 5] = [
        SoundCue::Open,
        SoundCue::Close,
        SoundCue::CloseEnd,
        SoundCue::LockedReject,
        SoundCue::Unlock,
    ];

    /// Name used for this cue in door definitions
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Open => "open",
            SoundCue::Close => "close",
            SoundCue::CloseEnd => "close_end",
            SoundCue::LockedReject => "locked",
            SoundCue::Unlock => "unlock",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug)]
struct CueSettings {
    clip: Option<String>,
    volume: f32,
}

/// Clip & volume for each of a door's sound cues
#[derive(Clone, Debug)]
pub struct DoorSounds {
    cues: [CueSettings; 5],
}

impl Default for DoorSounds {
    fn default() -> Self {
        DoorSounds {
            cues: std::array::from_fn(|_| CueSettings { clip: None, volume: 1.0 }),
        }
    }
}

impl DoorSounds {
    pub fn clip(&self, cue: SoundCue) -> Option<&str> {
        self.cues[cue.index()].clip.as_deref()
    }

    pub fn volume(&self, cue: SoundCue) -> f32 {
        self.cues[cue.index()].volume
    }

    pub fn set_clip(&mut self, cue: SoundCue, path: Option<String>) {
        self.cues[cue.index()].clip = path;
    }

    /// Volume is clamped into [0, MAX_SOUND_VOLUME]
    pub fn set_volume(&mut self, cue: SoundCue, volume: f32) {
        self.cues[cue.index()].volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, MAX_SOUND_VOLUME) };
    }

    pub fn with_clip(mut self, cue: SoundCue, path: &str) -> DoorSounds {
        self.set_clip(cue, Some(path.to_owned()));
        self
    }
}

/// Mixer voice a door plays its sounds on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSource {
    pub voice: i32,
}

pub struct Door {
    /// Whether the door is (or is heading) open. Doors spawned with this set start open.
    pub open: bool,
    pub requires_key: bool,
    /// Key that unlocks this door. None lets any actor unlock it.
    pub key: Option<String>,
    pub shake_duration: f32,
    /// Max rotation jitter in degrees while rejecting a locked interaction
    pub shake_intensity: f32,
    pub axis: DoorAxis,
    pub animation: DoorAnimation,
    pub sounds: DoorSounds,
}

impl Door {
    pub fn default() -> Door {
        Door {
            open: false,
            requires_key: false,
            key: None,
            shake_duration: 0.5,
            shake_intensity: 0.15,
            axis: DoorAxis::Y,
            animation: DoorAnimation::default(),
            sounds: DoorSounds::default(),
        }
    }

    /// Rotation relative to the closed pose once fully open
    pub fn open_offset(&self) -> Quaternion {
        self.axis.rotation(self.animation.open_angle)
    }
}

#[derive(Clone, Copy)]
pub enum DoorMotion {
    Idle,
    Opening,
    Closing,
    Shaking { origin: Quaternion },
}

/// Runtime state, inserted by the door system on first update
#[derive(Clone, Copy)]
pub struct DoorState {
    pub closed_rotation: Quaternion,
    pub motion: DoorMotion,
    pub timer: f32,
    /// Cue for a swing that was just started, played after the swing's first step
    pub start_cue: Option<SoundCue>,
}

impl DoorState {
    pub fn new(closed_rotation: Quaternion) -> DoorState {
        DoorState {
            closed_rotation,
            motion: DoorMotion::Idle,
            timer: 0.0,
            start_cue: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.motion, DoorMotion::Idle)
    }
}

/// Request to interact with a door, consumed by the next door system update
#[derive(Clone, Copy, Debug)]
pub struct DoorUseRequest {
    pub user: Entity,
}

/// Other doors which receive the same interactions as this one (ex: double doors)
pub struct DoorLink {
    pub links: Vec<Entity>
}

/// Actor able to use doors within reach
pub struct DoorUser {
    pub reach: f32,
}

#[derive(Clone, Copy, Default)]
pub struct DoorUserInput {
    pub use_pressed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct KeyRing {
    pub keys: Vec<String>,
}

impl KeyRing {
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(keys: I) -> KeyRing {
        KeyRing {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_are_clamped() {
        let mut sounds = DoorSounds::default();
        assert_eq!(sounds.volume(SoundCue::Open), 1.0);

        sounds.set_volume(SoundCue::Open, 35.0);
        sounds.set_volume(SoundCue::Close, -2.0);
        sounds.set_volume(SoundCue::Unlock, f32::NAN);

        assert_eq!(sounds.volume(SoundCue::Open), MAX_SOUND_VOLUME);
        assert_eq!(sounds.volume(SoundCue::Close), 0.0);
        assert_eq!(sounds.volume(SoundCue::Unlock), 0.0);
    }

    #[test]
    fn cues_have_independent_clips() {
        let sounds = DoorSounds::default().with_clip(SoundCue::CloseEnd, "/cd/content/sfx/slam.qoa");
        assert_eq!(sounds.clip(SoundCue::CloseEnd), Some("/cd/content/sfx/slam.qoa"));
        assert_eq!(sounds.clip(SoundCue::Close), None);
    }

    #[test]
    fn key_ring_lookup() {
        let ring = KeyRing::new(["red", "blue"]);
        assert!(ring.contains("blue"));
        assert!(!ring.contains("gold"));
    }

    #[test]
    fn door_defaults() {
        let door = Door::default();
        assert!(!door.open);
        assert!(!door.requires_key);
        assert_eq!(door.axis, DoorAxis::Y);
        assert_eq!(door.animation.open_angle, 90.0);
        assert_eq!(door.animation.open_duration, 1.0);
        assert_eq!(door.shake_duration, 0.5);
    }
}
