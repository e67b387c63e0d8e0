use std::{collections::HashMap, sync::Arc};

#[cfg(target_arch = "wasm32")]
use dbsdk_rs::audio;
#[cfg(target_arch = "wasm32")]
use log::warn;

#[cfg(target_arch = "wasm32")]
use crate::asset_loader::{self, SoundClip};
use crate::component::door::{AudioSource, DoorSounds, SoundCue};

/// Sink for door sound playback
pub trait SoundPlayer {
    /// Start a clip on a voice without waiting for whatever is already playing
    fn play_one_shot(&mut self, voice: i32, clip: &str, volume: f32);

    fn stop(&mut self, voice: i32);
}

/// Play one of a door's cues. Doors without a source or cues without a clip stay silent.
pub fn play_cue(player: &mut dyn SoundPlayer, source: Option<&AudioSource>, sounds: &DoorSounds, cue: SoundCue) {
    let (Some(source), Some(clip)) = (source, sounds.clip(cue)) else {
        return;
    };

    player.play_one_shot(source.voice, clip, sounds.volume(cue));
}

pub fn stop_sounds(player: &mut dyn SoundPlayer, source: Option<&AudioSource>) {
    if let Some(source) = source {
        player.stop(source.voice);
    }
}

/// Keeps every clip a door has played resident, so replaying a cue never decodes its file again
pub struct ClipBank<T> {
    clips: HashMap<String, Arc<T>>,
}

impl<T> ClipBank<T> {
    pub fn new() -> ClipBank<T> {
        ClipBank {
            clips: HashMap::new(),
        }
    }

    pub fn get_or_load<E, F>(&mut self, path: &str, load: F) -> Result<Arc<T>, E>
        where F: FnOnce(&str) -> Result<Arc<T>, E>
    {
        if let Some(clip) = self.clips.get(path) {
            return Ok(clip.clone());
        }

        let clip = load(path)?;
        self.clips.insert(path.to_owned(), clip.clone());
        Ok(clip)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }
}

/// Plays door sounds on the DreamBox audio mixer
#[cfg(target_arch = "wasm32")]
pub struct DbAudioPlayer {
    clips: ClipBank<SoundClip>,
}

#[cfg(target_arch = "wasm32")]
impl DbAudioPlayer {
    pub fn new() -> DbAudioPlayer {
        DbAudioPlayer {
            clips: ClipBank::new(),
        }
    }

    fn schedule_voice(slot: i32, clip: &SoundClip, volume: f32, t: f64) {
        audio::queue_set_voice_param_i(slot, audio::AudioVoiceParam::SampleData, clip.sample.handle, t);
        audio::queue_set_voice_param_i(slot, audio::AudioVoiceParam::Samplerate, clip.samplerate, t);
        audio::queue_set_voice_param_i(slot, audio::AudioVoiceParam::LoopEnabled, 0, t);
        audio::queue_set_voice_param_i(slot, audio::AudioVoiceParam::Reverb, 0, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::Volume, volume, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::Pitch, 1.0, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::Detune, 0.0, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::Pan, 0.0, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::FadeInDuration, 0.0, t);
        audio::queue_set_voice_param_f(slot, audio::AudioVoiceParam::FadeOutDuration, 0.0, t);

        audio::queue_stop_voice(slot, t);
        audio::queue_start_voice(slot, t);
    }
}

#[cfg(target_arch = "wasm32")]
impl SoundPlayer for DbAudioPlayer {
    fn play_one_shot(&mut self, voice: i32, clip: &str, volume: f32) {
        let clip = match self.clips.get_or_load(clip, asset_loader::load_sound) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed loading door sound {}: {}", clip, e);
                return;
            }
        };

        Self::schedule_voice(voice, &clip, volume, audio::get_time());
    }

    fn stop(&mut self, voice: i32) {
        audio::queue_stop_voice(voice, audio::get_time());
    }
}
