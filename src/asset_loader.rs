use std::{collections::HashMap, marker::PhantomData, sync::{Arc, Weak}};
#[cfg(target_arch = "wasm32")]
use std::sync::Mutex;

#[cfg(target_arch = "wasm32")]
use dbsdk_rs::{audio::AudioSample, io};
#[cfg(target_arch = "wasm32")]
use lazy_static::lazy_static;
use log::{debug, warn};
#[cfg(target_arch = "wasm32")]
use qoaudio::{QoaDecoder, QoaItem};
use thiserror::Error;

/// Error from opening a file on the console's filesystem
#[cfg(target_arch = "wasm32")]
pub type FileError = dbsdk_rs::io::IOError;
#[cfg(not(target_arch = "wasm32"))]
pub type FileError = std::io::Error;

// NOTE: sound effects are assumed to be mono 44100 Hz
pub const SOUND_SAMPLERATE: i32 = 44100;

#[cfg(target_arch = "wasm32")]
lazy_static! {
    static ref SOUND_CACHE: Mutex<SoundCache> = Mutex::new(SoundCache::new());
}

/// Load a sound clip, sharing the already loaded clip if something still holds it
#[cfg(target_arch = "wasm32")]
pub fn load_sound(path: &str) -> Result<Arc<SoundClip>, ResourceError> {
    let mut sound_cache = SOUND_CACHE.lock().map_err(|_| ResourceError::CachePoisoned)?;
    sound_cache.load(path)
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to open file: {0:?}")]
    Io(FileError),
    #[error("failed to decode file")]
    Parse,
    #[error("failed to allocate audio sample")]
    Allocation,
    #[error("resource cache lock poisoned")]
    CachePoisoned,
}

pub trait ResourceLoader<TResource> {
    fn load_resource(path: &str) -> Result<TResource, ResourceError>;
}

/// A decoded sound effect uploaded to audio memory
#[cfg(target_arch = "wasm32")]
pub struct SoundClip {
    pub sample: AudioSample,
    pub samplerate: i32,
}

#[cfg(target_arch = "wasm32")]
pub struct SoundLoader {
}

#[cfg(target_arch = "wasm32")]
impl ResourceLoader<SoundClip> for SoundLoader {
    fn load_resource(path: &str) -> Result<SoundClip, ResourceError> {
        let sound_file = io::FileStream::open(path, io::FileMode::Read).map_err(ResourceError::Io)?;
        let decoder = QoaDecoder::new(sound_file).map_err(|_| ResourceError::Parse)?;

        let mut data: Vec<i16> = Vec::new();
        for item in decoder {
            match item {
                Ok(QoaItem::Sample(v)) => data.push(v),
                Ok(_) => {}
                Err(_) => return Err(ResourceError::Parse),
            }
        }

        if data.is_empty() {
            return Err(ResourceError::Parse);
        }

        let sample = AudioSample::create_s16(&data, SOUND_SAMPLERATE).map_err(|_| ResourceError::Allocation)?;

        Ok(SoundClip {
            sample,
            samplerate: SOUND_SAMPLERATE,
        })
    }
}

/// Implementation of a smart cache with ref counted resources
/// Attempts to load the same resource path more than once will return a reference to the same resource
/// If all references to the resource are dropped, the resource will be unloaded
pub struct ResourceCache<TResource, TResourceLoader>
    where TResourceLoader: ResourceLoader<TResource>
{
    cache: HashMap<String, Weak<TResource>>,
    phantom: PhantomData<TResourceLoader>
}

impl<TResource, TResourceLoader> ResourceCache<TResource, TResourceLoader>
    where TResourceLoader: ResourceLoader<TResource>
{
    pub fn new() -> ResourceCache<TResource, TResourceLoader> {
        ResourceCache::<TResource, TResourceLoader> {
            cache: HashMap::new(),
            phantom: PhantomData::default()
        }
    }

    pub fn load(self: &mut Self, path: &str) -> Result<Arc<TResource>, ResourceError> {
        // a dead weak ref means the resource was unloaded, so fall through & load it again
        if let Some(res) = self.cache.get(path).and_then(Weak::upgrade) {
            return Ok(res);
        }
        self.cache.remove(path);

        debug!("Loading {}: {}", std::any::type_name::<TResource>(), path);

        let res = match TResourceLoader::load_resource(path) {
            Ok(v) => Arc::new(v),
            Err(e) => {
                warn!("\t FAILED: {}", e);
                return Err(e);
            }
        };

        self.cache.insert(path.to_owned(), Arc::downgrade(&res));
        Ok(res)
    }

    /// Number of paths whose resources are still alive
    pub fn live_count(&self) -> usize {
        self.cache.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(target_arch = "wasm32")]
pub type SoundCache = ResourceCache<SoundClip, SoundLoader>;
