use std::{collections::{hash_map::Entry, HashMap}, io::Read};

use hecs::{Entity, World};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use thiserror::Error;

use crate::{asset_loader::FileError, common::euler_degrees, component::{door::{AudioSource, Door, DoorAxis, DoorLink, SoundCue}, transform3d::Transform3D}, curve::{AnimationCurve, CurveParseError}, math::Vector3, parse_utils::{parse_bool, parse_f32, parse_vec3}};

pub const DOOR_CLASSNAME: &str = "func_door";

lazy_static! {
    static ref KEY_VALUE_RE: Regex = Regex::new("\"([^\"]*)\"[ \t]+\"([^\"]*)\"").unwrap();
}

#[derive(Debug, Error, PartialEq)]
pub enum DoorDefError {
    #[error("entity is not a door (classname '{0}')")]
    NotADoor(String),
    #[error("'{key}' has an invalid value '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("'{key}' has an invalid curve: {source}")]
    InvalidCurve { key: String, source: CurveParseError },
    #[error("door links to unknown door '{0}'")]
    UnknownLink(String),
}

#[derive(Debug, Error)]
pub enum DoorFileError {
    #[error("failed to open door file: {0:?}")]
    Open(FileError),
    #[error("failed to read door file: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Def(#[from] DoorDefError),
}

/// Call `f` with the key/value pairs of every `{ ... }` block in an entity list
pub fn parse_entities<F>(src: &str, mut f: F) where F: FnMut(HashMap<&str, &str>) {
    // find ranges of data between { and }
    let mut slices = Vec::new();
    let mut start = None;
    for (idx, v) in src.as_bytes().iter().enumerate() {
        if *v == b'{' {
            start = Some(idx + 1);
        }
        else if *v == b'}' {
            if let Some(s) = start.take() {
                slices.push((s, idx));
            }
        }
    }

    // parse key value pairs
    for (start, end) in slices {
        let entitydata = &src[start..end];

        let mut map = HashMap::new();
        for (_, [propname, propval]) in KEY_VALUE_RE.captures_iter(entitydata).map(|c| c.extract()) {
            map.insert(propname, propval);
        }

        f(map);
    }
}

fn value<T>(props: &HashMap<&str, &str>, key: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>, DoorDefError> {
    match props.get(key) {
        None => Ok(None),
        Some(v) => match parse(v) {
            Some(parsed) => Ok(Some(parsed)),
            None => Err(DoorDefError::InvalidValue { key: key.to_owned(), value: (*v).to_owned() }),
        },
    }
}

fn parse_axis(src: &str) -> Option<DoorAxis> {
    match src.trim().to_ascii_lowercase().as_str() {
        "x" => Some(DoorAxis::X),
        "y" => Some(DoorAxis::Y),
        "z" => Some(DoorAxis::Z),
        _ => None,
    }
}

fn parse_voice(src: &str) -> Option<i32> {
    src.trim().parse::<i32>().ok().filter(|v| *v >= 0)
}

fn curve(props: &HashMap<&str, &str>, key: &str) -> Result<Option<AnimationCurve>, DoorDefError> {
    match props.get(key) {
        None => Ok(None),
        Some(v) => AnimationCurve::parse(v)
            .map(Some)
            .map_err(|source| DoorDefError::InvalidCurve { key: key.to_owned(), source }),
    }
}

/// A door as described by an entity definition
pub struct DoorDef {
    pub name: Option<String>,
    pub link: Option<String>,
    pub origin: Vector3,
    /// Euler angles of the closed pose in degrees. Applied X first, then Y, then Z,
    /// each about the axes left by the previous rotation (R = Rx * Ry * Rz).
    pub angles: Vector3,
    pub voice: Option<i32>,
    pub door: Door,
}

impl DoorDef {
    pub fn from_props(props: &HashMap<&str, &str>) -> Result<DoorDef, DoorDefError> {
        let classname = props.get("classname").copied().unwrap_or("");
        if classname != DOOR_CLASSNAME {
            return Err(DoorDefError::NotADoor(classname.to_owned()));
        }

        let mut door = Door::default();

        if let Some(v) = value(props, "open", parse_bool)? { door.open = v; }
        if let Some(v) = value(props, "requires_key", parse_bool)? { door.requires_key = v; }
        if let Some(v) = value(props, "shake_duration", parse_f32)? { door.shake_duration = v; }
        if let Some(v) = value(props, "shake_intensity", parse_f32)? { door.shake_intensity = v; }
        if let Some(v) = value(props, "axis", parse_axis)? { door.axis = v; }
        if let Some(v) = value(props, "open_angle", parse_f32)? { door.animation.open_angle = v; }
        if let Some(v) = value(props, "open_duration", parse_f32)? { door.animation.open_duration = v; }
        if let Some(v) = value(props, "close_duration", parse_f32)? { door.animation.close_duration = v; }
        if let Some(v) = curve(props, "open_curve")? { door.animation.open_curve = v; }
        if let Some(v) = curve(props, "close_curve")? { door.animation.close_curve = v; }

        door.key = props.get("key").map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_owned);

        for cue in SoundCue::ALL {
            let snd_key = format!("snd_{}", cue.name());
            if let Some(path) = props.get(snd_key.as_str()).filter(|v| !v.is_empty()) {
                door.sounds.set_clip(cue, Some((*path).to_owned()));
            }

            let vol_key = format!("vol_{}", cue.name());
            if let Some(v) = value(props, &vol_key, parse_f32)? {
                door.sounds.set_volume(cue, v);
            }
        }

        Ok(DoorDef {
            name: props.get("targetname").map(|v| (*v).to_owned()),
            link: props.get("link").map(|v| (*v).to_owned()),
            origin: value(props, "origin", parse_vec3)?.unwrap_or(Vector3::zero()),
            angles: value(props, "angles", parse_vec3)?.unwrap_or(Vector3::zero()),
            voice: value(props, "voice", parse_voice)?,
            door,
        })
    }

    /// Closed pose of the door: `origin`, rotated by `angles`
    pub fn transform(&self) -> Transform3D {
        Transform3D::default()
            .with_position(self.origin)
            .with_rotation(euler_degrees(self.angles))
    }
}

/// Spawn every door described in an entity list. Entities of other classes are skipped.
pub fn spawn_doors(world: &mut World, src: &str) -> Result<Vec<Entity>, DoorDefError> {
    let mut defs = Vec::new();
    let mut first_err = None;

    parse_entities(src, |props| {
        if first_err.is_some() || props.get("classname").copied() != Some(DOOR_CLASSNAME) {
            return;
        }

        match DoorDef::from_props(&props) {
            Ok(def) => defs.push(def),
            Err(e) => first_err = Some(e),
        }
    });

    if let Some(e) = first_err {
        return Err(e);
    }

    let mut named: HashMap<String, Entity> = HashMap::new();
    let mut links: Vec<(Entity, String)> = Vec::new();
    let mut spawned = Vec::with_capacity(defs.len());

    for def in defs {
        let transform = def.transform();
        let eid = world.spawn((def.door, transform));

        if let Some(voice) = def.voice {
            // entity was spawned just above
            let _ = world.insert_one(eid, AudioSource { voice });
        }
        if let Some(name) = def.name {
            match named.entry(name) {
                Entry::Vacant(e) => {
                    e.insert(eid);
                }
                Entry::Occupied(e) => {
                    warn!("Duplicate door name '{}', links resolve to the first door {:?}", e.key(), e.get());
                }
            }
        }
        if let Some(link) = def.link {
            links.push((eid, link));
        }

        debug!("Spawned door {:?}", eid);
        spawned.push(eid);
    }

    for (eid, link) in links {
        let target = *named.get(&link).ok_or_else(|| DoorDefError::UnknownLink(link.clone()))?;
        let _ = world.insert_one(eid, DoorLink { links: vec![target] });
    }

    info!("Spawned {} doors", spawned.len());
    Ok(spawned)
}

/// Read an entity list from `reader` and spawn its doors
pub fn load_doors<R: Read>(world: &mut World, mut reader: R) -> Result<Vec<Entity>, DoorFileError> {
    let mut src = String::new();
    reader.read_to_string(&mut src)?;
    Ok(spawn_doors(world, &src)?)
}
