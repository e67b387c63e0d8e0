#[cfg(target_arch = "wasm32")]
extern crate dbsdk_rs;

use rand_xoshiro::Xoshiro128PlusPlus;

pub mod asset_loader;
pub mod common;
pub mod component;
pub mod curve;
pub mod door_def;
#[cfg(target_arch = "wasm32")]
pub mod logger;
pub mod math;
pub mod parse_utils;
pub mod sound;
pub mod system;

pub type DoorRng = Xoshiro128PlusPlus;

pub struct TimeData {
    pub delta_time: f32,
}

/// Gamepad state sampled once per frame
#[derive(Clone, Copy, Default)]
pub struct InputState {
    pub move_x: f32,
    pub move_y: f32,
    /// Use button went down this frame
    pub use_pressed: bool,
    use_held: bool,
}

impl InputState {
    pub fn update(&mut self, move_x: f32, move_y: f32, use_down: bool) {
        self.move_x = move_x;
        self.move_y = move_y;
        self.use_pressed = use_down && !self.use_held;
        self.use_held = use_down;
    }
}

#[cfg(target_arch = "wasm32")]
mod cartridge {
    use std::sync::Mutex;

    use dbsdk_rs::{audio, db, gamepad::{Gamepad, GamepadButton, GamepadSlot}, io::{FileMode, FileStream}, vdp::{self, Color32}};
    use hecs::World;
    use lazy_static::lazy_static;
    use log::{error, info, warn, LevelFilter};
    use rand::SeedableRng;

    use crate::{component::{door::{DoorUser, DoorUserInput, KeyRing}, playerinput::PlayerInput, transform3d::Transform3D}, door_def::{self, DoorFileError}, logger, math::Vector3, sound::DbAudioPlayer, system::{door_system::door_system_update, player_system::player_input_update}, DoorRng, InputState, TimeData};

    const DOOR_DEFS_PATH: &str = "/cd/content/doors.ent";
    const PLAYER_REACH: f32 = 64.0;

    struct GameState {
        world: World,
        audio: DbAudioPlayer,
        rng: DoorRng,
        input: InputState,
        time: TimeData,
        last_tick: f64,
    }

    lazy_static! {
        static ref GAME: Mutex<Option<GameState>> = Mutex::new(None);
    }

    fn load_doors(world: &mut World) -> Result<usize, DoorFileError> {
        let file = FileStream::open(DOOR_DEFS_PATH, FileMode::Read).map_err(DoorFileError::Open)?;
        Ok(door_def::load_doors(world, file)?.len())
    }

    fn read_input(input: &mut InputState) {
        let pad = Gamepad::new(GamepadSlot::SlotA).read_state();
        let axis = |neg: GamepadButton, pos: GamepadButton| {
            (pad.is_pressed(pos) as i32 - pad.is_pressed(neg) as i32) as f32
        };

        input.update(
            axis(GamepadButton::Left, GamepadButton::Right),
            axis(GamepadButton::Down, GamepadButton::Up),
            pad.is_pressed(GamepadButton::A),
        );
    }

    fn tick() {
        vdp::clear_color(Color32::new(128, 128, 255, 255));

        let Ok(mut game) = GAME.lock() else {
            return;
        };
        let Some(game) = game.as_mut() else {
            return;
        };

        let now = audio::get_time();
        game.time.delta_time = (now - game.last_tick).max(0.0) as f32;
        game.last_tick = now;

        read_input(&mut game.input);
        player_input_update(&game.input, &game.time, &mut game.world);
        door_system_update(&game.time, &mut game.world, &mut game.audio, &mut game.rng);
    }

    #[no_mangle]
    pub fn main(_: i32, _: i32) -> i32 {
        db::register_panic();

        if logger::init(LevelFilter::Debug).is_err() {
            db::log("Logger already installed");
        }

        let mut world = World::new();
        match load_doors(&mut world) {
            Ok(count) => info!("Loaded {} doors from {}", count, DOOR_DEFS_PATH),
            Err(e @ DoorFileError::Def(_)) => error!("Failed spawning doors: {}", e),
            Err(e) => warn!("No door definitions loaded from {}: {}", DOOR_DEFS_PATH, e),
        }

        world.spawn((
            Transform3D::default().with_position(Vector3::zero()),
            DoorUser { reach: PLAYER_REACH },
            DoorUserInput::default(),
            KeyRing::default(),
            PlayerInput {},
        ));

        let now = audio::get_time();
        let game = GameState {
            world,
            audio: DbAudioPlayer::new(),
            rng: DoorRng::seed_from_u64(now.to_bits()),
            input: InputState::default(),
            time: TimeData { delta_time: 0.0 },
            last_tick: now,
        };

        match GAME.lock() {
            Ok(mut g) => *g = Some(game),
            Err(_) => {
                error!("Game state lock poisoned");
                return 1;
            }
        }

        info!("Door demo started");
        vdp::set_vsync_handler(Some(tick));
        return 0;
    }
}
