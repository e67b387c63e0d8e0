use hecs::{CommandBuffer, Entity, World};
use log::{debug, info};
use rand::Rng;

use crate::{common::{axis_angle, quat_nlerp}, component::{door::{AudioSource, Door, DoorAxis, DoorLink, DoorMotion, DoorState, DoorUseRequest, DoorUser, DoorUserInput, KeyRing, SoundCue, MAX_SHAKE_INTENSITY}, transform3d::Transform3D}, sound::{play_cue, stop_sounds, SoundPlayer}, TimeData};

/// Normalized progress of a swing. Non-positive durations finish immediately.
fn swing_progress(timer: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    }
    else {
        (timer / duration).clamp(0.0, 1.0)
    }
}

/// Whether an actor carrying `keys` may unlock `door`
pub fn has_key(door: &Door, keys: Option<&KeyRing>) -> bool {
    match &door.key {
        None => true,
        Some(key) => keys.map_or(false, |ring| ring.contains(key)),
    }
}

/// Capture the closed pose of new doors, swinging doors which start open into their open pose
pub fn door_system_init(world: &mut World) {
    let mut cmd_buf = CommandBuffer::new();
    for (eid, (door, transform)) in world.query_mut::<(&Door, &mut Transform3D)>().without::<&DoorState>() {
        cmd_buf.insert_one(eid, DoorState::new(transform.rotation));

        if door.open {
            transform.rotate_local(door.axis.unit_vector(), door.animation.open_angle);
        }
    }
    cmd_buf.run_on(world);
}

/// Respond to an actor using a door: toggle it, unlock it, or rattle it if the actor lacks the key
pub fn door_interact(door: &mut Door, state: &mut DoorState, transform: &mut Transform3D, source: Option<&AudioSource>, user_keys: Option<&KeyRing>, player: &mut dyn SoundPlayer) {
    stop_sounds(player, source);

    // cancel whatever the door was doing
    if let DoorMotion::Shaking { origin } = state.motion {
        transform.rotation = origin;
    }
    state.motion = DoorMotion::Idle;
    state.timer = 0.0;
    state.start_cue = None;

    // swing cues wait for the first animation step, so a swing that finishes
    // on its first frame doesn't have its own cue stopped
    if !door.requires_key {
        door.open = !door.open;

        if door.open {
            debug!("Door opening");
            state.motion = DoorMotion::Opening;
            state.start_cue = Some(SoundCue::Open);
        }
        else {
            debug!("Door closing");
            state.motion = DoorMotion::Closing;
            state.start_cue = Some(SoundCue::Close);
        }
    }
    else if !has_key(door, user_keys) {
        info!("Door is locked (needs key {:?})", door.key);
        state.motion = DoorMotion::Shaking { origin: transform.rotation };
        play_cue(player, source, &door.sounds, SoundCue::LockedReject);
    }
    else {
        info!("Door unlocked");
        play_cue(player, source, &door.sounds, SoundCue::Unlock);
        door.requires_key = false;
    }
}

/// Advance a door's current motion by one frame
pub fn door_animate<R: Rng>(time: &TimeData, door: &Door, state: &mut DoorState, transform: &mut Transform3D, source: Option<&AudioSource>, player: &mut dyn SoundPlayer, rng: &mut R) {
    let open_rotation = state.closed_rotation * door.open_offset();

    match state.motion {
        DoorMotion::Idle => {}
        DoorMotion::Opening => {
            state.timer += time.delta_time;
            let t = swing_progress(state.timer, door.animation.open_duration);
            let c = door.animation.open_curve.evaluate(t);

            transform.rotation = quat_nlerp(state.closed_rotation, open_rotation, c);

            if t >= 1.0 {
                debug!("Door finished opening");
                state.motion = DoorMotion::Idle;
                state.timer = 0.0;
                stop_sounds(player, source);
            }
        }
        DoorMotion::Closing => {
            state.timer += time.delta_time;
            let t = swing_progress(state.timer, door.animation.close_duration);
            let c = door.animation.close_curve.evaluate(t);

            transform.rotation = quat_nlerp(open_rotation, state.closed_rotation, c);

            if t >= 1.0 {
                debug!("Door finished closing");
                state.motion = DoorMotion::Idle;
                state.timer = 0.0;
                stop_sounds(player, source);
                play_cue(player, source, &door.sounds, SoundCue::CloseEnd);
            }
        }
        DoorMotion::Shaking { origin } => {
            state.timer += time.delta_time;

            if state.timer < door.shake_duration {
                let intensity = door.shake_intensity.abs().min(MAX_SHAKE_INTENSITY);
                let shake_x = rng.random_range(-intensity..=intensity);
                let shake_y = rng.random_range(-intensity..=intensity);

                transform.rotation = origin
                    * axis_angle(DoorAxis::X.unit_vector(), shake_x)
                    * axis_angle(DoorAxis::Y.unit_vector(), shake_y);
            }
            else {
                transform.rotation = origin;
                state.motion = DoorMotion::Idle;
                state.timer = 0.0;
                stop_sounds(player, source);
            }
        }
    }

    if let Some(cue) = state.start_cue.take() {
        play_cue(player, source, &door.sounds, cue);
    }
}

// first pass: actors pressing use issue a request to the nearest door within reach
fn door_use_pass(world: &mut World) {
    let doors = world
        .query::<(&Door, &Transform3D)>()
        .iter()
        .map(|(eid, (_, transform))| (eid, transform.position))
        .collect::<Vec<_>>();

    let mut cmd_buf = CommandBuffer::new();
    for (user, (door_user, input, transform)) in world.query_mut::<(&DoorUser, &mut DoorUserInput, &Transform3D)>() {
        if !input.use_pressed {
            continue;
        }
        input.use_pressed = false;

        let nearest = doors
            .iter()
            .map(|(eid, pos)| (*eid, (*pos - transform.position).length_sq()))
            .filter(|(_, dist)| *dist <= door_user.reach * door_user.reach)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((door, _)) = nearest {
            cmd_buf.insert_one(door, DoorUseRequest { user });
        }
    }

    cmd_buf.run_on(world);
}

// second pass: propagate requests to linked doors
fn door_link_pass(world: &mut World) {
    let mut cmd_buf = CommandBuffer::new();
    for (_, (request, link)) in world.query_mut::<(&DoorUseRequest, &DoorLink)>() {
        for target in &link.links {
            cmd_buf.insert_one(*target, *request);
        }
    }

    cmd_buf.run_on(world);
}

// third pass: consume requests
fn door_interact_pass(world: &mut World, player: &mut dyn SoundPlayer) {
    let requests = world
        .query_mut::<&DoorUseRequest>()
        .into_iter()
        .map(|(eid, request)| (eid, request.user))
        .collect::<Vec<(Entity, Entity)>>();

    for (door_eid, user) in requests {
        let _ = world.remove_one::<DoorUseRequest>(door_eid);
        let keys = world.get::<&KeyRing>(user).ok().map(|ring| (*ring).clone());

        if let Ok((door, state, transform, source)) = world.query_one_mut::<(&mut Door, &mut DoorState, &mut Transform3D, Option<&AudioSource>)>(door_eid) {
            debug!("{:?} used door {:?}", user, door_eid);
            door_interact(door, state, transform, source, keys.as_ref(), player);
        }
    }
}

// final pass: animate doors
fn door_animate_pass<R: Rng>(time: &TimeData, world: &mut World, player: &mut dyn SoundPlayer, rng: &mut R) {
    for (_, (door, state, transform, source)) in world.query_mut::<(&Door, &mut DoorState, &mut Transform3D, Option<&AudioSource>)>() {
        door_animate(time, door, state, transform, source, player, rng);
    }
}

/// System which lets actors use doors, and swings, unlocks & rattles doors in response
pub fn door_system_update<R: Rng>(time: &TimeData, world: &mut World, player: &mut dyn SoundPlayer, rng: &mut R) {
    door_system_init(world);
    door_use_pass(world);
    door_link_pass(world);
    door_interact_pass(world, player);
    door_animate_pass(time, world, player, rng);
}
