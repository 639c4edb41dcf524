/*!
Per-tick locomotion pipeline and the character controller that owns it.

Every fixed tick the controller fires due timers, refreshes ability
indicators, applies automatic stops, polls any move-towards request, offers
the Move hook, then runs the stage sequence. At each stage the active
abilities are offered the hook in priority order and the built-in default
runs only when none claims it. Position is integrated after the stages,
automatic starts are attempted, and finally the animation layers are
resolved.

- stage:    [`PipelineStage`], hook dispatch and defaults
- ground:   downward sphere probe, snapping, fall height
- forces:   external force blending against the drive fraction
- step:     forward/down probes, step impulse, wall blocking
- surface:  surface material from grounded/moving state
- velocity: root-motion or input-driven lateral velocity, gravity
- platform: moving-platform follow and attachment
- rotation: root-motion rotation, turn toward look or move heading
- animator: parameter push and root-motion pull
- collider: collider height overrides
*/

pub mod animator;
pub mod collider;
pub mod forces;
pub mod ground;
pub mod platform;
pub mod rotation;
pub mod stage;
pub mod step;
pub mod surface;
pub mod velocity;

pub use stage::PipelineStage;

use crate::{
    ability::{Ability, AbilityArbitrator, AbilityContext, AbilityIndex},
    animation::{AnimationLayer, AnimationLayerResolver, AnimationPlayer, ItemStates, StateId},
    config::ControllerSettings,
    error::{ConfigError, StartRejection},
    events::{ControllerEvent, EventQueue},
    geometry::{GeometryQuery, PlatformId, PlatformPoses},
    math::{Iso, Quat, Vec3},
    motor::{Motor, MoveInput},
    move_towards::{MovePoll, MoveTowards},
    scheduler::Scheduler,
};

/// The host-side services a tick talks to.
pub struct Collaborators<'a> {
    pub geometry: &'a dyn GeometryQuery,
    pub items: &'a dyn ItemStates,
    pub animator: &'a mut dyn AnimationPlayer,
}

/// One simulated character: motor, abilities, animation resolver and outbox.
pub struct CharacterController {
    settings: ControllerSettings,
    motor: Motor,
    abilities: AbilityArbitrator,
    resolver: AnimationLayerResolver,
    scheduler: Scheduler,
    move_towards: Option<MoveTowards>,
    platforms: PlatformPoses,
    events: EventQueue,
    last_input: MoveInput,
}

impl CharacterController {
    /// Abilities are registered in priority order: index 0 wins every conflict.
    pub fn new(
        settings: ControllerSettings,
        abilities: Vec<Box<dyn Ability>>,
        position: Vec3,
        rotation: Quat,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let motor = Motor::new(position, rotation, &settings);
        log::debug!(
            "character controller created with {} abilities",
            abilities.len()
        );
        Ok(Self {
            settings,
            motor,
            abilities: AbilityArbitrator::new(abilities),
            resolver: AnimationLayerResolver::default(),
            scheduler: Scheduler::default(),
            move_towards: None,
            platforms: PlatformPoses::default(),
            events: EventQueue::default(),
            last_input: MoveInput::default(),
        })
    }

    /// Builds a hook context over the controller's state, runs `f`, then applies any
    /// stops requested during it.
    fn with_context<R>(
        &mut self,
        input: MoveInput,
        dt: f32,
        collab: &mut Collaborators<'_>,
        f: impl FnOnce(
            &mut AbilityArbitrator,
            &mut AnimationLayerResolver,
            &mut AbilityContext<'_>,
        ) -> R,
    ) -> R {
        let Self {
            settings,
            motor,
            abilities,
            resolver,
            scheduler,
            move_towards,
            platforms,
            events,
            ..
        } = self;
        let mut ctx = AbilityContext::new(
            motor,
            settings,
            collab.geometry,
            collab.items,
            &mut *collab.animator,
            scheduler,
            move_towards,
            platforms,
            events,
            input,
            dt,
        );
        let out = f(abilities, resolver, &mut ctx);
        abilities.flush_stops(&mut ctx);
        out
    }

    /// Advances the character by one fixed tick of `dt` seconds.
    pub fn fixed_update(&mut self, input: MoveInput, dt: f32, collab: &mut Collaborators<'_>) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("ignoring fixed update with dt={dt}");
            return;
        }
        self.last_input = input;
        let fired = self.scheduler.advance(dt);

        self.with_context(input, dt, collab, |abilities, resolver, ctx| {
            for timer in fired {
                abilities.dispatch_timer(timer, ctx);
                abilities.flush_stops(ctx);
            }

            abilities.update_all(ctx);
            abilities.stop_automatic(ctx);
            poll_move_towards(abilities, ctx);

            let claimed = abilities.offer_move(ctx);
            abilities.flush_stops(ctx);
            match claimed {
                Some(index) => log::trace!("movement owned by ability {index}; stages skipped"),
                None => run_stages(abilities, ctx),
            }

            abilities.start_automatic(ctx);
            resolver.resolve(abilities, ctx);
        });
    }

    pub fn try_start_ability(
        &mut self,
        index: AbilityIndex,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), StartRejection> {
        let input = self.last_input;
        self.with_context(input, 0.0, collab, |abilities, _, ctx| {
            abilities.try_start(index, ctx)
        })
    }

    /// Unconditional once called; returns whether the ability was active.
    pub fn try_stop_ability(&mut self, index: AbilityIndex, collab: &mut Collaborators<'_>) -> bool {
        let input = self.last_input;
        self.with_context(input, 0.0, collab, |abilities, _, ctx| {
            abilities.try_stop(index, ctx)
        })
    }

    /// Forced stop of every active ability, e.g. on death.
    pub fn stop_all_abilities(&mut self, collab: &mut Collaborators<'_>) {
        let input = self.last_input;
        self.with_context(input, 0.0, collab, |abilities, _, ctx| {
            abilities.stop_all(ctx)
        });
    }

    /// Stops everything and places a fresh motor at `position`.
    pub fn respawn(&mut self, position: Vec3, rotation: Quat, collab: &mut Collaborators<'_>) {
        self.stop_all_abilities(collab);
        self.scheduler.clear();
        self.move_towards = None;
        self.resolver.reset();
        self.motor = Motor::new(position, rotation, &self.settings);
        self.last_input = MoveInput::idle(rotation);
        log::debug!("respawned at {position:?}");
    }

    /// Latest world pose of a moving platform. Call before each tick.
    pub fn set_platform_pose(&mut self, id: PlatformId, pose: Iso) {
        self.platforms.set(id, pose);
    }

    pub fn remove_platform(&mut self, id: PlatformId) {
        self.platforms.remove(id);
    }

    /// Instantaneous velocity change applied at the next `CheckExternalForces` stage.
    pub fn add_force(&mut self, force: Vec3) {
        self.motor.add_force(force);
    }

    /// Refused while the items or an active ability disallow item interaction.
    pub fn set_aiming(&mut self, aiming: bool, collab: &Collaborators<'_>) -> bool {
        if aiming
            && !(collab.items.can_interact()
                && self.active_abilities_allow(|ability| ability.can_interact_item()))
        {
            log::debug!("aiming refused");
            return false;
        }
        self.motor.aiming = aiming;
        true
    }

    /// Whether the equipped item may be used (fired, reloaded) right now.
    pub fn can_use_item(&self, collab: &Collaborators<'_>) -> bool {
        collab.items.can_use() && self.active_abilities_allow(|ability| ability.can_use_item())
    }

    fn active_abilities_allow(&self, allows: impl Fn(&dyn Ability) -> bool) -> bool {
        self.abilities
            .active_indices()
            .filter_map(|index| self.abilities.ability(index))
            .all(allows)
    }

    /// Host-level kinematic switch, independent of ability overrides.
    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.motor.kinematic = kinematic;
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn abilities(&self) -> &AbilityArbitrator {
        &self.abilities
    }

    pub fn grounded(&self) -> bool {
        self.motor.grounded
    }

    pub fn moving(&self) -> bool {
        self.motor.moving
    }

    pub fn aiming(&self) -> bool {
        self.motor.aiming
    }

    pub fn velocity(&self) -> Vec3 {
        self.motor.velocity
    }

    pub fn position(&self) -> Vec3 {
        self.motor.position
    }

    pub fn rotation(&self) -> Quat {
        self.motor.rotation
    }

    pub fn is_ability_active(&self, index: AbilityIndex) -> bool {
        self.abilities.is_active(index)
    }

    /// State last requested on `layer`.
    pub fn active_state(&self, layer: AnimationLayer) -> Option<StateId> {
        self.resolver.active_state(layer)
    }

    pub fn active_state_name(&self, layer: AnimationLayer) -> Option<&str> {
        self.resolver.active_state_name(layer)
    }

    /// Hands out the notifications emitted since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ControllerEvent> + '_ {
        self.events.drain()
    }
}

/// Steering replaces the tick input, turning holds the character still, and arrival
/// notifies the owner.
fn poll_move_towards(abilities: &mut AbilityArbitrator, ctx: &mut AbilityContext<'_>) {
    let polled = match ctx.move_towards.as_mut() {
        Some(mover) => (mover.owner, mover.poll(ctx.motor, ctx.settings, ctx.dt)),
        None => return,
    };
    match polled {
        (_, MovePoll::Steer(input)) => ctx.input = input,
        (_, MovePoll::Turn) => ctx.input = MoveInput::idle(ctx.input.look_rotation),
        (owner, MovePoll::Arrived) => {
            *ctx.move_towards = None;
            ctx.input = MoveInput::idle(ctx.input.look_rotation);
            log::debug!("move-towards for ability {owner} arrived");
            abilities.dispatch_arrived(owner, ctx);
            abilities.flush_stops(ctx);
        }
    }
}

fn run_stages(abilities: &mut AbilityArbitrator, ctx: &mut AbilityContext<'_>) {
    let motor = &mut *ctx.motor;
    motor.move_direction = ctx.input.world_direction();
    motor.moving = motor.move_direction.norm() > ctx.settings.moving_threshold;
    ctx.lead = abilities.lead();
    let held_velocity = motor.velocity;

    for stage in PipelineStage::ALL {
        if abilities.claim_stage(stage, ctx).is_none() {
            stage.run_default(ctx);
        }
        abilities.flush_stops(ctx);
    }

    let dt = ctx.dt;
    let motor = &mut *ctx.motor;
    if motor.is_kinematic() {
        // Neither position nor velocity is written back while kinematic.
        motor.velocity = held_velocity;
    } else {
        motor.position += motor.velocity * dt;
    }
    platform::refresh_attachment(ctx);
}
