use crate::{
    ability::AbilityIndex,
    animation::{AnimationPlayer, ItemStates},
    config::ControllerSettings,
    events::{ControllerEvent, EventQueue},
    geometry::{GeometryQuery, PlatformPoses},
    math::{Quat, Vec3},
    motor::{Motor, MoveInput},
    move_towards::MoveTowards,
    scheduler::{Scheduler, TimerHandle, TimerKey},
};

/// Read-only view of the character for predicates (`can_start`, `should_stop`, `update`).
#[derive(Clone, Copy)]
pub struct CharacterView<'a> {
    pub motor: &'a Motor,
    pub settings: &'a ControllerSettings,
    pub geometry: &'a dyn GeometryQuery,
    pub items: &'a dyn ItemStates,
    pub input: MoveInput,
}

impl CharacterView<'_> {
    pub fn grounded(&self) -> bool {
        self.motor.grounded
    }

    pub fn moving(&self) -> bool {
        self.motor.moving
    }

    pub fn velocity(&self) -> Vec3 {
        self.motor.velocity
    }
}

/// Everything a hook may touch during one tick.
///
/// Motor overrides made through this context (root motion, kinematic mode, collider
/// height) are recorded against the calling ability and reverted when it stops. The same
/// holds for timers and move-towards requests.
pub struct AbilityContext<'a> {
    pub(crate) motor: &'a mut Motor,
    pub(crate) settings: &'a ControllerSettings,
    pub(crate) geometry: &'a dyn GeometryQuery,
    pub(crate) items: &'a dyn ItemStates,
    pub(crate) animator: &'a mut dyn AnimationPlayer,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) move_towards: &'a mut Option<MoveTowards>,
    pub(crate) platforms: &'a PlatformPoses,
    pub(crate) events: &'a mut EventQueue,
    pub(crate) input: MoveInput,
    pub(crate) dt: f32,
    /// Highest-priority active ability and its int data, for the animator parameters.
    pub(crate) lead: Option<(AbilityIndex, i32)>,
    /// Ability whose hook is running, `None` inside engine defaults.
    pub(crate) current: Option<AbilityIndex>,
    pub(crate) pending_stops: Vec<AbilityIndex>,
}

impl<'a> AbilityContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        motor: &'a mut Motor,
        settings: &'a ControllerSettings,
        geometry: &'a dyn GeometryQuery,
        items: &'a dyn ItemStates,
        animator: &'a mut dyn AnimationPlayer,
        scheduler: &'a mut Scheduler,
        move_towards: &'a mut Option<MoveTowards>,
        platforms: &'a PlatformPoses,
        events: &'a mut EventQueue,
        input: MoveInput,
        dt: f32,
    ) -> Self {
        Self {
            motor,
            settings,
            geometry,
            items,
            animator,
            scheduler,
            move_towards,
            platforms,
            events,
            input,
            dt,
            lead: None,
            current: None,
            pending_stops: Vec::new(),
        }
    }

    pub fn view(&self) -> CharacterView<'_> {
        CharacterView {
            motor: &*self.motor,
            settings: self.settings,
            geometry: self.geometry,
            items: self.items,
            input: self.input,
        }
    }

    pub fn motor(&self) -> &Motor {
        self.motor
    }

    pub fn motor_mut(&mut self) -> &mut Motor {
        self.motor
    }

    pub fn settings(&self) -> &ControllerSettings {
        self.settings
    }

    pub fn geometry(&self) -> &dyn GeometryQuery {
        self.geometry
    }

    pub fn items(&self) -> &dyn ItemStates {
        self.items
    }

    pub fn animator(&mut self) -> &mut dyn AnimationPlayer {
        &mut *self.animator
    }

    pub fn platforms(&self) -> &PlatformPoses {
        self.platforms
    }

    pub fn input(&self) -> MoveInput {
        self.input
    }

    /// Rewritable from the Move hook; the stage sequence reads the result.
    pub fn input_mut(&mut self) -> &mut MoveInput {
        &mut self.input
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Index of the ability whose hook is running.
    pub fn index(&self) -> Option<AbilityIndex> {
        self.current
    }

    fn owner(&self, what: &str) -> Option<AbilityIndex> {
        if self.current.is_none() {
            log::warn!("{what} requested outside an ability hook; ignored");
        }
        self.current
    }

    /// Drive lateral velocity from root motion while this ability is active.
    pub fn force_root_motion(&mut self, enabled: bool) {
        let Some(owner) = self.owner("force_root_motion") else {
            return;
        };
        let overrides = &mut self.motor.overrides;
        if enabled {
            overrides.root_motion = Some(owner);
        } else if overrides.root_motion == Some(owner) {
            overrides.root_motion = None;
        }
    }

    /// Stop writing velocity back to the body while this ability is active.
    pub fn set_kinematic(&mut self, enabled: bool) {
        let Some(owner) = self.owner("set_kinematic") else {
            return;
        };
        let overrides = &mut self.motor.overrides;
        if enabled {
            overrides.kinematic = Some(owner);
        } else if overrides.kinematic == Some(owner) {
            overrides.kinematic = None;
        }
    }

    /// Applied by the `UpdateCollider` stage; reverted when this ability stops.
    pub fn override_collider_height(&mut self, height: f32) {
        if let Some(owner) = self.owner("override_collider_height") {
            self.motor.overrides.collider_height = Some((owner, height.max(0.0)));
        }
    }

    pub fn clear_collider_height(&mut self) {
        if let Some(owner) = self.current {
            if matches!(self.motor.overrides.collider_height, Some((o, _)) if o == owner) {
                self.motor.overrides.collider_height = None;
            }
        }
    }

    /// One-shot timer. Owned by the calling ability when inside a hook.
    pub fn schedule(&mut self, delay_seconds: f32, key: TimerKey) -> TimerHandle {
        self.scheduler.schedule(self.current, delay_seconds, key)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    /// Walk to `target` over the next ticks, then turn to `facing` if given.
    ///
    /// Replaces the caller's own move in progress. Refused, returning `false`, while
    /// another ability's move is pending.
    pub fn move_towards(&mut self, target: Vec3, facing: Option<Quat>, speed: f32) -> bool {
        let Some(owner) = self.owner("move_towards") else {
            return false;
        };
        if let Some(pending) = self.move_towards.as_ref().filter(|m| m.owner != owner) {
            log::warn!(
                "move-towards from ability {owner} refused: ability {} is still moving",
                pending.owner
            );
            return false;
        }
        let mut mover = MoveTowards::new(owner, target, speed);
        if let Some(facing) = facing {
            mover = mover.facing(facing);
        }
        *self.move_towards = Some(mover);
        true
    }

    /// Cancels the pending move. Inside a hook only the caller's own move is cancelled.
    pub fn cancel_move_towards(&mut self) -> bool {
        let owned = match (self.move_towards.as_ref(), self.current) {
            (Some(mover), Some(current)) => mover.owner == current,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if owned {
            *self.move_towards = None;
        }
        owned
    }

    pub fn move_towards_pending(&self) -> bool {
        self.move_towards.is_some()
    }

    /// Queued until the next `CheckExternalForces` stage.
    pub fn add_force(&mut self, force: Vec3) {
        self.motor.add_force(force);
    }

    /// Requests that the calling ability stop once the current hook returns.
    pub fn stop_self(&mut self) {
        if let Some(owner) = self.owner("stop_self") {
            if !self.pending_stops.contains(&owner) {
                self.pending_stops.push(owner);
            }
        }
    }

    pub(crate) fn emit(&mut self, event: ControllerEvent) {
        self.events.push(event);
    }
}
