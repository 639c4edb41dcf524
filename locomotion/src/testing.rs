//! Test doubles shared by the unit tests: analytic geometry, a recording animation
//! player, scripted abilities, and a harness that owns everything an
//! [`AbilityContext`] borrows.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet, VecDeque},
    rc::Rc,
};

use crate::{
    ability::{Ability, AbilityContext, AbilityKind, CharacterView, HookResult, Trigger},
    animation::{
        AnimationLayer, AnimationPlayer, AnimatorParameters, Crossfade, ItemStates, LAYER_COUNT,
        LayerMask, RootMotion, StateId, StateRequest,
    },
    config::ControllerSettings,
    error::AbilityError,
    events::{ControllerEvent, EventQueue},
    geometry::{GeometryQuery, PlatformId, PlatformPoses, ProbeHit, SurfaceLayer, SurfaceMask},
    math::{Quat, Vec3, up},
    motor::{Motor, MoveInput},
    move_towards::MoveTowards,
    pipeline::PipelineStage,
    scheduler::{Scheduler, TimerKey},
};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

// -------------------------------------------------------------------------
// Geometry
// -------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Block {
    min: Vec3,
    max: Vec3,
    layer: SurfaceLayer,
    platform: Option<PlatformId>,
}

impl Block {
    fn contains(&self, p: Vec3) -> bool {
        (0..3).all(|i| p[i] > self.min[i] && p[i] < self.max[i])
    }

    fn covers_xz(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Slab test. Returns entry distance and the normal of the entered face.
    fn ray(&self, origin: Vec3, dir: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::zeros();
        for axis in 0..3 {
            if dir[axis].abs() <= f32::EPSILON {
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let a = (self.min[axis] - origin[axis]) / dir[axis];
            let b = (self.max[axis] - origin[axis]) / dir[axis];
            let (near, far) = if a < b { (a, b) } else { (b, a) };
            if near > t_enter {
                t_enter = near;
                normal = Vec3::zeros();
                normal[axis] = -dir[axis].signum();
            }
            t_exit = t_exit.min(far);
        }
        (t_enter <= t_exit && t_enter >= 0.0).then_some((t_enter, normal))
    }
}

/// A horizontal floor plus axis-aligned boxes, queried analytically.
///
/// Sphere casts only support straight-down probes and treat the sphere's footprint as its
/// center column. A ray or sphere starting inside a box hits nothing.
#[derive(Clone, Debug, Default)]
pub struct TestWorld {
    floor: Option<f32>,
    blocks: Vec<Block>,
}

impl TestWorld {
    pub fn flat(y: f32) -> Self {
        Self {
            floor: Some(y),
            blocks: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.blocks.push(Block {
            min,
            max,
            layer: SurfaceLayer::Default,
            platform: None,
        });
        self
    }

    pub fn with_platform_box(mut self, min: Vec3, max: Vec3, platform: PlatformId) -> Self {
        self.blocks.push(Block {
            min,
            max,
            layer: SurfaceLayer::Platform,
            platform: Some(platform),
        });
        self
    }

    fn inside_any(&self, p: Vec3) -> bool {
        self.blocks.iter().any(|b| b.contains(p))
    }
}

fn nearest(a: Option<ProbeHit>, b: ProbeHit) -> Option<ProbeHit> {
    match a {
        Some(a) if a.distance <= b.distance => Some(a),
        _ => Some(b),
    }
}

impl GeometryQuery for TestWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_dist: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        if self.inside_any(origin) {
            return None;
        }
        let mut best = None;
        if let Some(y) = self.floor {
            if mask.contains(SurfaceLayer::Default) && dir.y < 0.0 && origin.y >= y {
                let distance = (origin.y - y) / -dir.y;
                if distance <= max_dist {
                    best = nearest(
                        best,
                        ProbeHit {
                            point: origin + dir * distance,
                            normal: up(),
                            distance,
                            layer: SurfaceLayer::Default,
                            platform: None,
                        },
                    );
                }
            }
        }
        for block in self.blocks.iter().filter(|b| mask.contains(b.layer)) {
            if let Some((distance, normal)) = block.ray(origin, dir) {
                if distance <= max_dist {
                    best = nearest(
                        best,
                        ProbeHit {
                            point: origin + dir * distance,
                            normal,
                            distance,
                            layer: block.layer,
                            platform: block.platform,
                        },
                    );
                }
            }
        }
        best
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        if dir.y > -0.99 || self.inside_any(origin) {
            return None;
        }
        let mut tops: Vec<(f32, SurfaceLayer, Option<PlatformId>)> = Vec::new();
        if let Some(y) = self.floor {
            tops.push((y, SurfaceLayer::Default, None));
        }
        for block in self.blocks.iter().filter(|b| b.covers_xz(origin)) {
            if origin.y >= block.max.y {
                tops.push((block.max.y, block.layer, block.platform));
            }
        }

        let mut best = None;
        for (top, layer, platform) in tops {
            if !mask.contains(layer) || origin.y < top {
                continue;
            }
            let distance = (origin.y - radius - top).max(0.0);
            if distance <= max_dist {
                best = nearest(
                    best,
                    ProbeHit {
                        point: Vec3::new(origin.x, top, origin.z),
                        normal: up(),
                        distance,
                        layer,
                        platform,
                    },
                );
            }
        }
        best
    }
}

/// Replays queued hits in order, then misses.
#[derive(Debug, Default)]
pub struct ScriptedGeometry {
    rays: RefCell<VecDeque<(f32, Vec3)>>,
    spheres: RefCell<VecDeque<(f32, Vec3)>>,
}

impl ScriptedGeometry {
    pub fn ray_hit(self, distance: f32, normal: Vec3) -> Self {
        self.rays.borrow_mut().push_back((distance, normal));
        self
    }

    pub fn sphere_hit(self, distance: f32, normal: Vec3) -> Self {
        self.spheres.borrow_mut().push_back((distance, normal));
        self
    }
}

fn scripted_hit(queue: &RefCell<VecDeque<(f32, Vec3)>>, origin: Vec3, dir: Vec3) -> Option<ProbeHit> {
    let (distance, normal) = queue.borrow_mut().pop_front()?;
    Some(ProbeHit {
        point: origin + dir * distance,
        normal,
        distance,
        layer: SurfaceLayer::Default,
        platform: None,
    })
}

impl GeometryQuery for ScriptedGeometry {
    fn cast_ray(&self, origin: Vec3, dir: Vec3, _: f32, _: SurfaceMask) -> Option<ProbeHit> {
        scripted_hit(&self.rays, origin, dir)
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        _: f32,
        dir: Vec3,
        _: f32,
        _: SurfaceMask,
    ) -> Option<ProbeHit> {
        scripted_hit(&self.spheres, origin, dir)
    }
}

// -------------------------------------------------------------------------
// Animation and items
// -------------------------------------------------------------------------

/// Records everything the controller hands to the animation player.
#[derive(Debug)]
pub struct RecordingPlayer {
    pub crossfades: Vec<Crossfade>,
    pub parameters: Vec<AnimatorParameters>,
    pub root_motion: RootMotion,
    pub lengths: [f32; LAYER_COUNT],
    pub normalized: [f32; LAYER_COUNT],
    /// `None` accepts every state.
    pub known: Option<HashSet<(AnimationLayer, StateId)>>,
}

impl Default for RecordingPlayer {
    fn default() -> Self {
        Self {
            crossfades: Vec::new(),
            parameters: Vec::new(),
            root_motion: RootMotion::default(),
            lengths: [1.0; LAYER_COUNT],
            normalized: [0.0; LAYER_COUNT],
            known: None,
        }
    }
}

impl RecordingPlayer {
    pub fn crossfades_on(&self, layer: AnimationLayer) -> impl Iterator<Item = &Crossfade> {
        self.crossfades.iter().filter(move |c| c.layer == layer)
    }
}

impl AnimationPlayer for RecordingPlayer {
    fn has_state(&self, layer: AnimationLayer, state: StateId) -> bool {
        self.known
            .as_ref()
            .is_none_or(|known| known.contains(&(layer, state)))
    }

    fn state_length(&self, layer: AnimationLayer) -> f32 {
        self.lengths[layer.index()]
    }

    fn normalized_time(&self, layer: AnimationLayer) -> f32 {
        self.normalized[layer.index()]
    }

    fn crossfade(&mut self, transition: Crossfade) {
        self.crossfades.push(transition);
    }

    fn set_parameters(&mut self, parameters: &AnimatorParameters) {
        self.parameters.push(*parameters);
    }

    fn root_motion(&self) -> RootMotion {
        self.root_motion
    }
}

#[derive(Debug)]
pub struct StaticItems {
    pub high: HashMap<AnimationLayer, StateRequest>,
    pub low: HashMap<AnimationLayer, StateRequest>,
    pub interact: bool,
    pub usable: bool,
}

impl Default for StaticItems {
    fn default() -> Self {
        Self {
            high: HashMap::new(),
            low: HashMap::new(),
            interact: true,
            usable: true,
        }
    }
}

impl ItemStates for StaticItems {
    fn high_priority_state(&self, layer: AnimationLayer) -> Option<StateRequest> {
        self.high.get(&layer).cloned()
    }

    fn low_priority_state(&self, layer: AnimationLayer) -> Option<StateRequest> {
        self.low.get(&layer).cloned()
    }

    fn can_interact(&self) -> bool {
        self.interact
    }

    fn can_use(&self) -> bool {
        self.usable
    }
}

// -------------------------------------------------------------------------
// Abilities
// -------------------------------------------------------------------------

type HookFn = Box<dyn FnMut(&mut AbilityContext<'_>)>;

/// An ability assembled from builder flags. Every hook it receives is appended to the
/// journal as `"<Kind>:<hook>"`.
pub struct TestAbility {
    kind: AbilityKind,
    journal: Journal,
    concurrent: bool,
    vetoes: bool,
    item_interaction: bool,
    item_use: bool,
    automatic: bool,
    replayable: bool,
    synced: bool,
    layers: LayerMask,
    states: Vec<(AnimationLayer, &'static str)>,
    claims: Vec<&'static str>,
    faults: Vec<&'static str>,
    stops_self: Vec<&'static str>,
    actions: Vec<(&'static str, HookFn)>,
    pub can_start: Rc<Cell<bool>>,
    pub should_stop: Rc<Cell<bool>>,
}

impl TestAbility {
    pub fn new(kind: AbilityKind, journal: &Journal) -> Self {
        Self {
            kind,
            journal: journal.clone(),
            concurrent: false,
            vetoes: false,
            item_interaction: true,
            item_use: true,
            automatic: false,
            replayable: false,
            synced: true,
            layers: LayerMask::empty(),
            states: Vec::new(),
            claims: Vec::new(),
            faults: Vec::new(),
            stops_self: Vec::new(),
            actions: Vec::new(),
            can_start: Rc::new(Cell::new(true)),
            should_stop: Rc::new(Cell::new(false)),
        }
    }

    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Refuses every other ability's start while active.
    pub fn vetoes_others(mut self) -> Self {
        self.vetoes = true;
        self
    }

    pub fn no_item_interaction(mut self) -> Self {
        self.item_interaction = false;
        self
    }

    pub fn no_item_use(mut self) -> Self {
        self.item_use = false;
        self
    }

    /// Starts and stops automatically; stopping follows `should_stop`.
    pub fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }

    pub fn replayable(mut self) -> Self {
        self.replayable = true;
        self
    }

    pub fn unsynced(mut self) -> Self {
        self.synced = false;
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Owns `layer` and requests `state` on it.
    pub fn controls(mut self, layer: AnimationLayer, state: &'static str) -> Self {
        self.layers.insert(layer);
        self.states.push((layer, state));
        self
    }

    pub fn claims(mut self, hook: &'static str) -> Self {
        self.claims.push(hook);
        self
    }

    pub fn faults_on(mut self, hook: &'static str) -> Self {
        self.faults.push(hook);
        self
    }

    pub fn stops_self_on(mut self, hook: &'static str) -> Self {
        self.stops_self.push(hook);
        self
    }

    pub fn on(
        mut self,
        hook: &'static str,
        action: impl FnMut(&mut AbilityContext<'_>) + 'static,
    ) -> Self {
        self.actions.push((hook, Box::new(action)));
        self
    }

    fn record(&self, hook: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{hook}", self.kind.label()));
    }

    fn run(&mut self, hook: &'static str, ctx: &mut AbilityContext<'_>) {
        self.record(hook);
        self.act(hook, ctx);
    }

    fn act(&mut self, hook: &'static str, ctx: &mut AbilityContext<'_>) {
        for (name, action) in self.actions.iter_mut() {
            if *name == hook {
                action(ctx);
            }
        }
        if self.stops_self.contains(&hook) {
            ctx.stop_self();
        }
    }

    fn hook(&mut self, hook: &'static str, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.run(hook, ctx);
        if self.faults.contains(&hook) {
            return Err(AbilityError::fault(self.kind.label(), "scripted fault"));
        }
        Ok(self.claims.contains(&hook))
    }
}

impl Ability for TestAbility {
    fn kind(&self) -> AbilityKind {
        self.kind
    }

    fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    fn start_trigger(&self) -> Trigger {
        if self.automatic {
            Trigger::Automatic
        } else {
            Trigger::ButtonDown
        }
    }

    fn stop_trigger(&self) -> Trigger {
        if self.automatic {
            Trigger::Automatic
        } else {
            Trigger::ButtonUp
        }
    }

    fn can_start(&self, _view: &CharacterView<'_>) -> bool {
        self.can_start.get()
    }

    fn allows_start_of(&self, _candidate: &dyn Ability) -> bool {
        !self.vetoes
    }

    fn should_stop(&self, _view: &CharacterView<'_>) -> bool {
        self.should_stop.get()
    }

    fn can_interact_item(&self) -> bool {
        self.item_interaction
    }

    fn can_use_item(&self) -> bool {
        self.item_use
    }

    fn on_start(&mut self, ctx: &mut AbilityContext<'_>) {
        self.run("on_start", ctx);
    }

    fn on_stop(&mut self, ctx: &mut AbilityContext<'_>) {
        self.run("on_stop", ctx);
    }

    fn on_timer(&mut self, key: TimerKey, ctx: &mut AbilityContext<'_>) {
        self.record(&format!("on_timer:{key}"));
        self.act("on_timer", ctx);
    }

    fn on_arrived(&mut self, ctx: &mut AbilityContext<'_>) {
        self.run("on_arrived", ctx);
    }

    fn on_move(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook("on_move", ctx)
    }

    fn check_ground(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::CheckGround.name(), ctx)
    }

    fn check_external_forces(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::CheckExternalForces.name(), ctx)
    }

    fn check_movement(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::CheckMovement.name(), ctx)
    }

    fn set_surface_material(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::SetSurfaceMaterial.name(), ctx)
    }

    fn update_velocity(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::UpdateVelocity.name(), ctx)
    }

    fn update_platform(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::UpdatePlatform.name(), ctx)
    }

    fn update_rotation(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::UpdateRotation.name(), ctx)
    }

    fn push_animator_parameters(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::PushAnimatorParameters.name(), ctx)
    }

    fn apply_animator_root_motion(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::ApplyAnimatorRootMotion.name(), ctx)
    }

    fn update_collider(&mut self, ctx: &mut AbilityContext<'_>) -> HookResult {
        self.hook(PipelineStage::UpdateCollider.name(), ctx)
    }

    fn animator_layers(&self) -> LayerMask {
        self.layers
    }

    fn destination_state_name(&self, layer: AnimationLayer) -> Option<&str> {
        self.states
            .iter()
            .find_map(|&(l, state)| (l == layer).then_some(state))
    }

    fn can_replay(&self) -> bool {
        self.replayable
    }

    fn sync_upper_body(&self) -> bool {
        self.synced
    }
}

// -------------------------------------------------------------------------
// Harness
// -------------------------------------------------------------------------

/// Owns one of everything a hook context borrows. Defaults: standing at the origin on
/// a flat floor, default settings, 60 Hz.
pub struct Harness {
    pub settings: ControllerSettings,
    pub motor: Motor,
    pub world: TestWorld,
    /// Takes precedence over `world` when set.
    pub scripted: Option<ScriptedGeometry>,
    pub items: StaticItems,
    pub player: RecordingPlayer,
    pub scheduler: Scheduler,
    pub move_towards: Option<MoveTowards>,
    pub platforms: PlatformPoses,
    pub events: EventQueue,
    pub input: MoveInput,
    pub dt: f32,
}

impl Harness {
    pub fn new() -> Self {
        let settings = ControllerSettings::default();
        let motor = Motor::new(Vec3::zeros(), Quat::identity(), &settings);
        Self {
            settings,
            motor,
            world: TestWorld::flat(0.0),
            scripted: None,
            items: StaticItems::default(),
            player: RecordingPlayer::default(),
            scheduler: Scheduler::default(),
            move_towards: None,
            platforms: PlatformPoses::default(),
            events: EventQueue::default(),
            input: MoveInput::default(),
            dt: 1.0 / 60.0,
        }
    }

    pub fn ctx(&mut self) -> AbilityContext<'_> {
        let geometry: &dyn GeometryQuery = match &self.scripted {
            Some(scripted) => scripted,
            None => &self.world,
        };
        AbilityContext::new(
            &mut self.motor,
            &self.settings,
            geometry,
            &self.items,
            &mut self.player,
            &mut self.scheduler,
            &mut self.move_towards,
            &self.platforms,
            &mut self.events,
            self.input,
            self.dt,
        )
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain().collect()
    }
}
