use fxhash::FxHashSet;

use crate::{
    ability::{AbilityArbitrator, AbilityContext, AbilityIndex},
    animation::{AnimationLayer, Crossfade, LAYER_COUNT, StateId, StateNameCache, StateRequest},
    error::ConfigError,
    events::ControllerEvent,
};

/// Where a layer's request came from this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestSource {
    ItemHigh,
    Ability(AbilityIndex),
    ItemLow,
    Default,
}

enum Selection {
    Request(StateRequest, RequestSource),
    /// An active ability owns the layer but requests nothing: leave it playing.
    Hold,
}

/// Resolves one destination state per layer each tick and hands transitions to the
/// animation player.
///
/// Owns the per-layer last-requested identity used to suppress redundant transitions.
#[derive(Debug, Default)]
pub struct AnimationLayerResolver {
    active: [Option<StateId>; LAYER_COUNT],
    names: StateNameCache,
    reported_unknown: FxHashSet<(AnimationLayer, StateId)>,
}

impl AnimationLayerResolver {
    /// Identity last requested on `layer`.
    pub fn active_state(&self, layer: AnimationLayer) -> Option<StateId> {
        self.active[layer.index()]
    }

    /// Name of the state last requested on `layer`.
    pub fn active_state_name(&self, layer: AnimationLayer) -> Option<&str> {
        self.active_state(layer).and_then(|id| self.names.name(id))
    }

    /// Forgets the last-requested states, e.g. on respawn.
    pub fn reset(&mut self) {
        self.active = [None; LAYER_COUNT];
    }

    pub fn resolve(&mut self, abilities: &AbilityArbitrator, ctx: &mut AbilityContext<'_>) {
        // Start time of a lower-body transition issued this pass.
        let mut lower_start: Option<f32> = None;
        for layer in AnimationLayer::ALL {
            let Selection::Request(request, source) = self.select(layer, abilities, ctx) else {
                continue;
            };
            let Some((request, source, id)) = self.validate(request, source, ctx) else {
                continue;
            };

            if !request.replayable && self.active[layer.index()] == Some(id) {
                continue;
            }

            let start_normalized_time = if layer == AnimationLayer::UpperBody
                && syncs_upper_body(source, abilities)
            {
                match lower_start {
                    Some(start) => start,
                    None => ctx
                        .animator
                        .normalized_time(AnimationLayer::LowerBody)
                        .rem_euclid(1.0),
                }
            } else {
                request.start_normalized_time
            };

            let mut normalized_duration =
                request.transition_duration / ctx.animator.state_length(layer);
            if !normalized_duration.is_finite() {
                normalized_duration = 0.0;
            }

            log::trace!("{layer:?} -> {} ({source:?})", request.state);
            ctx.animator.crossfade(Crossfade {
                layer,
                state: id,
                name: request.state,
                normalized_duration: normalized_duration.max(0.0),
                start_normalized_time,
                speed: request.speed_multiplier,
            });
            self.active[layer.index()] = Some(id);
            ctx.emit(ControllerEvent::StateRequested { layer, state: id });

            if layer == AnimationLayer::LowerBody {
                lower_start = Some(start_normalized_time);
            }
        }
    }

    /// Precedence: item high priority, active abilities, item low priority, default.
    /// Items only apply to the privileged layers.
    fn select(
        &self,
        layer: AnimationLayer,
        abilities: &AbilityArbitrator,
        ctx: &AbilityContext<'_>,
    ) -> Selection {
        if layer.is_privileged() {
            if let Some(request) = non_empty(ctx.items.high_priority_state(layer)) {
                return Selection::Request(request, RequestSource::ItemHigh);
            }
        }

        let mut owned = false;
        for index in abilities.active_indices() {
            let Some(ability) = abilities.ability(index) else {
                continue;
            };
            if !ability.has_animator_control(layer) {
                continue;
            }
            owned = true;
            if let Some(request) = non_empty(ability.destination_state(layer)) {
                return Selection::Request(request, RequestSource::Ability(index));
            }
            if !ability.is_concurrent() {
                break;
            }
        }
        if owned {
            return Selection::Hold;
        }

        if layer.is_privileged() {
            if let Some(request) = non_empty(ctx.items.low_priority_state(layer)) {
                return Selection::Request(request, RequestSource::ItemLow);
            }
        }

        Selection::Request(default_request(layer, ctx), RequestSource::Default)
    }

    /// Resolves the request's identity, replacing unknown states with the layer default.
    fn validate(
        &mut self,
        request: StateRequest,
        source: RequestSource,
        ctx: &mut AbilityContext<'_>,
    ) -> Option<(StateRequest, RequestSource, StateId)> {
        let layer = request.layer;
        let id = self.names.id(&request.state);
        if ctx.animator.has_state(layer, id) {
            return Some((request, source, id));
        }
        self.report_unknown(layer, &request.state, id, ctx);
        if source == RequestSource::Default {
            return None;
        }

        let fallback = default_request(layer, ctx);
        let id = self.names.id(&fallback.state);
        if ctx.animator.has_state(layer, id) {
            return Some((fallback, RequestSource::Default, id));
        }
        self.report_unknown(layer, &fallback.state, id, ctx);
        None
    }

    fn report_unknown(
        &mut self,
        layer: AnimationLayer,
        name: &str,
        id: StateId,
        ctx: &mut AbilityContext<'_>,
    ) {
        if !self.reported_unknown.insert((layer, id)) {
            return;
        }
        let err = ConfigError::UnknownState {
            layer,
            name: name.to_string(),
        };
        log::warn!("{err}; falling back to the layer default");
        ctx.emit(ControllerEvent::Diagnostic(err.to_string()));
    }
}

fn non_empty(request: Option<StateRequest>) -> Option<StateRequest> {
    request.filter(|r| !r.is_empty())
}

fn default_request(layer: AnimationLayer, ctx: &AbilityContext<'_>) -> StateRequest {
    let defaults = &ctx.settings.animation;
    StateRequest::new(layer, defaults.state_for(layer, ctx.motor.moving))
        .with_duration(defaults.transition_duration)
}

/// Item-high requests (fire, reload) play on their own clock; abilities may opt out.
fn syncs_upper_body(source: RequestSource, abilities: &AbilityArbitrator) -> bool {
    match source {
        RequestSource::ItemHigh => false,
        RequestSource::Ability(index) => abilities
            .ability(index)
            .is_some_and(|ability| ability.sync_upper_body()),
        RequestSource::ItemLow | RequestSource::Default => true,
    }
}
