use crate::{
    ability::{Ability, AbilityContext, AbilityIndex, HookResult, Trigger},
    constants::DIST_EPS,
    error::{AbilityError, StartRejection, report_fault},
    events::ControllerEvent,
    pipeline::PipelineStage,
    scheduler::Fired,
};

struct AbilitySlot {
    ability: Box<dyn Ability>,
    active: bool,
}

/// Owns the registered abilities and their active flags.
///
/// Every decision scans in ascending index, so the outcome depends only on the active set
/// and the abilities' predicates, never on call order within a tick.
pub struct AbilityArbitrator {
    slots: Vec<AbilitySlot>,
}

impl AbilityArbitrator {
    /// Registration order is priority order.
    pub fn new(abilities: Vec<Box<dyn Ability>>) -> Self {
        Self {
            slots: abilities
                .into_iter()
                .map(|ability| AbilitySlot {
                    ability,
                    active: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ability(&self, index: AbilityIndex) -> Option<&dyn Ability> {
        self.slots.get(index).map(|slot| &*slot.ability)
    }

    pub fn is_active(&self, index: AbilityIndex) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.active)
    }

    /// Active abilities in priority order.
    pub fn active_indices(&self) -> impl Iterator<Item = AbilityIndex> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.active.then_some(index))
    }

    /// The active exclusive ability, if any.
    pub fn active_exclusive(&self) -> Option<AbilityIndex> {
        self.active_indices()
            .find(|&index| !self.slots[index].ability.is_concurrent())
    }

    /// Ability reported to the animator: the active exclusive one, else the
    /// highest-priority active one.
    pub(crate) fn lead(&self) -> Option<(AbilityIndex, i32)> {
        self.active_exclusive()
            .or_else(|| self.active_indices().next())
            .map(|index| (index, self.slots[index].ability.ability_int_data()))
    }

    fn exclusive_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.active && !slot.ability.is_concurrent())
            .count()
    }

    /// Runs every start check without side effects. On success returns the active
    /// exclusive abilities the candidate displaces.
    fn admit(
        &self,
        index: AbilityIndex,
        ctx: &AbilityContext<'_>,
    ) -> Result<Vec<AbilityIndex>, StartRejection> {
        let slot = self
            .slots
            .get(index)
            .ok_or(StartRejection::UnknownAbility(index))?;
        if slot.active {
            return Err(StartRejection::AlreadyActive);
        }
        if !slot.ability.can_start(&ctx.view()) {
            return Err(StartRejection::CannotStart);
        }

        let candidate = &*slot.ability;
        let mut displaced = Vec::new();
        for (other, active) in self.slots.iter().enumerate() {
            if other == index || !active.active {
                continue;
            }
            let exclusive = !active.ability.is_concurrent();
            if candidate.is_concurrent() {
                if !active.ability.allows_start_of(candidate) {
                    return Err(StartRejection::VetoedBy(other));
                }
            } else if other < index {
                if exclusive {
                    return Err(StartRejection::BlockedBy(other));
                }
                if !active.ability.allows_start_of(candidate) {
                    return Err(StartRejection::VetoedBy(other));
                }
            } else if exclusive {
                if !active.ability.allows_start_of(candidate) {
                    return Err(StartRejection::VetoedBy(other));
                }
                displaced.push(other);
            }
        }
        Ok(displaced)
    }

    /// Starts `index` if arbitration allows it, stopping any lower-priority exclusive
    /// ability it displaces.
    pub fn try_start(
        &mut self,
        index: AbilityIndex,
        ctx: &mut AbilityContext<'_>,
    ) -> Result<(), StartRejection> {
        let displaced = self.admit(index, ctx)?;
        for other in displaced {
            self.try_stop(other, ctx);
        }

        let slot = &mut self.slots[index];
        // Aiming is an item interaction.
        if ctx.motor.aiming && !slot.ability.can_interact_item() {
            ctx.motor.aiming = false;
        }

        let previous = ctx.current.replace(index);
        slot.ability.on_start(ctx);
        ctx.current = previous;
        slot.active = true;

        let kind = slot.ability.kind();
        log::debug!("ability {index} ({}) started", slot.ability.name());
        ctx.emit(ControllerEvent::AbilityActive {
            index,
            kind,
            active: true,
        });

        debug_assert!(
            self.exclusive_count() <= 1,
            "more than one exclusive ability active after starting {index}"
        );
        Ok(())
    }

    /// Stops `index` unconditionally. Returns `false` if it wasn't active.
    ///
    /// `on_stop` runs first; then the ability's timers, move-towards request and motor
    /// overrides are dropped before it is marked inactive.
    pub fn try_stop(&mut self, index: AbilityIndex, ctx: &mut AbilityContext<'_>) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if !slot.active {
            return false;
        }

        let previous = ctx.current.replace(index);
        slot.ability.on_stop(ctx);
        ctx.current = previous;

        let timers = ctx.scheduler.cancel_owned(index);
        if ctx
            .move_towards
            .as_ref()
            .is_some_and(|mover| mover.owner == index)
        {
            *ctx.move_towards = None;
        }

        let owned_height = matches!(
            ctx.motor.overrides.collider_height,
            Some((owner, _)) if owner == index
        );
        ctx.motor.overrides.release(index);
        if owned_height {
            let standing = ctx.settings.collider_height;
            if (ctx.motor.collider_height - standing).abs() > DIST_EPS {
                ctx.motor.collider_height = standing;
                ctx.emit(ControllerEvent::ColliderResized { height: standing });
            }
        }

        slot.active = false;
        ctx.pending_stops.retain(|&pending| pending != index);

        let kind = slot.ability.kind();
        log::debug!(
            "ability {index} ({}) stopped, {timers} timer(s) cancelled",
            slot.ability.name()
        );
        ctx.emit(ControllerEvent::AbilityActive {
            index,
            kind,
            active: false,
        });
        true
    }

    pub fn stop_all(&mut self, ctx: &mut AbilityContext<'_>) {
        for index in 0..self.slots.len() {
            self.try_stop(index, ctx);
        }
    }

    /// Offers a hook to every active ability in priority order. The first claim wins.
    ///
    /// Faults and claims made while a stop is pending go through the fault policy and the
    /// scan continues with the next ability.
    fn scan<'a>(
        &mut self,
        hook: &'static str,
        ctx: &mut AbilityContext<'a>,
        mut invoke: impl FnMut(&mut dyn Ability, &mut AbilityContext<'a>) -> HookResult,
    ) -> Option<AbilityIndex> {
        let policy = ctx.settings.fault_policy;
        let previous = ctx.current;
        let mut claimed = None;

        for index in 0..self.slots.len() {
            if !self.slots[index].active {
                continue;
            }
            let slot = &mut self.slots[index];
            ctx.current = Some(index);
            match invoke(&mut *slot.ability, ctx) {
                Ok(true) if ctx.pending_stops.contains(&index) => {
                    let err = AbilityError::InactiveClaim {
                        ability: slot.ability.name().to_string(),
                        hook,
                    };
                    report_fault(policy, &mut *ctx.events, err);
                }
                Ok(true) => {
                    log::trace!("{hook} claimed by ability {index} ({})", slot.ability.name());
                    claimed = Some(index);
                    break;
                }
                Ok(false) => {}
                Err(err) => report_fault(policy, &mut *ctx.events, err),
            }
        }

        ctx.current = previous;
        claimed
    }

    pub(crate) fn claim_stage(
        &mut self,
        stage: PipelineStage,
        ctx: &mut AbilityContext<'_>,
    ) -> Option<AbilityIndex> {
        self.scan(stage.name(), ctx, |ability, ctx| stage.invoke(ability, ctx))
    }

    pub(crate) fn offer_move(&mut self, ctx: &mut AbilityContext<'_>) -> Option<AbilityIndex> {
        self.scan("on_move", ctx, |ability, ctx| ability.on_move(ctx))
    }

    /// Indicator refresh on every registered ability.
    pub(crate) fn update_all(&mut self, ctx: &mut AbilityContext<'_>) {
        for index in 0..self.slots.len() {
            let changed = {
                let view = ctx.view();
                self.slots[index].ability.update(&view)
            };
            if changed {
                ctx.emit(ControllerEvent::IndicatorChanged { index });
            }
        }
    }

    pub(crate) fn stop_automatic(&mut self, ctx: &mut AbilityContext<'_>) {
        for index in 0..self.slots.len() {
            let slot = &self.slots[index];
            let stop = slot.active
                && slot.ability.stop_trigger() == Trigger::Automatic
                && slot.ability.should_stop(&ctx.view());
            if stop {
                self.try_stop(index, ctx);
            }
        }
    }

    /// Tries inactive automatic abilities in priority order; at most one starts.
    pub(crate) fn start_automatic(&mut self, ctx: &mut AbilityContext<'_>) -> Option<AbilityIndex> {
        for index in 0..self.slots.len() {
            let slot = &self.slots[index];
            if slot.active || slot.ability.start_trigger() != Trigger::Automatic {
                continue;
            }
            if self.try_start(index, ctx).is_ok() {
                return Some(index);
            }
        }
        None
    }

    pub(crate) fn dispatch_timer(&mut self, fired: Fired, ctx: &mut AbilityContext<'_>) {
        match fired.owner {
            Some(owner) if self.is_active(owner) => {
                let previous = ctx.current.replace(owner);
                self.slots[owner].ability.on_timer(fired.key, ctx);
                ctx.current = previous;
            }
            Some(owner) => {
                log::trace!("timer {} for inactive ability {owner} dropped", fired.key);
            }
            None => ctx.emit(ControllerEvent::TimerFired { key: fired.key }),
        }
    }

    pub(crate) fn dispatch_arrived(&mut self, owner: AbilityIndex, ctx: &mut AbilityContext<'_>) {
        if !self.is_active(owner) {
            return;
        }
        let previous = ctx.current.replace(owner);
        self.slots[owner].ability.on_arrived(ctx);
        ctx.current = previous;
    }

    /// Applies stops requested through [`AbilityContext::stop_self`].
    pub(crate) fn flush_stops(&mut self, ctx: &mut AbilityContext<'_>) {
        while !ctx.pending_stops.is_empty() {
            let pending = std::mem::take(&mut ctx.pending_stops);
            for index in pending {
                self.try_stop(index, ctx);
            }
        }
    }
}
