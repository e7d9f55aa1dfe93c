use core::f64::consts::FRAC_PI_2;

use super::{ActionError, ActorAction};
use crate::config::{EnergyRules, WorldConfig};
use crate::engine::{MoveReport, try_move};
use crate::ops::Operations;
use crate::state::{ActorState, CellOccupant, EntityId, Position, StoredItem, WorldState};

/// Outcome of the pick step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PickOutcome {
    Attacked { target: EntityId, dealt: f64 },
    LiftedObject(EntityId),
    LiftedTerrain(Operations),
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaceOutcome {
    Placed {
        at: Position,
        operations: Operations,
    },
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EatOutcome {
    Ate { at: Position },
    NothingToEat,
}

/// Everything one applied action did to its actor and the world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionReport {
    pub movement: MoveReport,
    /// Orientation change in radians.
    pub turned: f64,
    pub pick: Option<PickOutcome>,
    pub place: Option<PlaceOutcome>,
    pub eat: Option<EatOutcome>,
    pub energy_before: f64,
    pub energy_after: f64,
}

fn actor_mut(state: &mut WorldState, id: EntityId) -> Result<&mut ActorState, ActionError> {
    state
        .actors
        .get_mut(&id)
        .ok_or(ActionError::ActorNotFound { actor: id })
}

/// Applies `action` to actor `id`.
///
/// Order: validate, forward move, turn, pick, place, eat, signal, rest.
/// A rejected action leaves the world untouched. Removal of actors whose
/// energy reached zero is left to the caller.
pub fn apply_action(
    state: &mut WorldState,
    id: EntityId,
    action: &ActorAction,
    config: &WorldConfig,
) -> Result<ActionReport, ActionError> {
    action.validate(config.vocabulary_size)?;
    let rules = &config.energy;

    let actor = actor_mut(state, id)?;
    let energy_before = actor.energy;
    let mass = actor.mass();
    let delta = actor
        .direction()
        .scale(actor.max_forward_speed * action.forward() * actor.health() / mass);

    let movement = try_move(state, id, delta).map_err(|_| ActionError::ActorNotFound { actor: id })?;
    let actor = actor_mut(state, id)?;
    actor.spend(rules.moving_energy_cost * delta.l2() * mass);

    let turned = match (
        action.is_active(ActorAction::TURN_LEFT),
        action.is_active(ActorAction::TURN_RIGHT),
    ) {
        (true, false) => FRAC_PI_2,
        (false, true) => -FRAC_PI_2,
        _ => 0.0,
    };
    actor.orientation += turned;

    let pick = if action.is_active(ActorAction::PICK) {
        Some(pick(state, id, rules)?)
    } else {
        None
    };
    let place = if action.is_active(ActorAction::PLACE) {
        Some(place(state, id, rules)?)
    } else {
        None
    };
    let eat = if action.is_active(ActorAction::EAT) {
        Some(eat(state, id, rules)?)
    } else {
        None
    };

    let actor = actor_mut(state, id)?;
    actor.signal.set_signal(action.signal);
    actor.spend(rules.resting_energy_rate);

    Ok(ActionReport {
        movement,
        turned,
        pick,
        place,
        eat,
        energy_before,
        energy_after: actor.energy,
    })
}

/// Attacks an actor ahead, otherwise lifts what is ahead if it is liftable
/// and storage has room.
fn pick(
    state: &mut WorldState,
    id: EntityId,
    rules: &EnergyRules,
) -> Result<PickOutcome, ActionError> {
    let actor = actor_mut(state, id)?;
    let ahead = actor.ahead();
    let has_room = actor.has_room();

    let liftable = state
        .operations_at(ahead)
        .is_some_and(|ops| ops.contains(Operations::LIFTABLE));

    let outcome = match state.occupant_at(ahead) {
        Some(CellOccupant::Actor(target)) if target != id => {
            let dealt = actor_mut(state, target)?.attack(rules.attack_damage);
            let actor = actor_mut(state, id)?;
            actor.gain(rules.attack_gain_fraction * dealt);
            actor.spend(rules.attacking_cost);
            PickOutcome::Attacked { target, dealt }
        }
        Some(CellOccupant::SignalingObject(object_id) | CellOccupant::Object(object_id))
            if liftable && has_room =>
        {
            match state.objects.remove(&object_id) {
                Some(object) => {
                    lift(state, id, StoredItem::Object(object))?;
                    PickOutcome::LiftedObject(object_id)
                }
                None => fail_pick(state, id, rules)?,
            }
        }
        Some(CellOccupant::Terrain(content)) if liftable && has_room => {
            state.terrain.set(ahead, Operations::TRAVERSABLE);
            lift(state, id, StoredItem::Terrain(content))?;
            PickOutcome::LiftedTerrain(content)
        }
        _ => fail_pick(state, id, rules)?,
    };

    actor_mut(state, id)?.spend(rules.pickup_cost);
    Ok(outcome)
}

fn lift(state: &mut WorldState, id: EntityId, item: StoredItem) -> Result<(), ActionError> {
    // room was checked before the item left the world
    actor_mut(state, id)?
        .store(item)
        .map_err(|_| ActionError::ActorNotFound { actor: id })
}

fn fail_pick(
    state: &mut WorldState,
    id: EntityId,
    rules: &EnergyRules,
) -> Result<PickOutcome, ActionError> {
    actor_mut(state, id)?.spend(rules.failed_pickup_penalty);
    Ok(PickOutcome::Failed)
}

/// Puts the most recently stored item into the traversable cell ahead.
fn place(
    state: &mut WorldState,
    id: EntityId,
    rules: &EnergyRules,
) -> Result<PlaceOutcome, ActionError> {
    let ahead = actor_mut(state, id)?.ahead();
    let item = if state.is_traversable(ahead) {
        actor_mut(state, id)?.take_last()
    } else {
        None
    };

    let outcome = match item {
        Some(item) => {
            let operations = item.operations();
            state.terrain.set(ahead, operations);
            PlaceOutcome::Placed {
                at: ahead,
                operations,
            }
        }
        None => PlaceOutcome::Failed,
    };

    let actor = actor_mut(state, id)?;
    if outcome == PlaceOutcome::Failed {
        actor.spend(rules.failed_place_penalty);
    }
    actor.spend(rules.place_cost);
    Ok(outcome)
}

/// Consumes whatever edible thing is visible ahead.
///
/// Edible terrain turns into plain ground; an edible object is removed. An
/// object standing on food hides it.
fn eat(state: &mut WorldState, id: EntityId, rules: &EnergyRules) -> Result<EatOutcome, ActionError> {
    let actor = actor_mut(state, id)?;
    actor.spend(rules.eating_cost);
    let ahead = actor.ahead();

    let edible = |ops: Operations| ops.contains(Operations::EDIBLE);
    match state.occupant_at(ahead) {
        Some(CellOccupant::Terrain(ops)) if edible(ops) => {
            state.terrain.set(ahead, Operations::TRAVERSABLE);
        }
        Some(CellOccupant::Object(object) | CellOccupant::SignalingObject(object))
            if state.objects.get(&object).is_some_and(|o| edible(o.operations())) =>
        {
            state.objects.remove(&object);
        }
        _ => return Ok(EatOutcome::NothingToEat),
    }

    actor_mut(state, id)?.gain(rules.food_energy);
    Ok(EatOutcome::Ate { at: ahead })
}
