//! Actor identifiers and the world collaborators orders resolve against.
//!
//! Orders never hold live simulation objects. They carry lightweight,
//! copyable handles that the simulation hands out from its actor table,
//! and on the wire those handles shrink down to a 32-bit [`ActorId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::{CPos, SubCell, WPos};

/// Stable identifier of an actor within one game.
pub type ActorId = u32;

/// Reserved identifier meaning "no actor".
pub const NO_ACTOR: ActorId = u32::MAX;

/// Identifier of a frozen (remembered) actor inside a player's layer.
pub type FrozenActorId = u32;

/// Identifier of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Handle to a live actor, as handed out by a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    /// Stable actor identifier.
    pub id: ActorId,
    /// Player that owns the actor.
    pub owner: PlayerId,
}

impl ActorRef {
    /// Create a new actor handle.
    #[must_use]
    pub const fn new(id: ActorId, owner: PlayerId) -> Self {
        Self { id, owner }
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor {} ({})", self.id, self.owner)
    }
}

/// Handle to an actor as one player last saw it under the fog.
///
/// Frozen actors live in a per-player layer, so the handle remembers the
/// player actor of the viewer alongside its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrozenActorRef {
    /// Player actor of the player that remembers this actor.
    pub viewer: ActorId,
    /// Identifier within the viewer's frozen actor layer.
    pub id: FrozenActorId,
}

impl FrozenActorRef {
    /// Create a new frozen actor handle.
    #[must_use]
    pub const fn new(viewer: ActorId, id: FrozenActorId) -> Self {
        Self { viewer, id }
    }
}

impl fmt::Display for FrozenActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frozen actor {} (viewer {})", self.id, self.viewer)
    }
}

/// A player's layer of remembered actors.
pub trait FrozenActorLayer {
    /// Look up a frozen actor by id.
    fn frozen_actor(&self, id: FrozenActorId) -> Option<FrozenActorRef>;
}

/// The simulation-side actor table orders are decoded against.
///
/// Implementations must be deterministic: every peer has to resolve the
/// same id to the same handle on the same frame.
pub trait World {
    /// Look up a live actor. Never called with [`NO_ACTOR`].
    fn actor_by_id(&self, id: ActorId) -> Option<ActorRef>;

    /// The frozen actor layer belonging to the owner of `player_actor`,
    /// if that player keeps one.
    fn frozen_actor_layer(&self, player_actor: &ActorRef) -> Option<&dyn FrozenActorLayer>;

    /// World position of a sub-cell. The default assumes a flat map and
    /// ignores the sub-cell offset.
    fn center_of_sub_cell(&self, cell: CPos, _sub_cell: SubCell) -> WPos {
        WPos::center_of(cell)
    }
}

/// A non-sentinel actor id with no live actor behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no live actor with id {0}")]
pub struct LookupFailed(pub ActorId);

/// Wire identifier of an optional actor.
#[must_use]
pub fn id_of(actor: Option<&ActorRef>) -> ActorId {
    actor.map_or(NO_ACTOR, |a| a.id)
}

/// Resolve a wire identifier against the world.
///
/// The sentinel resolves successfully to `None`. Any other id either
/// resolves to its actor or fails with [`LookupFailed`]; callers decide
/// whether a miss is fatal.
pub fn resolve(world: &dyn World, id: ActorId) -> Result<Option<ActorRef>, LookupFailed> {
    if id == NO_ACTOR {
        return Ok(None);
    }

    world.actor_by_id(id).map(Some).ok_or(LookupFailed(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneActor;

    impl World for OneActor {
        fn actor_by_id(&self, id: ActorId) -> Option<ActorRef> {
            (id == 7).then(|| ActorRef::new(7, PlayerId(1)))
        }

        fn frozen_actor_layer(&self, _player_actor: &ActorRef) -> Option<&dyn FrozenActorLayer> {
            None
        }
    }

    #[test]
    fn test_id_of_absent_actor_is_sentinel() {
        assert_eq!(id_of(None), NO_ACTOR);
        assert_eq!(id_of(Some(&ActorRef::new(3, PlayerId(0)))), 3);
    }

    #[test]
    fn test_resolve_sentinel_is_absent() {
        assert_eq!(resolve(&OneActor, NO_ACTOR), Ok(None));
    }

    #[test]
    fn test_resolve_live_actor() {
        assert_eq!(
            resolve(&OneActor, 7),
            Ok(Some(ActorRef::new(7, PlayerId(1))))
        );
    }

    #[test]
    fn test_resolve_miss_is_reported() {
        assert_eq!(resolve(&OneActor, 8), Err(LookupFailed(8)));
    }

    #[test]
    fn test_default_center_of_sub_cell() {
        let pos = OneActor.center_of_sub_cell(CPos::new(1, 1), SubCell::FIRST);
        assert_eq!(pos, WPos::new(1536, 1536, 0));
    }
}
