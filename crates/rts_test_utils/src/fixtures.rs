//! Test fixtures and helpers.
//!
//! An in-memory actor table that stands in for the simulation, and a
//! diagnostic sink that remembers what it was told.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use rts_protocol::actor::{
    ActorId, ActorRef, FrozenActorId, FrozenActorLayer, FrozenActorRef, PlayerId, World,
};
use rts_protocol::diagnostics::DiagnosticSink;

/// Frozen actor layer of one test player.
#[derive(Debug, Clone, Default)]
pub struct TestFrozenLayer {
    viewer: ActorId,
    remembered: Vec<FrozenActorId>,
}

impl FrozenActorLayer for TestFrozenLayer {
    fn frozen_actor(&self, id: FrozenActorId) -> Option<FrozenActorRef> {
        self.remembered
            .contains(&id)
            .then(|| FrozenActorRef::new(self.viewer, id))
    }
}

/// Deterministic in-memory actor table.
///
/// Ids are handed out sequentially from 0 and stored in sorted maps, so
/// two worlds built by the same calls are identical.
#[derive(Debug, Clone, Default)]
pub struct TestWorld {
    actors: BTreeMap<ActorId, ActorRef>,
    player_actors: BTreeMap<PlayerId, ActorId>,
    frozen_layers: BTreeMap<PlayerId, TestFrozenLayer>,
    next_id: ActorId,
}

impl TestWorld {
    /// Empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Two players, each with a frozen layer, and three units apiece.
    ///
    /// Player actors get ids 0 and 1; units get ids 2 to 7.
    #[must_use]
    pub fn skirmish() -> Self {
        let mut world = Self::new();
        let p1 = world.add_player(PlayerId(1), true);
        let p2 = world.add_player(PlayerId(2), true);
        for _ in 0..3 {
            world.spawn(p1.owner);
            world.spawn(p2.owner);
        }
        world
    }

    /// Add a player and its player actor.
    pub fn add_player(&mut self, player: PlayerId, frozen_layer: bool) -> ActorRef {
        let actor = self.spawn(player);
        self.player_actors.insert(player, actor.id);
        if frozen_layer {
            self.frozen_layers.insert(
                player,
                TestFrozenLayer {
                    viewer: actor.id,
                    remembered: Vec::new(),
                },
            );
        }
        actor
    }

    /// Spawn an actor owned by `owner`.
    pub fn spawn(&mut self, owner: PlayerId) -> ActorRef {
        let actor = ActorRef::new(self.next_id, owner);
        self.actors.insert(actor.id, actor);
        self.next_id += 1;
        actor
    }

    /// Remove an actor, returning its last handle.
    pub fn kill(&mut self, id: ActorId) -> Option<ActorRef> {
        self.actors.remove(&id)
    }

    /// Make `viewer` remember a frozen actor. Returns `None` if the player
    /// has no frozen layer.
    pub fn remember(&mut self, viewer: PlayerId, id: FrozenActorId) -> Option<FrozenActorRef> {
        let layer = self.frozen_layers.get_mut(&viewer)?;
        if !layer.remembered.contains(&id) {
            layer.remembered.push(id);
        }
        Some(FrozenActorRef::new(layer.viewer, id))
    }

    /// Player actor of `player`.
    #[must_use]
    pub fn player_actor(&self, player: PlayerId) -> Option<ActorRef> {
        self.player_actors
            .get(&player)
            .and_then(|id| self.actors.get(id))
            .copied()
    }

    /// Every live actor, in id order.
    #[must_use]
    pub fn actors(&self) -> Vec<ActorRef> {
        self.actors.values().copied().collect()
    }

    /// Every remembered actor across all layers.
    #[must_use]
    pub fn frozen_actors(&self) -> Vec<FrozenActorRef> {
        self.frozen_layers
            .values()
            .flat_map(|layer| {
                layer
                    .remembered
                    .iter()
                    .map(|&id| FrozenActorRef::new(layer.viewer, id))
            })
            .collect()
    }

    /// Look up a live actor, panicking if it does not exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> ActorRef {
        self.actors[&id]
    }
}

impl World for TestWorld {
    fn actor_by_id(&self, id: ActorId) -> Option<ActorRef> {
        self.actors.get(&id).copied()
    }

    fn frozen_actor_layer(&self, player_actor: &ActorRef) -> Option<&dyn FrozenActorLayer> {
        self.frozen_layers
            .get(&player_actor.owner)
            .map(|layer| layer as &dyn FrozenActorLayer)
    }
}

/// One reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Channel it was reported on.
    pub channel: String,
    /// Message text.
    pub message: String,
}

/// Sink that records every diagnostic. Safe to share between threads.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of diagnostics reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything reported so far.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, channel: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                channel: channel.to_string(),
                message: message.to_string(),
            });
    }
}
