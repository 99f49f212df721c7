//! What an order acts upon.

use std::fmt;

use thiserror::Error;

use crate::actor::{ActorRef, FrozenActorRef, World};
use crate::coords::{CPos, SubCell, WPos};

/// Discriminant of a [`Target`], as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TargetKind {
    /// Nothing.
    Invalid = 0,
    /// A live actor.
    Actor = 1,
    /// A map cell or raw world position.
    Terrain = 2,
    /// An actor as remembered under the fog.
    FrozenActor = 3,
}

impl TargetKind {
    /// Wire discriminant.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire discriminant.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Invalid),
            1 => Some(Self::Actor),
            2 => Some(Self::Terrain),
            3 => Some(Self::FrozenActor),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "Invalid",
            Self::Actor => "Actor",
            Self::Terrain => "Terrain",
            Self::FrozenActor => "FrozenActor",
        };
        f.write_str(name)
    }
}

/// A kind-specific accessor was called on the wrong kind of target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} target, found {actual} target")]
pub struct WrongVariant {
    /// Kind the accessor handles.
    pub expected: TargetKind,
    /// Kind the target actually is.
    pub actual: TargetKind,
}

/// The two mutually exclusive terrain encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainTarget {
    /// A sub-cell of a map cell, plus its resolved world position.
    Cell {
        /// Target cell.
        cell: CPos,
        /// Slot within the cell.
        sub_cell: SubCell,
        /// World position of the slot.
        center: WPos,
    },
    /// A raw world position.
    Position(WPos),
}

/// What an order refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    /// Nothing to target.
    #[default]
    Invalid,
    /// A live actor.
    Actor(ActorRef),
    /// An actor remembered under the fog.
    FrozenActor(FrozenActorRef),
    /// A place on the map.
    Terrain(TerrainTarget),
}

impl Target {
    /// The empty target.
    #[must_use]
    pub const fn invalid() -> Self {
        Self::Invalid
    }

    /// Target a live actor.
    #[must_use]
    pub const fn from_actor(actor: ActorRef) -> Self {
        Self::Actor(actor)
    }

    /// Target a remembered actor.
    #[must_use]
    pub const fn from_frozen_actor(frozen: FrozenActorRef) -> Self {
        Self::FrozenActor(frozen)
    }

    /// Target a sub-cell. The world resolves the slot's position.
    #[must_use]
    pub fn from_cell(world: &dyn World, cell: CPos, sub_cell: SubCell) -> Self {
        Self::Terrain(TerrainTarget::Cell {
            cell,
            sub_cell,
            center: world.center_of_sub_cell(cell, sub_cell),
        })
    }

    /// Target a raw world position.
    #[must_use]
    pub const fn from_pos(pos: WPos) -> Self {
        Self::Terrain(TerrainTarget::Position(pos))
    }

    /// Which kind of target this is.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Invalid => TargetKind::Invalid,
            Self::Actor(_) => TargetKind::Actor,
            Self::FrozenActor(_) => TargetKind::FrozenActor,
            Self::Terrain(_) => TargetKind::Terrain,
        }
    }

    /// Whether the target refers to anything.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    const fn wrong(&self, expected: TargetKind) -> WrongVariant {
        WrongVariant {
            expected,
            actual: self.kind(),
        }
    }

    /// The targeted live actor.
    pub const fn actor(&self) -> Result<&ActorRef, WrongVariant> {
        match self {
            Self::Actor(actor) => Ok(actor),
            _ => Err(self.wrong(TargetKind::Actor)),
        }
    }

    /// The targeted frozen actor.
    pub const fn frozen_actor(&self) -> Result<&FrozenActorRef, WrongVariant> {
        match self {
            Self::FrozenActor(frozen) => Ok(frozen),
            _ => Err(self.wrong(TargetKind::FrozenActor)),
        }
    }

    /// The targeted terrain.
    pub const fn terrain(&self) -> Result<&TerrainTarget, WrongVariant> {
        match self {
            Self::Terrain(terrain) => Ok(terrain),
            _ => Err(self.wrong(TargetKind::Terrain)),
        }
    }

    /// World position of a terrain target, whichever way it was addressed.
    pub const fn terrain_position(&self) -> Result<WPos, WrongVariant> {
        match self.terrain() {
            Ok(TerrainTarget::Cell { center, .. }) => Ok(*center),
            Ok(TerrainTarget::Position(pos)) => Ok(*pos),
            Err(e) => Err(e),
        }
    }

    /// Cell and sub-cell, when this is a cell-addressed terrain target.
    ///
    /// The encoder uses this to decide whether the target goes on the
    /// wire as a cell or as a raw position.
    #[must_use]
    pub const fn serializable_cell(&self) -> Option<(CPos, SubCell)> {
        match self {
            Self::Terrain(TerrainTarget::Cell { cell, sub_cell, .. }) => Some((*cell, *sub_cell)),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("Invalid"),
            Self::Actor(actor) => write!(f, "{actor}"),
            Self::FrozenActor(frozen) => write!(f, "{frozen}"),
            Self::Terrain(TerrainTarget::Cell { cell, sub_cell, .. }) => {
                write!(f, "cell {cell} sub-cell {}", sub_cell.0)
            }
            Self::Terrain(TerrainTarget::Position(pos)) => write!(f, "position {pos}"),
        }
    }
}
