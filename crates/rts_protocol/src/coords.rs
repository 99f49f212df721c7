//! Map-space value types carried by orders.
//!
//! These are the shapes the wire format knows about: a packed map cell,
//! a sub-cell index within that cell, and a raw world position. None of
//! them know anything about a concrete map; resolving a cell to a world
//! position is the job of [`crate::actor::World`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// World units per map cell along each axis.
pub const WORLD_UNITS_PER_CELL: i32 = 1024;

/// A map cell, packed into a single `i32`.
///
/// Layout: `x` in the top 12 bits, `y` in the next 12 bits and the map
/// layer in the low byte. Both axes are signed, so the usable range is
/// `-2048..=2047`. The packed value is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CPos {
    bits: i32,
}

impl CPos {
    /// The origin cell. Used as the "no auxiliary cell" value.
    pub const ZERO: Self = Self { bits: 0 };

    /// Create a cell on the ground layer.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self::with_layer(x, y, 0)
    }

    /// Create a cell on a specific map layer.
    #[must_use]
    pub const fn with_layer(x: i32, y: i32, layer: u8) -> Self {
        Self {
            bits: ((x & 0xFFF) << 20) | ((y & 0xFFF) << 8) | layer as i32,
        }
    }

    /// Rebuild a cell from its packed wire representation.
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self { bits }
    }

    /// Packed wire representation.
    #[must_use]
    pub const fn bits(self) -> i32 {
        self.bits
    }

    /// Horizontal cell coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.bits >> 20
    }

    /// Vertical cell coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn y(self) -> i32 {
        (((self.bits >> 4) as i16) >> 4) as i32
    }

    /// Map layer index (0 is the ground layer).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn layer(self) -> u8 {
        self.bits as u8
    }
}

impl fmt::Display for CPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.layer() == 0 {
            write!(f, "{},{}", self.x(), self.y())
        } else {
            write!(f, "{},{},{}", self.x(), self.y(), self.layer())
        }
    }
}

/// Index of a sub-position inside a map cell.
///
/// Infantry-style actors can share a cell; the sub-cell says which slot
/// an order refers to. Values other than the named constants are valid
/// slot indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SubCell(pub u8);

impl SubCell {
    /// The whole cell.
    pub const FULL_CELL: Self = Self(0);
    /// First shared slot.
    pub const FIRST: Self = Self(1);
    /// Any free slot.
    pub const ANY: Self = Self(u8::MAX - 1);
    /// No valid slot.
    pub const INVALID: Self = Self(u8::MAX);
}

/// A raw position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WPos {
    /// X axis.
    pub x: i32,
    /// Y axis.
    pub y: i32,
    /// Z axis (height).
    pub z: i32,
}

impl WPos {
    /// World origin.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new world position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of a cell on a flat rectangular map.
    #[must_use]
    pub const fn center_of(cell: CPos) -> Self {
        Self {
            x: cell.x() * WORLD_UNITS_PER_CELL + WORLD_UNITS_PER_CELL / 2,
            y: cell.y() * WORLD_UNITS_PER_CELL + WORLD_UNITS_PER_CELL / 2,
            z: 0,
        }
    }
}

impl fmt::Display for WPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}
