//! Presence mask for the optional parts of an order.

use bitflags::bitflags;

bitflags! {
    /// Which optional fields follow in an order frame.
    ///
    /// Computed by the encoder from which fields are set, never stored on
    /// the order itself. Bits `0x02` and `0x80` are unassigned.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OrderFields: u8 {
        /// A target kind byte and its payload follow.
        const TARGET = 0x01;
        /// A length-prefixed payload string follows.
        const TARGET_STRING = 0x04;
        /// The order is queued behind the issuer's current activity. No body bytes.
        const QUEUED = 0x08;
        /// A packed auxiliary cell follows.
        const EXTRA_LOCATION = 0x10;
        /// An auxiliary `u32` follows.
        const EXTRA_DATA = 0x20;
        /// A terrain target is addressed by cell rather than world position.
        const TARGET_IS_CELL = 0x40;
    }
}

impl OrderFields {
    /// Flags an immediate frame may carry.
    pub const IMMEDIATE: Self = Self::TARGET_STRING.union(Self::EXTRA_DATA);

    /// Parse a flag byte, rejecting unassigned bits and anything outside
    /// `allowed`. Returns the offending bits on failure.
    pub fn parse(byte: u8, allowed: Self) -> Result<Self, u8> {
        let unexpected = byte & !allowed.bits();
        if unexpected != 0 {
            return Err(unexpected);
        }

        Ok(Self::from_bits_truncate(byte))
    }
}
