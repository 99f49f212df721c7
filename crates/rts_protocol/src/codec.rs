//! Binary wire format for orders.
//!
//! Every order starts with a one-byte tag selecting one of two frames:
//!
//! - `0xFF` full frame: name, issuer id, [`OrderFields`], then the optional
//!   target, payload, auxiliary cell and auxiliary value in that order.
//! - `0xFE` immediate frame: name, [`OrderFields`] limited to
//!   `TARGET_STRING | EXTRA_DATA`, then payload and auxiliary value.
//!
//! All integers are little-endian. Strings are UTF-8 with a 7-bit
//! variable-length length prefix.
//!
//! Encoding is total. Decoding treats its input as hostile: the inner
//! parser ([`OrderCodec::try_decode`]) fails with a precise
//! [`DecodeError`], and the public boundary turns any failure into `None`
//! plus exactly one diagnostic. No input makes the decoder panic.

use bytes::{Buf, BufMut};

use crate::actor::{self, LookupFailed, World};
use crate::config::CodecConfig;
use crate::coords::{CPos, SubCell, WPos};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::DecodeError;
use crate::fields::OrderFields;
use crate::order::Order;
use crate::target::{Target, TargetKind, TerrainTarget};

/// Tag of a full simulation order frame.
pub const TAG_FULL: u8 = 0xFF;

/// Tag of an immediate control order frame.
pub const TAG_IMMEDIATE: u8 = 0xFE;

/// Smallest possible immediate frame: tag, empty name, flags.
pub const MIN_IMMEDIATE_FRAME_LEN: usize = 3;

/// Smallest possible full frame: tag, empty name, issuer id, flags.
pub const MIN_FULL_FRAME_LEN: usize = 7;

/// Longest valid string length prefix, in bytes.
const MAX_LENGTH_PREFIX_BYTES: u32 = 5;

// ============================================================================
// Encoding
// ============================================================================

/// Presence mask the encoder writes for `order`.
///
/// Immediate orders only ever carry a payload and an auxiliary value.
#[must_use]
pub fn order_fields(order: &Order) -> OrderFields {
    let mut fields = OrderFields::empty();

    if order.payload().is_some() {
        fields |= OrderFields::TARGET_STRING;
    }

    if order.aux_value() != 0 {
        fields |= OrderFields::EXTRA_DATA;
    }

    if order.is_immediate() {
        return fields;
    }

    if order.target().is_valid() {
        fields |= OrderFields::TARGET;
    }

    if order.is_queued() {
        fields |= OrderFields::QUEUED;
    }

    if order.aux_cell() != CPos::ZERO {
        fields |= OrderFields::EXTRA_LOCATION;
    }

    if order.target().serializable_cell().is_some() {
        fields |= OrderFields::TARGET_IS_CELL;
    }

    fields
}

/// Encode one order into a fresh buffer.
#[must_use]
pub fn encode(order: &Order) -> Vec<u8> {
    let estimate = order.name().len()
        + order.payload().map_or(0, str::len)
        + if order.is_immediate() { 12 } else { 32 };
    let mut out = Vec::with_capacity(estimate);
    encode_into(order, &mut out);
    out
}

/// Encode one order, appending to `out`.
///
/// # Panics
///
/// Panics if a string is longer than `u32::MAX` bytes.
pub fn encode_into<B: BufMut>(order: &Order, out: &mut B) {
    let fields = order_fields(order);

    if order.is_immediate() {
        out.put_u8(TAG_IMMEDIATE);
        put_string(out, order.name());
        out.put_u8(fields.bits());

        if let Some(payload) = order.payload() {
            put_string(out, payload);
        }

        if fields.contains(OrderFields::EXTRA_DATA) {
            out.put_u32_le(order.aux_value());
        }

        tracing::trace!(order = order.name(), ?fields, "Encoded immediate order");
        return;
    }

    out.put_u8(TAG_FULL);
    put_string(out, order.name());
    out.put_u32_le(actor::id_of(order.issuer()));
    out.put_u8(fields.bits());

    if fields.contains(OrderFields::TARGET) {
        put_target(out, order.target());
    }

    if let Some(payload) = order.payload() {
        put_string(out, payload);
    }

    if fields.contains(OrderFields::EXTRA_LOCATION) {
        out.put_i32_le(order.aux_cell().bits());
    }

    if fields.contains(OrderFields::EXTRA_DATA) {
        out.put_u32_le(order.aux_value());
    }

    tracing::trace!(order = order.name(), ?fields, "Encoded order");
}

fn put_target<B: BufMut>(out: &mut B, target: &Target) {
    out.put_u8(target.kind().to_byte());
    match target {
        Target::Invalid => {}
        Target::Actor(actor) => out.put_u32_le(actor.id),
        Target::FrozenActor(frozen) => {
            out.put_u32_le(frozen.viewer);
            out.put_u32_le(frozen.id);
        }
        Target::Terrain(TerrainTarget::Cell { cell, sub_cell, .. }) => {
            out.put_i32_le(cell.bits());
            out.put_u8(sub_cell.0);
        }
        Target::Terrain(TerrainTarget::Position(pos)) => {
            out.put_i32_le(pos.x);
            out.put_i32_le(pos.y);
            out.put_i32_le(pos.z);
        }
    }
}

fn put_string<B: BufMut>(out: &mut B, value: &str) {
    let len = u32::try_from(value.len())
        .unwrap_or_else(|_| panic!("order string of {} bytes does not fit a u32", value.len()));
    put_length_prefix(out, len);
    out.put_slice(value.as_bytes());
}

#[allow(clippy::cast_possible_truncation)]
fn put_length_prefix<B: BufMut>(out: &mut B, mut value: u32) {
    while value >= 0x80 {
        out.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    out.put_u8(value as u8);
}

// ============================================================================
// Decoding
// ============================================================================

/// Bounds-checked view over the bytes of one frame.
struct FrameReader<'a, 'b> {
    buf: &'a mut &'b [u8],
    max_string_len: usize,
}

impl FrameReader<'_, '_> {
    fn need(&self, needed: usize) -> Result<(), DecodeError> {
        if self.buf.remaining() < needed {
            return Err(DecodeError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.need(4)?;
        Ok(self.buf.get_i32_le())
    }

    fn length_prefix(&mut self) -> Result<usize, DecodeError> {
        let mut value = 0u32;
        for i in 0..MAX_LENGTH_PREFIX_BYTES {
            let byte = self.u8()?;

            // The fifth byte only has room for the top four bits of a u32.
            if i == MAX_LENGTH_PREFIX_BYTES - 1 && byte > 0x0F {
                return Err(DecodeError::LengthPrefixOverflow);
            }

            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return usize::try_from(value).map_err(|_| DecodeError::LengthPrefixOverflow);
            }
        }
        Err(DecodeError::LengthPrefixOverflow)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.length_prefix()?;
        if len > self.max_string_len {
            return Err(DecodeError::StringTooLong {
                len,
                max: self.max_string_len,
            });
        }

        self.need(len)?;
        let value = std::str::from_utf8(&self.buf[..len])
            .map_err(|_| DecodeError::InvalidUtf8)?
            .to_owned();
        self.buf.advance(len);
        Ok(value)
    }

    fn fields(&mut self, tag: u8, allowed: OrderFields) -> Result<OrderFields, DecodeError> {
        let byte = self.u8()?;
        OrderFields::parse(byte, allowed).map_err(|bits| DecodeError::UnexpectedFields { tag, bits })
    }

    fn target(
        &mut self,
        fields: OrderFields,
        world: Option<&dyn World>,
    ) -> Result<Target, DecodeError> {
        let byte = self.u8()?;
        let kind = TargetKind::from_byte(byte).ok_or(DecodeError::UnknownTargetKind(byte))?;
        let is_cell = fields.contains(OrderFields::TARGET_IS_CELL);

        if is_cell && kind != TargetKind::Terrain {
            return Err(DecodeError::UnexpectedFields {
                tag: TAG_FULL,
                bits: OrderFields::TARGET_IS_CELL.bits(),
            });
        }

        // Target lookups that miss degrade to Invalid instead of failing the
        // order: the actor may have died between issue and execution. This
        // differs from the issuer on purpose, see `decode_full`.
        let target = match kind {
            TargetKind::Invalid => Target::Invalid,
            TargetKind::Actor => {
                let id = self.u32()?;
                world
                    .and_then(|w| actor::resolve(w, id).ok().flatten())
                    .map_or(Target::Invalid, Target::from_actor)
            }
            TargetKind::FrozenActor => {
                let player_actor_id = self.u32()?;
                let frozen_id = self.u32()?;
                world
                    .and_then(|w| {
                        let player_actor = actor::resolve(w, player_actor_id).ok().flatten()?;
                        w.frozen_actor_layer(&player_actor)?.frozen_actor(frozen_id)
                    })
                    .map_or(Target::Invalid, Target::from_frozen_actor)
            }
            TargetKind::Terrain if is_cell => {
                let cell = CPos::from_bits(self.i32()?);
                let sub_cell = SubCell(self.u8()?);
                world.map_or(Target::Invalid, |w| Target::from_cell(w, cell, sub_cell))
            }
            TargetKind::Terrain => {
                let x = self.i32()?;
                let y = self.i32()?;
                let z = self.i32()?;
                Target::from_pos(WPos::new(x, y, z))
            }
        };

        Ok(target)
    }
}

/// Encodes and decodes orders, reporting dropped frames to a sink.
///
/// The codec holds only configuration and the sink; decoding the same
/// bytes against the same world always yields the same result.
#[derive(Debug, Clone)]
pub struct OrderCodec<S = TracingSink> {
    config: CodecConfig,
    sink: S,
}

impl OrderCodec {
    /// Codec that reports through `tracing`.
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }
}

impl Default for OrderCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl<S: DiagnosticSink> OrderCodec<S> {
    /// Codec that reports through a custom sink.
    #[must_use]
    pub fn with_sink(config: CodecConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode one order. See [`encode`].
    #[must_use]
    pub fn encode(&self, order: &Order) -> Vec<u8> {
        encode(order)
    }

    /// Decode one order from the start of `bytes`. Trailing bytes are ignored.
    ///
    /// `world` may be `None` before the game has started (e.g. during the
    /// handshake); actor lookups are then skipped and issuer and actor
    /// targets come back empty.
    pub fn decode(&self, world: Option<&dyn World>, bytes: &[u8]) -> Option<Order> {
        let mut buf = bytes;
        self.decode_from(world, &mut buf)
    }

    /// Decode one order and advance `buf` past it.
    ///
    /// On failure the order is dropped, one diagnostic is reported and the
    /// position of `buf` is unspecified.
    pub fn decode_from(&self, world: Option<&dyn World>, buf: &mut &[u8]) -> Option<Order> {
        match self.try_decode(world, buf) {
            Ok(order) => Some(order),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Decode every order in a packet.
    ///
    /// An order with a dangling issuer is skipped and decoding continues
    /// with the next one. Any other failure ends the packet, since the
    /// start of the next order can no longer be found.
    pub fn decode_stream(&self, world: Option<&dyn World>, bytes: &[u8]) -> Vec<Order> {
        let mut buf = bytes;
        let mut orders = Vec::new();

        while buf.has_remaining() {
            match self.try_decode(world, &mut buf) {
                Ok(order) => orders.push(order),
                Err(err) => {
                    self.report(&err);
                    if !err.is_aligned() {
                        break;
                    }
                }
            }
        }

        orders
    }

    /// Decode one order, returning the precise failure instead of
    /// reporting it.
    pub fn try_decode(
        &self,
        world: Option<&dyn World>,
        buf: &mut &[u8],
    ) -> Result<Order, DecodeError> {
        let mut reader = FrameReader {
            buf,
            max_string_len: self.config.max_string_len,
        };

        let order = match reader.u8()? {
            TAG_FULL => decode_full(&mut reader, world)?,
            TAG_IMMEDIATE => decode_immediate(&mut reader)?,
            tag => return Err(DecodeError::UnknownTag(tag)),
        };

        tracing::trace!(order = order.name(), "Decoded order");
        Ok(order)
    }

    fn report(&self, err: &DecodeError) {
        let message = match err {
            DecodeError::UnknownTag(tag) => format!("Received unknown order with tag 0x{tag:02X}"),
            other => format!("Ignoring malformed order: {other}"),
        };
        self.sink.report(&self.config.diagnostic_channel, &message);
    }
}

fn decode_full(
    reader: &mut FrameReader<'_, '_>,
    world: Option<&dyn World>,
) -> Result<Order, DecodeError> {
    let name = reader.string()?;
    let issuer_id = reader.u32()?;
    let fields = reader.fields(TAG_FULL, OrderFields::all())?;

    let target = if fields.contains(OrderFields::TARGET) {
        reader.target(fields, world)?
    } else if fields.contains(OrderFields::TARGET_IS_CELL) {
        return Err(DecodeError::UnexpectedFields {
            tag: TAG_FULL,
            bits: OrderFields::TARGET_IS_CELL.bits(),
        });
    } else {
        Target::Invalid
    };

    let payload = if fields.contains(OrderFields::TARGET_STRING) {
        Some(reader.string()?)
    } else {
        None
    };

    let aux_cell = if fields.contains(OrderFields::EXTRA_LOCATION) {
        CPos::from_bits(reader.i32()?)
    } else {
        CPos::ZERO
    };

    let aux_value = if fields.contains(OrderFields::EXTRA_DATA) {
        reader.u32()?
    } else {
        0
    };

    // Intentional asymmetry with targets: an issuer id that no longer
    // resolves would hand the order to a different actor (or to nobody),
    // so the whole order is dropped. The frame has been read to its end
    // at this point, so a stream can carry on with the next order.
    //
    // The sentinel id is accepted as "no issuer" even with a world, which
    // world-level orders such as PauseGame rely on.
    let issuer = match world {
        Some(world) => actor::resolve(world, issuer_id)
            .map_err(|LookupFailed(id)| DecodeError::DanglingIssuer(id))?,
        None => None,
    };

    let mut order = Order::targeted(
        name,
        issuer,
        target,
        fields.contains(OrderFields::QUEUED),
    )
    .with_aux_cell(aux_cell)
    .with_aux_value(aux_value);
    order.set_payload(payload);
    Ok(order)
}

fn decode_immediate(reader: &mut FrameReader<'_, '_>) -> Result<Order, DecodeError> {
    let name = reader.string()?;
    let fields = reader.fields(TAG_IMMEDIATE, OrderFields::IMMEDIATE)?;

    let payload = if fields.contains(OrderFields::TARGET_STRING) {
        Some(reader.string()?)
    } else {
        None
    };

    let aux_value = if fields.contains(OrderFields::EXTRA_DATA) {
        reader.u32()?
    } else {
        0
    };

    let mut order = Order::immediate(name).with_aux_value(aux_value);
    order.set_payload(payload);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::actor::{ActorId, ActorRef, FrozenActorLayer, FrozenActorRef, PlayerId, NO_ACTOR};

    /// Two players, each with a player actor, a tank for player 1 and a
    /// frozen layer for player 1 that remembers id 40.
    struct SmallWorld {
        actors: BTreeMap<ActorId, ActorRef>,
        frozen: BTreeMap<PlayerId, FrozenLayer>,
    }

    struct FrozenLayer {
        viewer: ActorId,
        ids: Vec<u32>,
    }

    impl FrozenActorLayer for FrozenLayer {
        fn frozen_actor(&self, id: u32) -> Option<FrozenActorRef> {
            self.ids
                .contains(&id)
                .then(|| FrozenActorRef::new(self.viewer, id))
        }
    }

    impl SmallWorld {
        fn new() -> Self {
            let mut actors = BTreeMap::new();
            actors.insert(0, ActorRef::new(0, PlayerId(1)));
            actors.insert(1, ActorRef::new(1, PlayerId(2)));
            actors.insert(7, ActorRef::new(7, PlayerId(1)));
            let mut frozen = BTreeMap::new();
            frozen.insert(
                PlayerId(1),
                FrozenLayer {
                    viewer: 0,
                    ids: vec![40],
                },
            );
            Self { actors, frozen }
        }

        fn actor(&self, id: ActorId) -> ActorRef {
            self.actors[&id]
        }
    }

    impl World for SmallWorld {
        fn actor_by_id(&self, id: ActorId) -> Option<ActorRef> {
            self.actors.get(&id).copied()
        }

        fn frozen_actor_layer(&self, player_actor: &ActorRef) -> Option<&dyn FrozenActorLayer> {
            self.frozen
                .get(&player_actor.owner)
                .map(|layer| layer as &dyn FrozenActorLayer)
        }
    }

    #[derive(Default)]
    struct Collect(RefCell<Vec<(String, String)>>);

    impl DiagnosticSink for Collect {
        fn report(&self, channel: &str, message: &str) {
            self.0
                .borrow_mut()
                .push((channel.to_string(), message.to_string()));
        }
    }

    fn codec(sink: &Collect) -> OrderCodec<&Collect> {
        OrderCodec::with_sink(CodecConfig::default(), sink)
    }

    fn full_header(name: &str, issuer: u32, fields: u8) -> Vec<u8> {
        let mut bytes = vec![TAG_FULL];
        put_string(&mut bytes, name);
        bytes.extend_from_slice(&issuer.to_le_bytes());
        bytes.push(fields);
        bytes
    }

    #[test]
    fn test_pong_wire_layout() {
        let bytes = encode(&Order::pong("12:00:00"));
        let mut expected = vec![TAG_IMMEDIATE, 4];
        expected.extend_from_slice(b"Pong");
        expected.push(OrderFields::TARGET_STRING.bits());
        expected.push(8);
        expected.extend_from_slice(b"12:00:00");
        assert_eq!(bytes, expected);

        let sink = Collect::default();
        let order = codec(&sink).decode(None, &bytes).unwrap();
        assert!(order.is_immediate());
        assert_eq!(order.name(), "Pong");
        assert_eq!(order.payload(), Some("12:00:00"));
        assert_eq!(order.aux_value(), 0);
    }

    #[test]
    fn test_attack_cell_wire_layout() {
        let world = SmallWorld::new();
        let target = Target::from_cell(&world, CPos::new(10, 20), SubCell::FULL_CELL);
        let order = Order::targeted("Attack", Some(world.actor(7)), target, true);
        let bytes = encode(&order);

        let fields = OrderFields::TARGET | OrderFields::QUEUED | OrderFields::TARGET_IS_CELL;
        let mut expected = full_header("Attack", 7, fields.bits());
        expected.push(TargetKind::Terrain.to_byte());
        expected.extend_from_slice(&CPos::new(10, 20).bits().to_le_bytes());
        expected.push(0);
        assert_eq!(bytes, expected);

        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &bytes).unwrap();
        assert_eq!(decoded.name(), "Attack");
        assert_eq!(decoded.issuer(), Some(&world.actor(7)));
        assert_eq!(
            decoded.target().serializable_cell(),
            Some((CPos::new(10, 20), SubCell::FULL_CELL))
        );
        assert!(decoded.is_queued());
        assert_eq!(decoded.payload(), None);
        assert_eq!(decoded, order);
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn test_full_order_with_every_field() {
        let world = SmallWorld::new();
        let order = Order::targeted(
            "Move",
            Some(world.actor(7)),
            Target::from_pos(WPos::new(-100, 2048, 12)),
            false,
        )
        .with_payload("")
        .with_aux_cell(CPos::with_layer(-4, 9, 1))
        .with_aux_value(0xDEAD_BEEF);

        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &encode(&order)).unwrap();
        assert_eq!(decoded, order);
        assert_eq!(decoded.payload(), Some(""));
    }

    #[test]
    fn test_frozen_actor_target() {
        let world = SmallWorld::new();
        let order = Order::targeted(
            "Attack",
            Some(world.actor(7)),
            Target::from_frozen_actor(FrozenActorRef::new(0, 40)),
            false,
        );
        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &encode(&order)).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_frozen_actor_without_layer_degrades() {
        let world = SmallWorld::new();
        // Player 2 keeps no frozen layer.
        let order = Order::targeted(
            "Attack",
            Some(world.actor(7)),
            Target::from_frozen_actor(FrozenActorRef::new(1, 40)),
            false,
        );
        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &encode(&order)).unwrap();
        assert_eq!(decoded.target(), &Target::Invalid);
        assert_eq!(decoded.issuer(), Some(&world.actor(7)));
    }

    #[test]
    fn test_stale_target_degrades_to_invalid() {
        let world = SmallWorld::new();
        let ghost = ActorRef::new(99, PlayerId(2));
        let order = Order::targeted("Attack", Some(world.actor(7)), Target::from_actor(ghost), true)
            .with_payload("x");

        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &encode(&order)).unwrap();
        assert_eq!(decoded.target().kind(), TargetKind::Invalid);
        assert_eq!(decoded.name(), "Attack");
        assert_eq!(decoded.payload(), Some("x"));
        assert!(decoded.is_queued());
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn test_dangling_issuer_drops_order() {
        let world = SmallWorld::new();
        let order = Order::new("Stop", Some(ActorRef::new(55, PlayerId(1))), false);
        let bytes = encode(&order);

        let sink = Collect::default();
        let codec = codec(&sink);
        let mut buf = bytes.as_slice();
        assert_eq!(
            codec.try_decode(Some(&world), &mut buf),
            Err(DecodeError::DanglingIssuer(55))
        );
        assert!(buf.is_empty());

        assert_eq!(codec.decode(Some(&world), &bytes), None);
        assert_eq!(sink.0.borrow().len(), 1);
    }

    #[test]
    fn test_sentinel_issuer_is_no_issuer() {
        let world = SmallWorld::new();
        let bytes = encode(&Order::pause_game(true));
        assert_eq!(&bytes[11..15], &NO_ACTOR.to_le_bytes());

        let sink = Collect::default();
        let decoded = codec(&sink).decode(Some(&world), &bytes).unwrap();
        assert!(decoded.issuer().is_none());
        assert_eq!(decoded.payload(), Some("Pause"));
    }

    #[test]
    fn test_decode_without_world() {
        let world = SmallWorld::new();
        let order = Order::targeted(
            "Attack",
            Some(world.actor(7)),
            Target::from_actor(world.actor(1)),
            false,
        )
        .with_aux_value(3);

        let sink = Collect::default();
        let decoded = codec(&sink).decode(None, &encode(&order)).unwrap();
        assert!(decoded.issuer().is_none());
        assert_eq!(decoded.target(), &Target::Invalid);
        assert_eq!(decoded.aux_value(), 3);
    }

    #[test]
    fn test_position_target_needs_no_world() {
        let order = Order::targeted("Move", None, Target::from_pos(WPos::new(1, 2, 3)), false);
        let sink = Collect::default();
        let decoded = codec(&sink).decode(None, &encode(&order)).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_unknown_tag_reports_once() {
        let sink = Collect::default();
        assert_eq!(codec(&sink).decode(None, &[0x42, 1, 2, 3, 4, 5, 6, 7]), None);
        let reports = sink.0.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "debug");
        assert_eq!(reports[0].1, "Received unknown order with tag 0x42");
    }

    #[test]
    fn test_unknown_target_kind_is_malformed() {
        let mut bytes = full_header("Attack", NO_ACTOR, OrderFields::TARGET.bits());
        bytes.push(99);
        bytes.extend_from_slice(&[0; 12]);

        let sink = Collect::default();
        let codec = codec(&sink);
        assert_eq!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::UnknownTargetKind(99))
        );
        assert_eq!(codec.decode(None, &bytes), None);
        assert_eq!(sink.0.borrow().len(), 1);
    }

    #[test]
    fn test_truncated_frames() {
        let world = SmallWorld::new();
        let bytes = encode(&Order::start_production(world.actor(7), "e1", 5, true));
        let sink = Collect::default();
        let codec = codec(&sink);

        for len in 0..bytes.len() {
            assert_eq!(codec.decode(Some(&world), &bytes[..len]), None, "len {len}");
        }
        assert_eq!(sink.0.borrow().len(), bytes.len());
        assert!(codec.decode(Some(&world), &bytes).is_some());
    }

    #[test]
    fn test_unassigned_and_misplaced_flags_rejected() {
        let sink = Collect::default();
        let codec = codec(&sink);

        let bytes = full_header("Stop", NO_ACTOR, 0x02);
        assert_eq!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::UnexpectedFields {
                tag: TAG_FULL,
                bits: 0x02
            })
        );

        let bytes = full_header("Stop", NO_ACTOR, OrderFields::TARGET_IS_CELL.bits());
        assert!(matches!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::UnexpectedFields { .. })
        ));

        let bytes = [TAG_IMMEDIATE, 0, OrderFields::QUEUED.bits()];
        assert_eq!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::UnexpectedFields {
                tag: TAG_IMMEDIATE,
                bits: 0x08
            })
        );
    }

    #[test]
    fn test_cell_flag_on_actor_target_rejected() {
        let fields = OrderFields::TARGET | OrderFields::TARGET_IS_CELL;
        let mut bytes = full_header("Attack", NO_ACTOR, fields.bits());
        bytes.push(TargetKind::Actor.to_byte());
        bytes.extend_from_slice(&7u32.to_le_bytes());

        let sink = Collect::default();
        assert!(matches!(
            codec(&sink).try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::UnexpectedFields { .. })
        ));
    }

    #[test]
    fn test_length_prefix_multi_byte() {
        let text = "x".repeat(300);
        let bytes = encode(&Order::chat(text.clone()));
        // 300 = 0b10_0101100 -> 0xAC 0x02
        assert_eq!(&bytes[7..9], &[0xAC, 0x02]);

        let sink = Collect::default();
        let decoded = codec(&sink).decode(None, &bytes).unwrap();
        assert_eq!(decoded.payload(), Some(text.as_str()));
    }

    #[test]
    fn test_length_prefix_overflow() {
        let bytes = [TAG_IMMEDIATE, 0xFF, 0xFF, 0xFF, 0xFF, 0x1F, 0];
        let sink = Collect::default();
        assert_eq!(
            codec(&sink).try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::LengthPrefixOverflow)
        );
    }

    #[test]
    fn test_string_limit_is_enforced() {
        let sink = Collect::default();
        let config = CodecConfig {
            max_string_len: 4,
            ..CodecConfig::default()
        };
        let codec = OrderCodec::with_sink(config, &sink);

        let bytes = encode(&Order::chat("hello"));
        assert_eq!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::StringTooLong { len: 5, max: 4 })
        );

        // A huge declared length is rejected before any allocation.
        let bytes = [TAG_IMMEDIATE, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
        assert!(matches!(
            codec.try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::StringTooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [TAG_IMMEDIATE, 2, 0xC3, 0x28, 0];
        let sink = Collect::default();
        assert_eq!(
            codec(&sink).try_decode(None, &mut bytes.as_slice()),
            Err(DecodeError::InvalidUtf8)
        );
    }

    #[test]
    fn test_decode_stream() {
        let world = SmallWorld::new();
        let first = Order::chat("hi");
        let dangling = Order::new("Stop", Some(ActorRef::new(55, PlayerId(1))), false);
        let last = Order::new("Stop", Some(world.actor(7)), true);

        let mut packet = Vec::new();
        for order in [&first, &dangling, &last] {
            encode_into(order, &mut packet);
        }

        let sink = Collect::default();
        let orders = codec(&sink).decode_stream(Some(&world), &packet);
        assert_eq!(orders, vec![first.clone(), last.clone()]);
        assert_eq!(sink.0.borrow().len(), 1);

        // Garbage loses alignment and ends the packet.
        packet.push(0x00);
        encode_into(&first, &mut packet);
        let orders = codec(&sink).decode_stream(Some(&world), &packet);
        assert_eq!(orders, vec![first, last]);
        assert_eq!(sink.0.borrow().len(), 3);
    }

    #[test]
    fn test_decode_is_repeatable() {
        let world = SmallWorld::new();
        let bytes = encode(&Order::team_chat("go", 2));
        let sink = Collect::default();
        let codec = codec(&sink);
        assert_eq!(
            codec.decode(Some(&world), &bytes),
            codec.decode(Some(&world), &bytes)
        );
    }
}
