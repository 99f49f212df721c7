//! Proptest strategies for orders and wire bytes.
//!
//! Strategies that reference actors draw them from a [`TestWorld`], so
//! every generated order resolves when decoded against that world.

use proptest::prelude::*;
use rts_protocol::actor::{ActorRef, FrozenActorRef};
use rts_protocol::codec::{TAG_FULL, TAG_IMMEDIATE};
use rts_protocol::coords::{CPos, SubCell, WPos};
use rts_protocol::order::Order;
use rts_protocol::target::{Target, TerrainTarget};

use crate::fixtures::TestWorld;

/// Order names, including the empty name.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z]{0,16}"
}

/// Optional payload of arbitrary printable text, including empty strings.
pub fn arb_payload() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(".{0,40}")
}

/// Any cell a map can address.
pub fn arb_cell() -> impl Strategy<Value = CPos> {
    (-2048i32..2048, -2048i32..2048, any::<u8>())
        .prop_map(|(x, y, layer)| CPos::with_layer(x, y, layer))
}

/// Any world position.
pub fn arb_wpos() -> impl Strategy<Value = WPos> {
    (any::<i32>(), any::<i32>(), any::<i32>()).prop_map(|(x, y, z)| WPos::new(x, y, z))
}

/// Cell-addressed terrain target, centred the way [`TestWorld`] centres it.
pub fn arb_cell_target() -> impl Strategy<Value = Target> {
    (arb_cell(), any::<u8>()).prop_map(|(cell, sub_cell)| {
        Target::Terrain(TerrainTarget::Cell {
            cell,
            sub_cell: SubCell(sub_cell),
            center: WPos::center_of(cell),
        })
    })
}

fn arb_optional_actor(actors: Vec<ActorRef>) -> BoxedStrategy<Option<ActorRef>> {
    if actors.is_empty() {
        Just(None).boxed()
    } else {
        proptest::option::of(proptest::sample::select(actors)).boxed()
    }
}

/// Any target that resolves in `world`.
pub fn arb_target(world: &TestWorld) -> BoxedStrategy<Target> {
    let mut options: Vec<BoxedStrategy<Target>> = vec![
        Just(Target::Invalid).boxed(),
        arb_wpos().prop_map(Target::from_pos).boxed(),
        arb_cell_target().boxed(),
    ];

    let actors = world.actors();
    if !actors.is_empty() {
        options.push(
            proptest::sample::select(actors)
                .prop_map(Target::from_actor)
                .boxed(),
        );
    }

    let frozen: Vec<FrozenActorRef> = world.frozen_actors();
    if !frozen.is_empty() {
        options.push(
            proptest::sample::select(frozen)
                .prop_map(Target::from_frozen_actor)
                .boxed(),
        );
    }

    proptest::strategy::Union::new(options).boxed()
}

/// Full-frame order whose issuer and target resolve in `world`.
pub fn arb_full_order(world: &TestWorld) -> BoxedStrategy<Order> {
    (
        arb_name(),
        arb_optional_actor(world.actors()),
        arb_target(world),
        arb_payload(),
        prop_oneof![Just(CPos::ZERO), arb_cell()],
        prop_oneof![Just(0u32), any::<u32>()],
        any::<bool>(),
    )
        .prop_map(|(name, issuer, target, payload, cell, value, queued)| {
            let mut order = Order::targeted(name, issuer, target, queued)
                .with_aux_cell(cell)
                .with_aux_value(value);
            order.set_payload(payload);
            order
        })
        .boxed()
}

/// Immediate control order.
pub fn arb_immediate_order() -> impl Strategy<Value = Order> {
    (arb_name(), arb_payload(), prop_oneof![Just(0u32), any::<u32>()]).prop_map(
        |(name, payload, value)| {
            let mut order = Order::immediate(name).with_aux_value(value);
            order.set_payload(payload);
            order
        },
    )
}

/// Either kind of order, resolvable in `world`.
pub fn arb_order(world: &TestWorld) -> BoxedStrategy<Order> {
    prop_oneof![arb_full_order(world), arb_immediate_order()].boxed()
}

/// A tag byte that is neither frame tag.
pub fn arb_unknown_tag() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("known frame tag", |tag| {
        *tag != TAG_FULL && *tag != TAG_IMMEDIATE
    })
}

/// Arbitrary bytes, biased towards starting with a real frame tag so the
/// decoder gets past the first byte.
pub fn arb_frame_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    (
        prop_oneof![Just(TAG_FULL), Just(TAG_IMMEDIATE), any::<u8>()],
        proptest::collection::vec(any::<u8>(), 0..max_len),
    )
        .prop_map(|(tag, rest)| {
            let mut bytes = Vec::with_capacity(rest.len() + 1);
            bytes.push(tag);
            bytes.extend(rest);
            bytes
        })
}
