//! Decode determinism across runs and threads.
//!
//! Every peer must turn the same packet into the same orders, no matter
//! how many times or on which thread it is decoded.

use rts_protocol::codec::encode_into;
use rts_protocol::prelude::*;
use rts_test_utils::determinism::{
    compute_hash, find_first_divergence, run_parallel_decodes, verify_decode_determinism,
};
use rts_test_utils::fixtures::TestWorld;

fn busy_packet(world: &TestWorld) -> Vec<u8> {
    let mut packet = Vec::new();
    for (i, actor) in world.actors().into_iter().enumerate() {
        let target = if i % 2 == 0 {
            Target::from_cell(world, CPos::new(i as i32, 3), SubCell::FIRST)
        } else {
            Target::from_pos(WPos::new(i as i32 * 100, -50, 0))
        };
        let order = Order::targeted("Move", Some(actor), target, i % 3 == 0)
            .with_aux_value(i as u32);
        encode_into(&order, &mut packet);
    }
    encode_into(&Order::team_chat("hold", 1), &mut packet);
    encode_into(&Order::pause_game(false), &mut packet);
    packet
}

#[test]
fn test_sequential_runs_agree() {
    let world = TestWorld::skirmish();
    let result = verify_decode_determinism(Some(&world), &busy_packet(&world), 10);
    result.assert_deterministic();
}

#[test]
fn test_parallel_runs_agree() {
    let world = TestWorld::skirmish();
    let packet = busy_packet(&world);
    let parallel = run_parallel_decodes(&world, &packet, 8);
    parallel.assert_deterministic();

    let sequential = verify_decode_determinism(Some(&world), &packet, 1);
    assert_eq!(parallel.hashes[0], sequential.hashes[0]);
}

#[test]
fn test_world_change_shows_up_as_divergence() {
    let mut world = TestWorld::skirmish();
    let packet = busy_packet(&world);
    let codec = OrderCodec::with_sink(CodecConfig::default(), NullSink);

    let before = codec.decode_stream(Some(&world), &packet);
    world.kill(4);
    let after = codec.decode_stream(Some(&world), &packet);

    assert_ne!(compute_hash(&before), compute_hash(&after));
    // Actor 4 issued the fifth order in the packet.
    assert_eq!(find_first_divergence(&before, &after), Some(4));
    assert_eq!(after.len(), before.len() - 1);
}
