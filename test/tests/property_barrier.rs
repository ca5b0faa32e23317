/// PROPERTY-BASED TESTS: Barrier invariants
///
/// Key invariants:
/// 1. The barrier releases exactly once per epoch, whatever the report order
/// 2. It never releases before every active peer reported
/// 3. Duplicate reports never change the outcome
/// 4. Every node fires AllPeersReady exactly once per networked transition

use std::collections::HashSet;

use proptest::prelude::*;
use curtain_server::{BarrierCoordinator, BarrierOutcome};
use curtain_shared::{EpochId, LoadMode, PeerKey, TransitionEvent};
use curtain_test::TestSession;

// Strategy for a peer count and a report sequence over those peers, each
// peer appearing at least once and possibly repeated
fn report_sequence_strategy() -> impl Strategy<Value = (u64, Vec<u64>)> {
    (1u64..8).prop_flat_map(|peer_count| {
        let every_peer = Just((0..peer_count).collect::<Vec<u64>>());
        let duplicates = prop::collection::vec(0..peer_count, 0..10);
        (every_peer, duplicates).prop_flat_map(move |(mut reports, duplicates)| {
            reports.extend(duplicates);
            (Just(peer_count), Just(reports).prop_shuffle())
        })
    })
}

fn completion_order_strategy() -> impl Strategy<Value = Vec<usize>> {
    (1usize..5).prop_flat_map(|peer_count| Just((0..peer_count).collect::<Vec<usize>>()).prop_shuffle())
}

proptest! {
    /// Test that any report order with duplicates releases exactly once,
    /// right after the last distinct peer reported
    #[test]
    fn prop_barrier_releases_exactly_once(
        (peer_count, reports) in report_sequence_strategy(),
        epoch in any::<u16>(),
    ) {
        let epoch = EpochId::new(epoch);
        let active: HashSet<PeerKey> = (0..peer_count).map(PeerKey::new).collect();
        let mut barrier = BarrierCoordinator::new(None);
        barrier.begin_epoch(epoch);

        let mut seen = HashSet::new();
        let mut releases = 0;
        for peer in reports {
            seen.insert(peer);
            match barrier.on_peer_ready(epoch, PeerKey::new(peer), &active) {
                BarrierOutcome::Released => {
                    releases += 1;
                    prop_assert_eq!(seen.len() as u64, peer_count);
                }
                BarrierOutcome::Pending { ready, required } => {
                    prop_assert_eq!(ready, seen.len());
                    prop_assert_eq!(required as u64, peer_count);
                }
                BarrierOutcome::AlreadyReleased => {
                    prop_assert_eq!(releases, 1);
                }
                BarrierOutcome::Stale => prop_assert!(false, "report for current epoch was stale"),
            }
        }

        prop_assert_eq!(releases, 1);
        prop_assert!(barrier.is_released());
    }

    /// Test that reports for any other epoch never count
    #[test]
    fn prop_other_epochs_are_stale(
        current in any::<u16>(),
        offset in 1u16..=u16::MAX,
        peer in 0u64..8,
    ) {
        let current = EpochId::new(current);
        let other = EpochId::new(current.value().wrapping_add(offset));
        let active: HashSet<PeerKey> = [PeerKey::new(peer)].into_iter().collect();
        let mut barrier = BarrierCoordinator::new(None);
        barrier.begin_epoch(current);

        prop_assert_eq!(
            barrier.on_peer_ready(other, PeerKey::new(peer), &active),
            BarrierOutcome::Stale
        );
        prop_assert!(!barrier.is_released());
    }

    /// Test that whatever order peers finish loading in, every node sees
    /// exactly one release
    #[test]
    fn prop_every_node_released_once(order in completion_order_strategy()) {
        let mut session = TestSession::with_fade(order.len(), std::time::Duration::from_millis(32));
        session.authority.begin_networked_transition("arena", LoadMode::Single);
        session.run_until_loading();

        session.authority_handles.loader.complete();
        session.tick_authority();
        for index in order {
            prop_assert_eq!(session.network.all_ready_count(), 0);
            session.peer_handles[index].loader.complete();
            session.tick_peer(index);
            session.tick_authority();
        }
        session.tick_all_n(2);

        prop_assert_eq!(session.network.all_ready_count(), 1);
        prop_assert_eq!(
            session.authority_handles.probe.count(TransitionEvent::AllPeersReady),
            1
        );
        for handles in session.peer_handles.iter() {
            prop_assert_eq!(handles.probe.count(TransitionEvent::AllPeersReady), 1);
        }
    }
}
