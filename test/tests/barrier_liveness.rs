/// BARRIER LIVENESS
///
/// What happens to the readiness barrier when peers disconnect, stay silent,
/// are busy with a local transition or are torn down mid-transition.

use std::time::Duration;

use curtain_server::AuthorityConfig;
use curtain_shared::{LoadMode, PeerMessage, TransitionEvent, TransitionState};
use curtain_test::{TestSession, AUTHORITY_KEY};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn with_timeout(peer_count: usize, timeout: Duration) -> TestSession {
    TestSession::with_config(
        peer_count,
        AuthorityConfig {
            barrier_timeout: Some(timeout),
            ..Default::default()
        },
    )
}

/// Test that a peer leaving before it reports no longer holds the barrier
#[test]
fn disconnect_before_report_shrinks_the_barrier() {
    init_logger();
    let mut session = TestSession::new(2);

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.run_until_loading();
    session.network.disconnect(TestSession::peer_key(1));

    session.authority_handles.loader.complete();
    session.peer_handles[0].loader.complete();
    session.tick_all_n(2);

    assert_eq!(session.network.all_ready_count(), 1);
    assert_eq!(session.authority.state(), TransitionState::Released);
    assert_eq!(session.peers[0].state(), TransitionState::Released);
}

/// Test the documented stall: without a timeout, a peer that disconnects
/// after everyone else reported keeps the barrier closed
#[test]
fn disconnect_after_other_reports_stalls_without_timeout() {
    init_logger();
    let mut session = TestSession::new(2);

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.run_until_loading();
    session.authority_handles.loader.complete();
    session.peer_handles[0].loader.complete();
    session.tick_all_n(2);
    session.network.disconnect(TestSession::peer_key(1));

    session.tick_all_n(200);

    assert_eq!(session.network.all_ready_count(), 0);
    assert_eq!(session.authority.state(), TransitionState::AwaitingBarrier);
    assert_eq!(
        session
            .authority_handles
            .probe
            .count(TransitionEvent::AllPeersReady),
        0
    );
}

/// Test that a timeout excludes the silent peer and releases the rest
#[test]
fn timeout_releases_past_a_silent_peer() {
    init_logger();
    let mut session = with_timeout(2, Duration::from_millis(100));

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.run_until_loading();
    session.authority_handles.loader.complete();
    session.peer_handles[0].loader.complete();
    // first report arrives on the first frame; the clock runs from the next
    session.tick_all_n(7);
    assert_eq!(session.network.all_ready_count(), 0);

    session.tick_all();

    assert_eq!(session.network.all_ready_count(), 1);
    assert_eq!(
        session.authority.barrier().excluded().iter().copied().collect::<Vec<_>>(),
        vec![TestSession::peer_key(1)]
    );
    assert_eq!(session.authority.state(), TransitionState::Released);
    assert_eq!(session.peers[0].state(), TransitionState::Released);
    // the slow peer heard the release while still loading
    assert_eq!(
        session.peers[1].state(),
        TransitionState::AwaitingExternalLoad
    );
    assert_eq!(
        session.peer_handles[1].probe.events(),
        vec![TransitionEvent::LoadingStarted]
    );

    // once it finishes loading, it is released straight away
    session.peer_handles[1].loader.complete();
    session.tick_all();

    assert_eq!(session.peers[1].state(), TransitionState::Released);
    assert_eq!(
        session.peer_handles[1].probe.events(),
        vec![
            TransitionEvent::LoadingStarted,
            TransitionEvent::LoadingCompleted,
            TransitionEvent::AllPeersReady,
        ]
    );
    assert_eq!(session.network.all_ready_count(), 1);
}

/// Test that a peer busy with a local transition ignores the start and
/// never reports
#[test]
fn busy_peer_ignores_start() {
    init_logger();
    let mut session = TestSession::with_fade(1, Duration::from_millis(64));

    session.peers[0].begin_fade_to_black();
    session.tick_peer(0);
    let local_epoch = session.peers[0].current_epoch();

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.tick_all_n(10);
    session.authority_handles.loader.complete();
    session.tick_all_n(50);

    assert_eq!(session.peers[0].state(), TransitionState::Covered);
    assert_eq!(session.peers[0].current_epoch(), local_epoch);
    assert!(session.peer_handles[0].loader.requests().is_empty());
    assert!(session.network.reports().is_empty());
    assert_eq!(session.authority.state(), TransitionState::AwaitingBarrier);
    let ready = session.authority.barrier().ready_set().expect("barrier open");
    assert!(ready.contains(&AUTHORITY_KEY));
    assert_eq!(ready.len(), 1);
}

/// Test that tearing down the authority forgets the barrier but leaves peers
/// mid-transition
#[test]
fn authority_teardown_cancels_locally_only() {
    init_logger();
    let mut session = TestSession::new(1);

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.tick_all_n(5);
    let alpha = session.authority.machine().alpha();

    session.authority.teardown();

    assert!(!session.authority.is_transitioning());
    assert!(session.authority.barrier().current_epoch().is_none());
    assert!(session.peers[0].is_transitioning());
    // the overlay keeps what it last showed
    assert_eq!(
        session.authority_handles.overlay.borrow().last_alpha(),
        Some(alpha)
    );

    let broadcasts = session.network.broadcasts().len();
    session.tick_all_n(5);
    assert_eq!(session.network.broadcasts().len(), broadcasts);
    assert_eq!(session.authority.state(), TransitionState::Idle);
}

/// Test that tearing down a peer leaves the authority's barrier waiting
#[test]
fn peer_teardown_leaves_barrier_open() {
    init_logger();
    let mut session = TestSession::new(1);

    session
        .authority
        .begin_networked_transition("arena", LoadMode::Single);
    session.run_until_loading();
    session.peers[0].teardown();
    assert!(!session.peers[0].is_transitioning());

    session.authority_handles.loader.complete();
    session.peer_handles[0].loader.complete();
    session.tick_all_n(20);

    assert!(session.network.reports().is_empty());
    assert_eq!(session.authority.state(), TransitionState::AwaitingBarrier);
    assert_eq!(session.network.all_ready_count(), 0);
}

/// Test that a load abandoned by teardown never completes the next epoch
#[test]
fn torn_down_load_does_not_complete_next_epoch() {
    init_logger();
    let mut session = TestSession::new(1);

    session
        .authority
        .begin_networked_transition("a", LoadMode::Single);
    session.run_until_loading();
    session.authority.teardown();
    session.peers[0].teardown();

    assert!(!session.authority_handles.loader.is_loading());
    assert!(!session.peer_handles[0].loader.is_loading());
    assert_eq!(session.authority_handles.loader.aborts(), 1);
    assert_eq!(session.peer_handles[0].loader.aborts(), 1);

    // the engine finishes the abandoned loads anyway
    session.complete_all_loads();

    session
        .authority
        .begin_networked_transition("b", LoadMode::Single);
    let epoch = session.authority.current_epoch().expect("epoch allocated");
    session.run_until_loading();
    session.tick_all_n(20);

    assert_eq!(
        session.authority.state(),
        TransitionState::AwaitingExternalLoad
    );
    assert_eq!(
        session.peers[0].state(),
        TransitionState::AwaitingExternalLoad
    );
    assert!(session.network.reports().is_empty());
    assert_eq!(session.network.all_ready_count(), 0);
    let ready = session.authority.barrier().ready_set().expect("barrier open");
    assert_eq!(ready.epoch(), epoch);
    assert!(ready.is_empty());

    // only the load for "b" releases the barrier
    session.complete_all_loads();
    session.tick_all_n(2);

    assert_eq!(session.authority.state(), TransitionState::Released);
    assert_eq!(session.peers[0].state(), TransitionState::Released);
    assert_eq!(
        session.network.reports(),
        vec![PeerMessage::ReportReady {
            epoch,
            peer: TestSession::peer_key(0),
        }]
    );
    assert_eq!(session.network.all_ready_count(), 1);
}

/// Test that a load abandoned by an early fade-out never completes the next
/// epoch
#[test]
fn faded_out_load_does_not_complete_next_epoch() {
    init_logger();
    let mut session = TestSession::with_fade(1, Duration::from_millis(64));

    session
        .authority
        .begin_networked_transition("a", LoadMode::Single);
    session.run_until_loading();
    session.authority.complete_networked_transition();
    session.peers[0].complete_networked_transition();
    session.complete_all_loads();
    session.tick_all_n(10);

    assert!(session.authority.state().is_idle());
    assert!(session.peers[0].state().is_idle());
    assert_eq!(session.peer_handles[0].loader.aborts(), 1);

    session
        .authority
        .begin_networked_transition("b", LoadMode::Single);
    session.run_until_loading();
    session.tick_all_n(10);

    assert_eq!(
        session.peers[0].state(),
        TransitionState::AwaitingExternalLoad
    );
    assert!(session.network.reports().is_empty());
    assert_eq!(session.network.all_ready_count(), 0);
}
