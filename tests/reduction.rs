mod util;

use pi_sieve::algs::reduction::reduce_to_aggregator;
use pi_sieve::participants::ParticipantSet;
use pi_sieve::pi_error::PiError;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use util::*;

const TAG: u16 = 10;

fn me(rank: usize, size: usize) -> ParticipantSet {
    ParticipantSet::new(rank, size).unwrap()
}

#[test]
fn aggregator_receives_exactly_size_minus_one() {
    let comm = ScriptedComm::new(
        0,
        4,
        [msg(1.0, 3), msg(2.0, 1), msg(3.0, 2), msg(100.0, 1)],
    );
    let agg = reduce_to_aggregator(&me(0, 4), 0, TAG, &comm, 0.5)
        .unwrap()
        .expect("aggregator");
    assert_eq!(agg.total, 6.5);
    assert_eq!(agg.arrivals, vec![3, 1, 2]);
    assert_eq!(comm.receives.get(), 3);
    // the extra scripted message is never consumed
    assert_eq!(comm.remaining(), 1);
    assert!(comm.sent.borrow().is_empty());
}

#[test]
fn contributor_sends_once_to_aggregator() {
    let comm = ScriptedComm::new(2, 4, []);
    let out = reduce_to_aggregator(&me(2, 4), 1, TAG, &comm, 7.25).unwrap();
    assert!(out.is_none());
    assert_eq!(*comm.sent.borrow(), vec![(7.25, 1, TAG)]);
    assert_eq!(comm.receives.get(), 0);
}

#[test]
fn arrival_order_does_not_change_total() {
    let partials = [0.125, 1.5, 2.75, 3.0625, 4.5, 5.25, 6.0];
    let size = partials.len() + 1;
    let reference: f64 = partials.iter().sum();
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut inbox: Vec<_> = partials
            .iter()
            .enumerate()
            .map(|(i, &v)| msg(v, i + 1))
            .collect();
        inbox.shuffle(&mut rng);
        let comm = ScriptedComm::new(0, size, inbox);
        let agg = reduce_to_aggregator(&me(0, size), 0, TAG, &comm, 0.0)
            .unwrap()
            .unwrap();
        assert_close(agg.total, reference, 1e-12);
    }
}

#[test]
fn duplicate_and_foreign_sources_are_rejected() {
    let dup = ScriptedComm::new(0, 3, [msg(1.0, 1), msg(1.0, 1)]);
    assert_eq!(
        reduce_to_aggregator(&me(0, 3), 0, TAG, &dup, 0.0),
        Err(PiError::DuplicateContribution(1))
    );

    let own = ScriptedComm::new(0, 3, [msg(1.0, 0)]);
    assert!(matches!(
        reduce_to_aggregator(&me(0, 3), 0, TAG, &own, 0.0),
        Err(PiError::UnexpectedSource { source_rank: 0, .. })
    ));

    let stranger = ScriptedComm::new(0, 3, [msg(1.0, 9)]);
    assert!(matches!(
        reduce_to_aggregator(&me(0, 3), 0, TAG, &stranger, 0.0),
        Err(PiError::UnexpectedSource { source_rank: 9, .. })
    ));
}

#[test]
fn missing_contribution_surfaces_transport_error() {
    // a scripted comm fails where a real one would block forever
    let comm = ScriptedComm::new(0, 3, [msg(1.0, 2)]);
    assert_eq!(
        reduce_to_aggregator(&me(0, 3), 0, TAG, &comm, 0.0),
        Err(PiError::Transport("script exhausted".into()))
    );
}
