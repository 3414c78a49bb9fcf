use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn barrier_releases_all_lanes_each_generation() {
    const LANES: usize = 6;
    const ROUNDS: usize = 20;
    let barrier = TeamBarrier::new(LANES);
    let counter = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..LANES {
            scope.spawn(|| {
                for round in 0..ROUNDS {
                    counter.fetch_add(1, Ordering::Relaxed);
                    barrier.wait();
                    // Every lane has incremented for this round.
                    assert!(counter.load(Ordering::Relaxed) >= (round + 1) * LANES);
                    barrier.wait();
                }
            });
        }
    });

    assert_eq!(counter.load(Ordering::Relaxed), LANES * ROUNDS);
}

#[test]
fn exactly_one_leader_per_generation() {
    const LANES: usize = 4;
    let barrier = TeamBarrier::new(LANES);
    let leaders = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..LANES {
            scope.spawn(|| {
                if barrier.wait() {
                    leaders.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(leaders.load(Ordering::Relaxed), 1);
}

#[test]
fn panicking_lane_poisons_teammates_instead_of_deadlocking() {
    let barrier = TeamBarrier::new(3);

    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..3)
            .map(|lane| {
                let barrier = &barrier;
                scope.spawn(move || {
                    let _guard = PoisonOnPanic::new(barrier);
                    if lane == 0 {
                        panic!("lane fault");
                    }
                    barrier.wait();
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().is_err()).collect()
    });

    assert!(results.iter().all(|&failed| failed));
    assert!(barrier.is_poisoned());
}
