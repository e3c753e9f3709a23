use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use rune_navigation::scene::{Scene, filter_stale, reconcile};
use rune_navigation::{
    GestureSample, KeyGenerator, NavigationState, Navigator, NavigatorOptions, Route,
    TransitionState, state_ops,
};

#[derive(Debug)]
struct Page(u32);

impl Route for Page {}

/// Deterministic xorshift so failures replay.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_op(
    rng: &mut Rng,
    keygen: &mut KeyGenerator,
    state: &NavigationState<Page>,
    n: u32,
) -> NavigationState<Page> {
    match rng.below(6) {
        0 | 1 => state_ops::push(state, keygen.entry(Page(n))),
        2 => state_ops::pop(state, false),
        3 => state_ops::replace(state, keygen.entry(Page(n))),
        4 => state_ops::pop_to_top(state),
        _ => state_ops::reset(state, vec![keygen.entry(Page(n)), keygen.entry(Page(n + 1))], None),
    }
}

fn check_scenes(scenes: &[Arc<Scene<Page>>], state: &NavigationState<Page>) {
    let keys: HashSet<_> = scenes.iter().map(|scene| scene.key.clone()).collect();
    assert_eq!(keys.len(), scenes.len(), "duplicate scene key");
    assert!(scenes.iter().filter(|scene| scene.is_stale).count() <= 1);
    assert!(scenes.windows(2).all(|pair| pair[0].index <= pair[1].index));

    let live: Vec<_> = scenes.iter().filter(|scene| !scene.is_stale).collect();
    assert_eq!(live.len(), state.len());
    for (scene, entry) in live.iter().zip(state.routes()) {
        assert_eq!(scene.key, entry.key);
        assert!(Arc::ptr_eq(&scene.route, &entry.route));
    }
    let active: Vec<_> = scenes.iter().filter(|scene| scene.is_active).collect();
    match state.active_route() {
        Some(route) => {
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].key, route.key);
        }
        None => assert!(active.is_empty()),
    }
}

#[test]
fn test_reconcile_properties_hold_over_random_sequences() -> Result<()> {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    let mut keygen = KeyGenerator::new();
    let mut state = NavigationState::from_routes(vec![keygen.entry(Page(0))])?;
    let mut scenes = reconcile(&[], &state).scenes;

    for n in 1..500 {
        state = random_op(&mut rng, &mut keygen, &state, n);
        let next = reconcile(&scenes, &state);
        check_scenes(&next.scenes, &state);

        // Unchanged scenes keep their identity.
        for scene in &next.scenes {
            if let Some(old) = scenes.iter().find(|old| old.key == scene.key) {
                if old.same_as(scene) {
                    assert!(Arc::ptr_eq(old, scene));
                }
            }
        }

        // Once settled, another pass over the same state changes nothing.
        let settled = filter_stale(&next.scenes).unwrap_or_else(|| next.scenes.clone());
        let again = reconcile(&settled, &state);
        assert!(!again.changed);
        assert!(again.scenes.iter().zip(&settled).all(|(a, b)| Arc::ptr_eq(a, b)));

        scenes = next.scenes;
        if rng.below(3) == 0 {
            if let Some(live) = filter_stale(&scenes) {
                scenes = live;
            }
        }
    }
    Ok(())
}

#[test]
fn test_navigator_stays_bounded_under_random_input() -> Result<()> {
    let mut rng = Rng(0x2545_F491_4F6C_DD1D);
    let mut nav = Navigator::with_routes(NavigatorOptions::default(), [Page(0), Page(1)])?;
    let mut n = 2;

    for _ in 0..3000 {
        match rng.below(10) {
            0 => {
                nav.push(Page(n));
                n += 1;
            }
            1 => nav.pop(),
            2 => {
                nav.gesture_start_should_capture();
                let dx = 17.0 + rng.below(300) as f64;
                let sample = GestureSample {
                    dx,
                    vx: rng.below(3) as f64 * 0.5,
                    page_x: 5.0 + dx,
                    ..Default::default()
                };
                if nav.gesture_move_should_claim(&sample) {
                    nav.gesture_grant();
                    nav.gesture_move(&sample);
                    if rng.below(4) == 0 {
                        nav.gesture_terminate();
                    } else {
                        nav.gesture_release(&sample);
                    }
                }
            }
            _ => {}
        }

        let frame = nav.render();
        assert!((0.0..3.0).contains(&frame.position), "position {}", frame.position);
        assert!(nav.scenes().iter().filter(|scene| scene.is_stale).count() <= 1);
        if nav.transition_state() == TransitionState::Idle {
            assert!(nav.scenes().iter().all(|scene| !scene.is_stale));
            assert!(!nav.has_pending_transition());
        }
        // A transition and a gesture animation never run together.
        if nav.transition_state() == TransitionState::Animating {
            assert!(!nav.gesture_state().is_responding());
        }

        nav.advance(rng.below(40) as f64);
    }

    nav.run_until_idle(16.0);
    let state = nav.navigation_state().clone();
    check_scenes(nav.scenes(), &state);
    Ok(())
}
