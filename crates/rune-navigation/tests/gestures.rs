use anyhow::Result;
use rune_navigation::{
    GestureSample, GestureState, NavigationEvent, Navigator, NavigatorOptions, Route,
    TransitionState, VisibilityKind,
};

const FRAME_MS: f64 = 16.0;
const WIDTH: f64 = 360.0;

#[derive(Debug)]
struct Screen(&'static str);

impl Route for Screen {}

fn settled(
    options: NavigatorOptions,
    routes: impl IntoIterator<Item = Screen>,
) -> Result<Navigator<Screen>> {
    let mut nav = Navigator::with_routes(options, routes)?;
    nav.run_until_idle(FRAME_MS);
    nav.push(Screen("b"));
    nav.run_until_idle(FRAME_MS);
    nav.drain_events();
    Ok(nav)
}

/// A horizontal drag that started 10px from the left edge.
fn drag(dx: f64, vx: f64) -> GestureSample {
    GestureSample {
        dx,
        vx,
        page_x: 10.0 + dx,
        ..Default::default()
    }
}

fn begin_drag(nav: &mut Navigator<Screen>) {
    assert!(!nav.gesture_start_should_capture());
    assert!(nav.gesture_move_should_claim(&drag(20.0, 0.0)));
    nav.gesture_grant();
    assert_eq!(nav.gesture_state(), GestureState::Dragging);
}

fn ids(nav: &Navigator<Screen>) -> Vec<&'static str> {
    nav.scenes().iter().map(|scene| scene.route.0).collect()
}

#[test]
fn test_slow_half_drag_resets() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    assert_eq!(nav.transmitter().value(), 2.0);

    begin_drag(&mut nav);
    nav.gesture_move(&drag(150.0, 0.0));
    let expected = 2.0 - 150.0 / WIDTH;
    assert!((nav.transmitter().position() - expected).abs() < 1e-9);
    assert!(!nav.gesture_termination_request());

    nav.gesture_release(&drag(150.0, 0.0));
    assert_eq!(nav.gesture_state(), GestureState::Resetting);
    assert!(nav.is_in_transition());
    assert!(nav.dispatch_back_event());

    nav.run_until_idle(FRAME_MS);
    assert_eq!(nav.gesture_state(), GestureState::Idle);
    assert_eq!(nav.transmitter().position(), 2.0);
    assert_eq!(nav.navigation_state().len(), 2);
    assert_eq!(ids(&nav), vec!["a", "b"]);
    assert!(nav.drain_events().is_empty());
    Ok(())
}

#[test]
fn test_drag_past_threshold_pops() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;

    begin_drag(&mut nav);
    nav.gesture_move(&drag(WIDTH * 0.6, 0.0));
    nav.gesture_release(&drag(WIDTH * 0.6, 0.0));
    assert_eq!(nav.gesture_state(), GestureState::Backing);
    // The stack only follows once the animation is over.
    assert_eq!(nav.navigation_state().len(), 2);

    nav.run_until_idle(FRAME_MS);
    assert_eq!(nav.gesture_state(), GestureState::Idle);
    assert_eq!(nav.transition_state(), TransitionState::Idle);
    assert_eq!(ids(&nav), vec!["a"]);
    assert_eq!(nav.transmitter().value(), 1.0);
    assert_eq!(nav.transmitter().position(), 1.0);

    let events = nav.drain_events();
    let end = events
        .iter()
        .find_map(|event| match event {
            NavigationEvent::TransitionEnd { props, .. } => Some(props),
            _ => None,
        })
        .expect("transition end");
    assert_eq!(end.active_scene.as_ref().map(|s| s.route.0), Some("a"));
    assert_eq!(end.prev_active_scene.as_ref().map(|s| s.route.0), Some("b"));
    let kinds: Vec<_> = events
        .iter()
        .filter_map(|e| e.visibility())
        .map(|(_, kind)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            VisibilityKind::WillHide,
            VisibilityKind::WillShow,
            VisibilityKind::DidHide,
            VisibilityKind::DidShow,
        ]
    );
    Ok(())
}

#[test]
fn test_fast_flick_goes_back_from_short_drag() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    begin_drag(&mut nav);
    nav.gesture_move(&drag(60.0, 0.0));
    nav.gesture_release(&drag(60.0, 1.2));
    assert_eq!(nav.gesture_state(), GestureState::Backing);
    nav.run_until_idle(FRAME_MS);
    assert_eq!(ids(&nav), vec!["a"]);
    Ok(())
}

#[test]
fn test_transition_cancels_running_drag() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    begin_drag(&mut nav);
    nav.gesture_move(&drag(100.0, 0.0));

    nav.push(Screen("c"));
    assert_eq!(nav.gesture_state(), GestureState::Idle);
    assert_eq!(nav.transmitter().position(), 2.0);

    // Moves of the abandoned drag no longer reach the transmitter.
    nav.gesture_move(&drag(200.0, 0.0));
    assert_eq!(nav.transmitter().position(), 2.0);

    nav.run_until_idle(FRAME_MS);
    assert_eq!(ids(&nav), vec!["a", "b", "c"]);
    assert_eq!(nav.transmitter().value(), 3.0);
    Ok(())
}

#[test]
fn test_no_claim_while_animating() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    nav.push(Screen("c"));
    nav.render();
    assert_eq!(nav.transition_state(), TransitionState::Animating);

    assert!(nav.gesture_start_should_capture());
    assert!(!nav.gesture_move_should_claim(&drag(40.0, 0.0)));
    nav.run_until_idle(FRAME_MS);
    Ok(())
}

#[test]
fn test_touch_far_from_edge_is_ignored_until_next_touch() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    nav.gesture_start_should_capture();
    let far = GestureSample {
        dx: 20.0,
        page_x: 200.0,
        ..Default::default()
    };
    assert!(!nav.gesture_move_should_claim(&far));
    assert_eq!(nav.gesture_state(), GestureState::Unable);
    assert!(!nav.gesture_move_should_claim(&drag(20.0, 0.0)));

    nav.gesture_start_should_capture();
    assert!(nav.gesture_move_should_claim(&drag(20.0, 0.0)));
    Ok(())
}

#[test]
fn test_gestures_disabled() -> Result<()> {
    let options = NavigatorOptions {
        enable_gestures: false,
        ..Default::default()
    };
    let mut nav = settled(options, [Screen("a")])?;
    assert!(!nav.gesture_start_should_capture());
    assert!(!nav.gesture_move_should_claim(&drag(40.0, 0.0)));

    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    nav.set_gesture_enabled(false);
    assert!(!nav.is_gesture_enabled());
    nav.gesture_start_should_capture();
    assert!(!nav.gesture_move_should_claim(&drag(40.0, 0.0)));
    Ok(())
}

#[test]
fn test_single_scene_needs_opt_in() -> Result<()> {
    let mut nav = Navigator::with_routes(NavigatorOptions::default(), [Screen("a")])?;
    nav.run_until_idle(FRAME_MS);
    nav.gesture_start_should_capture();
    assert!(!nav.gesture_move_should_claim(&drag(40.0, 0.0)));

    let options = NavigatorOptions {
        enable_gesture_on_first_scene: true,
        ..Default::default()
    };
    let mut nav = Navigator::with_routes(options, [Screen("a")])?;
    nav.run_until_idle(FRAME_MS);
    nav.gesture_start_should_capture();
    assert!(nav.gesture_move_should_claim(&drag(40.0, 0.0)));
    Ok(())
}

#[test]
fn test_terminated_drag_snaps_back() -> Result<()> {
    let mut nav = settled(NavigatorOptions::default(), [Screen("a")])?;
    begin_drag(&mut nav);
    nav.gesture_move(&drag(120.0, 0.0));
    nav.gesture_terminate();
    assert_eq!(nav.gesture_state(), GestureState::Resetting);
    nav.advance(0.0);
    assert_eq!(nav.gesture_state(), GestureState::Idle);
    assert_eq!(nav.transmitter().position(), 2.0);
    assert_eq!(ids(&nav), vec!["a", "b"]);
    Ok(())
}
