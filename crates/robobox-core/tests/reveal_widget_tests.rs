//! Behavioral tests for the scratch-reveal widget
//!
//! Drives the widget the way a reveal session driver does: effects out,
//! flow results back in.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use robobox_core::reveal::*;
use robobox_core::DiscountResult;
use std::time::{Duration, Instant};

fn card() -> ScratchReveal<RasterMask> {
    ScratchReveal::new(RasterMask::new(160, 90)).with_brush_radius(12.0)
}

fn fetch(effect: Option<Effect>) -> FetchTicket {
    match effect {
        Some(Effect::FetchDiscount(ticket)) => ticket,
        None => panic!("Expected FetchDiscount"),
    }
}

fn ok(code: &str, pct: i64) -> Result<DiscountResult, String> {
    Ok(DiscountResult::new(code, pct).unwrap())
}

fn err() -> Result<DiscountResult, String> {
    Err("upstream timeout".to_string())
}

fn sweep(card: &mut ScratchReveal<RasterMask>, step: f64) {
    card.handle(PointerEvent::new(PointerKind::Down, 0.0, 0.0));
    let mut y = 0.0;
    while y <= 90.0 {
        let mut x = 0.0;
        while x <= 160.0 {
            card.handle(PointerEvent::new(PointerKind::Move, x, y));
            x += step;
        }
        y += step;
    }
    card.handle(PointerEvent::new(PointerKind::Up, 0.0, 0.0));
}

// =============================================================================
// Flow call accounting
// =============================================================================

#[test]
fn test_one_fetch_per_activation() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut w = card();
    let mut effects = 0;

    for _ in 0..500 {
        let kind = match rng.gen_range(0..5) {
            0 => PointerKind::Down,
            1 => PointerKind::Move,
            2 => PointerKind::Up,
            3 => PointerKind::Leave,
            _ => PointerKind::Click,
        };
        let event = PointerEvent::new(kind, rng.gen_range(0.0..160.0), rng.gen_range(0.0..90.0));
        if w.handle(event).is_some() {
            effects += 1;
        }
    }
    if w.reveal_instantly().is_some() {
        effects += 1;
    }

    assert_eq!(effects, 1);
    assert_eq!(w.fetches_issued(), 1);
}

#[test]
fn test_each_retry_adds_exactly_one_fetch() {
    let mut w = card();
    let mut ticket = fetch(w.interact());

    for round in 1..=3 {
        w.resolve(ticket, err());
        assert!(w.interact().is_none());
        ticket = fetch(w.retry());
        assert!(w.retry().is_none());
        assert_eq!(w.fetches_issued(), round + 1);
    }

    w.resolve(ticket, ok("ROBO-7", 7));
    assert_eq!(w.discount().map(|d| d.percentage), Some(7));
}

#[test]
fn test_result_from_superseded_fetch_is_dropped() {
    let mut w = card();
    let first = fetch(w.interact());
    w.resolve(first, err());
    let second = fetch(w.retry());

    assert!(!w.resolve(first, ok("OLD-1", 10)));
    assert!(w.resolve(second, ok("NEW-2", 20)));
    assert_eq!(w.discount().map(|d| d.code.as_str()), Some("NEW-2"));

    // A late duplicate of the applied ticket is dropped too
    assert!(!w.resolve(second, ok("DUP-3", 30)));
    assert_eq!(w.discount().map(|d| d.code.as_str()), Some("NEW-2"));
}

// =============================================================================
// Reveal
// =============================================================================

#[test]
fn test_full_sweep_reveals_once_and_stays_revealed() {
    let mut w = card();
    sweep(&mut w, 8.0);
    assert!(w.is_revealed());
    let fraction = w.reveal_state().fraction_erased;

    // Further strokes do nothing to a revealed card
    sweep(&mut w, 4.0);
    assert!(w.is_revealed());
    assert_eq!(w.reveal_state().fraction_erased, fraction);
}

#[test]
fn test_leave_checks_threshold() {
    let mut w = card();
    w.handle(PointerEvent::new(PointerKind::Down, 0.0, 0.0));
    let mut y = 0.0;
    while y <= 90.0 {
        let mut x = 0.0;
        while x <= 160.0 {
            w.handle(PointerEvent::new(PointerKind::Move, x, y));
            x += 8.0;
        }
        y += 8.0;
    }
    assert!(!w.is_revealed());
    w.handle(PointerEvent::new(PointerKind::Leave, 170.0, 50.0));
    assert!(w.is_revealed());
}

#[test]
fn test_small_scratch_stays_hidden() {
    let mut w = card();
    w.pointer_down(Point::new(80.0, 45.0));
    w.pointer_move(Point::new(80.0, 45.0));
    w.pointer_move(Point::new(90.0, 45.0));
    w.pointer_up();
    let state = w.reveal_state();
    assert!(state.fraction_erased > 0.0);
    assert!(state.fraction_erased <= REVEAL_THRESHOLD);
    assert!(!state.revealed);
}

#[test]
fn test_reveal_while_loading_then_failure() {
    let mut w = card();
    let ticket = fetch(w.interact());
    sweep(&mut w, 8.0);
    assert!(w.is_revealed());
    assert!(w.is_loading());

    w.resolve(ticket, err());
    let view = w.view(Instant::now());
    assert!(view.revealed);
    assert_eq!(
        view.status,
        FlowStatus::Failed {
            message: BUSY_MESSAGE.to_string()
        }
    );
}

#[test]
fn test_instant_reveal_from_idle() {
    let mut w = card();
    let ticket = fetch(w.reveal_instantly());
    assert!(w.is_revealed());
    assert_eq!(w.reveal_state().fraction_erased, 1.0);

    w.resolve(ticket, ok("ROBO-50", 50));
    assert!(w.reveal_instantly().is_none());
    assert_eq!(w.fetches_issued(), 1);
}

#[test]
fn test_stroke_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(42);
    let strokes: Vec<Point> = (0..40)
        .map(|_| Point::new(rng.gen_range(0.0..160.0), rng.gen_range(0.0..90.0)))
        .collect();

    let mut baseline = RasterMask::new(160, 90);
    for p in &strokes {
        baseline.erase(*p, 9.0);
    }

    for _ in 0..5 {
        let mut shuffled = strokes.clone();
        shuffled.shuffle(&mut rng);
        let mut mask = RasterMask::new(160, 90);
        for p in &shuffled {
            mask.erase(*p, 9.0);
        }
        assert_eq!(mask.erased_fraction(), baseline.erased_fraction());
    }
}

// =============================================================================
// Copy
// =============================================================================

#[test]
fn test_copy_ack_clears_after_window() {
    let mut w = card();
    let ticket = fetch(w.interact());
    w.resolve(ticket, ok("ROBO-15", 15));

    let t0 = Instant::now();
    let mut clipboard = MemoryClipboard::new();
    assert_eq!(w.copy_code(t0, &mut clipboard).as_deref(), Some("ROBO-15"));
    assert!(w.view(t0 + Duration::from_millis(500)).copied);
    assert!(!w.view(t0 + COPY_ACK_WINDOW).copied);

    // Copying again restarts the window
    let t1 = t0 + Duration::from_secs(3);
    w.copy_code(t1, &mut clipboard);
    assert!(w.is_copied(t1 + Duration::from_secs(1)));
}

#[test]
fn test_copy_refused_until_ready() {
    let mut w = card();
    let mut clipboard = MemoryClipboard::new();
    let ticket = fetch(w.interact());
    assert!(w.copy_code(Instant::now(), &mut clipboard).is_none());

    w.resolve(ticket, err());
    assert!(w.copy_code(Instant::now(), &mut clipboard).is_none());
    assert!(clipboard.take().is_none());
}

// =============================================================================
// Wire shapes
// =============================================================================

#[test]
fn test_pointer_event_deserialize() {
    let event: PointerEvent = serde_json::from_str(r#"{"kind":"move","x":12.5,"y":3}"#).unwrap();
    assert_eq!(event, PointerEvent::new(PointerKind::Move, 12.5, 3.0));

    let up: PointerEvent = serde_json::from_str(r#"{"kind":"up"}"#).unwrap();
    assert_eq!(up.kind, PointerKind::Up);
    assert_eq!(up.point(), Point::new(0.0, 0.0));
}

#[test]
fn test_idle_view_json() {
    let json = serde_json::to_value(card().view(Instant::now())).unwrap();
    assert_eq!(json["status"]["state"], "idle");
    assert_eq!(json["mask_label"], MASK_LABEL);
    assert_eq!(json["can_reveal_instantly"], true);
}
