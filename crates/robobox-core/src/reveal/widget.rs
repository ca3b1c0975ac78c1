//! Scratch-reveal state machine

use super::clipboard::Clipboard;
use super::mask::{Maskable, Point, RasterMask};
use crate::models::DiscountResult;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Erased fraction above which the widget commits to revealing
pub const REVEAL_THRESHOLD: f64 = 0.5;

/// Radius of the scratch brush, in mask pixels
pub const DEFAULT_BRUSH_RADIUS: f64 = 60.0;

/// How long a copy acknowledgement stays visible
pub const COPY_ACK_WINDOW: Duration = Duration::from_secs(2);

/// Prompt painted on the untouched mask
pub const MASK_LABEL: &str = "SCRATCH TO REVEAL";

/// Message shown when the discount flow failed
pub const BUSY_MESSAGE: &str = "The discount generator is busy. Please try again.";

/// Identifies one outstanding discount fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Work the driver must perform on behalf of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Call the discount flow once and feed the outcome to [`ScratchReveal::resolve`]
    FetchDiscount(FetchTicket),
}

/// Discount flow status as seen by the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowStatus {
    /// No flow call made yet
    Idle,
    /// A flow call is in flight
    Loading,
    /// The flow returned a discount
    Ready { discount: DiscountResult },
    /// The flow failed; `retry` re-enters `Loading`
    Failed { message: String },
}

/// Mask progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevealState {
    pub fraction_erased: f64,
    pub revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
    Click,
}

/// One pointer input in mask coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Render-ready snapshot of the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealView {
    pub status: FlowStatus,
    pub revealed: bool,
    pub fraction_erased: f64,
    /// Label painted on the mask while it is still shown
    pub mask_label: Option<&'static str>,
    pub copied: bool,
    pub can_reveal_instantly: bool,
}

/// Scratch-to-reveal discount widget
///
/// Mask reveal and result readiness are independent signals: the widget can
/// be revealed while the flow is still loading or has failed.
#[derive(Debug)]
pub struct ScratchReveal<M = RasterMask> {
    mask: M,
    brush_radius: f64,
    status: FlowStatus,
    revealed: bool,
    drawing: bool,
    pending: Option<FetchTicket>,
    next_ticket: u64,
    fetches_issued: u32,
    copied_until: Option<Instant>,
}

impl<M: Maskable> ScratchReveal<M> {
    pub fn new(mask: M) -> Self {
        Self {
            mask,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            status: FlowStatus::Idle,
            revealed: false,
            drawing: false,
            pending: None,
            next_ticket: 1,
            fetches_issued: 0,
            copied_until: None,
        }
    }

    pub fn with_brush_radius(mut self, radius: f64) -> Self {
        self.brush_radius = radius;
        self
    }

    /// Feed one pointer event
    pub fn handle(&mut self, event: PointerEvent) -> Option<Effect> {
        match event.kind {
            PointerKind::Down => self.pointer_down(event.point()),
            PointerKind::Move => self.pointer_move(event.point()),
            PointerKind::Up | PointerKind::Leave => {
                self.pointer_up();
                None
            }
            PointerKind::Click => self.interact(),
        }
    }

    /// Start a stroke
    pub fn pointer_down(&mut self, _at: Point) -> Option<Effect> {
        let effect = self.interact();
        self.drawing = true;
        effect
    }

    /// Continue a stroke, erasing under the pointer
    pub fn pointer_move(&mut self, at: Point) -> Option<Effect> {
        let effect = self.interact();
        if self.drawing && !self.revealed {
            self.mask.erase(at, self.brush_radius);
        }
        effect
    }

    /// End a stroke and re-check the reveal threshold
    pub fn pointer_up(&mut self) {
        self.drawing = false;
        self.check_reveal();
    }

    /// Any interaction with the card; only the first one starts a fetch
    pub fn interact(&mut self) -> Option<Effect> {
        match self.status {
            FlowStatus::Idle => Some(self.begin_fetch()),
            _ => None,
        }
    }

    /// Reveal without scratching
    ///
    /// Counts as a full mask erase. Refused while the flow has failed with no
    /// result to show.
    pub fn reveal_instantly(&mut self) -> Option<Effect> {
        let effect = self.interact();
        if matches!(self.status, FlowStatus::Failed { .. }) {
            return effect;
        }
        if !self.revealed {
            self.mask.erase_all();
            self.revealed = true;
            debug!("Discount card revealed instantly");
        }
        effect
    }

    /// Re-enter `Loading` after a failure
    pub fn retry(&mut self) -> Option<Effect> {
        match self.status {
            FlowStatus::Failed { .. } => Some(self.begin_fetch()),
            _ => None,
        }
    }

    /// Apply the outcome of a fetch; stale tickets are ignored
    pub fn resolve<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<DiscountResult, E>,
    ) -> bool {
        if self.pending != Some(ticket) {
            debug!("Ignoring stale discount result for ticket {}", ticket.id());
            return false;
        }
        self.pending = None;

        self.status = match result {
            Ok(discount) => FlowStatus::Ready { discount },
            Err(e) => {
                warn!("Discount generation failed: {}", e);
                FlowStatus::Failed {
                    message: BUSY_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// Copy the revealed code; a failing clipboard is a silent no-op
    pub fn copy_code(&mut self, now: Instant, clipboard: &mut dyn Clipboard) -> Option<String> {
        let code = match &self.status {
            FlowStatus::Ready { discount } => discount.code.clone(),
            _ => return None,
        };

        match clipboard.write_text(&code) {
            Ok(()) => {
                self.copied_until = Some(now + COPY_ACK_WINDOW);
                Some(code)
            }
            Err(e) => {
                debug!("Copy skipped: {}", e);
                None
            }
        }
    }

    /// Whether the copy acknowledgement is showing at `now`
    pub fn is_copied(&self, now: Instant) -> bool {
        matches!(self.copied_until, Some(until) if now < until)
    }

    pub fn status(&self) -> &FlowStatus {
        &self.status
    }

    pub fn discount(&self) -> Option<&DiscountResult> {
        match &self.status {
            FlowStatus::Ready { discount } => Some(discount),
            _ => None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, FlowStatus::Loading)
    }

    /// Ticket of the fetch in flight, if any
    pub fn pending(&self) -> Option<FetchTicket> {
        self.pending
    }

    /// Number of fetch effects emitted over the widget's lifetime
    pub fn fetches_issued(&self) -> u32 {
        self.fetches_issued
    }

    pub fn reveal_state(&self) -> RevealState {
        RevealState {
            fraction_erased: self.mask.erased_fraction(),
            revealed: self.revealed,
        }
    }

    pub fn mask(&self) -> &M {
        &self.mask
    }

    pub fn view(&self, now: Instant) -> RevealView {
        RevealView {
            status: self.status.clone(),
            revealed: self.revealed,
            fraction_erased: self.mask.erased_fraction(),
            mask_label: (!self.revealed).then_some(MASK_LABEL),
            copied: self.is_copied(now),
            can_reveal_instantly: !self.revealed
                && !matches!(self.status, FlowStatus::Failed { .. }),
        }
    }

    fn begin_fetch(&mut self) -> Effect {
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.fetches_issued += 1;
        self.pending = Some(ticket);
        self.status = FlowStatus::Loading;
        Effect::FetchDiscount(ticket)
    }

    fn check_reveal(&mut self) {
        if !self.revealed && self.mask.erased_fraction() > REVEAL_THRESHOLD {
            self.revealed = true;
            debug!(
                "Discount card revealed at {:.1}% erased",
                self.mask.erased_fraction() * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::clipboard::{ClipboardError, MemoryClipboard};

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("permission denied".to_string()))
        }
    }

    fn widget() -> ScratchReveal<RasterMask> {
        ScratchReveal::new(RasterMask::new(100, 100)).with_brush_radius(10.0)
    }

    fn ticket_of(effect: Option<Effect>) -> FetchTicket {
        match effect {
            Some(Effect::FetchDiscount(ticket)) => ticket,
            None => panic!("Expected a fetch effect"),
        }
    }

    fn discount() -> DiscountResult {
        DiscountResult::new("ROBO-42", 42).unwrap()
    }

    /// Scratch horizontal lines across the whole mask
    fn scratch_everything(w: &mut ScratchReveal<RasterMask>) {
        w.pointer_down(Point::new(0.0, 0.0));
        let mut y = 0.0;
        while y <= 100.0 {
            let mut x = 0.0;
            while x <= 100.0 {
                w.pointer_move(Point::new(x, y));
                x += 5.0;
            }
            y += 10.0;
        }
        w.pointer_up();
    }

    #[test]
    fn test_starts_idle_and_masked() {
        let w = widget();
        let view = w.view(Instant::now());
        assert_eq!(view.status, FlowStatus::Idle);
        assert!(!view.revealed);
        assert_eq!(view.mask_label, Some(MASK_LABEL));
        assert!(view.can_reveal_instantly);
        assert_eq!(w.fetches_issued(), 0);
    }

    #[test]
    fn test_first_interaction_fetches_once() {
        let mut w = widget();
        assert!(w.pointer_down(Point::new(1.0, 1.0)).is_some());
        assert!(w.is_loading());

        assert!(w.pointer_move(Point::new(2.0, 2.0)).is_none());
        assert!(w.interact().is_none());
        assert!(w.pointer_down(Point::new(3.0, 3.0)).is_none());
        assert!(w.reveal_instantly().is_none());
        assert_eq!(w.fetches_issued(), 1);
    }

    #[test]
    fn test_click_starts_fetch() {
        let mut w = widget();
        let effect = w.handle(PointerEvent::new(PointerKind::Click, 0.0, 0.0));
        assert!(effect.is_some());
        assert!(w.is_loading());
    }

    #[test]
    fn test_move_without_down_does_not_erase() {
        let mut w = widget();
        w.pointer_move(Point::new(50.0, 50.0));
        assert_eq!(w.reveal_state().fraction_erased, 0.0);
        assert!(w.is_loading());
    }

    #[test]
    fn test_drawing_continues_while_loading() {
        let mut w = widget();
        w.pointer_down(Point::new(50.0, 50.0));
        w.pointer_move(Point::new(50.0, 50.0));
        assert!(w.is_loading());
        assert!(w.reveal_state().fraction_erased > 0.0);
    }

    #[test]
    fn test_success_stores_discount() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        assert!(w.resolve(ticket, Ok::<_, String>(discount())));
        assert_eq!(w.discount(), Some(&discount()));
    }

    #[test]
    fn test_failure_then_retry() {
        let mut w = widget();
        let first = ticket_of(w.interact());
        w.resolve(first, Err::<DiscountResult, _>("timeout"));

        match w.status() {
            FlowStatus::Failed { message } => assert_eq!(message, BUSY_MESSAGE),
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(w.interact().is_none());

        let second = ticket_of(w.retry());
        assert_ne!(first, second);
        assert!(w.is_loading());
        assert_eq!(w.fetches_issued(), 2);

        w.resolve(second, Ok::<_, String>(discount()));
        assert!(w.discount().is_some());
    }

    #[test]
    fn test_retry_only_from_failed() {
        let mut w = widget();
        assert!(w.retry().is_none());
        let ticket = ticket_of(w.interact());
        assert!(w.retry().is_none());
        w.resolve(ticket, Ok::<_, String>(discount()));
        assert!(w.retry().is_none());
        assert_eq!(w.fetches_issued(), 1);
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut w = widget();
        let first = ticket_of(w.interact());
        w.resolve(first, Err::<DiscountResult, _>("boom"));
        let second = ticket_of(w.retry());

        assert!(!w.resolve(first, Ok::<_, String>(discount())));
        assert!(w.is_loading());
        assert!(w.resolve(second, Ok::<_, String>(discount())));
    }

    #[test]
    fn test_threshold_reveals_on_pointer_up() {
        let mut w = widget();
        w.pointer_down(Point::new(0.0, 0.0));
        for i in 0..=20 {
            w.pointer_move(Point::new(i as f64 * 5.0, 50.0));
        }
        // Not checked until the stroke ends
        assert!(!w.is_revealed());
        w.pointer_up();
        assert!(!w.is_revealed());

        scratch_everything(&mut w);
        assert!(w.reveal_state().fraction_erased > REVEAL_THRESHOLD);
        assert!(w.is_revealed());
        assert!(w.is_loading());
    }

    #[test]
    fn test_reveal_is_permanent() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        scratch_everything(&mut w);
        assert!(w.is_revealed());

        w.resolve(ticket, Err::<DiscountResult, _>("boom"));
        w.retry();
        w.pointer_down(Point::new(1.0, 1.0));
        w.pointer_up();
        assert!(w.is_revealed());
    }

    #[test]
    fn test_reveal_instantly_from_idle() {
        let mut w = widget();
        let ticket = ticket_of(w.reveal_instantly());
        assert!(w.is_revealed());
        assert_eq!(w.reveal_state().fraction_erased, 1.0);
        assert!(w.is_loading());

        w.resolve(ticket, Ok::<_, String>(discount()));
        assert_eq!(w.fetches_issued(), 1);
        assert!(w.discount().is_some());
    }

    #[test]
    fn test_reveal_instantly_refused_when_failed() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        w.resolve(ticket, Err::<DiscountResult, _>("boom"));

        assert!(w.reveal_instantly().is_none());
        assert!(!w.is_revealed());
        assert!(!w.view(Instant::now()).can_reveal_instantly);
    }

    #[test]
    fn test_copy_acknowledgement_expires() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        w.resolve(ticket, Ok::<_, String>(discount()));

        let start = Instant::now();
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(
            w.copy_code(start, &mut clipboard),
            Some("ROBO-42".to_string())
        );
        assert_eq!(clipboard.contents(), Some("ROBO-42"));

        assert!(w.is_copied(start));
        assert!(w.is_copied(start + Duration::from_millis(1999)));
        assert!(!w.is_copied(start + COPY_ACK_WINDOW));
        assert!(!w.is_copied(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_copy_without_code_is_noop() {
        let mut w = widget();
        let mut clipboard = MemoryClipboard::new();
        assert!(w.copy_code(Instant::now(), &mut clipboard).is_none());
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_copy_with_broken_clipboard_is_noop() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        w.resolve(ticket, Ok::<_, String>(discount()));

        let now = Instant::now();
        assert!(w.copy_code(now, &mut BrokenClipboard).is_none());
        assert!(!w.is_copied(now));
    }

    #[test]
    fn test_view_hides_label_after_reveal() {
        let mut w = widget();
        w.reveal_instantly();
        let view = w.view(Instant::now());
        assert!(view.mask_label.is_none());
        assert!(!view.can_reveal_instantly);
    }

    #[test]
    fn test_view_serializes_status_tag() {
        let mut w = widget();
        let ticket = ticket_of(w.interact());
        w.resolve(ticket, Ok::<_, String>(discount()));

        let json = serde_json::to_value(w.view(Instant::now())).unwrap();
        assert_eq!(json["status"]["state"], "ready");
        assert_eq!(json["status"]["discount"]["code"], "ROBO-42");
        assert_eq!(json["status"]["discount"]["percentage"], 42);
    }
}
