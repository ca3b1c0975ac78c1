//! Scratch-to-reveal discount widget
//!
//! The widget is a sans-io state machine. Pointer input and flow results go
//! in; an [`Effect`] comes out whenever the driver has to call the discount
//! flow. Rendering backends only need to satisfy [`Maskable`].
//!
//! ```
//! use robobox_core::reveal::{Effect, Point, RasterMask, ScratchReveal};
//! use robobox_core::DiscountResult;
//!
//! let mut widget = ScratchReveal::new(RasterMask::new(200, 100));
//!
//! // First touch asks the driver to fetch a discount
//! let effect = widget.pointer_down(Point::new(10.0, 10.0));
//! let Some(Effect::FetchDiscount(ticket)) = effect else { panic!() };
//!
//! // ... the driver awaits the discount flow, then feeds the result back
//! let discount = DiscountResult::new("ROBO-25", 25).unwrap();
//! widget.resolve(ticket, Ok::<_, String>(discount));
//!
//! widget.reveal_instantly();
//! assert!(widget.is_revealed());
//! ```

mod clipboard;
mod mask;
mod widget;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use mask::{Maskable, Point, RasterMask};
pub use widget::{
    Effect, FetchTicket, FlowStatus, PointerEvent, PointerKind, RevealState, RevealView,
    ScratchReveal, BUSY_MESSAGE, COPY_ACK_WINDOW, DEFAULT_BRUSH_RADIUS, MASK_LABEL,
    REVEAL_THRESHOLD,
};
