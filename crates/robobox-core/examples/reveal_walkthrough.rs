//! Walk a scratch-reveal card through one activation
//!
//! Run with: cargo run --example reveal_walkthrough

use robobox_core::reveal::{Effect, MemoryClipboard, Point, RasterMask, ScratchReveal};
use robobox_core::DiscountResult;
use std::time::Instant;

fn main() {
    println!("=== RoboBox Scratch Card Walkthrough ===\n");

    let mut card = ScratchReveal::new(RasterMask::new(320, 180)).with_brush_radius(30.0);

    // 1. First touch asks for a discount
    println!("1. First touch:");
    let ticket = match card.pointer_down(Point::new(10.0, 10.0)) {
        Some(Effect::FetchDiscount(ticket)) => ticket,
        None => unreachable!("first interaction always fetches"),
    };
    println!("   Fetch issued, ticket {}", ticket.id());
    println!("   Status: {:?}\n", card.status());

    // 2. Scratch while the flow is still running
    println!("2. Scratching:");
    let mut y = 0.0;
    while y <= 180.0 {
        let mut x = 0.0;
        while x <= 320.0 {
            card.pointer_move(Point::new(x, y));
            x += 15.0;
        }
        y += 30.0;
    }
    card.pointer_up();
    let state = card.reveal_state();
    println!(
        "   Erased {:.1}%, revealed: {}\n",
        state.fraction_erased * 100.0,
        state.revealed
    );

    // 3. The driver feeds the flow result back
    println!("3. Discount arrives:");
    let discount = match DiscountResult::new("ROBO-SPARK-25", 25) {
        Ok(discount) => discount,
        Err(e) => {
            eprintln!("   Invalid discount: {}", e);
            return;
        }
    };
    card.resolve(ticket, Ok::<_, String>(discount));
    println!("   Status: {:?}\n", card.status());

    // 4. Copy the code
    println!("4. Copy:");
    let now = Instant::now();
    let mut clipboard = MemoryClipboard::new();
    if let Some(code) = card.copy_code(now, &mut clipboard) {
        println!("   Copied {} (acknowledged: {})", code, card.is_copied(now));
    }

    println!("\n=== Done ===");
}
