//! Present a full-screen sheet sliding down from the top, dismiss it by
//! tapping the backdrop, and print the content frame along the way.
//!
//! Run with `RUST_LOG=debug cargo run --example move_from_top` to see the
//! transition log.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use overlay_presenter::headless::HeadlessHost;
use overlay_presenter::prelude::*;

const FRAME_TIME: Duration = Duration::from_millis(100);

fn print_frames(host: &mut HeadlessHost, label: &str) {
    let content = host.content_id();
    while !host.runtime().is_idle() {
        host.tick(FRAME_TIME);
        if let Some(record) = host.scene().record(content) {
            println!("{label}: {:?}", record.frame);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let screen = Size::new(320.0, 480.0);
    let dismissed = Rc::new(Cell::new(false));
    let flag = dismissed.clone();

    let config = PresenterConfig::new(screen)
        .backdrop_color(Color::from_hex(0x1A1A26).with_alpha(0.6))
        .effect("move-from-top".parse()?)
        .on_dismissed(move || flag.set(true));
    let mut host = HeadlessHost::new(Rect::from_size(screen), config)?;

    host.present()?;
    print_frames(&mut host, "present");

    // The sheet covers the whole screen, so tap the backdrop directly.
    if let Some(backdrop) = host.backdrop_id() {
        host.scene().tap(backdrop);
    }
    host.process_dismiss_requests()?;
    print_frames(&mut host, "dismiss");

    println!(
        "content attached: {}, dismissed callback fired: {}",
        host.scene().is_attached(host.content_id()),
        dismissed.get()
    );
    host.teardown();
    Ok(())
}
