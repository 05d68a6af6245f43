//! Fuzz target: `ProbeService::dispatch`
//!
//! Drives arbitrary byte streams through the command dispatcher, with
//! touches injected wherever the input carries a 0xFF marker, and asserts
//! that replies only ever come from `t` and always reflect the latch.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use std::sync::atomic::{AtomicU8, Ordering};

use libfuzzer_sys::fuzz_target;
use probelink::app::commands::{CMD_QUERY_TOUCH, touch_reply};
use probelink::app::context::DeviceContext;
use probelink::app::events::AppEvent;
use probelink::app::ports::{ActuatorPort, EventSink};
use probelink::app::service::ProbeService;

const TOUCH_MARKER: u8 = 0xFF;

#[derive(Default)]
struct Servo(AtomicU8);

impl ActuatorPort for Servo {
    fn extend(&self) {
        self.0.store(10, Ordering::Relaxed);
    }
    fn retract(&self) {
        self.0.store(90, Ordering::Relaxed);
    }
    fn park_from_isr(&self) {
        self.0.store(90, Ordering::Relaxed);
    }
    fn position(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let ctx = DeviceContext::new(Servo::default());
    let mut service = ProbeService::new(&ctx);
    let mut touched = false;

    for &byte in data {
        if byte == TOUCH_MARKER {
            ctx.on_touch();
            touched = true;
            continue;
        }
        let reply = service.dispatch(byte, &mut Discard);
        if byte == CMD_QUERY_TOUCH {
            assert_eq!(reply, Some(touch_reply(touched)));
            touched = false;
        } else {
            assert_eq!(reply, None, "only the query command replies");
        }
    }
    assert_eq!(ctx.latch().is_set(), touched);
});
