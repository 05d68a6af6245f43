//! Integration tests for the listener → ProbeService → actuator pipeline.
//!
//! A scripted mock client feeds bytes through the same `poll()` entry
//! point the firmware's main loop uses; touches are injected through the
//! device context exactly as the GPIO ISR would.

use crate::mock_hw::{ActuatorCall, MockActuator, MockListener, RecordingSink};

use probelink::app::commands::ProbeCommand;
use probelink::app::context::DeviceContext;
use probelink::app::events::AppEvent;
use probelink::app::ports::ActuatorPort;
use probelink::app::service::ProbeService;

/// Drain the listener: poll until no byte is consumed.
fn run_until_idle(
    service: &mut ProbeService<'_, MockActuator>,
    listener: &mut MockListener,
    sink: &mut RecordingSink,
) -> usize {
    let mut consumed = 0;
    while service.poll(listener, sink) {
        consumed += 1;
    }
    consumed
}

// ── Actuation ─────────────────────────────────────────────────

#[test]
fn extend_then_retract_moves_the_probe() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"e");
    assert!(service.poll(&mut listener, &mut sink));
    assert_eq!(ctx.actuator().position(), 10);

    listener.send(b"r");
    assert!(service.poll(&mut listener, &mut sink));
    assert_eq!(ctx.actuator().position(), 90);

    assert_eq!(
        ctx.actuator().calls(),
        vec![ActuatorCall::Extend, ActuatorCall::Retract]
    );
    assert!(listener.replies().is_empty(), "e/r never reply");
}

#[test]
fn repeated_extend_is_idempotent() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"eee");
    assert_eq!(run_until_idle(&mut service, &mut listener, &mut sink), 3);
    assert_eq!(ctx.actuator().position(), 10);
    assert_eq!(ctx.actuator().calls().len(), 3);
}

// ── Touch query ───────────────────────────────────────────────

#[test]
fn query_without_touch_replies_zero() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"t");
    service.poll(&mut listener, &mut sink);

    assert_eq!(listener.replies(), b"0");
    assert!(sink.events.contains(&AppEvent::TouchReported(false)));
}

#[test]
fn touch_is_reported_once_then_cleared() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"e");
    service.poll(&mut listener, &mut sink);

    ctx.on_touch();
    assert_eq!(ctx.actuator().last_call(), Some(ActuatorCall::ParkFromIsr));
    assert_eq!(ctx.actuator().position(), 90, "ISR parks the probe");

    listener.send(b"tt");
    run_until_idle(&mut service, &mut listener, &mut sink);

    assert_eq!(listener.replies(), b"10");
    assert!(!ctx.latch().is_set());
}

#[test]
fn several_touches_collapse_into_one_report() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    ctx.on_touch();
    ctx.on_touch();
    ctx.on_touch();

    listener.send(b"tt");
    run_until_idle(&mut service, &mut listener, &mut sink);
    assert_eq!(listener.replies(), b"10");
}

#[test]
fn touch_between_queries_is_not_lost() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"t");
    service.poll(&mut listener, &mut sink);
    ctx.on_touch();
    listener.send(b"t");
    service.poll(&mut listener, &mut sink);

    assert_eq!(listener.replies(), b"01");
}

// ── Unknown bytes / idle ──────────────────────────────────────

#[test]
fn unknown_bytes_are_consumed_silently() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"x\nE\0");
    assert_eq!(run_until_idle(&mut service, &mut listener, &mut sink), 4);

    assert!(ctx.actuator().calls().is_empty());
    assert!(listener.replies().is_empty());
    assert_eq!(service.bytes_received(), 4);
    assert_eq!(service.commands_executed(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandReceived(_))),
        4,
        "every byte is logged before dispatch"
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandExecuted(_))), 0);
}

#[test]
fn unknown_byte_leaves_latch_untouched() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    ctx.on_touch();
    listener.send(b"T");
    service.poll(&mut listener, &mut sink);
    assert!(ctx.latch().is_set());
}

#[test]
fn poll_without_client_does_nothing() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::empty();
    let mut sink = RecordingSink::new();

    assert!(!service.poll(&mut listener, &mut sink));
    assert!(sink.events.is_empty());
    assert_eq!(service.bytes_received(), 0);
}

#[test]
fn one_byte_per_poll() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"ert");
    assert!(service.poll(&mut listener, &mut sink));
    assert_eq!(service.bytes_received(), 1);
    assert_eq!(listener.client.as_ref().unwrap().inbound.len(), 2);
}

#[test]
fn event_order_for_query() {
    let ctx = DeviceContext::new(MockActuator::new());
    let mut service = ProbeService::new(&ctx);
    let mut listener = MockListener::with_client();
    let mut sink = RecordingSink::new();

    listener.send(b"t");
    service.poll(&mut listener, &mut sink);

    assert_eq!(
        sink.events,
        vec![
            AppEvent::CommandReceived(b't'),
            AppEvent::TouchReported(false),
            AppEvent::CommandExecuted(ProbeCommand::QueryTouch),
        ]
    );
}
