//! Application service, the hexagonal core.
//!
//! [`ProbeService`] interprets one command byte per poll iteration against
//! the shared [`DeviceContext`].  All I/O flows through port traits
//! injected at call sites, so the whole service is testable with mock
//! adapters.
//!
//! ```text
//!  ListenerPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │      ProbeService      │
//!  ClientPort   ◀── │  dispatch · latch      │ ──▶ ActuatorPort
//!                   └────────────────────────┘
//! ```

use super::commands::{ProbeCommand, touch_reply};
use super::context::DeviceContext;
use super::events::AppEvent;
use super::ports::{ActuatorPort, ClientPort, EventSink, ListenerPort};

// ───────────────────────────────────────────────────────────────
// ProbeService
// ───────────────────────────────────────────────────────────────

pub struct ProbeService<'a, A> {
    ctx: &'a DeviceContext<A>,
    bytes_received: u64,
    commands_executed: u64,
}

impl<'a, A: ActuatorPort> ProbeService<'a, A> {
    pub fn new(ctx: &'a DeviceContext<A>) -> Self {
        Self {
            ctx,
            bytes_received: 0,
            commands_executed: 0,
        }
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one poll-loop iteration: check for a client with data, read at
    /// most one byte, dispatch it and send any reply.
    ///
    /// Never blocks.  Returns `true` if a byte was consumed.
    pub fn poll(&mut self, listener: &mut impl ListenerPort, sink: &mut impl EventSink) -> bool {
        let Some(client) = listener.poll_client() else {
            return false;
        };
        let Some(byte) = client.read_byte() else {
            return false;
        };

        self.bytes_received += 1;
        sink.emit(&AppEvent::CommandReceived(byte));

        if let Some(reply) = self.dispatch(byte, sink) {
            client.write_byte(reply);
        }
        true
    }

    // ── Command dispatch ──────────────────────────────────────

    /// Execute one command byte.  Returns the reply byte for a touch query,
    /// `None` for everything else.  Unknown bytes are silently ignored.
    pub fn dispatch(&mut self, byte: u8, sink: &mut impl EventSink) -> Option<u8> {
        let command = ProbeCommand::from_byte(byte)?;
        self.commands_executed += 1;

        let reply = match command {
            ProbeCommand::Extend => {
                self.ctx.actuator().extend();
                None
            }
            ProbeCommand::Retract => {
                self.ctx.actuator().retract();
                None
            }
            ProbeCommand::QueryTouch => {
                let touched = self.ctx.latch().query_and_clear();
                sink.emit(&AppEvent::TouchReported(touched));
                Some(touch_reply(touched))
            }
        };

        sink.emit(&AppEvent::CommandExecuted(command));
        reply
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Bytes read from clients, recognised or not.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn commands_executed(&self) -> u64 {
        self.commands_executed
    }
}
