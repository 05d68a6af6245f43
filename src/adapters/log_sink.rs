//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART console at 9600 baud in production).  Lines are
//! human-readable status, not a protocol.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::FirmwareOutdated { current, latest } => {
                warn!("FWVER | radio firmware {} < {}, please upgrade the firmware", current, latest);
            }
            AppEvent::Joined { ip, rssi, attempts } => {
                match rssi {
                    Some(dbm) => info!("NET   | connected, IP={} RSSI={}dBm (attempts={})", ip, dbm, attempts),
                    None => info!("NET   | connected, IP={} RSSI=? (attempts={})", ip, attempts),
                }
            }
            AppEvent::Listening { port } => {
                info!("NET   | listening on port {}", port);
            }
            AppEvent::CommandReceived(byte) => {
                if byte.is_ascii_graphic() {
                    info!("CMD   | got command '{}' ({:#04x})", *byte as char, byte);
                } else {
                    info!("CMD   | got command {:#04x}", byte);
                }
            }
            AppEvent::CommandExecuted(cmd) => {
                info!("CMD   | executed {:?}", cmd);
            }
            AppEvent::TouchReported(touched) => {
                info!("TOUCH | reported {}", if *touched { "touched" } else { "clear" });
            }
        }
    }
}
