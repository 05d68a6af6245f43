//! Wire commands and replies.
//!
//! The protocol is one ASCII byte per command, no framing.  Only the query
//! command produces a reply, itself a single ASCII digit.

pub const CMD_EXTEND: u8 = b'e';
pub const CMD_RETRACT: u8 = b'r';
pub const CMD_QUERY_TOUCH: u8 = b't';

pub const REPLY_TOUCHED: u8 = b'1';
pub const REPLY_NOT_TOUCHED: u8 = b'0';

/// Commands a client can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeCommand {
    /// Deploy the probe pin.
    Extend,
    /// Stow the probe pin.
    Retract,
    /// Report and clear the touch latch.
    QueryTouch,
}

impl ProbeCommand {
    /// Decode one received byte.  Anything unknown is `None` and is
    /// ignored by the dispatcher.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_EXTEND => Some(Self::Extend),
            CMD_RETRACT => Some(Self::Retract),
            CMD_QUERY_TOUCH => Some(Self::QueryTouch),
            _ => None,
        }
    }

    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Extend => CMD_EXTEND,
            Self::Retract => CMD_RETRACT,
            Self::QueryTouch => CMD_QUERY_TOUCH,
        }
    }
}

/// Reply byte for a touch query.
pub const fn touch_reply(touched: bool) -> u8 {
    if touched { REPLY_TOUCHED } else { REPLY_NOT_TOUCHED }
}
