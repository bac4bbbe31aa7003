//! The failure taxonomy of the codec.

use std::io;
use std::str;

use crate::wire::DeviceClass;

/// Set of errors an operation on a [`Host`](crate::Host) can return.
///
/// Transport failures keep their underlying [`io::Error`]; everything
/// the parser itself detects is a [`FrameError`]. Handler callbacks
/// return the same type, and [`poll`](crate::Host::poll) propagates
/// their value verbatim.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport did not accept the full outbound frame.
    #[error("transport did not accept the full outbound frame: {0}")]
    Send(#[source] io::Error),

    /// The transport did not produce the requested bytes.
    #[error("transport did not produce the requested bytes: {0}")]
    Recv(#[source] io::Error),

    /// An inbound frame violated the protocol.
    #[error("malformed frame: {0}")]
    Frame(#[from] FrameError),

    /// The device class is not permitted for the attempted command.
    #[error("device class {0:?} cannot be used with this command")]
    InvalidDeviceClass(DeviceClass),

    /// A prompt response was sent with no matching open prompt.
    #[error("no active prompt of the matching type")]
    NoActivePrompt,
}

/// Protocol violations detected while parsing an inbound frame.
///
/// By the time one of these is returned the frame has been fully
/// drained from the transport, so the stream stays aligned and the next
/// [`poll`](crate::Host::poll) starts on a fresh header byte.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The device-class byte is not in the protocol table.
    #[error("unknown device class byte {0:#04x}")]
    UnknownDeviceClass(u8),

    /// The prompt-type byte is not in the protocol table.
    #[error("unknown prompt type byte {0:#04x}")]
    UnknownPromptKind(u8),

    /// An amalgamation unit appeared inside another amalgamation unit.
    #[error("amalgamation unit nested in another amalgamation unit")]
    NestedAmalgamation,

    /// A unit that may not be amalgamated appeared as a sub-unit.
    #[error("{0:?} units may not appear inside an amalgamation")]
    DisallowedSubunit(DeviceClass),

    /// The payload is shorter than its device class requires.
    #[error("{class:?} payload truncated: needed {needed} bytes, found {found}")]
    Truncated {
        class: DeviceClass,
        needed: usize,
        found: usize,
    },

    /// A prompt or log payload is not valid UTF-8.
    #[error("{class:?} text is not valid UTF-8: {source}")]
    BadText {
        class: DeviceClass,
        source: str::Utf8Error,
    },
}
