//! # `standlink`
//!
//! Ground-station codec for a rocketry test-stand control link. The
//! remote target streams framed telemetry (sensor readings, actuator
//! states, test-stand status, log text, operator prompts) over an
//! opaque byte transport; the ground station answers with framed
//! commands. This crate implements the host side of that wire
//! protocol: a [`Host`] session decodes inbound frames into typed
//! records dispatched through a [`Handler`], and encodes every
//! outbound command.
//!
//! ## Wire format
//!
//! Every frame opens with one header byte: bit 7 selects the
//! [`Channel`], bit 6 selects the extended format, and bits 5–0 hold
//! the payload length of a compact frame. An extended frame instead
//! carries its length in the next two bytes, big-endian. After the
//! header comes the device-class byte, a four-byte big-endian timestamp
//! (prompts are timestamp-less), and the class-specific payload. An
//! [amalgamation](DeviceClass::Amalgamate) bundles several sub-units
//! under a single timestamp; prompts, logs, and further amalgamations
//! may not appear inside one.
//!
//! Multi-byte integers are big-endian. Floats travel in the platform's
//! native float byte order; the protocol assumes host and target
//! agree, a known limitation inherited from the wire format.
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use standlink::{
//!     BoolData, Channel, Error, FourFloat, Handler, Host, OneFloat, PromptRequest,
//!     SimpleActuatorData, TargetLog, TestData, ThreeFloat, TwoFloat,
//! };
//!
//! struct Console;
//!
//! impl Handler for Console {
//!     fn test_update(&mut self, data: TestData) -> Result<(), Error> {
//!         println!("test stand is {:?}", data.state);
//!         Ok(())
//!     }
//!     fn one_float(&mut self, data: OneFloat) -> Result<(), Error> {
//!         println!("{:?} #{} reads {}", data.class, data.id, data.value);
//!         Ok(())
//!     }
//!     # fn simple_actuator(&mut self, _: SimpleActuatorData) -> Result<(), Error> { Ok(()) }
//!     # fn bool_sensor(&mut self, _: BoolData) -> Result<(), Error> { Ok(()) }
//!     # fn prompt_request(&mut self, _: PromptRequest<'_>) -> Result<(), Error> { Ok(()) }
//!     # fn target_log(&mut self, _: TargetLog<'_>) -> Result<(), Error> { Ok(()) }
//!     # fn two_float(&mut self, _: TwoFloat) -> Result<(), Error> { Ok(()) }
//!     # fn three_float(&mut self, _: ThreeFloat) -> Result<(), Error> { Ok(()) }
//!     # fn four_float(&mut self, _: FourFloat) -> Result<(), Error> { Ok(()) }
//!     fn heartbeat(&mut self) {
//!         println!("target is alive");
//!     }
//! }
//!
//! # fn main() -> Result<(), Error> {
//! // In production the transport is a serial port; any Read + Write
//! // pair works.
//! let transport = Cursor::new(vec![0x06, 0x00, 0x55, 0x55, 0x55, 0x55, 0xD0, 0xFF]);
//! let mut host = Host::new(transport, Console);
//! host.set_channel(Channel::Zero);
//!
//! host.poll()?;       // decodes one test-state frame
//! host.start_test(5)?; // encodes a start-test command
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A session is single-threaded and cooperative: nothing suspends,
//! handler methods run synchronously on the polling thread, and
//! `&mut self` rules out overlapping a poll with a send. Records passed
//! to the handler borrow the session's frame buffer and must be copied
//! if they are to outlive the call.
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod host;
mod record;
mod wire;

pub use error::{Error, FrameError};
pub use host::Host;
pub use record::{
    BoolData, FourFloat, Handler, OneFloat, PromptRequest, SimpleActuatorData, TargetLog,
    TestData, ThreeFloat, TwoFloat,
};
pub use wire::{
    ActuatorState, Channel, DeviceClass, GoNoGo, PromptKind, StepperMode, TestRunState,
    TestStateControl, CHANNEL_MASK, COMPACT_LENGTH_MASK, DATA_STREAM_MASK, DEVICE_INITED_MASK,
    EXTENDED_MASK, HEARTBEAT_TIME_MASK, MAX_COMPACT_BYTES, MAX_EXTENDED_BYTES, MAX_NON_PARAM,
    TEST_STATE_MASK,
};
