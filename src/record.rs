//! Typed records decoded from inbound frames, and the [`Handler`]
//! trait through which they are dispatched.

use crate::error::Error;
use crate::wire::{ActuatorState, DeviceClass, PromptKind, TestRunState};

/// Decoded test-stand state report.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestData {
    pub timestamp: u32,

    /// Whether the target is streaming telemetry.
    pub data_streaming: bool,

    pub state: TestRunState,

    /// Whether the target has completed initialization.
    pub inited: bool,

    /// Heartbeat period, from the low nibble of the status byte.
    pub heartbeat_time: u8,

    /// Number of the running test sequence. Zero unless
    /// [`state`](TestData::state) is [`TestRunState::Running`].
    pub running_test: u8,

    /// Progress through the running test sequence. Zero unless
    /// [`state`](TestData::state) is [`TestRunState::Running`].
    pub test_progress: u8,
}

/// Reported state of a two-state actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleActuatorData {
    pub timestamp: u32,
    pub id: u8,

    /// [`On`](ActuatorState::On) for any non-zero wire byte.
    pub state: ActuatorState,
}

/// Reading from an on/off sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolData {
    pub timestamp: u32,
    pub id: u8,
    pub value: bool,
}

/// Target-initiated request for operator input.
///
/// The prompt text borrows the session's frame buffer; copy it if it
/// must outlive the handler call. A [`PromptKind::Reset`] request
/// carries no text and withdraws any pending prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptRequest<'a> {
    pub kind: PromptKind,
    pub prompt: &'a str,
}

/// Free-form log text from the target.
///
/// The text borrows the session's frame buffer; copy it if it must
/// outlive the handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLog<'a> {
    pub timestamp: u32,
    pub message: &'a str,
}

/// Reading from a one-value sensor or actuator class.
///
/// [`class`](OneFloat::class) preserves the original device class:
/// angled actuator, ambient pressure, temperature, pressure transducer,
/// relative hygrometer, or load cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneFloat {
    pub class: DeviceClass,
    pub timestamp: u32,
    pub id: u8,
    pub value: f32,
}

/// Reading from a two-value device class: stepper (position, speed) or
/// power monitor (voltage, current).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoFloat {
    pub class: DeviceClass,
    pub timestamp: u32,
    pub id: u8,
    pub values: [f32; 2],
}

/// Reading from a three-axis device class: accelerometer, gyroscope, or
/// magnetometer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreeFloat {
    pub class: DeviceClass,
    pub timestamp: u32,
    pub id: u8,
    pub values: [f32; 3],
}

/// GPS reading: latitude, longitude, altitude, ground speed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FourFloat {
    pub class: DeviceClass,
    pub timestamp: u32,
    pub id: u8,
    pub values: [f32; 4],
}

/// Receives the records decoded by [`poll`](crate::Host::poll).
///
/// One method per record family; each runs synchronously on the polling
/// thread while the frame is still held in the session buffer. A
/// returned error aborts the current poll and is handed back to the
/// caller unchanged; the codec attaches no meaning to it.
pub trait Handler {
    fn test_update(&mut self, data: TestData) -> Result<(), Error>;

    fn simple_actuator(&mut self, data: SimpleActuatorData) -> Result<(), Error>;

    fn bool_sensor(&mut self, data: BoolData) -> Result<(), Error>;

    /// Called for every prompt request, including withdrawals
    /// ([`PromptKind::Reset`]). The session's response gate has already
    /// been updated when this runs.
    fn prompt_request(&mut self, request: PromptRequest<'_>) -> Result<(), Error>;

    fn target_log(&mut self, log: TargetLog<'_>) -> Result<(), Error>;

    fn one_float(&mut self, data: OneFloat) -> Result<(), Error>;

    fn two_float(&mut self, data: TwoFloat) -> Result<(), Error>;

    fn three_float(&mut self, data: ThreeFloat) -> Result<(), Error>;

    fn four_float(&mut self, data: FourFloat) -> Result<(), Error>;

    /// Called when a heartbeat frame arrives. Defaults to a no-op.
    fn heartbeat(&mut self) {}
}
