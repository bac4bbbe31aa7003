//! On-wire constants: header bit layout, channel and device-class
//! codes, status-byte masks, and command opcodes.
//!
//! Every value here is fixed by the protocol; the test module at the
//! bottom pins each literal so an accidental renumbering cannot pass
//! CI.

/// Largest payload a compact frame can declare (six length bits).
pub const MAX_COMPACT_BYTES: usize = 63;

/// Largest payload an extended frame can declare (two length bytes).
pub const MAX_EXTENDED_BYTES: usize = 65536;

/// Frame bytes that are not payload: the device-class byte plus a
/// worst-case header (one header byte and two length bytes).
pub const MAX_NON_PARAM: usize = 4;

/// Header bit selecting the channel; clear for [`Channel::Zero`], set
/// for [`Channel::One`].
pub const CHANNEL_MASK: u8 = 0x80;

/// Header bit selecting the extended (two length bytes) frame format.
pub const EXTENDED_MASK: u8 = 0x40;

/// Low six header bits holding the payload length of a compact frame.
pub const COMPACT_LENGTH_MASK: u8 = 0x3F;

/// Test-state status bit: the target is streaming telemetry.
pub const DATA_STREAM_MASK: u8 = 0x80;

/// Test-state status bits holding the [`TestRunState`].
pub const TEST_STATE_MASK: u8 = 0x60;

/// Test-state status bit: the target has completed initialization.
pub const DEVICE_INITED_MASK: u8 = 0x10;

/// Test-state status nibble holding the heartbeat period.
pub const HEARTBEAT_TIME_MASK: u8 = 0x0F;

/// A logical stream multiplexed over the shared transport.
///
/// The codec only dispatches inbound frames whose channel bit matches
/// the session channel, and stamps the session channel into every
/// outbound header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    Zero = 0x00,
    One = 0x80,
}

/// Device class of an information unit, the tag byte following the
/// frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DeviceClass {
    /// Overall test-stand state: run state, streaming, heartbeats.
    TestState = 0x00,
    /// Two-state actuator (solenoid, relay).
    SimpleActuator = 0x01,
    /// Stepper motor; reports position and speed.
    Stepper = 0x02,
    /// Target-initiated request for operator input. Timestamp-less.
    Prompt = 0x03,
    /// Actuator with a continuous angle setpoint.
    AngledActuator = 0x04,
    /// Free-form log text from the target.
    TargetLog = 0x80,
    /// Ambient (atmospheric) pressure sensor.
    AmbientPressure = 0x90,
    Temperature = 0x91,
    PressureTransducer = 0x92,
    RelativeHygrometer = 0x93,
    LoadCell = 0x94,
    /// Single on/off sensor (limit switch, continuity loop).
    BoolSensor = 0x95,
    /// Power monitor; reports voltage and current.
    PowerMonitor = 0xA0,
    Accelerometer = 0xB0,
    Gyroscope = 0xB1,
    Magnetometer = 0xB2,
    Gps = 0xC0,
    /// Container bundling several sub-units under one timestamp.
    Amalgamate = 0xFF,
}

impl DeviceClass {
    /// Maps a wire byte back to its device class.
    pub fn from_u8(byte: u8) -> Option<DeviceClass> {
        Some(match byte {
            0x00 => DeviceClass::TestState,
            0x01 => DeviceClass::SimpleActuator,
            0x02 => DeviceClass::Stepper,
            0x03 => DeviceClass::Prompt,
            0x04 => DeviceClass::AngledActuator,
            0x80 => DeviceClass::TargetLog,
            0x90 => DeviceClass::AmbientPressure,
            0x91 => DeviceClass::Temperature,
            0x92 => DeviceClass::PressureTransducer,
            0x93 => DeviceClass::RelativeHygrometer,
            0x94 => DeviceClass::LoadCell,
            0x95 => DeviceClass::BoolSensor,
            0xA0 => DeviceClass::PowerMonitor,
            0xB0 => DeviceClass::Accelerometer,
            0xB1 => DeviceClass::Gyroscope,
            0xB2 => DeviceClass::Magnetometer,
            0xC0 => DeviceClass::Gps,
            0xFF => DeviceClass::Amalgamate,
            _ => return None,
        })
    }
}

/// Run state of the test stand, from bits 6–5 of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TestRunState {
    Running = 0x00,
    Stopped = 0x20,
    Paused = 0x40,
    Estop = 0x60,
}

/// Opcodes for outbound test-state control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TestStateControl {
    /// Start the numbered test sequence. Carries a parameter byte.
    Start = 0x00,
    Stop = 0x10,
    Pause = 0x11,
    DeviceReset = 0x12,
    DeviceTimeReset = 0x13,
    DataStreamStop = 0x20,
    DataStreamStart = 0x21,
    Query = 0x30,
    /// Set the heartbeat period. Carries a parameter byte.
    HeartbeatsControl = 0xF0,
    Heartbeat = 0xFF,
}

/// Commanded or reported state of a two-state actuator.
///
/// Inbound reports only ever decode to `On` or `Off`; `Toggle` is an
/// outbound command value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ActuatorState {
    Off = 0x00,
    On = 0x80,
    Toggle = 0xC0,
}

/// Control mode for a stepper write command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StepperMode {
    AbsolutePosition = 0x40,
    RelativePosition = 0x80,
    Speed = 0xC0,
}

/// Kind of operator input a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PromptKind {
    /// Go / no-go decision.
    GoNoGo = 0x00,
    /// Floating-point value (a pressure threshold, a duration).
    Float = 0x01,
    /// No prompt is open; a pending prompt was withdrawn.
    Reset = 0xFF,
}

impl PromptKind {
    /// Maps a wire byte back to its prompt kind.
    pub fn from_u8(byte: u8) -> Option<PromptKind> {
        Some(match byte {
            0x00 => PromptKind::GoNoGo,
            0x01 => PromptKind::Float,
            0xFF => PromptKind::Reset,
            _ => return None,
        })
    }
}

/// Operator answer to a go/no-go prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GoNoGo {
    NoGo = 0x00,
    Go = 0x01,
}
