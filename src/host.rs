//! The host-side session: frame reader, payload parser, and command
//! encoders.

use std::io::{Read, Write};

use bitmatch::bitmatch;

use crate::error::{Error, FrameError};
use crate::record::{
    BoolData, FourFloat, Handler, OneFloat, PromptRequest, SimpleActuatorData, TargetLog,
    TestData, ThreeFloat, TwoFloat,
};
use crate::wire::{
    ActuatorState, Channel, DeviceClass, GoNoGo, PromptKind, StepperMode, TestRunState,
    TestStateControl, MAX_EXTENDED_BYTES, MAX_NON_PARAM,
};

/// A ground-station session over one transport.
///
/// The session owns the transport (anything [`Read`] + [`Write`], e.g.
/// a serial port), the [`Handler`] that receives decoded records, the
/// selected [`Channel`], the prompt-response gate, and a frame buffer
/// sized for the largest extended frame. All of it is allocated once at
/// construction and freed on drop.
///
/// [`poll`](Host::poll) drives inbound decoding one frame at a time;
/// the `send_*`, `write_*`, `request_*`, and `respond_*` methods encode
/// outbound commands. Everything runs synchronously on the calling
/// thread; `&mut self` already rules out polling concurrently with a
/// send. Multiple sessions may coexist, each with its own channel and
/// handler.
pub struct Host<T, H>
where
    T: Read + Write,
    H: Handler,
{
    transport: T,
    handler: H,
    channel: Channel,
    active_prompt: PromptKind,
    scratch: Box<[u8]>,
}

impl<T, H> Host<T, H>
where
    T: Read + Write,
    H: Handler,
{
    /// Opens a session on `transport`, dispatching records to
    /// `handler`. Starts on [`Channel::Zero`] with no prompt open.
    pub fn new(transport: T, handler: H) -> Host<T, H> {
        Host {
            transport,
            handler,
            channel: Channel::Zero,
            active_prompt: PromptKind::Reset,
            scratch: vec![0; MAX_EXTENDED_BYTES + MAX_NON_PARAM].into_boxed_slice(),
        }
    }

    /// Closes the session, handing back the transport and handler.
    pub fn into_parts(self) -> (T, H) {
        (self.transport, self.handler)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns a reference to the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns a mutable reference to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Selects the channel for all subsequent frames, inbound and
    /// outbound.
    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
    }

    /// Returns the selected channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the kind of prompt currently awaiting a response.
    /// [`PromptKind::Reset`] means none is open.
    pub fn active_prompt(&self) -> PromptKind {
        self.active_prompt
    }

    /// Reads and dispatches one frame from the transport.
    ///
    /// Reads exactly one header byte, the two length bytes if the
    /// extended bit is set, then the device-class byte and the declared
    /// payload. Short reads surface as [`Error::Recv`] immediately; no
    /// partial-frame state is kept. Zero-length frames are consumed as
    /// no-ops. A frame whose channel bit differs from the session
    /// channel is drained but not dispatched, so a foreign channel can
    /// never wedge the stream; the channel comparison happens only
    /// after the whole frame has left the transport.
    ///
    /// Records handed to the handler borrow the session's frame buffer
    /// and are only valid for the duration of the call. Handler errors
    /// abort the poll and are returned verbatim.
    #[bitmatch]
    pub fn poll(&mut self) -> Result<(), Error> {
        let Host {
            transport,
            handler,
            channel,
            active_prompt,
            scratch,
        } = self;

        transport
            .read_exact(&mut scratch[..1])
            .map_err(Error::Recv)?;
        #[bitmatch]
        let "cell_llll" = scratch[0];

        let (preamble, params) = if e == 1 {
            transport
                .read_exact(&mut scratch[1..3])
                .map_err(Error::Recv)?;
            (3, u16::from_be_bytes([scratch[1], scratch[2]]) as usize)
        } else {
            (1, l as usize)
        };
        if params == 0 {
            return Ok(());
        }

        // The declared length counts the bytes after the device-class
        // byte, hence the +1.
        transport
            .read_exact(&mut scratch[preamble..preamble + params + 1])
            .map_err(Error::Recv)?;
        if c << 7 != *channel as u8 {
            return Ok(());
        }

        let frame = &scratch[preamble..preamble + params + 1];
        let class = DeviceClass::from_u8(frame[0])
            .ok_or(FrameError::UnknownDeviceClass(frame[0]))?;
        let body = &frame[1..];

        // Prompts are the one timestamp-less class.
        if class == DeviceClass::Prompt {
            process_iu(handler, active_prompt, class, 0, params as u16, body)?;
            return Ok(());
        }

        // A heartbeat is a bare opcode with no room for a timestamp.
        if class == DeviceClass::TestState
            && params == 1
            && body[0] == TestStateControl::Heartbeat as u8
        {
            handler.heartbeat();
            return Ok(());
        }

        if body.len() < MAX_NON_PARAM {
            return Err(FrameError::Truncated {
                class,
                needed: MAX_NON_PARAM,
                found: body.len(),
            }
            .into());
        }
        let timestamp = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
        let mut rest = &body[MAX_NON_PARAM..];

        if class != DeviceClass::Amalgamate {
            process_iu(handler, active_prompt, class, timestamp, params as u16, rest)?;
            return Ok(());
        }

        // Amalgamation: walk the concatenated sub-units, reusing the
        // envelope timestamp. Sub-units see params == 0, which is what
        // rejects prompts and logs inside a bundle.
        while !rest.is_empty() {
            let sub = DeviceClass::from_u8(rest[0])
                .ok_or(FrameError::UnknownDeviceClass(rest[0]))?;
            rest = &rest[1..];
            let consumed = process_iu(handler, active_prompt, sub, timestamp, 0, rest)?;
            rest = &rest[consumed..];
        }
        Ok(())
    }

    /// Sends an emergency stop: a single header byte with no payload.
    pub fn send_estop(&mut self) -> Result<(), Error> {
        self.scratch[0] = self.channel as u8;
        self.transmit(1)
    }

    /// Sends a heartbeat frame.
    pub fn send_heartbeat(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::Heartbeat, 0)
    }

    /// Commands the target to start test sequence `test_number`.
    pub fn start_test(&mut self, test_number: u8) -> Result<(), Error> {
        self.send_test_control(TestStateControl::Start, test_number)
    }

    /// Commands the target to stop the running test.
    pub fn stop_test(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::Stop, 0)
    }

    /// Pauses the running test, or unpauses a paused one.
    pub fn pause_unpause_test(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::Pause, 0)
    }

    /// Commands a full target reset.
    pub fn reset_device(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::DeviceReset, 0)
    }

    /// Commands the target to rezero its timestamp clock.
    pub fn reset_device_time(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::DeviceTimeReset, 0)
    }

    /// Turns target telemetry streaming on or off.
    pub fn set_data_streaming(&mut self, streaming: bool) -> Result<(), Error> {
        self.send_test_control(
            if streaming {
                TestStateControl::DataStreamStart
            } else {
                TestStateControl::DataStreamStop
            },
            0,
        )
    }

    /// Sets the target's heartbeat period.
    pub fn set_heartbeat_time(&mut self, period: u8) -> Result<(), Error> {
        self.send_test_control(TestStateControl::HeartbeatsControl, period)
    }

    /// Asks the target to report its test state.
    pub fn request_test_state(&mut self) -> Result<(), Error> {
        self.send_test_control(TestStateControl::Query, 0)
    }

    /// Commands a two-state actuator.
    pub fn write_simple_actuator(&mut self, id: u8, state: ActuatorState) -> Result<(), Error> {
        let ch = self.channel as u8;
        self.scratch[..4].copy_from_slice(&[
            ch | 0x02,
            DeviceClass::SimpleActuator as u8,
            id,
            state as u8,
        ]);
        self.transmit(4)
    }

    /// Commands a stepper in the given control mode.
    pub fn write_stepper(&mut self, id: u8, mode: StepperMode, value: f32) -> Result<(), Error> {
        let ch = self.channel as u8;
        self.scratch[..4].copy_from_slice(&[ch | 0x06, DeviceClass::Stepper as u8, id, mode as u8]);
        self.scratch[4..8].copy_from_slice(&value.to_ne_bytes());
        self.transmit(8)
    }

    /// Commands an angled actuator to the given setpoint.
    pub fn write_angled_actuator(&mut self, id: u8, value: f32) -> Result<(), Error> {
        let ch = self.channel as u8;
        self.scratch[..3].copy_from_slice(&[ch | 0x05, DeviceClass::AngledActuator as u8, id]);
        self.scratch[3..7].copy_from_slice(&value.to_ne_bytes());
        self.transmit(7)
    }

    /// Requests a one-shot reading from device `id` of the given class.
    ///
    /// Prompts, logs, and amalgamations are not readable and return
    /// [`Error::InvalidDeviceClass`]; a test-state request is routed
    /// through [`request_test_state`](Host::request_test_state), which
    /// has its own opcode.
    pub fn request_read(&mut self, class: DeviceClass, id: u8) -> Result<(), Error> {
        match class {
            DeviceClass::Prompt | DeviceClass::TargetLog | DeviceClass::Amalgamate => {
                return Err(Error::InvalidDeviceClass(class))
            }
            DeviceClass::TestState => return self.request_test_state(),
            _ => {}
        }
        let ch = self.channel as u8;
        self.scratch[..3].copy_from_slice(&[ch | 0x01, class as u8, id]);
        self.transmit(3)
    }

    /// Configures the tare offset for one data channel of a sensor.
    ///
    /// Only sensor classes can be tared; anything at or below the log
    /// class code, bool sensors, and amalgamations return
    /// [`Error::InvalidDeviceClass`] without touching the transport.
    pub fn request_tare(
        &mut self,
        class: DeviceClass,
        id: u8,
        data_channel: u8,
        offset: f32,
    ) -> Result<(), Error> {
        if class as u8 <= DeviceClass::TargetLog as u8
            || class == DeviceClass::BoolSensor
            || class == DeviceClass::Amalgamate
        {
            return Err(Error::InvalidDeviceClass(class));
        }
        let ch = self.channel as u8;
        self.scratch[..4].copy_from_slice(&[ch | 0x06, class as u8, id, data_channel]);
        self.scratch[4..8].copy_from_slice(&offset.to_ne_bytes());
        self.transmit(8)
    }

    /// Answers an open go/no-go prompt.
    ///
    /// Valid only while the active prompt is [`PromptKind::GoNoGo`];
    /// otherwise returns [`Error::NoActivePrompt`]. Responding does not
    /// close the gate; only a prompt delivery moves it.
    pub fn respond_go_no_go(&mut self, answer: GoNoGo) -> Result<(), Error> {
        if self.active_prompt != PromptKind::GoNoGo {
            return Err(Error::NoActivePrompt);
        }
        let ch = self.channel as u8;
        self.scratch[..3].copy_from_slice(&[ch | 0x01, DeviceClass::Prompt as u8, answer as u8]);
        self.transmit(3)
    }

    /// Answers an open floating-point prompt.
    ///
    /// Valid only while the active prompt is [`PromptKind::Float`];
    /// otherwise returns [`Error::NoActivePrompt`].
    pub fn respond_float(&mut self, value: f32) -> Result<(), Error> {
        if self.active_prompt != PromptKind::Float {
            return Err(Error::NoActivePrompt);
        }
        let ch = self.channel as u8;
        self.scratch[..2].copy_from_slice(&[ch | 0x04, DeviceClass::Prompt as u8]);
        self.scratch[2..6].copy_from_slice(&value.to_ne_bytes());
        self.transmit(6)
    }

    /// Most test-state commands share one shape: a length-1 frame with
    /// the opcode, or length-2 when the opcode carries a parameter.
    fn send_test_control(&mut self, mode: TestStateControl, param: u8) -> Result<(), Error> {
        let ch = self.channel as u8;
        let len = match mode {
            TestStateControl::Start | TestStateControl::HeartbeatsControl => {
                self.scratch[..4].copy_from_slice(&[
                    ch | 0x02,
                    DeviceClass::TestState as u8,
                    mode as u8,
                    param,
                ]);
                4
            }
            _ => {
                self.scratch[..3].copy_from_slice(&[
                    ch | 0x01,
                    DeviceClass::TestState as u8,
                    mode as u8,
                ]);
                3
            }
        };
        self.transmit(len)
    }

    fn transmit(&mut self, len: usize) -> Result<(), Error> {
        self.transport
            .write_all(&self.scratch[..len])
            .map_err(Error::Send)
    }
}

/// Decodes a single information unit and dispatches its record.
///
/// `params` is the byte count the frame declared for this unit
/// (timestamp included); the amalgamation walker passes zero, which is
/// how prompts and logs inside a bundle are rejected. `payload` starts
/// after the timestamp (after the type byte for prompts). Returns how
/// many payload bytes the unit consumed so the walker can advance.
#[bitmatch]
fn process_iu<H: Handler>(
    handler: &mut H,
    active_prompt: &mut PromptKind,
    class: DeviceClass,
    timestamp: u32,
    params: u16,
    payload: &[u8],
) -> Result<usize, Error> {
    match class {
        DeviceClass::TestState => {
            need(class, 2, payload)?;
            #[bitmatch]
            let "srri_hhhh" = payload[0];
            let state = match r {
                0b00 => TestRunState::Running,
                0b01 => TestRunState::Stopped,
                0b10 => TestRunState::Paused,
                _ => TestRunState::Estop,
            };

            let mut data = TestData {
                timestamp,
                data_streaming: s != 0,
                state,
                inited: i != 0,
                heartbeat_time: h,
                running_test: 0,
                test_progress: 0,
            };

            // Only a running test carries the two trailing bytes.
            let mut consumed = 2;
            if state == TestRunState::Running {
                need(class, 4, payload)?;
                data.running_test = payload[2];
                data.test_progress = payload[3];
                consumed = 4;
            }

            handler.test_update(data)?;
            Ok(consumed)
        }

        DeviceClass::SimpleActuator => {
            need(class, 2, payload)?;
            let state = if payload[1] != 0 {
                ActuatorState::On
            } else {
                ActuatorState::Off
            };
            handler.simple_actuator(SimpleActuatorData {
                timestamp,
                id: payload[0],
                state,
            })?;
            Ok(2)
        }

        DeviceClass::Prompt => {
            if params == 0 {
                return Err(FrameError::DisallowedSubunit(class).into());
            }
            need(class, 1, payload)?;

            if payload[0] == PromptKind::Reset as u8 {
                *active_prompt = PromptKind::Reset;
                handler.prompt_request(PromptRequest {
                    kind: PromptKind::Reset,
                    prompt: "",
                })?;
                return Ok(0);
            }

            let kind = PromptKind::from_u8(payload[0])
                .ok_or(FrameError::UnknownPromptKind(payload[0]))?;
            let prompt = text(class, &payload[1..])?;
            *active_prompt = kind;
            handler.prompt_request(PromptRequest { kind, prompt })?;
            Ok(0)
        }

        DeviceClass::TargetLog => {
            if params == 0 {
                return Err(FrameError::DisallowedSubunit(class).into());
            }
            let message = text(class, payload)?;
            handler.target_log(TargetLog { timestamp, message })?;
            Ok(0)
        }

        DeviceClass::AngledActuator
        | DeviceClass::AmbientPressure
        | DeviceClass::Temperature
        | DeviceClass::PressureTransducer
        | DeviceClass::RelativeHygrometer
        | DeviceClass::LoadCell => {
            need(class, 5, payload)?;
            handler.one_float(OneFloat {
                class,
                timestamp,
                id: payload[0],
                value: ne_f32(&payload[1..]),
            })?;
            Ok(5)
        }

        DeviceClass::BoolSensor => {
            need(class, 2, payload)?;
            handler.bool_sensor(BoolData {
                timestamp,
                id: payload[0],
                value: payload[1] != 0,
            })?;
            Ok(2)
        }

        DeviceClass::Stepper | DeviceClass::PowerMonitor => {
            need(class, 9, payload)?;
            handler.two_float(TwoFloat {
                class,
                timestamp,
                id: payload[0],
                values: [ne_f32(&payload[1..]), ne_f32(&payload[5..])],
            })?;
            Ok(9)
        }

        DeviceClass::Accelerometer | DeviceClass::Gyroscope | DeviceClass::Magnetometer => {
            need(class, 13, payload)?;
            handler.three_float(ThreeFloat {
                class,
                timestamp,
                id: payload[0],
                values: [
                    ne_f32(&payload[1..]),
                    ne_f32(&payload[5..]),
                    ne_f32(&payload[9..]),
                ],
            })?;
            Ok(13)
        }

        DeviceClass::Gps => {
            need(class, 17, payload)?;
            handler.four_float(FourFloat {
                class,
                timestamp,
                id: payload[0],
                values: [
                    ne_f32(&payload[1..]),
                    ne_f32(&payload[5..]),
                    ne_f32(&payload[9..]),
                    ne_f32(&payload[13..]),
                ],
            })?;
            Ok(17)
        }

        // The walker in poll() handles amalgamation itself; seeing the
        // class here means one was nested inside another.
        DeviceClass::Amalgamate => Err(FrameError::NestedAmalgamation.into()),
    }
}

fn need(class: DeviceClass, needed: usize, payload: &[u8]) -> Result<(), FrameError> {
    if payload.len() < needed {
        return Err(FrameError::Truncated {
            class,
            needed,
            found: payload.len(),
        });
    }
    Ok(())
}

fn text(class: DeviceClass, bytes: &[u8]) -> Result<&str, FrameError> {
    std::str::from_utf8(bytes).map_err(|source| FrameError::BadText { class, source })
}

/// The protocol carries floats in the platform's float byte order; both
/// endpoints are assumed to agree.
fn ne_f32(bytes: &[u8]) -> f32 {
    f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
