//! Shared harness: an in-memory transport and a recording handler.
#![allow(dead_code)]

use std::io::{self, Cursor, Read, Write};

use standlink::{
    BoolData, Error, FourFloat, Handler, Host, OneFloat, PromptKind, PromptRequest,
    SimpleActuatorData, TargetLog, TestData, ThreeFloat, TwoFloat,
};

pub const TS1: u32 = 0x5555_5555;
pub const TS2: u32 = 0xAAAA_AAAA;

pub const PI1: f32 = 3.1415925;
pub const PI2: f32 = 6.283185;
pub const PI3: f32 = 9.4247775;
pub const PI4: f32 = 12.56637;

/// In-memory transport: reads from a preloaded buffer, collects writes.
pub struct Pipe {
    pub rx: Cursor<Vec<u8>>,
    pub tx: Vec<u8>,
    /// When set, writes are refused (the transport accepts 0 bytes).
    pub fail_tx: bool,
}

impl Pipe {
    pub fn new(inbound: &[u8]) -> Pipe {
        Pipe {
            rx: Cursor::new(inbound.to_vec()),
            tx: Vec::new(),
            fail_tx: false,
        }
    }

    /// True once every preloaded inbound byte has been consumed.
    pub fn drained(&self) -> bool {
        self.rx.position() as usize == self.rx.get_ref().len()
    }
}

impl Read for Pipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.rx.read(buf)
    }
}

impl Write for Pipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_tx {
            return Ok(0);
        }
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Handler that records every delivery, owning copies of borrowed text.
#[derive(Default)]
pub struct Recorder {
    pub tests: Vec<TestData>,
    pub actuators: Vec<SimpleActuatorData>,
    pub bools: Vec<BoolData>,
    pub prompts: Vec<(PromptKind, String)>,
    pub logs: Vec<(u32, String)>,
    pub ones: Vec<OneFloat>,
    pub twos: Vec<TwoFloat>,
    pub threes: Vec<ThreeFloat>,
    pub fours: Vec<FourFloat>,
    pub heartbeats: usize,
}

impl Recorder {
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
            && self.actuators.is_empty()
            && self.bools.is_empty()
            && self.prompts.is_empty()
            && self.logs.is_empty()
            && self.ones.is_empty()
            && self.twos.is_empty()
            && self.threes.is_empty()
            && self.fours.is_empty()
            && self.heartbeats == 0
    }
}

impl Handler for Recorder {
    fn test_update(&mut self, data: TestData) -> Result<(), Error> {
        self.tests.push(data);
        Ok(())
    }

    fn simple_actuator(&mut self, data: SimpleActuatorData) -> Result<(), Error> {
        self.actuators.push(data);
        Ok(())
    }

    fn bool_sensor(&mut self, data: BoolData) -> Result<(), Error> {
        self.bools.push(data);
        Ok(())
    }

    fn prompt_request(&mut self, request: PromptRequest<'_>) -> Result<(), Error> {
        self.prompts.push((request.kind, request.prompt.to_owned()));
        Ok(())
    }

    fn target_log(&mut self, log: TargetLog<'_>) -> Result<(), Error> {
        self.logs.push((log.timestamp, log.message.to_owned()));
        Ok(())
    }

    fn one_float(&mut self, data: OneFloat) -> Result<(), Error> {
        self.ones.push(data);
        Ok(())
    }

    fn two_float(&mut self, data: TwoFloat) -> Result<(), Error> {
        self.twos.push(data);
        Ok(())
    }

    fn three_float(&mut self, data: ThreeFloat) -> Result<(), Error> {
        self.threes.push(data);
        Ok(())
    }

    fn four_float(&mut self, data: FourFloat) -> Result<(), Error> {
        self.fours.push(data);
        Ok(())
    }

    fn heartbeat(&mut self) {
        self.heartbeats += 1;
    }
}

pub fn host(inbound: &[u8]) -> Host<Pipe, Recorder> {
    Host::new(Pipe::new(inbound), Recorder::default())
}

/// Appends a float in the protocol's (native) byte order.
pub fn push_f32(frame: &mut Vec<u8>, value: f32) {
    frame.extend_from_slice(&value.to_ne_bytes());
}

/// Appends a big-endian timestamp.
pub fn push_ts(frame: &mut Vec<u8>, ts: u32) {
    frame.extend_from_slice(&ts.to_be_bytes());
}
