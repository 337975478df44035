// FXOS Capture — Data Types & Report Events

// ---------------------------------------------------------------------------
// Motion data (one hybrid accel + mag read from the FXOS8700)
// ---------------------------------------------------------------------------

/// Raw 3-axis reading in sensor counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector3 {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// One read of the sensor transport: primary (accelerometer) and secondary
/// (magnetometer) channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub accel: Vector3,
    pub mag: Vector3,
}

/// A sample paired with the data-ready timestamp it was read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Microseconds since collection start, captured in interrupt context.
    pub timestamp_us: u32,
    pub sample: MotionSample,
}

// ---------------------------------------------------------------------------
// Acquisition lifecycle
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionState {
    #[default]
    Idle,
    /// Arm trigger accepted; collection is being prepared.
    Armed,
    Collecting,
    Done,
}

/// What the status lights should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indication {
    /// All lights off (startup, before `Idle` is entered).
    Off,
    Waiting,
    Busy,
    Complete,
}

impl From<AcquisitionState> for Indication {
    fn from(state: AcquisitionState) -> Self {
        match state {
            AcquisitionState::Idle => Self::Waiting,
            AcquisitionState::Armed | AcquisitionState::Collecting => Self::Busy,
            AcquisitionState::Done => Self::Complete,
        }
    }
}

// ---------------------------------------------------------------------------
// Report events — handed to the reporter, which owns the text layout
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEvent {
    /// WHO_AM_I value read once at startup.
    DeviceIdentity(u8),
    /// One accepted sample (or the startup diagnostic sample).
    Reading(Reading),
    WaitingForTrigger,
    /// Collection window opened; accelerometer full-scale range in g.
    CollectionStarted { full_scale_g: u8 },
    CollectionComplete,
    /// Idle liveness tick after `Done`.
    Heartbeat,
}
