//! Wall-clock budget for a single search.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("unknown time control: {0}")]
    UnknownControl(String),

    #[error("invalid value {value} for time control {name}")]
    InvalidValue { name: &'static str, value: f64 },
}

/// Named time-control parameters, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeControl {
    Move,
    Reserve,
    Percent,
    Max,
    Total,
    Turns,
    TurnTime,
    GoldReserve,
    SilverReserve,
    GoldUsed,
    SilverUsed,
    LastMoveUsed,
    MoveUsed,
}

impl TimeControl {
    pub const ALL: [TimeControl; 13] = [
        TimeControl::Move,
        TimeControl::Reserve,
        TimeControl::Percent,
        TimeControl::Max,
        TimeControl::Total,
        TimeControl::Turns,
        TimeControl::TurnTime,
        TimeControl::GoldReserve,
        TimeControl::SilverReserve,
        TimeControl::GoldUsed,
        TimeControl::SilverUsed,
        TimeControl::LastMoveUsed,
        TimeControl::MoveUsed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimeControl::Move => "tcmove",
            TimeControl::Reserve => "tcreserve",
            TimeControl::Percent => "tcpercent",
            TimeControl::Max => "tcmax",
            TimeControl::Total => "tctotal",
            TimeControl::Turns => "tcturns",
            TimeControl::TurnTime => "tcturntime",
            TimeControl::GoldReserve => "wreserve",
            TimeControl::SilverReserve => "breserve",
            TimeControl::GoldUsed => "wused",
            TimeControl::SilverUsed => "bused",
            TimeControl::LastMoveUsed => "lastmoveused",
            TimeControl::MoveUsed => "tcmoveused",
        }
    }

    pub fn from_name(name: &str) -> Option<TimeControl> {
        Self::ALL.into_iter().find(|tc| tc.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeControl {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| TimeError::UnknownControl(s.to_string()))
    }
}

/// Tracks elapsed time against the per-move allotment.
///
/// The clock is advisory: the search polls [`TimeManager::time_up`] between
/// playouts, so a search can overrun its budget by one playout.
#[derive(Debug, Clone)]
pub struct TimeManager {
    controls: [f64; 13],
    safety_margin: f64,
    no_time_limit: bool,
    started: Instant,
    budget: Duration,
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeManager {
    pub const DEFAULT_MOVE_SECS: f64 = 3.0;
    pub const DEFAULT_SAFETY_MARGIN_SECS: f64 = 0.2;

    pub fn new() -> Self {
        Self::from_config(Self::DEFAULT_MOVE_SECS, 0.0, 0.0, Self::DEFAULT_SAFETY_MARGIN_SECS)
    }

    /// A manager with the given per-move allotment, reserve, cap (0 means
    /// no cap) and safety margin.
    pub fn from_config(move_secs: f64, reserve_secs: f64, max_secs: f64, margin_secs: f64) -> Self {
        let mut controls = [0.0; 13];
        controls[TimeControl::Move.index()] = move_secs;
        controls[TimeControl::Reserve.index()] = reserve_secs;
        controls[TimeControl::Max.index()] = max_secs;
        Self {
            controls,
            safety_margin: margin_secs.max(0.0),
            no_time_limit: false,
            started: Instant::now(),
            budget: Duration::ZERO,
        }
    }

    pub fn set(&mut self, control: TimeControl, value: f64) {
        self.controls[control.index()] = value;
    }

    pub fn get(&self, control: TimeControl) -> f64 {
        self.controls[control.index()]
    }

    /// Set a control from its textual name, as a session would forward it.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> Result<(), TimeError> {
        let control: TimeControl = name.parse()?;
        if !value.is_finite() {
            return Err(TimeError::InvalidValue {
                name: control.name(),
                value,
            });
        }
        self.set(control, value);
        Ok(())
    }

    /// Arm the countdown for this turn.
    pub fn start_clock(&mut self) {
        let mut secs = self.get(TimeControl::Move) - self.safety_margin;
        let cap = self.get(TimeControl::Max);
        if cap > 0.0 {
            secs = secs.min(cap);
        }
        self.budget = Duration::from_secs_f64(secs.max(0.0));
        self.started = Instant::now();
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn time_up(&self) -> bool {
        !self.no_time_limit && self.started.elapsed() >= self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Search until stopped from outside, e.g. while pondering.
    pub fn set_no_time_limit(&mut self) {
        self.no_time_limit = true;
    }

    pub fn has_no_time_limit(&self) -> bool {
        self.no_time_limit
    }

    pub fn reset_settings(&mut self) {
        self.no_time_limit = false;
    }
}
