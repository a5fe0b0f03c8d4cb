//! Button sampling and signal classification.

pub mod mock;
pub mod pins;

/// Resolved meaning of one pad sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonSignal {
    None,
    Left,
    Right,
    Confirm,
    Cancel,
    /// Two or more lines active in the same sample. Cancels any in-progress
    /// repeat action and never reads as a direction or confirm/cancel.
    Conflict,
}

impl ButtonSignal {
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Raw state of the four lines in one sample; `true` = released
/// (the lines read active-low).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PadSample {
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
    pub cancel: bool,
}

impl PadSample {
    /// Sample with every line released.
    pub const fn released() -> Self {
        Self {
            left: true,
            right: true,
            confirm: true,
            cancel: true,
        }
    }

    pub const fn press_left() -> Self {
        Self {
            left: false,
            right: true,
            confirm: true,
            cancel: true,
        }
    }

    pub const fn press_right() -> Self {
        Self {
            left: true,
            right: false,
            confirm: true,
            cancel: true,
        }
    }

    pub const fn press_confirm() -> Self {
        Self {
            left: true,
            right: true,
            confirm: false,
            cancel: true,
        }
    }

    pub const fn press_cancel() -> Self {
        Self {
            left: true,
            right: true,
            confirm: true,
            cancel: false,
        }
    }

    pub const fn any_pressed(self) -> bool {
        !(self.left && self.right && self.confirm && self.cancel)
    }

    /// Classify the sample: exactly one active line maps to its signal,
    /// none maps to `None`, two or more map to `Conflict` regardless of
    /// which.
    pub fn signal(self) -> ButtonSignal {
        let mut signal = ButtonSignal::None;
        for (released, pressed) in [
            (self.left, ButtonSignal::Left),
            (self.right, ButtonSignal::Right),
            (self.confirm, ButtonSignal::Confirm),
            (self.cancel, ButtonSignal::Cancel),
        ] {
            if released {
                continue;
            }
            signal = if signal == ButtonSignal::None {
                pressed
            } else {
                ButtonSignal::Conflict
            };
        }

        signal
    }
}

/// Polled four-line button pad.
pub trait ButtonPad {
    type Error;

    /// Read all four lines once. Pure read; debouncing and hold tracking
    /// happen above this layer.
    fn sample(&mut self) -> Result<PadSample, Self::Error>;

    /// Sample and classify in one step.
    fn signal(&mut self) -> Result<ButtonSignal, Self::Error> {
        Ok(self.sample()?.signal())
    }
}

/// Edge and hold bookkeeping carried across poll ticks, shared by every
/// widget loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HoldState {
    /// Previous tick's resolved signal.
    pub last: ButtonSignal,
    /// Timestamp after which a held directional may repeat.
    pub repeat_after_ms: u64,
}

impl HoldState {
    pub const fn new() -> Self {
        Self {
            last: ButtonSignal::None,
            repeat_after_ms: 0,
        }
    }

    /// A different signal arriving while another is held reads as
    /// `Conflict`; the latch only clears on full release.
    pub fn resolve_change(self, signal: ButtonSignal) -> ButtonSignal {
        if self.last != ButtonSignal::None && self.last != signal {
            ButtonSignal::Conflict
        } else {
            signal
        }
    }
}

impl Default for HoldState {
    fn default() -> Self {
        Self::new()
    }
}
