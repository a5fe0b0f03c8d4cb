//! embedded-hal GPIO adapter for the four-button pad.

use embedded_hal::digital::InputPin;

use super::{ButtonPad, PadSample};

/// Electrical polarity of the four lines.
#[derive(Debug, Clone, Copy)]
pub struct PinPadConfig {
    active_low: bool,
}

impl Default for PinPadConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

impl PinPadConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

/// Per-pin read failure.
#[derive(Debug)]
pub enum PinPadError<LeftErr, RightErr, ConfirmErr, CancelErr> {
    Left(LeftErr),
    Right(RightErr),
    Confirm(ConfirmErr),
    Cancel(CancelErr),
}

/// Four discrete GPIO lines exposed as a [`ButtonPad`].
#[derive(Debug)]
pub struct PinPad<L, R, O, C> {
    left: L,
    right: R,
    confirm: O,
    cancel: C,
    config: PinPadConfig,
}

impl<L, R, O, C> PinPad<L, R, O, C>
where
    L: InputPin,
    R: InputPin,
    O: InputPin,
    C: InputPin,
{
    pub const fn new(left: L, right: R, confirm: O, cancel: C, config: PinPadConfig) -> Self {
        Self {
            left,
            right,
            confirm,
            cancel,
            config,
        }
    }

    /// Hand the pins back to the host.
    pub fn into_pins(self) -> (L, R, O, C) {
        (self.left, self.right, self.confirm, self.cancel)
    }
}

impl<L, R, O, C> ButtonPad for PinPad<L, R, O, C>
where
    L: InputPin,
    R: InputPin,
    O: InputPin,
    C: InputPin,
{
    type Error = PinPadError<L::Error, R::Error, O::Error, C::Error>;

    fn sample(&mut self) -> Result<PadSample, Self::Error> {
        let active_low = self.config.active_low;
        let left = self.left.is_high().map_err(PinPadError::Left)?;
        let right = self.right.is_high().map_err(PinPadError::Right)?;
        let confirm = self.confirm.is_high().map_err(PinPadError::Confirm)?;
        let cancel = self.cancel.is_high().map_err(PinPadError::Cancel)?;

        Ok(PadSample {
            left: line_released(left, active_low),
            right: line_released(right, active_low),
            confirm: line_released(confirm, active_low),
            cancel: line_released(cancel, active_low),
        })
    }
}

#[inline]
fn line_released(high: bool, active_low: bool) -> bool {
    if active_low { high } else { !high }
}
