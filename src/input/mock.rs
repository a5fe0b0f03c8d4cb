use super::{ButtonPad, PadSample};

/// Scripted input source for host-side tests and bring-up.
#[derive(Debug, Clone)]
pub struct ScriptedPad<'a> {
    samples: &'a [PadSample],
    cursor: usize,
}

/// Raised when a widget loop keeps polling after the script ran dry; turns
/// a loop that fails to terminate into a visible failure instead of a hang.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScriptExhausted;

impl<'a> ScriptedPad<'a> {
    pub const fn new(samples: &'a [PadSample]) -> Self {
        Self { samples, cursor: 0 }
    }

    pub const fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

impl ButtonPad for ScriptedPad<'_> {
    type Error = ScriptExhausted;

    fn sample(&mut self) -> Result<PadSample, Self::Error> {
        let Some(sample) = self.samples.get(self.cursor).copied() else {
            return Err(ScriptExhausted);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(sample)
    }
}
