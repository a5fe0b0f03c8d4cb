//! Blocking menu and editor widgets built on the collaborator traits.
//!
//! Each widget owns a tight poll loop: read input, mutate state, render,
//! sleep one tick. Only one widget loop runs at a time; the loop returns a
//! terminal result (selected index, edited value, or cancellation) to the
//! caller.

use core::fmt::{self, Write as _};

use heapless::{String, Vec};
use log::debug;

use crate::{
    clock::Clock,
    datetime::DateTime,
    glyph::{DEFAULT_GLYPH, Glyph},
    input::{ButtonPad, ButtonSignal, HoldState},
    surface::{Font, Surface},
};

/// Poll interval for the widget loops.
const TICK_MS: u32 = 50;
/// Poll interval while waiting for a press-and-release acknowledgement.
const ACK_POLL_MS: u32 = 100;
/// A held directional stays quiet this long after its first action.
const HOLD_REPEAT_DELAY_MS: u64 = 1_000;
/// Separator blink period in live date-time editing.
const BLINK_PERIOD_MS: u64 = 1_000;

/// Upper bound on carousel items; per-item layout is precomputed into a
/// bounded vector.
pub const MAX_CAROUSEL_ITEMS: usize = 16;

const ACTION_ERROR_BYTES: usize = 96;
const FIELD_TEXT_BYTES: usize = 12;
/// Capacity of the formatted value buffer in [`Menu::read_value`].
pub const VALUE_TEXT_BYTES: usize = 24;

/// Formatted value text handed to a caller-supplied formatter.
pub type ValueText = String<VALUE_TEXT_BYTES>;

/// Failure reported by a menu item action; the message is shown full-screen
/// until the user acknowledges it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionError {
    message: String<ACTION_ERROR_BYTES>,
}

impl ActionError {
    /// Messages longer than the on-screen buffer are truncated.
    pub fn new(message: &str) -> Self {
        let mut truncated = String::new();
        for ch in message.chars() {
            if truncated.push(ch).is_err() {
                break;
            }
        }

        Self { message: truncated }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Behavior bound to a menu item.
///
/// Captured parameters live in the implementing closure or context struct,
/// so every item invokes uniformly.
pub trait ItemAction {
    fn invoke(&mut self) -> Result<(), ActionError>;
}

impl<T> ItemAction for T
where
    T: FnMut() -> Result<(), ActionError>,
{
    fn invoke(&mut self) -> Result<(), ActionError> {
        self()
    }
}

/// One carousel entry: caption, glyph, optional action.
pub struct MenuItem<'a> {
    caption: &'a str,
    glyph: Glyph<'a>,
    action: Option<&'a mut dyn ItemAction>,
}

impl<'a> MenuItem<'a> {
    pub fn new(caption: &'a str) -> Self {
        Self {
            caption,
            glyph: DEFAULT_GLYPH,
            action: None,
        }
    }

    pub fn with_glyph(mut self, glyph: Glyph<'a>) -> Self {
        self.glyph = glyph;
        self
    }

    pub fn with_action(mut self, action: &'a mut dyn ItemAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Widget failure: a collaborator error, or caller misuse caught at entry.
#[derive(Debug)]
pub enum MenuError<DisplayErr, FontErr, PadErr> {
    Display(DisplayErr),
    Font(FontErr),
    Pad(PadErr),
    NoItems,
    TooManyItems,
}

type WidgetResult<D, F, P, T> =
    Result<T, MenuError<<D as Surface>::Error, <F as Font>::Error, <P as ButtonPad>::Error>>;

/// Carousel entry options.
#[derive(Clone, Copy, Debug)]
pub struct CarouselConfig {
    first_index: usize,
    allow_back: bool,
    auto_invoke: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            first_index: 0,
            allow_back: true,
            auto_invoke: false,
        }
    }
}

impl CarouselConfig {
    /// Starting selection; wraps modulo the item count.
    pub const fn with_first_index(mut self, first_index: usize) -> Self {
        self.first_index = first_index;
        self
    }

    /// Disabling back also turns confirm on an action-less item into a
    /// no-op, so the menu can only be left through an item action.
    pub const fn with_back_allowed(mut self, allow_back: bool) -> Self {
        self.allow_back = allow_back;
        self
    }

    /// Invoke the starting item's action once before the first poll.
    pub const fn with_auto_invoke(mut self, auto_invoke: bool) -> Self {
        self.auto_invoke = auto_invoke;
        self
    }
}

/// Date-time editor options.
#[derive(Clone, Copy, Debug)]
pub struct DateTimeConfig {
    live: bool,
    first_field: u8,
}

impl Default for DateTimeConfig {
    fn default() -> Self {
        Self {
            live: true,
            first_field: 0,
        }
    }
}

impl DateTimeConfig {
    /// Live mode advances the seconds with the wall clock and blinks the
    /// `:` separators at 2 Hz.
    pub const fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Starting cursor position in rendered order (0 = day .. 5 = second).
    pub const fn with_first_field(mut self, first_field: u8) -> Self {
        self.first_field = first_field;
        self
    }
}

/// Value editor bounds and presentation.
#[derive(Clone, Copy, Debug)]
pub struct ValueConfig {
    min: i32,
    max: i32,
    increment: i32,
    display_mult: i32,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            min: i32::MIN + 1,
            max: i32::MAX,
            increment: 1,
            display_mult: 1,
        }
    }
}

impl ValueConfig {
    pub const fn new(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            increment: 1,
            display_mult: 1,
        }
    }

    pub const fn with_increment(mut self, increment: i32) -> Self {
        self.increment = increment;
        self
    }

    /// The rendered value is `current * display_mult`; the stored value is
    /// unaffected.
    pub const fn with_display_mult(mut self, display_mult: i32) -> Self {
        self.display_mult = display_mult;
        self
    }
}

/// Optional observer hooks for the editors.
pub struct EditHooks<'a, T> {
    /// Runs once per loop iteration with the current value.
    pub on_loop: Option<&'a mut dyn FnMut(T)>,
    /// Runs when the observed value changes, including the normalization or
    /// clamp applied to the initial value at entry.
    pub on_update: Option<&'a mut dyn FnMut(T)>,
}

impl<T> Default for EditHooks<'_, T> {
    fn default() -> Self {
        Self {
            on_loop: None,
            on_update: None,
        }
    }
}

/// Owner of the display, font, pad, and clock for one UI context.
pub struct Menu<D, F, P, C>
where
    D: Surface,
    F: Font,
    P: ButtonPad,
    C: Clock,
{
    surface: D,
    font: F,
    pad: P,
    clock: C,
}

impl<D, F, P, C> Menu<D, F, P, C>
where
    D: Surface,
    F: Font,
    P: ButtonPad,
    C: Clock,
{
    pub const fn new(surface: D, font: F, pad: P, clock: C) -> Self {
        Self {
            surface,
            font,
            pad,
            clock,
        }
    }

    /// Hand the collaborators back to the host.
    pub fn into_parts(self) -> (D, F, P, C) {
        (self.surface, self.font, self.pad, self.clock)
    }

    /// Block until every line is released, one is pressed, and all are
    /// released again.
    ///
    /// Also usable standalone as a modal "press any button" gate; the
    /// display is cleared on the press and again on the release.
    pub fn press_any(&mut self) -> WidgetResult<D, F, P, ()> {
        loop {
            let sample = self.pad.sample().map_err(MenuError::Pad)?;
            if !sample.any_pressed() {
                break;
            }
            self.clock.sleep_ms(ACK_POLL_MS);
        }
        loop {
            let sample = self.pad.sample().map_err(MenuError::Pad)?;
            if sample.any_pressed() {
                break;
            }
            self.clock.sleep_ms(ACK_POLL_MS);
        }
        self.surface.clear().map_err(MenuError::Display)?;
        self.surface.flush().map_err(MenuError::Display)?;
        loop {
            let sample = self.pad.sample().map_err(MenuError::Pad)?;
            if !sample.any_pressed() {
                break;
            }
            self.clock.sleep_ms(ACK_POLL_MS);
        }
        self.surface.clear().map_err(MenuError::Display)?;
        self.surface.flush().map_err(MenuError::Display)
    }

    /// Invoke an item action; a failure renders its message full-screen and
    /// waits for a press-and-release acknowledgement, then the caller
    /// resumes with its state unchanged.
    fn run_action(&mut self, action: &mut dyn ItemAction) -> WidgetResult<D, F, P, ()> {
        if let Err(failure) = action.invoke() {
            debug!("menu: item action failed: {}", failure.message());
            self.surface.clear().map_err(MenuError::Display)?;
            self.font
                .print(failure.message(), 0, 0)
                .map_err(MenuError::Font)?;
            self.surface.flush().map_err(MenuError::Display)?;
            self.press_any()?;
        }

        Ok(())
    }

    fn print_center_x(&mut self, text: &str, x: i32, y: i32) -> Result<(), F::Error> {
        let size = self.font.calculate_size(text);
        self.font.print(text, x - size.advance / 2, y)
    }

    fn print_center_2d(&mut self, value: i32, x: i32, y: i32) -> Result<(), F::Error> {
        let mut text: String<FIELD_TEXT_BYTES> = String::new();
        let _ = write!(text, "{value:02}");
        self.print_center_x(&text, x, y)
    }

    fn draw_edge_hints(&mut self, y: i32) -> Result<(), F::Error> {
        self.font.print("<", 0, y)?;
        self.font.print(">", self.surface.width() - 5, y)
    }

    fn draw_edge_latch(&mut self, latch: ButtonSignal, y: i32) -> Result<(), D::Error> {
        let width = self.surface.width();
        let font_height = self.font.height();
        match latch {
            ButtonSignal::Left => self.surface.rect(0, y - 3, 5, y + font_height + 3, true),
            ButtonSignal::Right => {
                self.surface
                    .rect(width - 8, y - 3, width, y + font_height + 3, true)
            }
            _ => Ok(()),
        }
    }
}

include!("carousel.rs");
include!("datetime_editor.rs");
include!("value_editor.rs");

#[cfg(test)]
mod tests;
