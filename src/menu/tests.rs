use core::fmt::Write as _;

use super::*;
use crate::input::{PadSample, mock::ScriptedPad};
use crate::surface::TextSize;

const IDLE: PadSample = PadSample::released();
const LEFT: PadSample = PadSample::press_left();
const RIGHT: PadSample = PadSample::press_right();
const CONFIRM: PadSample = PadSample::press_confirm();
const CANCEL: PadSample = PadSample::press_cancel();
const CONFLICT: PadSample = PadSample {
    left: false,
    right: false,
    confirm: true,
    cancel: true,
};

struct FakeClock {
    now_ms: u64,
}

impl FakeClock {
    const fn new() -> Self {
        Self { now_ms: 0 }
    }
}

impl Clock for FakeClock {
    fn ticks_ms(&mut self) -> u64 {
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now_ms += ms as u64;
    }
}

struct NullSurface;

impl Surface for NullSurface {
    type Error = core::convert::Infallible;

    fn width(&self) -> i32 {
        128
    }

    fn height(&self) -> i32 {
        64
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn rect(&mut self, _: i32, _: i32, _: i32, _: i32, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn line(&mut self, _: i32, _: i32, _: i32, _: i32, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn copy_from(&mut self, _: &Glyph<'_>, _: i32, _: i32) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct NullFont;

impl Font for NullFont {
    type Error = core::convert::Infallible;

    fn print(&mut self, _: &str, _: i32, _: i32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn calculate_size(&self, text: &str) -> TextSize {
        let advance = text.chars().count() as i32 * 4;
        TextSize {
            width: advance,
            height: 8,
            advance,
        }
    }

    fn height(&self) -> i32 {
        8
    }

    fn line_height(&self) -> i32 {
        10
    }
}

fn menu_with(script: &[PadSample]) -> Menu<NullSurface, NullFont, ScriptedPad<'_>, FakeClock> {
    Menu::new(NullSurface, NullFont, ScriptedPad::new(script), FakeClock::new())
}

#[test]
fn right_right_confirm_selects_third_item() {
    let script = [RIGHT, IDLE, RIGHT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A"), MenuItem::new("B"), MenuItem::new("C")];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(Some(2))));
}

#[test]
fn confirm_with_action_runs_it_once_and_keeps_looping() {
    let script = [RIGHT, IDLE, RIGHT, IDLE, CONFIRM, IDLE, CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let mut invocations = 0u32;
    let mut select_c = || -> Result<(), ActionError> {
        invocations += 1;
        Ok(())
    };
    let mut items = [
        MenuItem::new("A"),
        MenuItem::new("B"),
        MenuItem::new("C").with_action(&mut select_c),
    ];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(None)));
    assert_eq!(invocations, 1);
}

#[test]
fn left_then_right_returns_to_the_starting_index() {
    let script = [LEFT, IDLE, RIGHT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A"), MenuItem::new("B"), MenuItem::new("C")];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(Some(0))));
}

#[test]
fn single_item_list_wraps_in_place() {
    let script = [LEFT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("only")];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(Some(0))));
}

#[test]
fn cancel_returns_no_selection() {
    let script = [CANCEL, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A"), MenuItem::new("B")];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(None)));
}

#[test]
fn disabled_back_ignores_cancel_and_plain_confirm() {
    // With back disabled and no actions the loop can never exit; the
    // exhausted script surfaces as a pad error.
    let script = [CANCEL, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A")];

    let config = CarouselConfig::default().with_back_allowed(false);
    let selected = menu.horizontal_glyph_menu(&mut items, config, None);
    assert!(matches!(selected, Err(MenuError::Pad(_))));
}

#[test]
fn simultaneous_press_is_inert() {
    let script = [CONFLICT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A"), MenuItem::new("B"), MenuItem::new("C")];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(Some(0))));
}

#[test]
fn conflict_latch_blocks_held_directionals() {
    let script = [LEFT, CONFLICT, LEFT, IDLE, CANCEL, IDLE];
    let mut menu = menu_with(&script);
    let mut items = [MenuItem::new("A"), MenuItem::new("B"), MenuItem::new("C")];

    let mut observed = vec![];
    let mut on_loop = |index: usize| observed.push(index);
    let selected = menu.horizontal_glyph_menu(
        &mut items,
        CarouselConfig::default(),
        Some(&mut on_loop),
    );
    assert!(matches!(selected, Ok(None)));

    // One slide animation only: eight frames at the old index, then the
    // conflicted ticks stay put on the committed index.
    assert_eq!(observed.iter().filter(|&&index| index == 0).count(), 8);
    assert_eq!(observed.last(), Some(&2));
    assert_eq!(observed.len(), 13);
}

#[test]
fn preselected_action_runs_before_the_first_poll() {
    let script = [CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let mut invocations = 0u32;
    let mut preselect = || -> Result<(), ActionError> {
        invocations += 1;
        Ok(())
    };
    let mut items = [
        MenuItem::new("A").with_action(&mut preselect),
        MenuItem::new("B"),
    ];

    let config = CarouselConfig::default().with_auto_invoke(true);
    let selected = menu.horizontal_glyph_menu(&mut items, config, None);
    assert!(matches!(selected, Ok(None)));
    assert_eq!(invocations, 1);
}

#[test]
fn failing_action_shows_error_and_resumes_unchanged() {
    // Confirm, release, then the press-any acknowledgement (released,
    // pressed, released), then cancel out.
    let script = [CONFIRM, IDLE, IDLE, CONFIRM, IDLE, CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let mut invocations = 0u32;
    let mut failing = || -> Result<(), ActionError> {
        invocations += 1;
        Err(ActionError::new("sensor offline"))
    };
    let mut items = [MenuItem::new("A").with_action(&mut failing)];

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Ok(None)));
    assert_eq!(invocations, 1);
}

#[test]
fn empty_item_list_fails_fast() {
    let script = [IDLE];
    let mut menu = menu_with(&script);

    let selected = menu.horizontal_glyph_menu(&mut [], CarouselConfig::default(), None);
    assert!(matches!(selected, Err(MenuError::NoItems)));
}

#[test]
fn oversized_item_list_fails_fast() {
    let script = [IDLE];
    let mut menu = menu_with(&script);
    let mut items: [MenuItem<'_>; MAX_CAROUSEL_ITEMS + 1] =
        core::array::from_fn(|_| MenuItem::new("x"));

    let selected = menu.horizontal_glyph_menu(&mut items, CarouselConfig::default(), None);
    assert!(matches!(selected, Err(MenuError::TooManyItems)));
}

#[test]
fn value_increment_clamps_at_max() {
    let script = [RIGHT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let config = ValueConfig::new(-5, 5).with_increment(2);
    let value = menu.read_value("power", 4, config, None, EditHooks::default());
    assert!(matches!(value, Ok(Some(5))));
}

#[test]
fn out_of_range_start_clamps_on_entry_and_fires_update() {
    let script = [CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: i32| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let value = menu.read_value("power", 99, ValueConfig::new(0, 10), None, hooks);
    assert!(matches!(value, Ok(Some(10))));
    assert_eq!(updates, [10]);
}

#[test]
fn clamped_noop_fires_no_update() {
    let script = [RIGHT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: i32| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let value = menu.read_value("power", 5, ValueConfig::new(0, 5), None, hooks);
    assert!(matches!(value, Ok(Some(5))));
    assert!(updates.is_empty());
}

#[test]
fn held_directional_repeats_after_the_initial_delay() {
    // Ticks are 50 ms apart; the first press acts at t=0 and arms a
    // 1000 ms guard, so repeats land at t=1050 and t=1100.
    let mut script = vec![RIGHT; 23];
    script.extend_from_slice(&[IDLE, CONFIRM, IDLE]);
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: i32| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let value = menu.read_value("power", 0, ValueConfig::new(0, 100), None, hooks);
    assert!(matches!(value, Ok(Some(3))));
    assert_eq!(updates, [1, 2, 3]);
}

#[test]
fn value_cancel_returns_no_result() {
    let script = [CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let value = menu.read_value("power", 3, ValueConfig::new(0, 10), None, EditHooks::default());
    assert!(matches!(value, Ok(None)));
}

#[test]
fn formatter_receives_the_scaled_display_value() {
    let script = [CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let mut seen = vec![];
    let mut format = |display: i64, out: &mut ValueText| -> fmt::Result {
        seen.push(display);
        write!(out, "{display} mW")
    };
    let config = ValueConfig::new(0, 100).with_display_mult(10);
    let value = menu.read_value("power", 7, config, Some(&mut format), EditHooks::default());
    assert!(matches!(value, Ok(Some(7))));
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|&display| display == 70));
}

#[test]
fn inverted_bounds_are_swapped_before_clamping() {
    let script = [CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let value = menu.read_value("power", -10, ValueConfig::new(5, -5), None, EditHooks::default());
    assert!(matches!(value, Ok(Some(-5))));
}

#[test]
fn confirm_walks_every_field_and_commits() {
    let mut script = vec![];
    for _ in 0..6 {
        script.extend_from_slice(&[CONFIRM, IDLE]);
    }
    let mut menu = menu_with(&script);

    let start = DateTime::new(2024, 5, 17, 12, 30, 45);
    let config = DateTimeConfig::default().with_live(false);
    let committed = menu.read_datetime("clock", start, config, EditHooks::default());
    assert!(matches!(committed, Ok(Some(value)) if value == start));
}

#[test]
fn cancel_at_the_first_field_abandons() {
    let script = [CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let config = DateTimeConfig::default().with_live(false);
    let committed =
        menu.read_datetime("clock", DateTime::default(), config, EditHooks::default());
    assert!(matches!(committed, Ok(None)));
}

#[test]
fn cancel_walks_the_cursor_back_before_abandoning() {
    let script = [CONFIRM, IDLE, CANCEL, IDLE, CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let config = DateTimeConfig::default().with_live(false);
    let committed =
        menu.read_datetime("clock", DateTime::default(), config, EditHooks::default());
    assert!(matches!(committed, Ok(None)));
}

#[test]
fn incrementing_the_day_rolls_a_leap_boundary() {
    let mut script = vec![RIGHT, IDLE];
    for _ in 0..6 {
        script.extend_from_slice(&[CONFIRM, IDLE]);
    }
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: DateTime| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let start = DateTime::new(2024, 2, 29, 0, 0, 0);
    let config = DateTimeConfig::default().with_live(false);
    let committed = menu.read_datetime("clock", start, config, hooks);

    let expected = DateTime::new(2024, 3, 1, 0, 0, 0);
    assert!(matches!(committed, Ok(Some(value)) if value == expected));
    assert_eq!(updates, [expected]);
}

#[test]
fn year_clamp_at_the_ceiling_fires_no_update() {
    let script = [RIGHT, IDLE, CANCEL, IDLE, CANCEL, IDLE, CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: DateTime| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let start = DateTime::new(2200, 6, 15, 0, 0, 0);
    let config = DateTimeConfig::default().with_live(false).with_first_field(2);
    let committed = menu.read_datetime("clock", start, config, hooks);
    assert!(matches!(committed, Ok(None)));
    assert!(updates.is_empty());
}

#[test]
fn entry_normalization_fires_a_single_update() {
    let script = [CANCEL, IDLE];
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: DateTime| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let start = DateTime::new(2024, 1, 1, 0, 0, 90);
    let config = DateTimeConfig::default().with_live(false);
    let committed = menu.read_datetime("clock", start, config, hooks);
    assert!(matches!(committed, Ok(None)));
    assert_eq!(updates, [DateTime::new(2024, 1, 1, 0, 1, 30)]);
}

#[test]
fn live_mode_tracks_wall_clock_seconds() {
    let mut script = vec![IDLE; 45];
    script.extend_from_slice(&[CANCEL, IDLE]);
    let mut menu = menu_with(&script);

    let mut updates = vec![];
    let mut on_update = |value: DateTime| updates.push(value);
    let hooks = EditHooks {
        on_update: Some(&mut on_update),
        ..Default::default()
    };
    let start = DateTime::new(2025, 1, 1, 0, 0, 0);
    let config = DateTimeConfig::default().with_live(true);
    let committed = menu.read_datetime("clock", start, config, hooks);
    assert!(matches!(committed, Ok(None)));

    // 45 ticks cover just over two wall-clock seconds.
    assert_eq!(updates.len(), 2);
    assert_eq!(updates.last(), Some(&DateTime::new(2025, 1, 1, 0, 0, 2)));
}

#[test]
fn on_loop_observes_the_edited_value_each_tick() {
    let script = [RIGHT, IDLE, CONFIRM, IDLE];
    let mut menu = menu_with(&script);

    let mut observed = vec![];
    let mut on_loop = |value: i32| observed.push(value);
    let hooks = EditHooks {
        on_loop: Some(&mut on_loop),
        ..Default::default()
    };
    let value = menu.read_value("power", 0, ValueConfig::new(0, 10), None, hooks);
    assert!(matches!(value, Ok(Some(1))));
    assert_eq!(observed, [1, 1, 1]);
}
