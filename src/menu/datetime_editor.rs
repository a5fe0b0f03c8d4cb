/// Cursor positions in rendered row-major order: day, month, year, hour,
/// minute, second.
const FIELD_COUNT: u8 = 6;

// The top row draws the value tuple's year/month/day in reverse, so the
// first three cursor slots index the tuple back to front.
const fn tuple_index(cursor: u8) -> usize {
    if cursor > 2 {
        cursor as usize
    } else {
        (2 - cursor) as usize
    }
}

const fn blink_phase(now_ms: u64) -> bool {
    now_ms % BLINK_PERIOD_MS > BLINK_PERIOD_MS / 2
}

fn fire_datetime_update(
    value: &DateTime,
    last_signature: &mut i64,
    on_update: &mut Option<&mut dyn FnMut(DateTime)>,
) {
    let signature = value.signature();
    if signature != *last_signature {
        if let Some(on_update) = on_update.as_deref_mut() {
            on_update(*value);
        }
    }
    *last_signature = signature;
}

/// Field grid geometry, measured once at entry.
#[derive(Clone, Copy, Debug)]
struct DateTimeLayout {
    caption_x: i32,
    arrow_y: i32,
    third_x: i32,
    third_centers: [i32; 3],
    half_y: i32,
    half_tops: [i32; 2],
    half_offsets: [i32; 2],
}

impl DateTimeLayout {
    fn measure<F: Font>(font: &F, width: i32, height: i32, caption: &str) -> Self {
        let caption_size = font.calculate_size(caption);
        let value_top = caption_size.height + font.height();
        let arrow_y = value_top + (height - value_top) / 2 - font.height() / 2;
        let third_x = (width - 10) / 3;
        let third_centers = [
            5 + third_x / 2,
            5 + third_x + third_x / 2,
            5 + third_x * 2 + third_x / 2,
        ];
        let grid_top = caption_size.height + font.line_height();
        let half_y = (height - grid_top) / 2;
        let half_tops = [grid_top, grid_top + half_y];
        let text_inset = (half_y - font.height()) / 2;

        Self {
            caption_x: (width - caption_size.advance) / 2,
            arrow_y,
            third_x,
            third_centers,
            half_y,
            half_tops,
            half_offsets: [half_tops[0] + text_inset, half_tops[1] + text_inset],
        }
    }
}

impl<D, F, P, C> Menu<D, F, P, C>
where
    D: Surface,
    F: Font,
    P: ButtonPad,
    C: Clock,
{
    /// Edit a six-field date-time; returns `None` when abandoned.
    ///
    /// Left/right adjust the focused field, cancel walks the cursor left
    /// (abandoning past the first field), confirm walks right (committing
    /// past the last). In live mode the seconds track the wall clock while
    /// the user edits.
    pub fn read_datetime(
        &mut self,
        caption: &str,
        value: DateTime,
        config: DateTimeConfig,
        mut hooks: EditHooks<'_, DateTime>,
    ) -> WidgetResult<D, F, P, Option<DateTime>> {
        let layout = DateTimeLayout::measure(
            &self.font,
            self.surface.width(),
            self.surface.height(),
            caption,
        );

        let mut value = value;
        let mut cursor = config.first_field.min(FIELD_COUNT - 1);
        let mut hold = HoldState::new();

        let mut last_signature = value.signature();
        value.normalize();

        let mut now = self.clock.ticks_ms();
        let mut prev_blink = blink_phase(now);
        let mut last_second = now / 1_000;

        self.draw_datetime(&layout, caption, &value, cursor, hold.last, config.live, now)?;
        fire_datetime_update(&value, &mut last_signature, &mut hooks.on_update);

        loop {
            now = self.clock.ticks_ms();
            let mut signal = self.pad.signal().map_err(MenuError::Pad)?;
            if signal != ButtonSignal::None {
                if hold.last == ButtonSignal::None
                    || (hold.last != ButtonSignal::Conflict && hold.repeat_after_ms < now)
                {
                    if hold.last == ButtonSignal::None {
                        hold.repeat_after_ms = now + HOLD_REPEAT_DELAY_MS;
                    }
                    match signal {
                        ButtonSignal::Left => *value.field_mut(tuple_index(cursor)) -= 1,
                        ButtonSignal::Right => *value.field_mut(tuple_index(cursor)) += 1,
                        _ => {}
                    }
                    value.normalize();
                    fire_datetime_update(&value, &mut last_signature, &mut hooks.on_update);
                } else {
                    signal = hold.resolve_change(signal);
                }
                hold.last = signal;
                self.draw_datetime(&layout, caption, &value, cursor, hold.last, config.live, now)?;
            } else if hold.last != ButtonSignal::None {
                match hold.last {
                    ButtonSignal::Cancel => {
                        if cursor == 0 {
                            debug!("edit: date-time abandoned");
                            return Ok(None);
                        }
                        cursor -= 1;
                    }
                    ButtonSignal::Confirm => {
                        if cursor == FIELD_COUNT - 1 {
                            debug!("edit: date-time committed");
                            return Ok(Some(value));
                        }
                        cursor += 1;
                    }
                    _ => {}
                }
                hold.last = ButtonSignal::None;
                self.draw_datetime(&layout, caption, &value, cursor, hold.last, config.live, now)?;
            }

            let blink = blink_phase(now);
            if blink != prev_blink {
                if config.live {
                    let second = now / 1_000;
                    value.second += (second - last_second) as i32;
                    value.normalize();
                    fire_datetime_update(&value, &mut last_signature, &mut hooks.on_update);
                    last_second = second;
                }
                self.draw_datetime(&layout, caption, &value, cursor, hold.last, config.live, now)?;
            }
            prev_blink = blink;

            self.clock.sleep_ms(TICK_MS);
            if let Some(on_loop) = hooks.on_loop.as_deref_mut() {
                on_loop(value);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_datetime(
        &mut self,
        layout: &DateTimeLayout,
        caption: &str,
        value: &DateTime,
        cursor: u8,
        latch: ButtonSignal,
        live: bool,
        now_ms: u64,
    ) -> WidgetResult<D, F, P, ()> {
        self.surface.clear().map_err(MenuError::Display)?;
        self.font
            .print(caption, layout.caption_x, 0)
            .map_err(MenuError::Font)?;
        self.draw_edge_hints(layout.arrow_y).map_err(MenuError::Font)?;

        let separator_x = |column: usize| layout.third_centers[column] + layout.third_x / 2 - 2;
        self.font
            .print("/", separator_x(0), layout.half_offsets[0])
            .map_err(MenuError::Font)?;
        self.font
            .print("/", separator_x(1), layout.half_offsets[0])
            .map_err(MenuError::Font)?;
        if !live || now_ms % BLINK_PERIOD_MS < BLINK_PERIOD_MS / 2 {
            self.font
                .print(":", separator_x(0), layout.half_offsets[1])
                .map_err(MenuError::Font)?;
            self.font
                .print(":", separator_x(1), layout.half_offsets[1])
                .map_err(MenuError::Font)?;
        }

        let mut year_text: String<FIELD_TEXT_BYTES> = String::new();
        let _ = write!(year_text, "{}", value.year);
        self.print_center_x(&year_text, layout.third_centers[2], layout.half_offsets[0])
            .map_err(MenuError::Font)?;
        self.print_center_2d(value.month, layout.third_centers[1], layout.half_offsets[0])
            .map_err(MenuError::Font)?;
        self.print_center_2d(value.day, layout.third_centers[0], layout.half_offsets[0])
            .map_err(MenuError::Font)?;

        self.print_center_2d(value.hour, layout.third_centers[0], layout.half_offsets[1])
            .map_err(MenuError::Font)?;
        self.print_center_2d(value.minute, layout.third_centers[1], layout.half_offsets[1])
            .map_err(MenuError::Font)?;
        self.print_center_2d(value.second, layout.third_centers[2], layout.half_offsets[1])
            .map_err(MenuError::Font)?;

        let column = (cursor % 3) as usize;
        let row = (cursor / 3) as usize;
        self.surface
            .rect(
                layout.third_centers[column] + 4 - layout.third_x / 2,
                layout.half_tops[row],
                layout.third_centers[column] - 4 + layout.third_x / 2,
                layout.half_tops[row] + layout.half_y,
                true,
            )
            .map_err(MenuError::Display)?;

        self.draw_edge_latch(latch, layout.arrow_y)
            .map_err(MenuError::Display)?;
        self.surface.flush().map_err(MenuError::Display)
    }
}
