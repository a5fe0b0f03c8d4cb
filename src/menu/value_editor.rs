/// Caption and value line geometry, measured once at entry.
#[derive(Clone, Copy, Debug)]
struct ValueLayout {
    caption_x: i32,
    arrow_y: i32,
    value_y: i32,
}

impl ValueLayout {
    fn measure<F: Font>(font: &F, width: i32, height: i32, caption: &str) -> Self {
        let caption_size = font.calculate_size(caption);
        let value_top = caption_size.height + font.height();
        let band = (height - value_top) / 2;

        Self {
            caption_x: (width - caption_size.advance) / 2,
            arrow_y: value_top + band - font.height() / 2,
            value_y: value_top + band - font.height() / 2,
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
    /// Edit one bounded integer; returns `None` when cancelled.
    ///
    /// The value stays inside `[min, max]` at all times, starting with a
    /// clamp of the supplied value on entry. The rendered text is
    /// `value * display_mult` passed through `format` (plain decimal when
    /// absent).
    pub fn read_value<'f>(
        &mut self,
        caption: &str,
        value: i32,
        config: ValueConfig,
        mut format: Option<&mut (dyn FnMut(i64, &mut ValueText) -> fmt::Result + 'f)>,
        mut hooks: EditHooks<'_, i32>,
    ) -> WidgetResult<D, F, P, Option<i32>> {
        let mut config = config;
        if config.min > config.max {
            core::mem::swap(&mut config.min, &mut config.max);
        }

        let layout = ValueLayout::measure(
            &self.font,
            self.surface.width(),
            self.surface.height(),
            caption,
        );

        let mut last_value = value;
        let mut value = value.clamp(config.min, config.max);
        let mut hold = HoldState::new();

        self.draw_value(
            &layout,
            caption,
            value,
            config.display_mult,
            format.as_deref_mut(),
            hold.last,
        )?;
        if value != last_value {
            if let Some(on_update) = hooks.on_update.as_deref_mut() {
                on_update(value);
            }
        }
        last_value = value;

        loop {
            let now = self.clock.ticks_ms();
            let mut signal = self.pad.signal().map_err(MenuError::Pad)?;
            if signal != ButtonSignal::None {
                if hold.last == ButtonSignal::None
                    || (hold.last != ButtonSignal::Conflict && hold.repeat_after_ms < now)
                {
                    if hold.last == ButtonSignal::None {
                        hold.repeat_after_ms = now + HOLD_REPEAT_DELAY_MS;
                    }
                    match signal {
                        ButtonSignal::Left => {
                            value = value.saturating_sub(config.increment).max(config.min);
                        }
                        ButtonSignal::Right => {
                            value = value.saturating_add(config.increment).min(config.max);
                        }
                        _ => {}
                    }
                    if value != last_value {
                        if let Some(on_update) = hooks.on_update.as_deref_mut() {
                            on_update(value);
                        }
                    }
                    last_value = value;
                } else {
                    signal = hold.resolve_change(signal);
                }
                hold.last = signal;
                self.draw_value(
                    &layout,
                    caption,
                    value,
                    config.display_mult,
                    format.as_deref_mut(),
                    hold.last,
                )?;
            } else if hold.last != ButtonSignal::None {
                match hold.last {
                    ButtonSignal::Cancel => {
                        debug!("edit: value abandoned");
                        return Ok(None);
                    }
                    ButtonSignal::Confirm => {
                        debug!("edit: value committed {value}");
                        return Ok(Some(value));
                    }
                    _ => {}
                }
                hold.last = ButtonSignal::None;
                self.draw_value(
                    &layout,
                    caption,
                    value,
                    config.display_mult,
                    format.as_deref_mut(),
                    hold.last,
                )?;
            }

            self.clock.sleep_ms(TICK_MS);
            if let Some(on_loop) = hooks.on_loop.as_deref_mut() {
                on_loop(value);
            }
        }
    }

    fn draw_value<'f>(
        &mut self,
        layout: &ValueLayout,
        caption: &str,
        value: i32,
        display_mult: i32,
        format: Option<&mut (dyn FnMut(i64, &mut ValueText) -> fmt::Result + 'f)>,
        latch: ButtonSignal,
    ) -> WidgetResult<D, F, P, ()> {
        self.surface.clear().map_err(MenuError::Display)?;
        self.font
            .print(caption, layout.caption_x, 0)
            .map_err(MenuError::Font)?;
        self.draw_edge_hints(layout.arrow_y).map_err(MenuError::Font)?;

        let display_value = value as i64 * display_mult as i64;
        let mut text = ValueText::new();
        match format {
            Some(format) => {
                let _ = format(display_value, &mut text);
            }
            None => {
                let _ = write!(text, "{display_value}");
            }
        }

        let size = self.font.calculate_size(&text);
        let left = self.surface.width() / 2 - size.advance / 2;
        let right = left + size.advance;
        self.font
            .print(&text, left, layout.value_y)
            .map_err(MenuError::Font)?;

        self.draw_edge_latch(latch, layout.arrow_y)
            .map_err(MenuError::Display)?;
        let font_height = self.font.height();
        match latch {
            ButtonSignal::Confirm => {
                self.surface
                    .rect(
                        left - 3,
                        layout.value_y - 3,
                        right + 3,
                        layout.value_y + font_height + 3,
                        true,
                    )
                    .map_err(MenuError::Display)?;
            }
            ButtonSignal::Cancel => {
                self.surface
                    .line(
                        left - 5,
                        layout.value_y - 5,
                        right + 5,
                        layout.value_y + font_height + 5,
                        true,
                    )
                    .map_err(MenuError::Display)?;
                self.surface
                    .line(
                        left - 5,
                        layout.value_y + font_height + 5,
                        right + 5,
                        layout.value_y - 5,
                        true,
                    )
                    .map_err(MenuError::Display)?;
            }
            _ => {}
        }

        self.surface.flush().map_err(MenuError::Display)
    }
}
