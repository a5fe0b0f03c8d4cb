/// Precomputed placement for one carousel item, derived once at entry from
/// the measured caption and glyph sizes.
#[derive(Clone, Copy, Debug)]
struct ItemLayout {
    caption_x: i32,
    caption_y: i32,
    glyph_x: i32,
    glyph_y: i32,
}

impl<D, F, P, C> Menu<D, F, P, C>
where
    D: Surface,
    F: Font,
    P: ButtonPad,
    C: Clock,
{
    /// Run the horizontal glyph carousel until a selection or cancel.
    ///
    /// Confirm on an item with an action runs the action and keeps the loop
    /// going; confirm on an action-less item returns its index. Cancel
    /// returns `None`. Both exits can be disabled through
    /// [`CarouselConfig::with_back_allowed`]. `on_loop` observes the
    /// current index once per tick and once per animation frame.
    pub fn horizontal_glyph_menu<'f>(
        &mut self,
        items: &mut [MenuItem<'_>],
        config: CarouselConfig,
        mut on_loop: Option<&mut (dyn FnMut(usize) + 'f)>,
    ) -> WidgetResult<D, F, P, Option<usize>> {
        if items.is_empty() {
            return Err(MenuError::NoItems);
        }

        let mut layouts: Vec<ItemLayout, MAX_CAROUSEL_ITEMS> = Vec::new();
        for item in items.iter() {
            let caption_size = self.font.calculate_size(item.caption);
            let caption_y =
                self.surface.height() - (caption_size.height + self.font.line_height());
            let layout = ItemLayout {
                caption_x: (self.surface.width() - caption_size.advance) / 2,
                caption_y,
                glyph_x: (self.surface.width() - item.glyph.width()) / 2,
                glyph_y: (caption_y - item.glyph.height()) / 2,
            };
            layouts
                .push(layout)
                .map_err(|_| MenuError::TooManyItems)?;
        }

        let mut index = config.first_index % items.len();
        let mut hold = HoldState::new();
        // Most recent acted-on signal; keeps the edge hint box up until a
        // different signal class arrives.
        let mut hint = ButtonSignal::None;

        if config.auto_invoke {
            if let Some(action) = items[index].action.as_deref_mut() {
                self.run_action(action)?;
            }
        }

        self.draw_carousel(items, &layouts, index, 0, hold.last, hint)?;
        loop {
            let mut signal = self.pad.signal().map_err(MenuError::Pad)?;
            if signal != ButtonSignal::None {
                let may_act = (hold.last == ButtonSignal::None || signal.is_directional())
                    && hold.last != ButtonSignal::Conflict;
                if may_act && signal.is_directional() {
                    hold.last = signal;
                    hint = signal;
                    match signal {
                        ButtonSignal::Left => {
                            self.slide(items, &layouts, index, 1, hint, on_loop.as_deref_mut())?;
                            index = (index + items.len() - 1) % items.len();
                        }
                        ButtonSignal::Right => {
                            self.slide(items, &layouts, index, -1, hint, on_loop.as_deref_mut())?;
                            index = (index + 1) % items.len();
                        }
                        _ => {}
                    }
                    self.draw_carousel(items, &layouts, index, 0, hold.last, hint)?;
                }

                if hold.last != ButtonSignal::None && hold.last != signal {
                    if hold.last != ButtonSignal::Conflict {
                        debug!("menu: conflicting input latched");
                    }
                    signal = ButtonSignal::Conflict;
                }
                hold.last = signal;
                hint = signal;
                self.draw_carousel(items, &layouts, index, 0, hold.last, hint)?;
            } else if hold.last != ButtonSignal::None {
                match hold.last {
                    ButtonSignal::Cancel if config.allow_back => {
                        debug!("menu: cancelled");
                        return Ok(None);
                    }
                    ButtonSignal::Confirm => {
                        if let Some(action) = items[index].action.as_deref_mut() {
                            debug!("menu: confirm index={index} runs action");
                            self.run_action(action)?;
                        } else if config.allow_back {
                            debug!("menu: selected index={index}");
                            return Ok(Some(index));
                        }
                    }
                    _ => {}
                }
                hold.last = ButtonSignal::None;
                self.draw_carousel(items, &layouts, index, 0, hold.last, hint)?;
            }

            self.clock.sleep_ms(TICK_MS);
            if let Some(on_loop) = on_loop.as_deref_mut() {
                on_loop(index);
            }
        }
    }

    /// Slide the current item off-screen: eight frames stepping
    /// display-width/8, starting at display-width/16. `direction` is +1 for
    /// a leftward selection move, -1 for rightward.
    fn slide<'f>(
        &mut self,
        items: &[MenuItem<'_>],
        layouts: &[ItemLayout],
        index: usize,
        direction: i32,
        hint: ButtonSignal,
        mut on_loop: Option<&mut (dyn FnMut(usize) + 'f)>,
    ) -> WidgetResult<D, F, P, ()> {
        let width = self.surface.width();
        let step = (width / 8).max(1);
        let mut offset = width / 16;
        while offset < width {
            self.draw_carousel(items, layouts, index, direction * offset, hint, hint)?;
            if let Some(on_loop) = on_loop.as_deref_mut() {
                on_loop(index);
            }
            offset += step;
        }

        Ok(())
    }

    fn draw_carousel(
        &mut self,
        items: &[MenuItem<'_>],
        layouts: &[ItemLayout],
        index: usize,
        offset: i32,
        latch: ButtonSignal,
        hint: ButtonSignal,
    ) -> WidgetResult<D, F, P, ()> {
        let width = self.surface.width();
        let height = self.surface.height();
        self.surface.clear().map_err(MenuError::Display)?;
        self.draw_edge_hints(height / 2).map_err(MenuError::Font)?;

        self.draw_item(items, layouts, index, offset)?;
        if offset > 0 {
            let other = (index + items.len() - 1) % items.len();
            self.draw_item(items, layouts, other, offset - width)?;
        } else if offset < 0 {
            let other = (index + 1) % items.len();
            self.draw_item(items, layouts, other, offset + width)?;
        }

        self.draw_edge_latch(hint, height / 2)
            .map_err(MenuError::Display)?;
        if latch == ButtonSignal::Confirm && offset == 0 {
            let layout = &layouts[index];
            let glyph = &items[index].glyph;
            self.surface
                .rect(
                    layout.glyph_x - 3,
                    layout.glyph_y - 3,
                    layout.glyph_x + glyph.width() + 3,
                    layout.glyph_y + glyph.height() + 3,
                    true,
                )
                .map_err(MenuError::Display)?;
        }

        self.surface.flush().map_err(MenuError::Display)
    }

    fn draw_item(
        &mut self,
        items: &[MenuItem<'_>],
        layouts: &[ItemLayout],
        index: usize,
        offset: i32,
    ) -> WidgetResult<D, F, P, ()> {
        let layout = &layouts[index];
        self.surface
            .copy_from(&items[index].glyph, layout.glyph_x + offset, layout.glyph_y)
            .map_err(MenuError::Display)?;
        self.font
            .print(items[index].caption, layout.caption_x + offset, layout.caption_y)
            .map_err(MenuError::Font)
    }
}
