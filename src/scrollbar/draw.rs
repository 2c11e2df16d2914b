use super::{Axis, ScrollPart, ScrollView, ARROW_SIZE, SCROLLBAR_SIZE};
use crate::render::DrawContext;

impl ScrollView {
    fn button_color(&self, axis: Axis, part: ScrollPart) -> &str {
        if self.hover == Some((axis, part)) {
            &self.style.button_hover_color
        } else {
            &self.style.button_color
        }
    }

    /// Paint both scrollbars. Must run after all content drawing.
    pub fn draw(&self, ctx: &mut dyn DrawContext) {
        if self.content.is_none() {
            return;
        }
        let r = self.ratio;
        let bar = SCROLLBAR_SIZE * r;
        let padding = (SCROLLBAR_SIZE - ARROW_SIZE) / 2.0;
        let (cw, ch) = (self.canvas_width, self.canvas_height);

        if self.y.visible {
            let height = ch - if self.x.visible { bar } else { 0.0 };
            let (thumb_pos, thumb_len) = self.thumb(Axis::Y);

            ctx.set_fill_style(&self.style.background_color);
            ctx.fill_rect(cw - bar, 0.0, bar, height);

            ctx.set_fill_style(self.button_color(Axis::Y, ScrollPart::StartArrow));
            ctx.fill_polygon(&[
                (cw - bar * 0.5, r * 2.0),
                (cw - r * (ARROW_SIZE + padding), r * 10.0),
                (cw - r * padding, r * 10.0),
            ]);

            ctx.set_fill_style(self.button_color(Axis::Y, ScrollPart::EndArrow));
            ctx.fill_polygon(&[
                (cw - bar * 0.5, height - r * 2.0),
                (cw - r * (ARROW_SIZE + padding), height - r * 10.0),
                (cw - r * padding, height - r * 10.0),
            ]);

            ctx.set_fill_style(self.button_color(Axis::Y, ScrollPart::Thumb));
            ctx.fill_rect(
                cw - r * (SCROLLBAR_SIZE - 1.0),
                thumb_pos + 4.0 * r,
                (SCROLLBAR_SIZE - 2.0) * r,
                thumb_len,
            );
        }

        if self.x.visible {
            let width = cw - if self.y.visible { bar } else { 0.0 };
            let (thumb_pos, thumb_len) = self.thumb(Axis::X);

            ctx.set_fill_style(&self.style.background_color);
            ctx.fill_rect(0.0, ch - bar, width, bar);

            ctx.set_fill_style(self.button_color(Axis::X, ScrollPart::StartArrow));
            ctx.fill_polygon(&[
                (r * 2.0, ch - bar * 0.5),
                (r * 10.0, ch - r * (ARROW_SIZE + padding)),
                (r * 10.0, ch - r * padding),
            ]);

            ctx.set_fill_style(self.button_color(Axis::X, ScrollPart::EndArrow));
            ctx.fill_polygon(&[
                (width - r * 2.0, ch - bar * 0.5),
                (width - r * 10.0, ch - r * (ARROW_SIZE + padding)),
                (width - r * 10.0, ch - r * padding),
            ]);

            ctx.set_fill_style(self.button_color(Axis::X, ScrollPart::Thumb));
            ctx.fill_rect(
                thumb_pos + 4.0 * r,
                ch - r * (SCROLLBAR_SIZE - 1.0),
                thumb_len,
                (SCROLLBAR_SIZE - 2.0) * r,
            );
        }

        if self.x.visible && self.y.visible {
            ctx.set_fill_style(&self.style.background_color);
            ctx.fill_rect(cw - bar, ch - bar, bar, bar);
        }
    }
}
