//! # AffectionPanel Component
//!
//! Side panel showing the character, the closeness counter and meter, and the
//! relationship and scene labels.
//!
//! ```text
//! ╭ 苏糖 ──────────────────╮
//! │              +15       │  ← delta indicator, drifts up and fades
//! │ 好感度 37              │  ← counter, interpolated
//! │ ██████████░░░░░░░ 37%  │  ← meter, coloured by tier
//! │ 关系  朋友             │
//! │ 场景  学校 - 百团大战   │
//! │ 立绘  /static/images/… │
//! ╰────────────────────────╯
//! ```
//!
//! Everything animated is read from `StateSync` at the frame's `now`.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Gauge, Paragraph};

use crate::core::animation::INDICATOR_RISE_ROWS;
use crate::core::characters::Portrait;
use crate::core::sync::{StateSync, Tier};
use crate::tui::component::Component;
use crate::tui::components::truncate_to_width;

/// Rows the indicator can occupy above the counter.
const INDICATOR_ROWS: u16 = INDICATOR_RISE_ROWS as u16;

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Critical => Color::Red,
        Tier::Low => Color::Yellow,
        Tier::Mid => Color::Green,
        Tier::High => Color::Magenta,
    }
}

pub struct AffectionPanel<'a> {
    pub sync: &'a StateSync,
    pub character_name: &'a str,
    pub portrait: Option<&'a Portrait>,
    pub now: Instant,
}

impl<'a> AffectionPanel<'a> {
    pub fn new(
        sync: &'a StateSync,
        character_name: &'a str,
        portrait: Option<&'a Portrait>,
        now: Instant,
    ) -> Self {
        Self {
            sync,
            character_name,
            portrait,
            now,
        }
    }

    fn render_indicator(&self, frame: &mut Frame, area: Rect) {
        let Some(indicator) = self.sync.indicator(self.now) else {
            return;
        };
        let rise = (indicator.rise_at(self.now).round() as u16).min(INDICATOR_ROWS);
        let row = area.y + INDICATOR_ROWS - rise;
        if row < area.y || row >= area.y + area.height {
            return;
        }

        let color = if indicator.is_gain() {
            Color::LightGreen
        } else {
            Color::LightRed
        };
        let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if indicator.opacity_at(self.now) < 0.5 {
            style = style.remove_modifier(Modifier::BOLD).add_modifier(Modifier::DIM);
        }

        let label = indicator.label();
        let rect = Rect::new(area.x, row, area.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(label, style)).right_aligned(),
            rect,
        );
    }
}

impl<'a> Component for AffectionPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let tier = self.sync.tier();
        let color = tier_color(tier);
        let state = self.sync.state();

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color).add_modifier(Modifier::DIM))
            .title(Span::styled(
                format!(" {} ", self.character_name),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        use Constraint::{Length, Min};
        let [indicator_area, number_area, gauge_area, relationship_area, scene_area, portrait_area, _] =
            Layout::vertical([
                Length(INDICATOR_ROWS),
                Length(1),
                Length(1),
                Length(1),
                Length(1),
                Length(1),
                Min(0),
            ])
            .areas(inner);

        let displayed = self.sync.displayed_closeness(self.now);
        frame.render_widget(
            Line::from(vec![
                Span::styled("好感度 ", Style::default().fg(Color::Gray)),
                Span::styled(
                    displayed.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]),
            number_area,
        );

        // The counter row sits right under the indicator's lowest position.
        let indicator_span = Rect::new(
            indicator_area.x,
            indicator_area.y,
            indicator_area.width,
            indicator_area.height + 1,
        );
        self.render_indicator(frame, indicator_span);

        let fill = self.sync.fill_percent(self.now);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
            .ratio(fill / 100.0)
            .label(format!("{}%", fill.round() as i32))
            .use_unicode(true);
        frame.render_widget(gauge, gauge_area);

        let width = inner.width.saturating_sub(6) as usize;
        let label_line = |key: &'static str, value: &str| {
            Line::from(vec![
                Span::styled(key, Style::default().fg(Color::Gray)),
                Span::raw(truncate_to_width(value, width)),
            ])
        };
        frame.render_widget(
            label_line("关系  ", &state.relationship_label),
            relationship_area,
        );
        frame.render_widget(label_line("场景  ", &state.scene), scene_area);
        if let Some(portrait) = self.portrait {
            let dim = matches!(portrait, Portrait::Pending(_) | Portrait::Fallback);
            let mut line = label_line("立绘  ", portrait.path());
            if dim {
                line = line.style(Style::default().add_modifier(Modifier::DIM));
            }
            frame.render_widget(line, portrait_area);
        }
    }
}
