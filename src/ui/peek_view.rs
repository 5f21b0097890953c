use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::bubble_stack::{self, HitMap, HitTarget, Placement};
use super::character::{self, CharacterArt};
use crate::app::{PeekDirection, PeekTimeline};
use crate::notify::NotificationLevel;

/// peek 中に表示する内容
#[derive(Debug, Clone)]
pub struct PeekContent {
    pub art: CharacterArt,
    pub message: Option<String>,
    pub level: NotificationLevel,
    pub margin: u16,
    pub bubble_width: u16,
    pub direction: PeekDirection,
}

/// 画面端から出ているキャラクターの領域
///
/// `extent` is rows for the bottom edge and columns for the side edges. The
/// margin is measured from the bottom-right corner along the other axis.
pub fn character_rect(
    area: Rect,
    art: &CharacterArt,
    margin: u16,
    extent: u16,
    direction: PeekDirection,
) -> Rect {
    match direction {
        PeekDirection::Bottom => {
            let width = art.width().min(area.width);
            let height = extent.min(area.height);
            Rect {
                x: area.x + area.width.saturating_sub(margin.saturating_add(width)),
                y: area.bottom() - height,
                width,
                height,
            }
        }
        PeekDirection::Left | PeekDirection::Right => {
            let width = extent.min(area.width);
            let height = art.height().min(area.height);
            let x = if direction == PeekDirection::Left {
                area.x
            } else {
                area.right() - width
            };
            Rect {
                x,
                y: area.y + area.height.saturating_sub(margin.saturating_add(height)),
                width,
                height,
            }
        }
    }
}

/// 端に隠れていない部分だけ描画する
fn render_character(frame: &mut Frame, rect: Rect, art: &CharacterArt, direction: PeekDirection) {
    let lines: Vec<Line> = match direction {
        PeekDirection::Bottom => return character::render(frame, rect, art),
        // 右端: 左側の列から見え始める。はみ出しは Paragraph が切る
        PeekDirection::Right => art.lines().iter().map(|l| Line::from(l.as_str())).collect(),
        PeekDirection::Left => {
            let art_width = usize::from(art.width());
            let visible = usize::from(rect.width);
            art.lines()
                .iter()
                .map(|l| {
                    let padded = format!("{:<width$}", l, width = art_width);
                    if visible >= art_width {
                        Line::from(format!("{}{}", " ".repeat(visible - art_width), padded))
                    } else {
                        Line::from(padded.chars().skip(art_width - visible).collect::<String>())
                    }
                })
                .collect()
        }
    };

    let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::Cyan));
    frame.render_widget(paragraph, rect);
}

/// peek を描画
pub fn render(
    frame: &mut Frame,
    content: &PeekContent,
    timeline: &PeekTimeline,
    now: Instant,
    hits: &mut HitMap,
) {
    let area = frame.area();
    let extent = timeline.visible_rows(now);
    let rect = character_rect(area, &content.art, content.margin, extent, content.direction);
    if rect.area() == 0 {
        return;
    }

    render_character(frame, rect, &content.art, content.direction);
    hits.push(rect, HitTarget::Character);

    let Some(message) = content.message.as_deref() else {
        return;
    };
    if !timeline.shows_bubble(now) {
        return;
    }

    let height = bubble_stack::bubble_height(message, content.bubble_width);
    let middle = i32::from(rect.y) + i32::from(rect.height) / 2;
    // 左端から出たときだけ吹き出しは右側
    let x = if content.direction == PeekDirection::Left {
        i32::from(rect.right()) + 1
    } else {
        i32::from(rect.x) - 1 - i32::from(content.bubble_width)
    };
    let placement = Placement {
        x,
        y: middle - i32::from(height) / 2,
        width: content.bubble_width,
        height,
    };
    if let Some(bubble) = bubble_stack::draw_bubble(frame, area, placement, message, content.level) {
        hits.push(bubble, HitTarget::Character);
    }
}
