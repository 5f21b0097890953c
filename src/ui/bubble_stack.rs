//! Speech bubbles stacked to the left of the character
//!
//! The newest bubble is centred on the character's middle row; older ones sit
//! above it by their accumulated offsets. Anything outside the frame is
//! clipped. Rendering also records where each bubble landed so mouse clicks
//! can be mapped back to a bubble.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
    Frame,
};

use crate::app::{Bubble, BubbleId, BubbleQueue};
use crate::notify::NotificationLevel;

/// 吹き出しとキャラクターの間隔（列数）
const GAP: u16 = 1;
/// 枠線と左右パディングの合計幅
const CHROME_WIDTH: u16 = 4;
/// 上下の枠線
const CHROME_HEIGHT: u16 = 2;

/// レベルごとの背景色
pub fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => Color::White,
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Error => Color::Red,
    }
}

/// 単語単位で折り返す。長すぎる単語は途中で切る
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            if current_len > 0 && current_len + 1 + chars.len() <= width {
                current.push(' ');
                current.extend(chars.iter());
                current_len += 1 + chars.len();
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            while chars.len() > width {
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            current_len = chars.len();
            current = chars.into_iter().collect();
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 吹き出しの高さ（枠線込み）
pub fn bubble_height(text: &str, bubble_width: u16) -> u16 {
    let inner = bubble_width.saturating_sub(CHROME_WIDTH);
    let rows = u16::try_from(wrap_text(text, inner).len()).unwrap_or(u16::MAX);
    rows.saturating_add(CHROME_HEIGHT)
}

/// クリック対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Bubble(BubbleId),
    Character,
}

/// 描画した領域とクリック対象の対応
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, HitTarget)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, target: HitTarget) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, target));
        }
    }

    /// 最後に描いたものが手前
    pub fn hit(&self, column: u16, row: u16) -> Option<HitTarget> {
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| {
                column >= area.x
                    && column < area.x.saturating_add(area.width)
                    && row >= area.y
                    && row < area.y.saturating_add(area.height)
            })
            .map(|(_, target)| *target)
    }
}

/// 吹き出しの配置（クリップ前の符号付き座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

fn place(bubble: &Bubble, character: Rect, bubble_width: u16, now: Instant) -> Placement {
    let center = i32::from(character.y) + i32::from(character.height) / 2;
    let height = bubble.height.max(CHROME_HEIGHT + 1);
    let bottom = center + (i32::from(height) + 1) / 2 - i32::from(bubble.offset);
    let right = i32::from(character.x) - i32::from(GAP);

    // 退場中は右へスライド
    let slide = (bubble.exit_progress(now) * f32::from(bubble_width + GAP)).round() as i32;

    Placement {
        x: right - i32::from(bubble_width) + slide,
        y: bottom - i32::from(height),
        width: bubble_width,
        height,
    }
}

/// 画面内に収まる部分と、上側で切れた行数
fn clip(placement: Placement, area: Rect) -> Option<(Rect, u16)> {
    let left = placement.x.max(i32::from(area.x));
    let top = placement.y.max(i32::from(area.y));
    let right = (placement.x + i32::from(placement.width)).min(i32::from(area.right()));
    let bottom = (placement.y + i32::from(placement.height)).min(i32::from(area.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    let rect = Rect {
        x: u16::try_from(left).ok()?,
        y: u16::try_from(top).ok()?,
        width: u16::try_from(right - left).ok()?,
        height: u16::try_from(bottom - top).ok()?,
    };
    let clipped_top = u16::try_from(top - placement.y).unwrap_or(0);
    Some((rect, clipped_top))
}

/// 吹き出し1つを描画
///
/// `placement` may extend past `area`; the visible part is drawn and returned.
pub(crate) fn draw_bubble(
    frame: &mut Frame,
    area: Rect,
    placement: Placement,
    message: &str,
    level: NotificationLevel,
) -> Option<Rect> {
    let (rect, clipped_top) = clip(placement, area)?;

    let mut borders = Borders::ALL;
    if clipped_top > 0 {
        borders.remove(Borders::TOP);
    }
    let block = Block::default()
        .borders(borders)
        .border_type(BorderType::Rounded)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(level_color(level)).fg(Color::Black));

    let inner_width = placement.width.saturating_sub(CHROME_WIDTH);
    let text = wrap_text(message, inner_width).join("\n");
    let paragraph = Paragraph::new(text)
        .block(block)
        .scroll((clipped_top.saturating_sub(1), 0));

    frame.render_widget(paragraph, rect);
    Some(rect)
}

/// 吹き出しを描画してクリック領域を記録
pub fn render(
    frame: &mut Frame,
    area: Rect,
    queue: &BubbleQueue,
    character: Rect,
    bubble_width: u16,
    now: Instant,
    hits: &mut HitMap,
) {
    for bubble in queue.iter() {
        let placement = place(bubble, character, bubble_width, now);
        if let Some(rect) = draw_bubble(frame, area, placement, &bubble.message, bubble.level) {
            hits.push(rect, HitTarget::Bubble(bubble.id));
        }
    }
}
