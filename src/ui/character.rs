use anyhow::{Context, Result};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use tracing::warn;

use crate::system::expand_tilde;

/// 組み込みのキャラクター
const BUILTIN_ART: &str = r"   .-----.
  /       \
 |  o   o  |
 |    ^    |
 |  \___/  |
  \       /
   '-----'
   /|   |\
  /_|   |_\";

/// マスコットのテキストアート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterArt {
    lines: Vec<String>,
}

impl CharacterArt {
    pub fn builtin() -> Self {
        Self::from_text(BUILTIN_ART)
    }

    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Self::builtin();
        }
        Self { lines }
    }

    /// ファイルから読み込む（`~` 展開あり）
    pub fn load(path: &str) -> Result<Self> {
        let path = expand_tilde(path);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read character file {}", path.display()))?;
        Ok(Self::from_text(&text))
    }

    /// 読めなければ組み込みアートを使う（デーモン用）
    pub fn load_or_builtin(path: Option<&str>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                warn!("{:#}, using built-in character", e);
                Self::builtin()
            }),
            None => Self::builtin(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn width(&self) -> u16 {
        let widest = self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        u16::try_from(widest).unwrap_or(u16::MAX)
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len()).unwrap_or(u16::MAX)
    }
}

/// 右下に置いたキャラクターの領域
///
/// `min_width` widens the slot beyond the art itself; the art is right-aligned
/// inside it.
pub fn anchor_rect(area: Rect, art: &CharacterArt, min_width: u16, margin: u16) -> Rect {
    let width = art.width().max(min_width).min(area.width.saturating_sub(margin));
    let height = art.height().min(area.height.saturating_sub(margin));
    Rect {
        x: area.x + area.width.saturating_sub(margin + width),
        y: area.y + area.height.saturating_sub(margin + height),
        width,
        height,
    }
}

/// キャラクターを描画。領域に収まる上側の行だけ表示する
pub fn render(frame: &mut Frame, area: Rect, art: &CharacterArt) {
    let visible = area.height as usize;
    let pad = area.width.saturating_sub(art.width()) as usize;
    let lines: Vec<Line> = art
        .lines()
        .iter()
        .take(visible)
        .map(|l| Line::from(format!("{}{}", " ".repeat(pad), l)))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::Cyan));
    frame.render_widget(paragraph, area);
}
