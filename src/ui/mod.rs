pub mod bubble_stack;
pub mod character;
pub mod peek_view;

pub use bubble_stack::{HitMap, HitTarget};
pub use character::CharacterArt;
pub use peek_view::PeekContent;

use std::time::Instant;

use ratatui::Frame;

use crate::app::{BubbleQueue, PeekTimeline};

/// デーモン画面のレイアウト設定
#[derive(Debug, Clone)]
pub struct DaemonLayout {
    pub art: CharacterArt,
    /// キャラクター領域の幅
    pub size: u16,
    pub margin: u16,
    pub bubble_width: u16,
}

/// デーモン画面を描画（キャラクター + 吹き出しスタック）
pub fn render_daemon(
    frame: &mut Frame,
    layout: &DaemonLayout,
    queue: &BubbleQueue,
    now: Instant,
    hits: &mut HitMap,
) {
    let area = frame.area();
    hits.clear();

    let character_area = character::anchor_rect(area, &layout.art, layout.size, layout.margin);
    character::render(frame, character_area, &layout.art);
    hits.push(character_area, HitTarget::Character);

    bubble_stack::render(
        frame,
        area,
        queue,
        character_area,
        layout.bubble_width,
        now,
        hits,
    );
}

/// peek 画面を描画
pub fn render_peek(
    frame: &mut Frame,
    content: &PeekContent,
    timeline: &PeekTimeline,
    now: Instant,
    hits: &mut HitMap,
) {
    hits.clear();
    peek_view::render(frame, content, timeline, now, hits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationLevel;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_daemon_screen_hits() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let layout = DaemonLayout {
            art: CharacterArt::builtin(),
            size: 16,
            margin: 1,
            bubble_width: 40,
        };
        let mut queue = BubbleQueue::new(5, 1);
        let (id, _) = queue.push("hello".to_string(), NotificationLevel::Info, 3, None);
        let mut hits = HitMap::default();
        hits.push(ratatui::layout::Rect::new(0, 0, 1, 1), HitTarget::Character);

        terminal
            .draw(|frame| render_daemon(frame, &layout, &queue, Instant::now(), &mut hits))
            .unwrap();

        // stale regions are dropped each frame
        assert_eq!(hits.hit(0, 0), None);
        // character slot: 16 wide, 9 tall, bottom-right with margin 1
        assert_eq!(hits.hit(70, 20), Some(HitTarget::Character));
        // newest bubble centred on the character's middle row (14 + 4 = 18)
        assert_eq!(hits.hit(40, 18), Some(HitTarget::Bubble(id)));
    }
}
