//! Stacking notification bubbles
//!
//! Bubbles never expire on their own. They leave when clicked (after a short
//! exit transition) or when the queue is full and a new one arrives, in which
//! case the oldest is evicted immediately.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use crate::focus::BubbleFocusInfo;
use crate::notify::NotificationLevel;

/// 退場アニメーションの長さ
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleId(Uuid);

impl BubbleId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleState {
    Visible,
    /// Clicked, sliding out
    Leaving { since: Instant },
}

#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub message: String,
    pub level: NotificationLevel,
    /// 描画時の高さ（行数）
    pub height: u16,
    /// 最新の吹き出しからの縦方向オフセット（行数）
    pub offset: u16,
    pub focus_info: Option<BubbleFocusInfo>,
    pub state: BubbleState,
}

impl Bubble {
    pub fn is_leaving(&self) -> bool {
        matches!(self.state, BubbleState::Leaving { .. })
    }

    /// 退場アニメーションの進捗（0.0〜1.0）
    pub fn exit_progress(&self, now: Instant) -> f32 {
        match self.state {
            BubbleState::Visible => 0.0,
            BubbleState::Leaving { since } => {
                let elapsed = now.saturating_duration_since(since);
                (elapsed.as_secs_f32() / EXIT_DURATION.as_secs_f32()).min(1.0)
            }
        }
    }
}

/// 吹き出しのスタック（古い順）
#[derive(Debug)]
pub struct BubbleQueue {
    bubbles: VecDeque<Bubble>,
    capacity: usize,
    spacing: u16,
}

impl BubbleQueue {
    pub fn new(capacity: usize, spacing: u16) -> Self {
        Self {
            bubbles: VecDeque::new(),
            capacity: capacity.max(1),
            spacing,
        }
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 古い順
    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// 最新の吹き出し
    pub fn last(&self) -> Option<&Bubble> {
        self.bubbles.back()
    }

    /// 吹き出しを追加
    ///
    /// Evicts the oldest bubble when full, then pushes every existing bubble
    /// up by the new bubble's height plus spacing. Returns the evicted bubble.
    pub fn push(
        &mut self,
        message: String,
        level: NotificationLevel,
        height: u16,
        focus_info: Option<BubbleFocusInfo>,
    ) -> (BubbleId, Option<Bubble>) {
        let evicted = if self.bubbles.len() >= self.capacity {
            self.bubbles.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            debug!("Bubble evicted: {:?}", old.message);
        }

        let delta = height.saturating_add(self.spacing);
        for bubble in self.bubbles.iter_mut() {
            bubble.offset = bubble.offset.saturating_add(delta);
        }

        let id = BubbleId::new();
        self.bubbles.push_back(Bubble {
            id,
            message,
            level,
            height,
            offset: 0,
            focus_info,
            state: BubbleState::Visible,
        });
        (id, evicted)
    }

    /// クリックで退場を開始
    ///
    /// Returns the bubble only on the first click; a bubble that is already
    /// leaving (or gone) yields `None`, so focus fires at most once.
    pub fn dismiss(&mut self, id: BubbleId, now: Instant) -> Option<&Bubble> {
        let bubble = self.bubbles.iter_mut().find(|b| b.id == id)?;
        if bubble.is_leaving() {
            return None;
        }
        bubble.state = BubbleState::Leaving { since: now };
        Some(bubble)
    }

    /// 即座に削除。残りの位置は詰めない
    pub fn remove(&mut self, id: BubbleId) -> Option<Bubble> {
        let index = self.bubbles.iter().position(|b| b.id == id)?;
        self.bubbles.remove(index)
    }

    /// 退場アニメーションが終わった吹き出しを削除
    pub fn reap(&mut self, now: Instant) -> usize {
        let before = self.bubbles.len();
        self.bubbles.retain(|b| match b.state {
            BubbleState::Visible => true,
            BubbleState::Leaving { since } => now.saturating_duration_since(since) < EXIT_DURATION,
        });
        before - self.bubbles.len()
    }

    /// 退場中の吹き出しがあるか（再描画の要否判定用）
    pub fn is_animating(&self) -> bool {
        self.bubbles.iter().any(Bubble::is_leaving)
    }
}
