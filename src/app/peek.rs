//! One-shot peek timeline
//!
//! The character rises from a screen edge with a small overshoot, stays for
//! the display duration, then sinks back. A click cuts the stay short.
//! In random mode the next peek is scheduled after a random pause.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::PeekConfig;

/// 跳ね上がりの行数
pub const OVERSHOOT_ROWS: f32 = 2.0;

/// 上昇アニメーションのうちオーバーシュートまでの割合
const OVERSHOOT_SHARE: f32 = 0.6;

/// キャラクターが顔を出す画面端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeekDirection {
    #[default]
    Bottom,
    Left,
    Right,
}

impl PeekDirection {
    pub const ALL: [PeekDirection; 3] = [Self::Bottom, Self::Left, Self::Right];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL.choose(rng).copied().unwrap_or_default()
    }

    /// 左右の端から出るときは列方向に伸びる
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// 次に顔を出すまでの待ち時間。min と max が逆でも範囲として扱う
pub fn next_interval<R: Rng + ?Sized>(min_secs: f64, max_secs: f64, rng: &mut R) -> Duration {
    let low = min_secs.min(max_secs).max(0.0);
    let high = min_secs.max(max_secs).max(0.0);
    if high > low {
        seconds(rng.gen_range(low..=high))
    } else {
        seconds(low)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekPhase {
    Rising,
    Showing,
    Sinking,
    Done,
}

#[derive(Debug, Clone)]
pub struct PeekTimeline {
    start: Instant,
    animation: Duration,
    display: Duration,
    peek_height: f32,
    /// 早期退場（開始時刻, その時点の表示行数）
    early_exit: Option<(Instant, f32)>,
}

fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

fn ease_in(t: f32) -> f32 {
    t * t
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

impl PeekTimeline {
    pub fn new(config: &PeekConfig, now: Instant) -> Self {
        Self {
            start: now,
            animation: seconds(config.animation_duration),
            display: seconds(config.display_duration),
            peek_height: f32::from(config.peek_height),
            early_exit: None,
        }
    }

    fn progress(elapsed: Duration, total: Duration) -> f32 {
        if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
        }
    }

    /// 退場の開始時刻と開始時の高さ
    fn exit_start(&self) -> (Instant, f32) {
        self.early_exit
            .unwrap_or((self.start + self.animation + self.display, self.peek_height))
    }

    pub fn phase(&self, now: Instant) -> PeekPhase {
        let (exit_at, _) = self.exit_start();
        if now >= exit_at {
            if now.saturating_duration_since(exit_at) >= self.animation {
                PeekPhase::Done
            } else {
                PeekPhase::Sinking
            }
        } else if now.saturating_duration_since(self.start) < self.animation {
            PeekPhase::Rising
        } else {
            PeekPhase::Showing
        }
    }

    /// 画面端から見えている量（小数）。左右の端では列数
    pub fn height_at(&self, now: Instant) -> f32 {
        match self.phase(now) {
            PeekPhase::Rising => {
                let elapsed = now.saturating_duration_since(self.start);
                let overshoot_time = self.animation.mul_f32(OVERSHOOT_SHARE);
                let peak = self.peek_height + OVERSHOOT_ROWS;
                if elapsed < overshoot_time {
                    peak * ease_out(Self::progress(elapsed, overshoot_time))
                } else {
                    let t = Self::progress(elapsed - overshoot_time, self.animation - overshoot_time);
                    peak - OVERSHOOT_ROWS * ease_in_out(t)
                }
            }
            PeekPhase::Showing => self.peek_height,
            PeekPhase::Sinking => {
                let (exit_at, from) = self.exit_start();
                let t = Self::progress(now.saturating_duration_since(exit_at), self.animation);
                from * (1.0 - ease_in(t))
            }
            PeekPhase::Done => 0.0,
        }
    }

    pub fn visible_rows(&self, now: Instant) -> u16 {
        self.height_at(now).round().max(0.0) as u16
    }

    /// 吹き出しは静止表示中のみ
    pub fn shows_bubble(&self, now: Instant) -> bool {
        self.phase(now) == PeekPhase::Showing
    }

    /// クリックなどで退場を前倒し。すでに退場中なら何もしない
    pub fn begin_exit(&mut self, now: Instant) -> bool {
        match self.phase(now) {
            PeekPhase::Rising | PeekPhase::Showing => {
                let height = self.height_at(now);
                self.early_exit = Some((now, height));
                true
            }
            PeekPhase::Sinking | PeekPhase::Done => false,
        }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.phase(now) == PeekPhase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> PeekConfig {
        PeekConfig {
            animation_duration: 1.0,
            display_duration: 2.0,
            peek_height: 10,
            ..Default::default()
        }
    }

    fn at(start: Instant, secs: f64) -> Instant {
        start + Duration::from_secs_f64(secs)
    }

    #[test]
    fn test_phases_follow_durations() {
        let t0 = Instant::now();
        let timeline = PeekTimeline::new(&config(), t0);

        assert_eq!(timeline.phase(t0), PeekPhase::Rising);
        assert_eq!(timeline.phase(at(t0, 1.5)), PeekPhase::Showing);
        assert_eq!(timeline.phase(at(t0, 3.5)), PeekPhase::Sinking);
        assert_eq!(timeline.phase(at(t0, 4.0)), PeekPhase::Done);
        assert!(timeline.is_done(at(t0, 10.0)));
    }

    #[test]
    fn test_rise_overshoots_then_settles() {
        let t0 = Instant::now();
        let timeline = PeekTimeline::new(&config(), t0);

        assert_eq!(timeline.visible_rows(t0), 0);
        assert_eq!(timeline.visible_rows(at(t0, 0.6)), 12);
        assert_eq!(timeline.visible_rows(at(t0, 1.0)), 10);
        assert_eq!(timeline.visible_rows(at(t0, 2.0)), 10);
        assert!(timeline.shows_bubble(at(t0, 2.0)));
        assert!(!timeline.shows_bubble(at(t0, 0.3)));
    }

    #[test]
    fn test_sink_is_monotonic() {
        let t0 = Instant::now();
        let timeline = PeekTimeline::new(&config(), t0);
        let samples: Vec<f32> = (0..=10)
            .map(|i| timeline.height_at(at(t0, 3.0 + f64::from(i) / 10.0)))
            .collect();
        assert!(samples.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(timeline.visible_rows(at(t0, 4.0)), 0);
    }

    #[test]
    fn test_click_exits_early_once() {
        let t0 = Instant::now();
        let mut timeline = PeekTimeline::new(&config(), t0);

        assert!(timeline.begin_exit(at(t0, 1.5)));
        assert_eq!(timeline.phase(at(t0, 1.6)), PeekPhase::Sinking);
        assert!(!timeline.begin_exit(at(t0, 1.6)));
        assert!(timeline.is_done(at(t0, 2.5)));
    }

    #[test]
    fn test_zero_durations() {
        let t0 = Instant::now();
        let cfg = PeekConfig {
            animation_duration: 0.0,
            display_duration: 0.0,
            ..Default::default()
        };
        let timeline = PeekTimeline::new(&cfg, t0);
        assert!(timeline.is_done(t0));
    }

    #[test]
    fn test_next_interval_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let wait = next_interval(30.0, 120.0, &mut rng);
            assert!(wait >= Duration::from_secs(30));
            assert!(wait <= Duration::from_secs(120));
        }
    }

    #[test]
    fn test_next_interval_swapped_and_degenerate_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let wait = next_interval(10.0, 2.0, &mut rng);
        assert!(wait >= Duration::from_secs(2) && wait <= Duration::from_secs(10));
        assert_eq!(next_interval(5.0, 5.0, &mut rng), Duration::from_secs(5));
        assert_eq!(next_interval(-3.0, -1.0, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_random_direction_covers_every_edge() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: Vec<PeekDirection> = (0..100).map(|_| PeekDirection::random(&mut rng)).collect();
        for direction in PeekDirection::ALL {
            assert!(seen.contains(&direction));
        }
        assert!(PeekDirection::Left.is_horizontal());
        assert!(!PeekDirection::Bottom.is_horizontal());
    }
}
