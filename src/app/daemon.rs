//! Daemon-side handling of incoming notifications
//!
//! Turns a [`NotificationMessage`] into display text (hook normalization,
//! default messages, template expansion) and owns the bubble queue. Only the
//! main loop touches a [`DaemonController`].

use std::cell::OnceCell;
use std::time::Instant;

use tracing::debug;

use super::bubbles::{BubbleId, BubbleQueue};
use super::config::Config;
use crate::focus::BubbleFocusInfo;
use crate::hooks::HooksContext;
use crate::notify::{NotificationLevel, NotificationMessage};
use crate::system::{self, GitInfo};
use crate::template::{self, TemplateContext};
use crate::ui::bubble_stack;

/// 通知処理が外部に頼る操作（テストで差し替える）
pub trait NotificationEnv {
    fn git_info(&self, cwd: &str) -> GitInfo;
    fn detect_caller(&self) -> Option<String>;
    fn play_sound(&self, path: &str);
}

/// 実環境: git2、プロセスツリー、afplay/paplay
pub struct SystemEnv;

impl NotificationEnv for SystemEnv {
    fn git_info(&self, cwd: &str) -> GitInfo {
        GitInfo::lookup(cwd)
    }

    fn detect_caller(&self) -> Option<String> {
        system::detect_caller_app()
    }

    fn play_sound(&self, path: &str) {
        system::sound::play(path);
    }
}

/// 表示用に解決済みの通知
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNotification {
    pub text: String,
    pub level: NotificationLevel,
    pub sound: Option<String>,
    pub focus_info: BubbleFocusInfo,
}

/// メッセージ本文を決定する
///
/// Hook payloads contribute cwd, caller, event and tool names, and a
/// default message when none was given. Text containing `$` is template
/// expanded whether or not hooks were present. Returns `None` when there is
/// nothing to show.
pub fn resolve(message: &NotificationMessage, env: &dyn NotificationEnv) -> Option<ResolvedNotification> {
    let hooks = message.hooks_json.as_deref().and_then(HooksContext::parse_str);
    if message.hooks_json.is_some() && hooks.is_none() {
        debug!("hooksJson could not be normalized, using explicit message");
    }

    let mut cwd = message.cwd.clone();
    let mut caller_app = message.caller_app.clone();
    let mut event_name = None;
    let mut tool_name = None;

    if let Some(ctx) = &hooks {
        if ctx.cwd.is_some() {
            cwd = ctx.cwd.clone();
        }
        if caller_app.is_none() {
            caller_app = env.detect_caller();
        }
        event_name = Some(ctx.event_name().to_string());
        tool_name = ctx.tool_name.clone();
        if let Some(desc) = ctx.tool_description() {
            debug!("Hook {} tool: {}", ctx.event_name(), desc);
        }
    }

    let git = OnceCell::new();

    let mut text = message.message.clone();
    if text.is_none() {
        if let Some(ctx) = &hooks {
            let info = lookup_git(&git, cwd.as_deref(), env);
            text = Some(ctx.generate_default_message(
                info.repository_name.as_deref(),
                info.branch.as_deref(),
            ));
        }
    }

    if let Some(template_text) = text.as_deref().filter(|t| t.contains('$')) {
        let context = TemplateContext::new(
            cwd.clone(),
            lookup_git(&git, cwd.as_deref(), env).branch.clone(),
            event_name,
            tool_name,
        );
        text = Some(template::expand(template_text, &context));
    }

    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        debug!("No message to display");
        return None;
    };

    Some(ResolvedNotification {
        text,
        level: message.level,
        sound: message.sound.clone(),
        focus_info: BubbleFocusInfo::new(cwd, caller_app),
    })
}

/// git の問い合わせは遅いので1回だけ
fn lookup_git<'a>(cell: &'a OnceCell<GitInfo>, cwd: Option<&str>, env: &dyn NotificationEnv) -> &'a GitInfo {
    cell.get_or_init(|| cwd.map(|c| env.git_info(c)).unwrap_or_default())
}

/// デーモンモードの状態（吹き出しスタック）
pub struct DaemonController<E: NotificationEnv> {
    env: E,
    queue: BubbleQueue,
    bubble_width: u16,
    default_duration: f64,
    default_sound: Option<String>,
}

impl<E: NotificationEnv> DaemonController<E> {
    pub fn new(config: &Config, env: E) -> Self {
        Self {
            env,
            queue: BubbleQueue::new(config.daemon.max_bubbles, config.daemon.bubble_spacing),
            bubble_width: config.daemon.bubble_width,
            default_duration: config.daemon.default_duration,
            default_sound: config.default_sound.clone(),
        }
    }

    pub fn queue(&self) -> &BubbleQueue {
        &self.queue
    }

    /// 通知を処理（即座に表示、キューイングなし）
    pub fn handle(&mut self, message: &NotificationMessage) -> Option<BubbleId> {
        let resolved = resolve(message, &self.env)?;

        debug!(
            "Showing bubble: level={} duration={}s text={:?}",
            resolved.level.as_str(),
            message.duration.unwrap_or(self.default_duration),
            resolved.text
        );

        if let Some(sound) = resolved.sound.as_deref().or(self.default_sound.as_deref()) {
            self.env.play_sound(sound);
        }

        let height = bubble_stack::bubble_height(&resolved.text, self.bubble_width);
        let (id, _evicted) = self.queue.push(
            resolved.text,
            resolved.level,
            height,
            Some(resolved.focus_info),
        );
        Some(id)
    }

    /// 吹き出しクリック: 退場を開始し、フォーカス先を返す（1回だけ）
    ///
    /// The caller performs the focus off the UI thread.
    pub fn click_bubble(&mut self, id: BubbleId, now: Instant) -> Option<BubbleFocusInfo> {
        let bubble = self.queue.dismiss(id, now)?;
        bubble.focus_info.clone()
    }

    /// キャラクタークリック: 最新の吹き出しの呼び出し元
    pub fn click_character(&self) -> Option<BubbleFocusInfo> {
        self.queue.last().and_then(|b| b.focus_info.clone())
    }

    /// 退場が終わった吹き出しを片付ける
    pub fn tick(&mut self, now: Instant) -> usize {
        self.queue.reap(now)
    }
}
