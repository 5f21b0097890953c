use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    style::Stylize,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use peekaboo::app::{
    daemon, next_interval, Action, AppEvent, Config, DaemonController, PeekDirection,
    PeekTimeline, SystemEnv, poll_event,
};
use peekaboo::focus::{default_raiser, focus_in_background, BubbleFocusInfo, SharedRaiser};
use peekaboo::hooks::read_stdin_payload;
use peekaboo::notify::{
    DaemonError, DaemonPaths, DaemonServer, NotificationLevel, NotificationMessage, NotifyClient,
};
use peekaboo::system::detect_caller_app;
use peekaboo::ui::{self, CharacterArt, DaemonLayout, HitMap, HitTarget, PeekContent};

/// 環境変数が設定されていればデバッグログを出す
const DEBUG_ENV: &str = "PEEKABOO_DEBUG";

/// 受信チャネルの容量
const CHANNEL_CAPACITY: usize = 100;

/// Peekaboo - a terminal mascot that shows notifications from your tools
#[derive(Parser)]
#[command(name = "peekaboo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notification daemon with the bubble stack view
    Daemon(DaemonArgs),
    /// Send a notification to the running daemon
    Notify(NotifyArgs),
    /// Show whether the daemon is running
    Status,
    /// Peek in once and leave (default)
    Peek(PeekArgs),
}

#[derive(Args)]
struct DaemonArgs {
    /// Character text-art file
    #[arg(long)]
    character: Option<String>,
    /// Width of the character slot in columns
    #[arg(long)]
    size: Option<u16>,
    /// Margin from the terminal edges
    #[arg(long)]
    margin: Option<u16>,
    /// Default display duration in seconds
    #[arg(long)]
    duration: Option<f64>,
}

#[derive(Args, Default)]
struct MessageArgs {
    /// Message text (supports $dir, $branch, $cwd, $event, $tool)
    #[arg(short, long)]
    text: Option<String>,
    /// Notification level (info, success, warning, error)
    #[arg(short, long, default_value = "info")]
    level: NotificationLevel,
    /// Sound file to play
    #[arg(long)]
    sound: Option<String>,
    /// Working directory of the caller (defaults to the current directory)
    #[arg(long)]
    cwd: Option<String>,
    /// Calling application, e.g. the TERM_PROGRAM value
    #[arg(short, long, env = "PEEKABOO_CALLER")]
    caller: Option<String>,
    /// Read hook JSON from stdin
    #[arg(long)]
    hooks: bool,
}

#[derive(Args)]
struct NotifyArgs {
    #[command(flatten)]
    message: MessageArgs,
    /// Display duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,
}

#[derive(Args, Default)]
struct PeekArgs {
    #[command(flatten)]
    message: MessageArgs,
    /// Character text-art file
    #[arg(long)]
    character: Option<String>,
    /// How long to stay, in seconds
    #[arg(short, long)]
    duration: Option<f64>,
    /// Slide in/out duration in seconds
    #[arg(short, long)]
    animation: Option<f64>,
    /// How far to peek out (rows, or columns from the side edges)
    #[arg(short = 'p', long = "peek")]
    peek_height: Option<u16>,
    /// Margin from the bottom-right corner
    #[arg(short, long)]
    margin: Option<u16>,
    /// Do not focus the caller on click
    #[arg(long)]
    no_click: bool,
    /// Keep peeking at random intervals until clicked or quit
    #[arg(short, long)]
    random: bool,
    /// Pick a random edge (bottom, left, right) for every peek
    #[arg(long)]
    random_direction: bool,
    /// Shortest pause between random peeks, in seconds
    #[arg(long = "min")]
    min_interval: Option<f64>,
    /// Longest pause between random peeks, in seconds
    #[arg(long = "max")]
    max_interval: Option<f64>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // 設定を先に読み込む（ファイルがなければ作成）
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}, using defaults", e);
        Config::default()
    });

    let command = cli.command.unwrap_or_else(|| Commands::Peek(PeekArgs::default()));
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let owns_terminal = matches!(command, Commands::Daemon(_) | Commands::Peek(_));
    let (file_level, stderr_debug) =
        log_targets(level, std::env::var_os(DEBUG_ENV).is_some(), owns_terminal);
    init_logging(file_level, stderr_debug)?;

    let paths = DaemonPaths::from_temp_dir();

    match command {
        Commands::Daemon(args) => run_daemon(config, args, paths),
        Commands::Notify(args) => handle_notify(args, &paths),
        Commands::Status => handle_status(&paths),
        Commands::Peek(args) => run_peek(config, args),
    }
}

/// ログの出力先: ファイルのレベルと stderr 層の有無
///
/// The debug toggle raises the file log to debug in every mode. TUI modes
/// own the terminal, so only they skip the stderr layer.
fn log_targets(level: &str, debug: bool, owns_terminal: bool) -> (&str, bool) {
    if debug {
        ("debug", !owns_terminal)
    } else {
        (level, false)
    }
}

fn init_logging(level: &str, stderr_debug: bool) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "peekaboo")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("peekaboo"));

    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("peekaboo.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = stderr_debug.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_filter(filter),
        )
        .with(stderr_layer)
        .init();

    debug!("Peekaboo starting (pid {})", std::process::id());
    Ok(())
}

/// CLI 引数から送信する通知を組み立てる
fn build_message(args: MessageArgs, duration: Option<f64>) -> NotificationMessage {
    let hooks_json = if args.hooks {
        read_stdin_payload().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    } else {
        None
    };

    let cwd = args.cwd.or_else(|| {
        std::env::current_dir()
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    });
    let caller_app = args.caller.or_else(detect_caller_app);

    NotificationMessage {
        message: args.text,
        level: args.level,
        sound: args.sound,
        duration,
        cwd,
        caller_app,
        hooks_json,
    }
}

fn handle_notify(args: NotifyArgs, paths: &DaemonPaths) -> Result<()> {
    let message = build_message(args.message, args.duration);
    let client = NotifyClient::new(paths);

    let response = client.send(&message)?;
    if !response.success {
        anyhow::bail!(response.error.unwrap_or_else(|| "Unknown error".to_string()));
    }

    info!("Notification sent successfully");
    Ok(())
}

fn handle_status(paths: &DaemonPaths) -> Result<()> {
    let client = NotifyClient::new(paths);
    if client.is_daemon_running() {
        match paths.read_pid() {
            Some(pid) => println!("Daemon is running (pid {})", pid),
            None => println!("Daemon is running"),
        }
        println!("Socket: {}", client.socket_path().display());
    } else {
        println!("Daemon is not running");
    }
    Ok(())
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn leave_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_daemon(mut config: Config, args: DaemonArgs, paths: DaemonPaths) -> Result<()> {
    // CLI 引数で設定を上書き
    if args.character.is_some() {
        config.daemon.character = args.character;
    }
    if let Some(size) = args.size {
        config.daemon.size = size;
    }
    if let Some(margin) = args.margin {
        config.daemon.margin = margin;
    }
    if let Some(duration) = args.duration {
        config.daemon.default_duration = duration;
    }

    if NotifyClient::new(&paths).is_daemon_running() {
        return Err(DaemonError::AlreadyRunning.into());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let (notify_tx, notify_rx) = mpsc::channel::<NotificationMessage>(CHANNEL_CAPACITY);
    let server = {
        let _guard = runtime.enter();
        DaemonServer::start(paths, notify_tx)?
    };

    let layout = DaemonLayout {
        art: CharacterArt::load_or_builtin(config.daemon.character.as_deref()),
        size: config.daemon.size,
        margin: config.daemon.margin,
        bubble_width: config.daemon.bubble_width,
    };
    let mut controller = DaemonController::new(&config, SystemEnv);
    let raiser = default_raiser();
    info!("Daemon started (focus via {})", raiser.name());

    let mut terminal = enter_terminal()?;
    let result = run_daemon_loop(&mut terminal, &layout, &mut controller, &raiser, notify_rx);
    let restored = leave_terminal(&mut terminal);

    runtime.block_on(server.shutdown());
    info!("Daemon stopped");

    result.and(restored)
}

fn run_daemon_loop(
    terminal: &mut Tui,
    layout: &DaemonLayout,
    controller: &mut DaemonController<SystemEnv>,
    raiser: &SharedRaiser,
    mut notify_rx: mpsc::Receiver<NotificationMessage>,
) -> Result<()> {
    let mut hits = HitMap::default();

    loop {
        // 受信済みの通知をすべて処理（ノンブロッキング）
        while let Ok(message) = notify_rx.try_recv() {
            controller.handle(&message);
        }

        let now = Instant::now();
        controller.tick(now);

        terminal.draw(|frame| {
            ui::render_daemon(frame, layout, controller.queue(), now, &mut hits);
        })?;

        // 退場アニメーション中は細かく描画
        let timeout = if controller.queue().is_animating() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        if let Some(event) = poll_event(timeout)? {
            match event {
                AppEvent::Key(key) => {
                    if Action::from(key) == Action::Quit {
                        break;
                    }
                }
                AppEvent::Click(column, row) => match hits.hit(column, row) {
                    Some(HitTarget::Bubble(id)) => {
                        if let Some(info) = controller.click_bubble(id, Instant::now()) {
                            focus_in_background(info, Arc::clone(raiser));
                        }
                    }
                    Some(HitTarget::Character) => {
                        if let Some(info) = controller.click_character() {
                            focus_in_background(info, Arc::clone(raiser));
                        }
                    }
                    None => {}
                },
                AppEvent::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

/// CLI 引数で peek 設定を上書き
fn apply_peek_args(config: &mut Config, args: &PeekArgs) {
    let peek = &mut config.peek;
    if let Some(duration) = args.duration {
        peek.display_duration = duration;
    }
    if let Some(animation) = args.animation {
        peek.animation_duration = animation;
    }
    if let Some(height) = args.peek_height {
        peek.peek_height = height;
    }
    if let Some(margin) = args.margin {
        peek.margin = margin;
    }
    if args.no_click {
        peek.clickable = false;
    }
    if args.random {
        peek.random = true;
    }
    if args.random_direction {
        peek.random_direction = true;
    }
    if let Some(min) = args.min_interval {
        peek.random_min_interval = min;
    }
    if let Some(max) = args.max_interval {
        peek.random_max_interval = max;
    }
}

fn run_peek(mut config: Config, args: PeekArgs) -> Result<()> {
    apply_peek_args(&mut config, &args);

    // peek ではキャラクターファイルが読めなければ終了
    let art = match args.character.or_else(|| config.peek.character.clone()) {
        Some(path) => CharacterArt::load(&path)?,
        None => CharacterArt::builtin(),
    };

    let message = build_message(args.message, None);
    let resolved = daemon::resolve(&message, &SystemEnv);
    let (text, focus_info) = match resolved {
        Some(resolved) => {
            let sound = resolved.sound.as_deref().or(config.default_sound.as_deref());
            if let Some(sound) = sound {
                peekaboo::system::sound::play(sound);
            }
            (Some(resolved.text), resolved.focus_info)
        }
        None => (
            None,
            BubbleFocusInfo::new(message.cwd.clone(), message.caller_app.clone()),
        ),
    };

    let mut content = PeekContent {
        art,
        message: text,
        level: message.level,
        margin: config.peek.margin,
        bubble_width: config.daemon.bubble_width,
        direction: config.peek.direction,
    };

    let mut terminal = enter_terminal()?;
    let mut focus = None;
    let result = run_peek_loop(&mut terminal, &config, &mut content, &focus_info, &mut focus);
    let restored = leave_terminal(&mut terminal);

    // フォーカスが終わるまで待ってから終了
    if let Some(handle) = focus {
        if !handle.join().unwrap_or(false) {
            warn!("Could not focus caller window");
        }
    }

    result.and(restored)
}

/// peek の終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeekEnd {
    /// 時間切れで引っ込んだ
    Finished,
    /// クリックか終了キー
    Stopped,
}

fn run_peek_loop(
    terminal: &mut Tui,
    config: &Config,
    content: &mut PeekContent,
    focus_info: &BubbleFocusInfo,
    focus: &mut Option<JoinHandle<bool>>,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut hits = HitMap::default();

    loop {
        if config.peek.random_direction {
            content.direction = PeekDirection::random(&mut rng);
        }
        debug!("Peeking from {:?}", content.direction);

        let end = peek_once(terminal, config, content, focus_info, focus, &mut hits)?;
        if end == PeekEnd::Stopped || !config.peek.random {
            break;
        }

        let wait = next_interval(
            config.peek.random_min_interval,
            config.peek.random_max_interval,
            &mut rng,
        );
        debug!("Next peek in {:.1}s", wait.as_secs_f64());
        if wait_between_peeks(terminal, wait)? == PeekEnd::Stopped {
            break;
        }
    }

    Ok(())
}

fn peek_once(
    terminal: &mut Tui,
    config: &Config,
    content: &PeekContent,
    focus_info: &BubbleFocusInfo,
    focus: &mut Option<JoinHandle<bool>>,
    hits: &mut HitMap,
) -> Result<PeekEnd> {
    let mut timeline = PeekTimeline::new(&config.peek, Instant::now());
    let mut end = PeekEnd::Finished;

    loop {
        let now = Instant::now();
        if timeline.is_done(now) {
            break;
        }

        terminal
            .draw(|frame| ui::render_peek(frame, content, &timeline, now, hits))
            .context("Failed to draw peek")?;

        if let Some(event) = poll_event(Duration::from_millis(16))? {
            match event {
                AppEvent::Key(key) => {
                    if Action::from(key) == Action::Quit {
                        timeline.begin_exit(Instant::now());
                        end = PeekEnd::Stopped;
                    }
                }
                AppEvent::Click(column, row) => {
                    if config.peek.clickable
                        && hits.hit(column, row).is_some()
                        && timeline.begin_exit(Instant::now())
                    {
                        *focus = focus_in_background(focus_info.clone(), default_raiser());
                        end = PeekEnd::Stopped;
                    }
                }
                AppEvent::Resize(_, _) => {}
            }
        }
    }

    Ok(end)
}

/// 次の peek まで画面を空けて待つ。終了キーで打ち切り
fn wait_between_peeks(terminal: &mut Tui, wait: Duration) -> Result<PeekEnd> {
    terminal
        .draw(|_| {})
        .context("Failed to clear peek")?;
    let deadline = Instant::now() + wait;

    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(PeekEnd::Finished);
        }
        let timeout = (deadline - now).min(Duration::from_millis(100));
        if let Some(AppEvent::Key(key)) = poll_event(timeout)? {
            if Action::from(key) == Action::Quit {
                return Ok(PeekEnd::Stopped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peek_args(argv: &[&str]) -> PeekArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Peek(args)) => args,
            _ => panic!("expected the peek command"),
        }
    }

    #[test]
    fn test_debug_toggle_raises_file_level_in_every_mode() {
        // daemon and peek draw on the terminal: file only
        assert_eq!(log_targets("warn", true, true), ("debug", false));
        assert_eq!(log_targets("warn", true, false), ("debug", true));
        assert_eq!(log_targets("warn", false, true), ("warn", false));
        assert_eq!(log_targets("info", false, false), ("info", false));
    }

    #[test]
    fn test_random_peek_flags() {
        let args = peek_args(&[
            "peekaboo", "peek", "-r", "--random-direction", "--min", "5", "--max", "10", "-a",
            "0.2", "-p", "6", "-m", "2",
        ]);
        let mut config = Config::default();
        apply_peek_args(&mut config, &args);

        assert!(config.peek.random);
        assert!(config.peek.random_direction);
        assert_eq!(config.peek.random_min_interval, 5.0);
        assert_eq!(config.peek.random_max_interval, 10.0);
        assert_eq!(config.peek.animation_duration, 0.2);
        assert_eq!(config.peek.peek_height, 6);
        assert_eq!(config.peek.margin, 2);
        assert!(config.peek.clickable);
    }

    #[test]
    fn test_peek_flags_leave_config_alone_when_absent() {
        let args = peek_args(&["peekaboo", "peek", "-t", "hi", "--no-click"]);
        let mut config = Config::default();
        config.peek.random = true;
        apply_peek_args(&mut config, &args);

        assert!(config.peek.random);
        assert!(!config.peek.clickable);
        assert_eq!(config.peek.random_min_interval, 30.0);
        assert_eq!(config.peek.random_max_interval, 120.0);
        assert_eq!(config.peek.peek_height, Config::default().peek.peek_height);
    }
}
