use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use space_invaders::display::{self, Viewport};
use space_invaders::{
    init_round_with, snapshot, tick, FireLatch, InputSnapshot, RoundConfig, RoundState,
};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// OS key-repeat runs at ≥ 15 Hz, so 8 frames (≈133 ms) is refreshed before
/// expiry while the key is repeating.
const HOLD_WINDOW: u64 = 8;

/// Hold window for fire without key-release events.  Must outlast the OS
/// repeat delay (250-600 ms) or a held Space reads as a second press when the
/// first repeat arrives.  40 frames ≈ 667 ms.
const FIRE_HOLD_WINDOW: u64 = 40;

const FIRE_KEY: KeyCode = KeyCode::Char(' ');

/// Environment variable naming the log file.
const LOG_ENV: &str = "INVADERS_LOG";

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    held_within(key_frame, key, frame, HOLD_WINDOW)
}

fn held_within(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64, window: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= window)
        .unwrap_or(false)
}

/// With release events Space is down from Press until Release, however long
/// the gap before the first repeat.  Without them fall back to a wide window.
fn fire_held(key_frame: &HashMap<KeyCode, u64>, frame: u64, keyboard_enhanced: bool) -> bool {
    if keyboard_enhanced {
        key_frame.contains_key(&FIRE_KEY)
    } else {
        held_within(key_frame, &FIRE_KEY, frame, FIRE_HOLD_WINDOW)
    }
}

/// Press and Repeat refresh the key's frame; Release forgets the key.
fn record_key(key_frame: &mut HashMap<KeyCode, u64>, code: KeyCode, kind: KeyEventKind, frame: u64) {
    match kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {
            key_frame.insert(code, frame);
        }
        KeyEventKind::Release => {
            key_frame.remove(&code);
        }
    }
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the renderer, so logs go to a file.
fn init_tracing() -> Result<PathBuf> {
    let path = std::env::var_os(LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("space_invaders.log"));
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(path)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
}

/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key, and each frame the still-fresh keys become one
/// `InputSnapshot`.  Fire goes through a `FireLatch`, so holding Space fires
/// once until the key is released.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut RoundState,
    rx: &mpsc::Receiver<Event>,
    keyboard_enhanced: bool,
) -> Result<LoopExit> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut latch = FireLatch::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            record_key(&mut key_frame, code, kind, frame);
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(LoopExit::Quit);
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(LoopExit::Quit);
                }
                KeyCode::Char('r') | KeyCode::Char('R') if state.status.is_over() => {
                    return Ok(LoopExit::Restart);
                }
                _ => {}
            }
        }

        let left = any_held(
            &key_frame,
            &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
            frame,
        );
        let right = any_held(
            &key_frame,
            &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
            frame,
        );
        let fire_down = fire_held(&key_frame, frame, keyboard_enhanced);

        let input = InputSnapshot::from_keys(left, right, fire_down, &mut latch);
        *state = tick(state, input);

        let (width, height) = terminal::size()?;
        display::render(out, &snapshot(state), Viewport::new(width, height))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let log_path = init_tracing()?;
    // Read config before touching the terminal so errors print normally.
    let config = RoundConfig::from_env().context("failed to load round config")?;
    info!(log = %log_path.display(), ?config, "starting");

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events; terminals without the kitty protocol
    // fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the frame loop never waits.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &rx, &config, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &RoundConfig,
    keyboard_enhanced: bool,
) -> Result<()> {
    loop {
        let mut state = init_round_with(config);
        let exit = game_loop(out, &mut state, rx, keyboard_enhanced)?;
        info!(status = ?state.status, score = state.score, frame = state.frame, "round closed");
        match exit {
            LoopExit::Quit => return Ok(()),
            LoopExit::Restart => continue,
        }
    }
}
