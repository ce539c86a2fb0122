//! Rendering layer — all terminal output lives here.
//!
//! Each function receives a mutable writer and a read-only snapshot of the
//! round.  No game logic is performed; field coordinates are scaled onto
//! whatever terminal grid the host reports.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::entities::{Enemy, Projectile, Rect, RoundSnapshot, RoundStatus};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_ENEMIES: Color = Color::Green;
const C_PLAYER: Color = Color::Blue;
const C_ENEMY: Color = Color::Green;
const C_PROJECTILE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

pub const CONTROLS_HINT: &str = "← → / A D : Move   SPACE : Shoot   Q : Quit";

/// Terminal size in cells, as reported by `crossterm::terminal::size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    // Play area sits inside the border: columns 1..width-1, rows 2..height-2.
    fn inner_width(&self) -> u16 {
        self.width.saturating_sub(2).max(1)
    }

    fn inner_height(&self) -> u16 {
        self.height.saturating_sub(4).max(1)
    }

    fn col(&self, x: f32, field_width: f32) -> u16 {
        1 + cell(x / field_width, self.inner_width())
    }

    fn row(&self, y: f32, field_height: f32) -> u16 {
        2 + cell(y / field_height, self.inner_height())
    }

    /// Last row covered by a box whose bottom edge is at `y`.
    fn last_row(&self, y: f32, field_height: f32) -> u16 {
        2 + last_cell(y / field_height, self.inner_height())
    }

    /// Leftmost column and cell count covered by `rect`, at least one cell.
    fn span(&self, rect: &Rect, field_width: f32) -> (u16, u16) {
        let inner = self.inner_width();
        let left = cell(rect.x / field_width, inner);
        let right = last_cell(rect.right() / field_width, inner).max(left);
        (1 + left, right - left + 1)
    }
}

/// Cell index containing the fraction `t` of a run of `cells` cells.
fn cell(t: f32, cells: u16) -> u16 {
    let c = (t * cells as f32).floor().max(0.0) as u16;
    c.min(cells - 1)
}

/// Cell index of an exclusive end at fraction `t`.
fn last_cell(t: f32, cells: u16) -> u16 {
    let c = ((t * cells as f32).ceil() - 1.0).max(0.0) as u16;
    c.min(cells - 1)
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    round: &RoundSnapshot<'_>,
    view: Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, round, view)?;

    for enemy in round.enemies {
        draw_enemy(out, enemy, round, view)?;
    }
    for projectile in round.projectiles {
        draw_projectile(out, projectile, round, view)?;
    }
    if round.player.alive {
        draw_player(out, round, view)?;
    }
    draw_controls_hint(out, view)?;

    match round.status {
        RoundStatus::Playing => {}
        RoundStatus::Won => draw_banner(out, round, view, "YOU  WIN", Color::Green)?,
        RoundStatus::Lost => draw_banner(out, round, view, "GAME OVER", Color::Red)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    round: &RoundSnapshot<'_>,
    view: Viewport,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("SCORE: {:04}", round.score)))?;

    let remaining = format!("Invaders: {}", round.enemies.len());
    let rx = view
        .width
        .saturating_sub(remaining.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_ENEMIES))?;
    out.queue(Print(&remaining))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    round: &RoundSnapshot<'_>,
    view: Viewport,
) -> std::io::Result<()> {
    //   ▲       ← top row (tip)
    //  /█\      ← next row, if the box is tall enough to reach it
    let rect = &round.player.rect;
    let (left, cells) = view.span(rect, round.field_width);
    let top = view.row(rect.y, round.field_height);
    let bottom = view.last_row(rect.bottom(), round.field_height);

    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(view.col(rect.center_x(), round.field_width), top))?;
    out.queue(Print("▲"))?;

    if bottom > top {
        out.queue(cursor::MoveTo(left, bottom))?;
        out.queue(Print(sprite(cells, '/', '█', '\\')))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(
    out: &mut W,
    enemy: &Enemy,
    round: &RoundSnapshot<'_>,
    view: Viewport,
) -> std::io::Result<()> {
    let (left, cells) = view.span(&enemy.rect, round.field_width);
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    out.queue(cursor::MoveTo(left, view.row(enemy.rect.y, round.field_height)))?;
    out.queue(Print(sprite(cells, '<', '▼', '>')))?;
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    projectile: &Projectile,
    round: &RoundSnapshot<'_>,
    view: Viewport,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(
        view.col(projectile.rect.center_x(), round.field_width),
        view.row(projectile.rect.y, round.field_height),
    ))?;
    out.queue(style::SetForegroundColor(C_PROJECTILE))?;
    out.queue(Print("║"))?;
    Ok(())
}

/// `cells` wide: caps at both ends once there is room for them.
fn sprite(cells: u16, left: char, fill: char, right: char) -> String {
    let cells = cells as usize;
    if cells < 3 {
        return fill.to_string().repeat(cells.max(1));
    }
    let mut s = String::with_capacity(cells * 3);
    s.push(left);
    s.extend(std::iter::repeat(fill).take(cells - 2));
    s.push(right);
    s
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(CONTROLS_HINT))?;
    Ok(())
}

// ── Round-over overlay ────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    round: &RoundSnapshot<'_>,
    view: Viewport,
    title: &str,
    color: Color,
) -> std::io::Result<()> {
    let title_line = format!("║{:^18}║", title);
    let score_line = format!("Final Score: {:04}", round.score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", color),
        (title_line.as_str(), color),
        ("╚══════════════════╝", color),
        (score_line.as_str(), Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = view.width / 2;
    let start_row = (view.height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
