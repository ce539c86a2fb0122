//! All round entity types — pure data, no logic beyond geometry helpers.

use crate::config::RoundConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Playing,
    Won,
    Lost,
}

impl RoundStatus {
    pub fn is_over(self) -> bool {
        self != RoundStatus::Playing
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned box in field units.  `y` grows downward, so `y` is the top
/// edge and `y + height` the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Strict overlap on both axes; boxes that only share an edge do not
    /// overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    /// Horizontal distance covered per tick while a direction is held.
    pub speed: f32,
    pub alive: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub rect: Rect,
    pub active: bool,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub alive: bool,
    /// Horizontal distance covered per tick.
    pub speed: f32,
    pub moving_right: bool,
}

// ── Round state ───────────────────────────────────────────────────────────────

/// The entire state of one round.  Cloneable so `tick` can hand back a new
/// value without touching the caller's copy.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub player: Player,
    /// Active projectiles in spawn order.
    pub projectiles: Vec<Projectile>,
    /// Live enemies in row-major grid order.
    pub enemies: Vec<Enemy>,
    pub score: u32,
    pub status: RoundStatus,
    pub frame: u64,
    pub config: RoundConfig,
}

/// Read-only view handed to the rendering host.
#[derive(Clone, Copy, Debug)]
pub struct RoundSnapshot<'a> {
    pub player: &'a Player,
    pub projectiles: &'a [Projectile],
    pub enemies: &'a [Enemy],
    pub score: u32,
    pub status: RoundStatus,
    pub field_width: f32,
    pub field_height: f32,
}
