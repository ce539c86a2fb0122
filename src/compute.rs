//! Round logic.
//!
//! `tick` takes an immutable reference to the current `RoundState` and
//! returns a brand-new one.  The per-system helpers below work on `&mut`
//! pieces of that copy and are public so each system can be driven on its
//! own.

use tracing::{debug, info};

use crate::config::RoundConfig;
use crate::entities::{
    Enemy, Player, Projectile, Rect, RoundSnapshot, RoundState, RoundStatus,
};
use crate::input::InputSnapshot;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial round from the standard constants.
pub fn init_round() -> RoundState {
    init_round_with(&RoundConfig::default())
}

/// Build the initial round: centred player, full enemy grid, no projectiles.
pub fn init_round_with(config: &RoundConfig) -> RoundState {
    let (px, py) = config.player_spawn();
    let player = Player {
        rect: Rect::new(px, py, config.player_width, config.player_height),
        speed: config.player_speed,
        alive: true,
    };

    let enemies: Vec<Enemy> = (0..config.enemy_rows)
        .flat_map(|row| {
            (0..config.enemy_cols).map(move |col| Enemy {
                rect: Rect::new(
                    config.grid_origin_x + col as f32 * config.column_pitch,
                    config.grid_origin_y + row as f32 * config.row_pitch,
                    config.enemy_width,
                    config.enemy_height,
                ),
                alive: true,
                speed: config.enemy_speed,
                moving_right: true,
            })
        })
        .collect();

    info!(
        target: "invaders.round",
        rows = config.enemy_rows,
        cols = config.enemy_cols,
        "round started"
    );

    RoundState {
        player,
        projectiles: Vec::new(),
        enemies,
        score: 0,
        status: RoundStatus::Playing,
        frame: 0,
        config: *config,
    }
}

/// Read-only projection for the rendering host.
pub fn snapshot(state: &RoundState) -> RoundSnapshot<'_> {
    RoundSnapshot {
        player: &state.player,
        projectiles: &state.projectiles,
        enemies: &state.enemies,
        score: state.score,
        status: state.status,
        field_width: state.config.field_width,
        field_height: state.config.field_height,
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the round by one frame.  A finished round (or one whose player
/// is already down) comes back unchanged.
pub fn tick(state: &RoundState, input: InputSnapshot) -> RoundState {
    if state.status.is_over() || !state.player.alive {
        return state.clone();
    }

    let mut next = state.clone();
    let cfg = next.config;
    next.frame += 1;

    // ── 1. Player ────────────────────────────────────────────────────────────
    steer_player(&mut next.player, &input, cfg.field_width);
    if input.fire {
        fire(&next.player, &mut next.projectiles, &cfg);
    }

    // ── 2. Projectiles ───────────────────────────────────────────────────────
    advance_projectiles(&mut next.projectiles, cfg.projectile_step);

    // ── 3. Formation ─────────────────────────────────────────────────────────
    let formation = advance_formation(&mut next.enemies, &mut next.player, &cfg);

    // ── 4. Collisions + compaction ───────────────────────────────────────────
    let kills = resolve_collisions(&mut next.projectiles, &mut next.enemies);
    next.score = next.score.saturating_add(kills.saturating_mul(cfg.kill_score));

    // ── 5. Terminal conditions ───────────────────────────────────────────────
    next.status = round_status(&next.player, &next.enemies);
    if next.status.is_over() {
        info!(
            target: "invaders.round",
            status = ?next.status,
            score = next.score,
            frame = next.frame,
            reached_player = formation.reached_player,
            "round over"
        );
    }

    next
}

/// Loss is checked before win.
pub fn round_status(player: &Player, enemies: &[Enemy]) -> RoundStatus {
    if !player.alive {
        RoundStatus::Lost
    } else if enemies.is_empty() {
        RoundStatus::Won
    } else {
        RoundStatus::Playing
    }
}

// ── Player controller ────────────────────────────────────────────────────────

/// Move the player by its speed in the held direction(s), keeping the whole
/// box inside `[0, field_width]`.  Holding both directions cancels out.
pub fn steer_player(player: &mut Player, input: &InputSnapshot, field_width: f32) {
    if !player.alive {
        return;
    }
    let mut dx = 0.0;
    if input.left {
        dx -= player.speed;
    }
    if input.right {
        dx += player.speed;
    }
    let max_x = (field_width - player.rect.width).max(0.0);
    player.rect.x = (player.rect.x + dx).clamp(0.0, max_x);
}

/// Spawn one projectile centred on the player's top edge.
pub fn fire(player: &Player, projectiles: &mut Vec<Projectile>, config: &RoundConfig) {
    if !player.alive {
        return;
    }
    projectiles.push(Projectile {
        rect: Rect::new(
            player.rect.center_x() - config.projectile_width / 2.0,
            player.rect.y,
            config.projectile_width,
            config.projectile_height,
        ),
        active: true,
    });
}

// ── Projectile manager ───────────────────────────────────────────────────────

/// Move active projectiles up; those whose top edge leaves the field go
/// inactive.  Removal happens in `resolve_collisions`.
pub fn advance_projectiles(projectiles: &mut [Projectile], step: f32) {
    for p in projectiles.iter_mut().filter(|p| p.active) {
        p.rect.y -= step;
        if p.rect.y < 0.0 {
            p.active = false;
        }
    }
}

// ── Formation controller ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormationOutcome {
    /// The formation hit a side margin, dropped a row and reversed.
    pub descended: bool,
    /// An enemy reached the player's row; the player is now down.
    pub reached_player: bool,
}

/// Slide the formation sideways; if any enemy touched a margin, drop and
/// reverse every enemy once.  Then mark the player down if an enemy's
/// bottom edge has reached the player's top edge.
pub fn advance_formation(
    enemies: &mut [Enemy],
    player: &mut Player,
    config: &RoundConfig,
) -> FormationOutcome {
    let left_wall = config.side_margin;
    let right_wall = config.field_width - config.side_margin;

    // Move everyone first, only note whether a wall was touched.
    let mut hit_wall = false;
    for e in enemies.iter_mut().filter(|e| e.alive) {
        if e.moving_right {
            e.rect.x += e.speed;
            hit_wall |= e.rect.right() >= right_wall;
        } else {
            e.rect.x -= e.speed;
            hit_wall |= e.rect.x <= left_wall;
        }
    }

    if hit_wall {
        for e in enemies.iter_mut().filter(|e| e.alive) {
            e.rect.y += config.descent_step;
            e.moving_right = !e.moving_right;
        }
        debug!(target: "invaders.formation", "formation descended and reversed");
    }

    let reached_player = enemies
        .iter()
        .filter(|e| e.alive)
        .any(|e| e.rect.bottom() >= player.rect.y);
    if reached_player && player.alive {
        player.alive = false;
        debug!(target: "invaders.formation", player_y = player.rect.y, "formation reached the player");
    }

    FormationOutcome {
        descended: hit_wall,
        reached_player,
    }
}

// ── Collision resolver ───────────────────────────────────────────────────────

/// Pair every active projectile with the first live enemy it overlaps, kill
/// both, then drop dead enemies and inactive projectiles.  Returns the
/// number of kills.
///
/// Projectiles are visited in spawn order and enemies in grid order, so when
/// one projectile overlaps several enemies the earliest in the grid dies.
pub fn resolve_collisions(projectiles: &mut Vec<Projectile>, enemies: &mut Vec<Enemy>) -> u32 {
    let mut killed = vec![false; enemies.len()];
    let mut hits: Vec<(usize, usize)> = Vec::new();

    for (pi, p) in projectiles.iter().enumerate() {
        if !p.active {
            continue;
        }
        let target = enemies
            .iter()
            .enumerate()
            .find(|&(ei, e)| e.alive && !killed[ei] && p.rect.overlaps(&e.rect))
            .map(|(ei, _)| ei);
        if let Some(ei) = target {
            killed[ei] = true;
            hits.push((pi, ei));
        }
    }

    for &(pi, ei) in &hits {
        projectiles[pi].active = false;
        enemies[ei].alive = false;
        debug!(
            target: "invaders.collision",
            projectile = pi,
            enemy = ei,
            x = enemies[ei].rect.x,
            y = enemies[ei].rect.y,
            "enemy destroyed"
        );
    }

    projectiles.retain(|p| p.active);
    enemies.retain(|e| e.alive);

    hits.len() as u32
}
