use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// Field and entity constants for a standard round.

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 50.0;
/// Distance from the field bottom to the player's top edge.
pub const PLAYER_BOTTOM_GAP: f32 = 50.0;
pub const PLAYER_SPEED: f32 = 5.0;

pub const PROJECTILE_WIDTH: f32 = 5.0;
pub const PROJECTILE_HEIGHT: f32 = 10.0;
pub const PROJECTILE_STEP: f32 = 5.0;

pub const ENEMY_ROWS: usize = 5;
pub const ENEMY_COLS: usize = 10;
pub const ENEMY_WIDTH: f32 = 40.0;
pub const ENEMY_HEIGHT: f32 = 30.0;
pub const GRID_ORIGIN_X: f32 = 50.0;
pub const GRID_ORIGIN_Y: f32 = 50.0;
pub const COLUMN_PITCH: f32 = 60.0;
pub const ROW_PITCH: f32 = 40.0;
pub const ENEMY_SPEED: f32 = 1.0;
pub const DESCENT_STEP: f32 = 20.0;
pub const SIDE_MARGIN: f32 = 10.0;

pub const KILL_SCORE: u32 = 10;

/// Environment variable naming an optional TOML file with overrides.
pub const CONFIG_ENV: &str = "INVADERS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every tunable of a round.  Missing TOML keys fall back to the constants
/// above, so a file only needs the values it changes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundConfig {
    pub field_width: f32,
    pub field_height: f32,

    pub player_width: f32,
    pub player_height: f32,
    pub player_bottom_gap: f32,
    pub player_speed: f32,

    pub projectile_width: f32,
    pub projectile_height: f32,
    pub projectile_step: f32,

    pub enemy_rows: usize,
    pub enemy_cols: usize,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub grid_origin_x: f32,
    pub grid_origin_y: f32,
    pub column_pitch: f32,
    pub row_pitch: f32,
    pub enemy_speed: f32,
    pub descent_step: f32,
    pub side_margin: f32,

    pub kill_score: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_bottom_gap: PLAYER_BOTTOM_GAP,
            player_speed: PLAYER_SPEED,
            projectile_width: PROJECTILE_WIDTH,
            projectile_height: PROJECTILE_HEIGHT,
            projectile_step: PROJECTILE_STEP,
            enemy_rows: ENEMY_ROWS,
            enemy_cols: ENEMY_COLS,
            enemy_width: ENEMY_WIDTH,
            enemy_height: ENEMY_HEIGHT,
            grid_origin_x: GRID_ORIGIN_X,
            grid_origin_y: GRID_ORIGIN_Y,
            column_pitch: COLUMN_PITCH,
            row_pitch: ROW_PITCH,
            enemy_speed: ENEMY_SPEED,
            descent_step: DESCENT_STEP,
            side_margin: SIDE_MARGIN,
            kill_score: KILL_SCORE,
        }
    }
}

impl RoundConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let cfg: RoundConfig = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Load from the file named by `INVADERS_CONFIG`, or the defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Top-left corner of the player at round start.
    pub fn player_spawn(&self) -> (f32, f32) {
        (
            self.field_width / 2.0 - self.player_width / 2.0,
            self.field_height - self.player_bottom_gap,
        )
    }

    /// Bottom edge of the lowest enemy row at round start.
    pub fn formation_bottom(&self) -> f32 {
        self.grid_origin_y + (self.enemy_rows.saturating_sub(1)) as f32 * self.row_pitch
            + self.enemy_height
    }

    /// Right edge of the rightmost enemy column at round start.
    pub fn formation_right(&self) -> f32 {
        self.grid_origin_x + (self.enemy_cols.saturating_sub(1)) as f32 * self.column_pitch
            + self.enemy_width
    }

    /// Score for clearing the whole grid, or `None` if it does not fit a `u32`.
    pub fn max_score(&self) -> Option<u32> {
        let rows = u32::try_from(self.enemy_rows).ok()?;
        let cols = u32::try_from(self.enemy_cols).ok()?;
        rows.checked_mul(cols)?.checked_mul(self.kill_score)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("projectile_width", self.projectile_width),
            ("projectile_height", self.projectile_height),
            ("projectile_step", self.projectile_step),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        for (field, value) in [
            ("player_speed", self.player_speed),
            ("enemy_speed", self.enemy_speed),
            ("descent_step", self.descent_step),
            ("side_margin", self.side_margin),
            ("column_pitch", self.column_pitch),
            ("row_pitch", self.row_pitch),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(field, format!("must not be negative, got {value}")));
            }
        }

        if self.enemy_rows == 0 {
            return Err(invalid("enemy_rows", "formation needs at least one row".into()));
        }
        if self.enemy_cols == 0 {
            return Err(invalid("enemy_cols", "formation needs at least one column".into()));
        }
        if self.kill_score == 0 {
            return Err(invalid("kill_score", "must be positive".into()));
        }
        if self.max_score().is_none() {
            return Err(invalid(
                "kill_score",
                format!(
                    "{} per kill over a {}x{} grid overflows the score",
                    self.kill_score, self.enemy_rows, self.enemy_cols
                ),
            ));
        }
        if self.player_width > self.field_width {
            return Err(invalid(
                "player_width",
                format!("{} does not fit a field {} wide", self.player_width, self.field_width),
            ));
        }
        if self.player_bottom_gap < self.player_height || self.player_bottom_gap > self.field_height
        {
            return Err(invalid(
                "player_bottom_gap",
                format!(
                    "player must sit inside the field (gap {}, height {})",
                    self.player_bottom_gap, self.player_height
                ),
            ));
        }
        let (_, player_top) = self.player_spawn();
        if self.formation_bottom() >= player_top {
            return Err(invalid(
                "enemy_rows",
                format!(
                    "formation reaches y={} but the player starts at y={}",
                    self.formation_bottom(),
                    player_top
                ),
            ));
        }
        let right_wall = self.field_width - self.side_margin;
        if self.formation_right() >= right_wall {
            return Err(invalid(
                "enemy_cols",
                format!(
                    "formation spans to x={} but the right margin is at x={}",
                    self.formation_right(),
                    right_wall
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
