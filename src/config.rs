//! アプリケーション設定管理モジュール
//! 盤面サイズ、スキル配布、AI探索深度、ルーム数の上限などを
//! 設定ファイルと環境変数から読み込んで管理する。

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, str::FromStr, time::Duration};
use tracing::{info, warn};

use crate::ai::Difficulty;
use crate::game::DEFAULT_BOARD_SIZE;

/// Duration型をJSONでシリアライズするためのモジュール
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Durationを(secs, nanos)のタプルとしてシリアライズ
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    /// (secs, nanos)のタプルからDurationをデシリアライズ
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos) = <(u64, u32)>::deserialize(deserializer)?;
        Ok(Duration::new(secs, nanos))
    }
}

/// 盤面サイズとして許される範囲
pub const BOARD_SIZE_RANGE: std::ops::RangeInclusive<usize> = 5..=25;
/// AI探索深度として許される範囲
pub const AI_DEPTH_RANGE: std::ops::RangeInclusive<u32> = 1..=6;

/// 対局の既定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub default_board_size: usize,
    pub default_skill_count_per_player: usize,
    pub default_skill_pool_id: String,
    pub enable_skills: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_board_size: DEFAULT_BOARD_SIZE,
            default_skill_count_per_player: 3,
            default_skill_pool_id: "standard".to_string(),
            enable_skills: true,
        }
    }
}

/// スキルプールの読み込み設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    /// 追加のプール定義（*.json）を置くディレクトリ
    pub pools_dir: Option<PathBuf>,
}

/// AIの探索設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub easy_depth: u32,
    pub medium_depth: u32,
    pub hard_depth: u32,
    /// 1手の計算時間の上限
    #[serde(with = "duration_serde")]
    pub max_calculation_time: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            easy_depth: 1,
            medium_depth: 2,
            hard_depth: 3,
            max_calculation_time: Duration::from_secs(10),
        }
    }
}

impl AiConfig {
    /// 難易度に対応する探索深度
    pub fn depth_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_depth,
            Difficulty::Medium => self.medium_depth,
            Difficulty::Hard => self.hard_depth,
        }
    }
}

/// システムの制限値を定義する構造体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemLimits {
    /// 同時に存在できるルーム数の上限
    pub max_rooms: usize,
    /// 無操作のルームを破棄するまでの時間（分）
    pub room_timeout_minutes: i64,
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            max_rooms: 100,
            room_timeout_minutes: 30,
        }
    }
}

/// アプリケーションの全設定を統合するメイン設定構造体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub skills: SkillConfig,
    pub ai: AiConfig,
    pub system_limits: SystemLimits,
}

/// 設定関連のエラーを表すenum
/// ファイル読み込み、パース、検証エラーなどを含む
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイル読み込みエラー: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("設定ファイル解析エラー: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("環境変数エラー: {name} = {value}")]
    EnvVarError { name: String, value: String },

    #[error("設定値が無効です: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

/// 設定ファイルの探索順
const CONFIG_CANDIDATES: [&str; 2] = ["config.json", "config/gomoku.json"];

/// 環境変数を読んで型変換する。未設定ならNone
fn env_value<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarError {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

impl Config {
    /// 指定したファイルパスから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 環境変数から設定を読み込む
    /// デフォルト値をベースに環境変数で上書きする
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 設定済みの値に環境変数を重ねる
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(size) = env_value("GOMOKU_BOARD_SIZE")? {
            self.game.default_board_size = size;
        }
        if let Some(count) = env_value("GOMOKU_SKILL_COUNT")? {
            self.game.default_skill_count_per_player = count;
        }
        if let Some(pool_id) = env_value("GOMOKU_SKILL_POOL")? {
            self.game.default_skill_pool_id = pool_id;
        }
        if let Some(dir) = env_value::<PathBuf>("GOMOKU_SKILL_POOLS_DIR")? {
            self.skills.pools_dir = Some(dir);
        }
        if let Some(enabled) = env_value("GOMOKU_ENABLE_SKILLS")? {
            self.game.enable_skills = enabled;
        }
        if let Some(depth) = env_value("GOMOKU_AI_HARD_DEPTH")? {
            self.ai.hard_depth = depth;
        }
        if let Some(max_rooms) = env_value("GOMOKU_MAX_ROOMS")? {
            self.system_limits.max_rooms = max_rooms;
        }
        Ok(())
    }

    /// 設定ファイルと環境変数を結合して設定を読み込む
    /// 設定ファイルがなくてもデフォルト値で動作する
    pub fn load() -> Self {
        let mut config = CONFIG_CANDIDATES
            .iter()
            .find_map(|path| match Self::from_file(path) {
                Ok(config) => {
                    info!(path = %path, "configuration loaded");
                    Some(config)
                }
                Err(_) => None,
            })
            .unwrap_or_default();

        // 環境変数で設定を上書き
        let mut overridden = config.clone();
        match overridden.apply_env() {
            Ok(()) => config = overridden,
            Err(e) => warn!(error = %e, "ignoring environment overrides"),
        }

        config
    }

    /// 現在の設定を指定したファイルに保存する
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定値の妥当性をチェックする
    /// 不正な値がある場合はConfigErrorを返す
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BOARD_SIZE_RANGE.contains(&self.game.default_board_size) {
            return Err(invalid("game.default_board_size", self.game.default_board_size));
        }

        if self.game.default_skill_pool_id.trim().is_empty() {
            return Err(invalid("game.default_skill_pool_id", &self.game.default_skill_pool_id));
        }

        for (field, depth) in [
            ("ai.easy_depth", self.ai.easy_depth),
            ("ai.medium_depth", self.ai.medium_depth),
            ("ai.hard_depth", self.ai.hard_depth),
        ] {
            if !AI_DEPTH_RANGE.contains(&depth) {
                return Err(invalid(field, depth));
            }
        }

        if self.system_limits.max_rooms == 0 {
            return Err(invalid("system_limits.max_rooms", self.system_limits.max_rooms));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.default_board_size, 15);
        assert_eq!(config.game.default_skill_pool_id, "standard");
        assert_eq!(config.ai.depth_for(Difficulty::Hard), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"game": {"default_board_size": 19}}"#).unwrap();
        assert_eq!(config.game.default_board_size, 19);
        assert_eq!(config.game.default_skill_count_per_player, 3);
        assert_eq!(config.system_limits.max_rooms, 100);
    }

    #[test]
    fn test_duration_serialized_as_tuple() {
        let json = serde_json::to_value(AiConfig::default()).unwrap();
        assert_eq!(json["max_calculation_time"], serde_json::json!([10, 0]));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.game.default_board_size = 4;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = Config::default();
        config.ai.hard_depth = 7;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.game.default_skill_pool_id = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.system_limits.max_rooms = 0;
        assert!(config.validate().is_err());
    }
}
