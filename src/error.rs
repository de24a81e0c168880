//! アプリケーション全体のエラー定義モジュール
//! 盤上のルール違反はエラーではなくNoneで表す。ここで扱うのは設定・基盤側の失敗のみ。

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// ルーム管理など基盤レベルのエラー
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: Uuid },

    #[error("Room is full: {room_id}")]
    RoomFull { room_id: Uuid },

    #[error("Room limit exceeded (max {max})")]
    RoomLimitExceeded { max: usize },

    #[error("Invalid room option {field}: {value}")]
    InvalidRoomOptions { field: String, value: String },

    #[error("Player {player_id} is already in room {room_id}")]
    AlreadyInRoom { player_id: String, room_id: Uuid },

    #[error("Skill pool error: {source}")]
    SkillPool {
        #[from]
        source: SkillPoolError,
    },

    #[error("AI calculation failed: {source}")]
    AIError {
        #[from]
        source: AIError,
    },
}

/// スキルプール設定に関するエラー
/// 起動時の設定不備を示すもので、対局中の操作では発生しない
#[derive(Debug, Error)]
pub enum SkillPoolError {
    #[error("Skill pool not found: {pool_id}")]
    PoolNotFound { pool_id: String },

    #[error("Duplicate skill pool id: {pool_id}")]
    DuplicatePool { pool_id: String },

    #[error("Skill {skill_id} is defined differently in pools {first_pool} and {second_pool}")]
    ConflictingSkill {
        skill_id: String,
        first_pool: String,
        second_pool: String,
    },

    #[error("Invalid skill {skill_id} in pool {pool_id}: {reason}")]
    InvalidSkill {
        pool_id: String,
        skill_id: String,
        reason: String,
    },

    #[error("Skill pool I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Skill pool parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// AI探索に関するエラー
#[derive(Debug, Error)]
pub enum AIError {
    #[error("AI calculation timeout")]
    Timeout,

    #[error("No valid moves available")]
    NoValidMoves,

    #[error("AI strategy error: {message}")]
    StrategyError { message: String },

    #[error("AI service unavailable: {service_name} ({reason})")]
    ServiceUnavailable { service_name: String, reason: String },
}

/// ゲームエラーをベースとした結果型
pub type Result<T> = std::result::Result<T, GameError>;
