//! スキル五目並べのセルフプレイデモ
//! 設定を読み込み、AI同士の対局を1局最後まで進めて結果を表示する。

use std::sync::Arc;

use skill_gomoku::{
    ai::{AIService, Difficulty, LocalAIService},
    config::Config,
    game::{GameState, Outcome, Stone},
    session::{RoomManager, RoomOptions},
    skills::SkillPoolManager,
    GameError,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PLAYERS: [(&str, &str, Difficulty); 2] = [
    ("ai-black", "Black AI", Difficulty::Hard),
    ("ai-white", "White AI", Difficulty::Medium),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 設定ファイルと環境変数から統合設定を読み込み
    let config = Config::load();
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    match self_play(&config).await {
        Ok(state) => {
            println!("{}", state.board.display());
            match state.winner {
                Some(Outcome::Win(stone)) => println!("勝者: {:?}（{}手）", stone, state.history.len()),
                Some(Outcome::Draw) => println!("引き分け（{}手）", state.history.len()),
                None => println!("対局は終了していません"),
            }
        }
        Err(e) => {
            error!(error = %e, "self-play failed");
            std::process::exit(1);
        }
    }
}

/// AI同士で1局打つ
async fn self_play(config: &Config) -> Result<GameState, GameError> {
    let mut pools = SkillPoolManager::with_builtin_pools();
    if let Some(dir) = &config.skills.pools_dir {
        let loaded = pools.load_dir(dir)?;
        info!(loaded, dir = ?dir, "custom skill pools loaded");
    }

    let manager = RoomManager::new(Arc::new(pools), &config.system_limits);
    let ai = LocalAIService::new(config.ai.clone());

    let room_id = manager.create_room(RoomOptions::from_config(&config.game))?;
    for (player_id, username, _) in PLAYERS {
        manager.join_room(room_id, player_id, username)?;
    }

    loop {
        let state = manager.get_state(room_id)?;
        if state.is_finished() {
            return Ok(state);
        }

        let (player_id, _, difficulty) = match state.current_player {
            Stone::Black => PLAYERS[0],
            Stone::White => PLAYERS[1],
        };

        // 2手打ちのカードがあれば手番の最初に使う
        if state.remaining_moves == 1 {
            let double = state
                .current_player_state()
                .available_cards()
                .find(|card| card.skill_id == "double_move")
                .map(|card| card.id.clone());
            if let Some(card_id) = double {
                if manager.use_skill(room_id, player_id, &card_id, None)?.is_some() {
                    info!(player_id, "double move activated");
                }
            }
        }

        let state = manager.get_state(room_id)?;
        let placed = match ai.calculate_move(&state, state.current_player, difficulty).await {
            Ok(result) => manager.place_stone(room_id, player_id, result.position)?,
            Err(e) => {
                warn!(player_id, error = %e, "AI could not move");
                None
            }
        };
        if placed.is_none() {
            manager.resign(room_id, player_id)?;
        }
    }
}
