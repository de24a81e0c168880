use async_trait::async_trait;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::error::AIError;
use crate::game::{GameState, Stone};

use super::service::{AIMoveResult, AIService};
use super::strategies::{Difficulty, MinimaxAI};

/// 同一プロセス内で探索するAIサービス
/// 探索はブロッキングスレッドで実行し、設定の上限時間で打ち切る
#[derive(Debug, Clone, Default)]
pub struct LocalAIService {
    config: AiConfig,
}

impl LocalAIService {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}

#[async_trait]
impl AIService for LocalAIService {
    async fn calculate_move(
        &self,
        game_state: &GameState,
        ai_color: Stone,
        difficulty: Difficulty,
    ) -> Result<AIMoveResult, AIError> {
        let start_time = Instant::now();

        if game_state.is_finished() {
            return Err(AIError::StrategyError {
                message: "Cannot calculate move for finished game".to_string(),
            });
        }

        let depth = self.config.depth_for(difficulty);
        let ai = MinimaxAI::new(depth, ai_color);
        let snapshot = game_state.clone();

        let task = tokio::task::spawn_blocking(move || ai.search(&snapshot));
        let result = match timeout(self.config.max_calculation_time, task).await {
            Ok(Ok(Some(result))) => result,
            Ok(Ok(None)) => return Err(AIError::NoValidMoves),
            Ok(Err(join_error)) => {
                return Err(AIError::StrategyError {
                    message: join_error.to_string(),
                })
            }
            Err(_) => {
                warn!(depth, "AI calculation timed out");
                return Err(AIError::Timeout);
            }
        };

        let thinking_time_ms = start_time.elapsed().as_millis() as u64;
        debug!(position = ?result.position, thinking_time_ms, nodes = result.nodes, "AI move calculated");

        Ok(AIMoveResult {
            position: result.position,
            thinking_time_ms,
            evaluation_score: Some(result.score),
            depth_reached: Some(depth),
            nodes_evaluated: Some(result.nodes),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn get_supported_difficulties(&self) -> Vec<Difficulty> {
        vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    fn get_name(&self) -> &'static str {
        "LocalAIService"
    }
}
