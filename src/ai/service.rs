//! AIサービスの抽象化層モジュール
//! 探索はCPU負荷の高い同期処理なので、呼び出し側（ルーム）からは
//! 非同期インターフェースを通して使う。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::strategies::Difficulty;
use crate::error::AIError;
use crate::game::{GameState, Position, Stone};

/// AIの手の計算結果を表す構造体
/// 選択した位置と計算の統計情報を含む
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIMoveResult {
    /// AIが選択した手の位置
    pub position: Position,
    /// 思考時間（ミリ秒）
    pub thinking_time_ms: u64,
    /// 盤面評価値
    pub evaluation_score: Option<i64>,
    /// 探索した深度
    pub depth_reached: Option<u32>,
    /// 評価したノード数
    pub nodes_evaluated: Option<u64>,
}

/// AIサービスの状態情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIServiceStatus {
    pub name: String,
    pub available: bool,
    pub supported_difficulties: Vec<Difficulty>,
    pub last_check: DateTime<Utc>,
    pub average_response_time_ms: Option<u64>,
}

/// AIサービスの統一インターフェース
#[async_trait]
pub trait AIService: Send + Sync {
    /// 指定した色・難易度でAIの手を計算する
    async fn calculate_move(
        &self,
        game_state: &GameState,
        ai_color: Stone,
        difficulty: Difficulty,
    ) -> Result<AIMoveResult, AIError>;

    /// サービスが利用可能かチェックする
    async fn is_available(&self) -> bool;

    /// サポートしている難易度レベルの一覧を返す
    fn get_supported_difficulties(&self) -> Vec<Difficulty>;

    /// サービス名を返す
    fn get_name(&self) -> &'static str;

    /// サービスの健全性チェックを実行し、レスポンス時間も測定する
    async fn health_check(&self) -> Result<AIServiceStatus, AIError> {
        let start_time = std::time::Instant::now();
        let available = self.is_available().await;
        let response_time = start_time.elapsed().as_millis() as u64;

        if available {
            Ok(AIServiceStatus {
                name: self.get_name().to_string(),
                available: true,
                supported_difficulties: self.get_supported_difficulties(),
                last_check: Utc::now(),
                average_response_time_ms: Some(response_time),
            })
        } else {
            Err(AIError::ServiceUnavailable {
                service_name: self.get_name().to_string(),
                reason: "Service health check failed".to_string(),
            })
        }
    }
}
