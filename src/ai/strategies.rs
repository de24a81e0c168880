//! AI戦略の実装モジュール
//! αβ枝刈り付きミニマックス探索で次の一手を求める。
//! 候補手は既存の石から2マス以内の空きマスに限定し、封鎖ゾーンは除外する。

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::evaluation::{BoardEvaluator, FIVE_SCORE};
use crate::config::AiConfig;
use crate::error::AIError;
use crate::game::{is_position_blocked, Board, BlockedZone, Cell, GameState, GomokuRules, Position, Stone};

/// 候補手を探す範囲（既存の石からのチェビシェフ距離）
pub const CANDIDATE_RADIUS: isize = 2;

/// AIの難易度を表すenum
/// 設定で探索深度に対応づける
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// AI戦略の共通インターフェース
pub trait AIStrategy: Send + Sync {
    /// ゲーム状態から次の一手を計算する
    fn calculate_move(&self, game_state: &GameState) -> Result<Position, AIError>;
    /// 探索深度
    fn depth(&self) -> u32;
    /// AIの名前を返す
    fn get_name(&self) -> &'static str;
}

/// 探索結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub position: Position,
    pub score: i64,
    /// 評価したノード数
    pub nodes: u64,
}

/// ミニマックス法（αβ枝刈り）を使用するAI実装
#[derive(Debug, Clone)]
pub struct MinimaxAI {
    /// 探索深度（手数）
    pub depth: u32,
    /// AIが担当する色（最大化側）
    pub color: Stone,
}

impl MinimaxAI {
    pub fn new(depth: u32, color: Stone) -> Self {
        MinimaxAI {
            depth: depth.max(1),
            color,
        }
    }

    /// 最善手を探索する
    /// 空き盤面なら中央を返し、探索は行わない
    pub fn search(&self, state: &GameState) -> Option<SearchResult> {
        let board = &state.board;
        if board.count_stones() == 0 {
            let center = board.center();
            let opening = if is_position_blocked(center, &state.blocked_zones, state.turn) {
                Self::first_open_cell(state)?
            } else {
                center
            };
            return Some(SearchResult {
                position: opening,
                score: 0,
                nodes: 0,
            });
        }

        let mut search = Search {
            board: board.clone(),
            zones: &state.blocked_zones,
            base_turn: state.turn,
            ai: self.color,
            nodes: 0,
        };

        let mut moves = search.candidates(0);
        if moves.is_empty() {
            moves.extend(Self::first_open_cell(state));
        }

        let mut best: Option<(Position, i64)> = None;
        let mut alpha = i64::MIN;
        for mv in moves {
            search.board.set_cell(mv, self.color.to_cell());
            let score = search.minimax(self.depth - 1, 1, alpha, i64::MAX, false, mv, self.color);
            search.board.set_cell(mv, Cell::Empty);

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
                alpha = alpha.max(score);
            }
        }

        let (position, score) = best?;
        debug!(?position, score, nodes = search.nodes, depth = self.depth, "search finished");
        Some(SearchResult {
            position,
            score,
            nodes: search.nodes,
        })
    }

    /// 封鎖されていない最初の空きマス
    fn first_open_cell(state: &GameState) -> Option<Position> {
        state
            .board
            .positions()
            .find(|&pos| state.board.is_empty(pos) && !is_position_blocked(pos, &state.blocked_zones, state.turn))
    }
}

impl AIStrategy for MinimaxAI {
    fn calculate_move(&self, game_state: &GameState) -> Result<Position, AIError> {
        if game_state.is_finished() {
            return Err(AIError::StrategyError {
                message: "Cannot calculate move for finished game".to_string(),
            });
        }

        self.search(game_state)
            .map(|result| result.position)
            .ok_or(AIError::NoValidMoves)
    }

    fn depth(&self) -> u32 {
        self.depth
    }

    fn get_name(&self) -> &'static str {
        "MinimaxAI"
    }
}

/// 探索中の作業状態
/// 盤面は1枚を使い回し、着手と取り消しを繰り返す
struct Search<'a> {
    board: Board,
    zones: &'a [BlockedZone],
    base_turn: u32,
    ai: Stone,
    nodes: u64,
}

impl Search<'_> {
    /// `ply`手先の局面での候補手
    fn candidates(&self, ply: u32) -> Vec<Position> {
        let size = self.board.size();
        let turn = self.base_turn + ply;
        let mut seen = vec![false; size * size];
        let mut moves = Vec::new();

        for stone in self.board.occupied_positions() {
            for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                    let Some(pos) = stone.offset(dr, dc, 1, size) else {
                        continue;
                    };
                    let index = pos.row * size + pos.col;
                    if seen[index] {
                        continue;
                    }
                    seen[index] = true;
                    if self.board.is_empty(pos) && !is_position_blocked(pos, self.zones, turn) {
                        moves.push(pos);
                    }
                }
            }
        }

        moves
    }

    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        depth: u32,
        ply: u32,
        mut alpha: i64,
        mut beta: i64,
        maximizing: bool,
        last: Position,
        last_color: Stone,
    ) -> i64 {
        self.nodes += 1;

        if GomokuRules::check_winner(&self.board, last, last_color).is_some() {
            let bonus = i64::from(depth);
            return if last_color == self.ai {
                FIVE_SCORE + bonus
            } else {
                -FIVE_SCORE - bonus
            };
        }
        if depth == 0 {
            return BoardEvaluator::evaluate(&self.board, self.ai);
        }

        let moves = self.candidates(ply);
        if moves.is_empty() {
            return 0;
        }

        let mover = if maximizing { self.ai } else { self.ai.opposite() };
        let mut best = if maximizing { i64::MIN } else { i64::MAX };

        for mv in moves {
            self.board.set_cell(mv, mover.to_cell());
            let score = self.minimax(depth - 1, ply + 1, alpha, beta, !maximizing, mv, mover);
            self.board.set_cell(mv, Cell::Empty);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        best
    }
}

/// 指定した色と深度で最善手を求める
pub fn get_best_move(state: &GameState, ai_color: Stone, depth: u32) -> Option<Position> {
    MinimaxAI::new(depth, ai_color).search(state).map(|result| result.position)
}

/// 難易度に応じたAI戦略を生成するファクトリ関数
pub fn create_ai_strategy(difficulty: Difficulty, color: Stone, config: &AiConfig) -> Box<dyn AIStrategy> {
    Box::new(MinimaxAI::new(config.depth_for(difficulty), color))
}
