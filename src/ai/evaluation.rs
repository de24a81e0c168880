//! AIの盤面評価システム
//! 各石を通る4方向のラインの連続数と開いた端の数から、盤面の優劣を数値化する。

use crate::game::{Board, GomokuRules, Position, Stone, LINE_DIRECTIONS};

/// 5連（勝利）の評価値
pub const FIVE_SCORE: i64 = 100_000;

/// 盤面評価を行うスタティックメソッド集
pub struct BoardEvaluator;

impl BoardEvaluator {
    /// AIの色から見た盤面の評価値
    /// 自分の石のスコアを加算し、相手の石のスコアを減算する
    pub fn evaluate(board: &Board, ai_color: Stone) -> i64 {
        board
            .occupied_positions()
            .into_iter()
            .map(|pos| match board.stone_at(pos) {
                Some(stone) if stone == ai_color => Self::evaluate_cell(board, pos, stone),
                Some(stone) => -Self::evaluate_cell(board, pos, stone),
                None => 0,
            })
            .sum()
    }

    /// 1つの石について4方向のラインスコアを合計する
    pub fn evaluate_cell(board: &Board, position: Position, color: Stone) -> i64 {
        LINE_DIRECTIONS
            .iter()
            .map(|&(dr, dc)| {
                let (count, open_ends) = GomokuRules::run_through(board, position, dr, dc, color);
                Self::line_score(count, open_ends)
            })
            .sum()
    }

    /// (連続数, 開いた端の数) → スコア
    pub fn line_score(count: usize, open_ends: usize) -> i64 {
        match (count, open_ends) {
            (c, _) if c >= 5 => FIVE_SCORE,
            (4, o) if o >= 1 => 10_000,
            (3, o) if o >= 2 => 1_000,
            (3, 1) => 100,
            (2, o) if o >= 2 => 50,
            (2, 1) => 10,
            (c, _) => c as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(usize, usize, Stone)]) -> Board {
        stones
            .iter()
            .fold(Board::new(15), |board, &(r, c, s)| board.with_stone(Position::new(r, c), s))
    }

    #[test]
    fn test_line_score_table() {
        assert_eq!(BoardEvaluator::line_score(5, 0), 100_000);
        assert_eq!(BoardEvaluator::line_score(6, 2), 100_000);
        assert_eq!(BoardEvaluator::line_score(4, 1), 10_000);
        assert_eq!(BoardEvaluator::line_score(4, 0), 4);
        assert_eq!(BoardEvaluator::line_score(3, 2), 1_000);
        assert_eq!(BoardEvaluator::line_score(3, 1), 100);
        assert_eq!(BoardEvaluator::line_score(2, 2), 50);
        assert_eq!(BoardEvaluator::line_score(2, 1), 10);
        assert_eq!(BoardEvaluator::line_score(1, 2), 1);
    }

    #[test]
    fn test_empty_board_is_neutral() {
        assert_eq!(BoardEvaluator::evaluate(&Board::new(15), Stone::Black), 0);
    }

    #[test]
    fn test_single_stone_in_open_space() {
        let board = board_with(&[(7, 7, Stone::Black)]);
        // 4方向とも長さ1
        assert_eq!(BoardEvaluator::evaluate_cell(&board, Position::new(7, 7), Stone::Black), 4);
        assert_eq!(BoardEvaluator::evaluate(&board, Stone::Black), 4);
        assert_eq!(BoardEvaluator::evaluate(&board, Stone::White), -4);
    }

    #[test]
    fn test_open_two_counts_per_stone() {
        let board = board_with(&[(7, 7, Stone::White), (7, 8, Stone::White)]);
        // 横方向は50、他の3方向は1ずつ。石2つ分
        assert_eq!(BoardEvaluator::evaluate(&board, Stone::White), 2 * (50 + 3));
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let board = board_with(&[
            (7, 7, Stone::Black),
            (7, 8, Stone::Black),
            (8, 8, Stone::White),
            (3, 3, Stone::White),
        ]);
        assert_eq!(
            BoardEvaluator::evaluate(&board, Stone::Black),
            -BoardEvaluator::evaluate(&board, Stone::White)
        );
    }
}
