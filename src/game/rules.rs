//! 五目並べの勝利判定モジュール
//! 直前に置かれた石を起点に4方向の連続数を数え、5連以上で勝利とする。

use super::board::Board;
use super::types::{Position, Stone};

/// 勝利に必要な連続数
pub const WIN_LENGTH: usize = 5;

/// 判定する4方向（水平、垂直、斜め、逆斜め）
/// 各方向は正負の両側を合わせて1本のラインとして数える
pub const LINE_DIRECTIONS: [(isize, isize); 4] = [
    (0, 1),
    (1, 0),
    (1, 1),
    (1, -1),
];

/// 五目並べのルールを実装する構造体
/// スタティックメソッドのみを提供する
pub struct GomokuRules;

impl GomokuRules {
    /// 直前の着手で勝利したかを判定する
    /// `last_position`には`color`の石が置かれている前提（盤面全体の走査は行わない）
    pub fn check_winner(board: &Board, last_position: Position, color: Stone) -> Option<Stone> {
        for &(dr, dc) in &LINE_DIRECTIONS {
            let count = 1
                + Self::count_direction(board, last_position, dr, dc, color)
                + Self::count_direction(board, last_position, -dr, -dc, color);

            if count >= WIN_LENGTH {
                return Some(color);
            }
        }

        None
    }

    /// 一方向に最大`WIN_LENGTH - 1`マスまで同色の連続を数える
    fn count_direction(board: &Board, origin: Position, dr: isize, dc: isize, color: Stone) -> usize {
        let mut count = 0;
        for distance in 1..WIN_LENGTH as isize {
            match origin.offset(dr, dc, distance, board.size()) {
                Some(pos) if board.stone_at(pos) == Some(color) => count += 1,
                _ => break,
            }
        }
        count
    }

    /// `origin`を通る1本のラインの連続数と開いた端の数を返す
    /// 評価関数から使われるため、長さの上限は設けない
    /// 戻り値: (連続数, 開いた端の数 0〜2)
    pub fn run_through(board: &Board, origin: Position, dr: isize, dc: isize, color: Stone) -> (usize, usize) {
        let mut count = 1;
        let mut open_ends = 0;

        for (sr, sc) in [(dr, dc), (-dr, -dc)] {
            let mut distance = 1;
            while let Some(pos) = origin.offset(sr, sc, distance, board.size()) {
                match board.stone_at(pos) {
                    Some(stone) if stone == color => count += 1,
                    None => {
                        open_ends += 1;
                        break;
                    }
                    Some(_) => break,
                }
                distance += 1;
            }
        }

        (count, open_ends)
    }
}
