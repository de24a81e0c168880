//! 五目並べの盤面状態を管理するモジュール
//! `size x size`のグリッドをフラットな配列で保持し、石の配置と参照を担当する。

use super::types::{Cell, Position, Stone};
use serde::{Deserialize, Serialize};

/// 標準の盤面サイズ
pub const DEFAULT_BOARD_SIZE: usize = 15;

/// `size x size`の盤面を表現する構造体
/// 変更系の操作は`with_*`で新しい盤面を返し、元の盤面には触れない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// 全マス空の盤面を作成する
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 盤面の中央（15路なら(7, 7)）
    pub fn center(&self) -> Position {
        Position::new(self.size / 2, self.size / 2)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.is_valid(self.size)
    }

    fn index(&self, position: Position) -> usize {
        position.row * self.size + position.col
    }

    /// 指定した位置のセル状態を取得する
    /// 範囲外の場合はNoneを返す
    pub fn get_cell(&self, position: Position) -> Option<Cell> {
        if self.contains(position) {
            Some(self.cells[self.index(position)])
        } else {
            None
        }
    }

    /// 指定した位置の石を取得する
    pub fn stone_at(&self, position: Position) -> Option<Stone> {
        self.get_cell(position).and_then(Cell::stone)
    }

    /// 指定した位置にセル状態を設定する
    /// 範囲外の場合はfalseを返す
    pub fn set_cell(&mut self, position: Position, cell: Cell) -> bool {
        if self.contains(position) {
            let index = self.index(position);
            self.cells[index] = cell;
            true
        } else {
            false
        }
    }

    /// 指定した位置が空かチェックする
    pub fn is_empty(&self, position: Position) -> bool {
        matches!(self.get_cell(position), Some(Cell::Empty))
    }

    /// 石を1つ置いた新しい盤面を返す
    pub fn with_stone(&self, position: Position, stone: Stone) -> Board {
        let mut next = self.clone();
        next.set_cell(position, stone.to_cell());
        next
    }

    /// 指定マスを空にした新しい盤面を返す
    pub fn with_cleared(&self, position: Position) -> Board {
        let mut next = self.clone();
        next.set_cell(position, Cell::Empty);
        next
    }

    /// 指定したマスの石の色を反転した新しい盤面を返す
    /// 空マスは無視する
    pub fn flip_positions(&self, positions: &[Position]) -> Board {
        let mut next = self.clone();
        for &position in positions {
            if let Some(stone) = next.stone_at(position) {
                next.set_cell(position, stone.opposite().to_cell());
            }
        }
        next
    }

    /// 石が置かれている全マスの座標（行優先順）
    pub fn occupied_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|&position| !self.is_empty(position))
            .collect()
    }

    /// 盤面の全座標を行優先で列挙する
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Position::new(row, col)))
    }

    /// 盤面上の石の総数
    pub fn count_stones(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != Cell::Empty).count()
    }

    /// 黒石と白石の数を数える
    /// 戻り値: (黒石数, 白石数)
    pub fn count_pieces(&self) -> (usize, usize) {
        let mut black_count = 0;
        let mut white_count = 0;

        for &cell in &self.cells {
            match cell {
                Cell::Black => black_count += 1,
                Cell::White => white_count += 1,
                Cell::Empty => {}
            }
        }

        (black_count, white_count)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    /// デバッグ用の盤面表示文字列を生成する
    /// ●で黒、○で白、.で空マスを表現
    pub fn display(&self) -> String {
        let mut result = String::from("   ");
        for col in 0..self.size {
            result.push_str(&format!("{:>2}", col));
        }
        result.push('\n');

        for row in 0..self.size {
            result.push_str(&format!("{:>2} ", row));
            for col in 0..self.size {
                let symbol = match self.cells[self.index(Position::new(row, col))] {
                    Cell::Empty => ".",
                    Cell::Black => "●",
                    Cell::White => "○",
                };
                result.push_str(&format!(" {}", symbol));
            }
            result.push('\n');
        }

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}
