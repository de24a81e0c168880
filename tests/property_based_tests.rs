//! プロパティベーステストモジュール
//! ランダムな入力で勝利判定・封鎖ゾーン・スキル効果・着手の不変条件を検証する。

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use skill_gomoku::{
    game::{
        is_position_blocked, Board, BlockedZone, GameEngine, GameState, GomokuRules, HistoryMove, Phase, PlayerState,
        Position, Stone, LINE_DIRECTIONS,
    },
    skills::{Actor, EffectKind, SkillContext, SkillParams},
};

const SIZE: usize = 15;

fn new_game() -> GameState {
    GameEngine::create_initial_state(
        SIZE,
        PlayerState::new("p1", "alice", Stone::Black),
        PlayerState::new("p2", "bob", Stone::White),
    )
}

/// 盤面内の座標を生成する戦略
fn position_strategy() -> impl Strategy<Value = Position> {
    (0..SIZE, 0..SIZE).prop_map(|(row, col)| Position::new(row, col))
}

/// 石の色を生成する戦略
fn stone_strategy() -> impl Strategy<Value = Stone> {
    prop_oneof![Just(Stone::Black), Just(Stone::White)]
}

/// 4方向のいずれか
fn direction_strategy() -> impl Strategy<Value = (isize, isize)> {
    prop::sample::select(LINE_DIRECTIONS.to_vec())
}

/// `length`個の石が収まる始点と方向からラインを作る
fn line_cells(start: Position, (dr, dc): (isize, isize), length: isize) -> Option<Vec<Position>> {
    (0..length).map(|i| start.offset(dr, dc, i, SIZE)).collect()
}

proptest! {
    /// プロパティ: 両端の開いた4連は勝ちではなく、5連はどの方向でも勝ち
    #[test]
    fn test_four_never_wins_five_always_wins(
        start in position_strategy(),
        direction in direction_strategy(),
        color in stone_strategy(),
        pick in 0usize..5,
    ) {
        let cells = line_cells(start, direction, 5);
        prop_assume!(cells.is_some());
        let cells = cells.unwrap();

        let four = cells[..4]
            .iter()
            .fold(Board::new(SIZE), |board, &pos| board.with_stone(pos, color));
        for &pos in &cells[..4] {
            prop_assert_eq!(GomokuRules::check_winner(&four, pos, color), None);
        }

        let five = four.with_stone(cells[4], color);
        prop_assert_eq!(GomokuRules::check_winner(&five, cells[pick], color), Some(color));
        prop_assert_eq!(GomokuRules::check_winner(&five, cells[pick], color.opposite()), None);
    }

    /// プロパティ: 同じマスへの2回目の着手は必ず拒否される
    #[test]
    fn test_second_placement_on_same_cell_rejected(pos in position_strategy()) {
        let state = new_game();
        let placed = GameEngine::place_stone(&state, pos).unwrap();
        prop_assert!(GameEngine::place_stone(&placed, pos).is_none());
        prop_assert_eq!(placed.board.count_stones(), 1);
    }

    /// プロパティ: 有効な封鎖ゾーンは中心と周囲8マスを塞ぎ、距離2や期限後は塞がない
    #[test]
    fn test_blocked_zone_coverage(
        center in position_strategy(),
        expires in 1u32..50,
        turn in 1u32..60,
        target in position_strategy(),
    ) {
        let zones = [BlockedZone::new(center, expires, Stone::Black)];
        let expected = turn <= expires && center.chebyshev_distance(target) <= 1;
        prop_assert_eq!(is_position_blocked(target, &zones, turn), expected);
    }

    /// プロパティ: 同じマスを2回反転すると元の盤面に戻る
    #[test]
    fn test_flip_is_an_involution(
        stones in prop::collection::hash_map(position_strategy(), stone_strategy(), 1..30),
        seed in any::<u64>(),
    ) {
        let mut state = new_game();
        for (&pos, &stone) in &stones {
            state.board = state.board.with_stone(pos, stone);
        }
        let actor = Actor { id: "p1", color: Stone::Black };
        let params = SkillParams::default();
        let mut rng = StdRng::seed_from_u64(seed);

        let first = EffectKind::FlipStones
            .apply(&SkillContext::new(&state, actor, None), &params, &mut rng)
            .unwrap();
        let context = SkillContext::new(&first.state, actor, None).with_recorded_flips(Some(first.affected.as_slice()));
        let second = EffectKind::FlipStones.apply(&context, &params, &mut rng).unwrap();

        prop_assert_eq!(second.state.board, state.board);
    }

    /// プロパティ: 取り消してから同じ手を打ち直すと元の局面に戻る
    #[test]
    fn test_undo_then_replace_round_trips(
        moves in prop::collection::vec(position_strategy(), 1..20),
    ) {
        let mut state = new_game();
        for pos in moves {
            if let Some(next) = GameEngine::place_stone(&state, pos) {
                state = next;
            }
        }
        prop_assume!(state.phase == Phase::Playing && !state.history.is_empty());

        let outcome = EffectKind::UndoMove
            .apply(
                &SkillContext::new(&state, Actor { id: "p", color: state.current_player }, None),
                &SkillParams::default(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap();
        let undone_at = outcome.affected[0];
        let restored = GameEngine::place_stone(&outcome.state, undone_at).unwrap();

        prop_assert_eq!(&restored.board, &state.board);
        prop_assert_eq!(restored.turn, state.turn);
        prop_assert_eq!(restored.current_player, state.current_player);
    }

    /// プロパティ: スキルなしの対局では石数と履歴数が一致し、手番は交互に進む
    #[test]
    fn test_plain_game_state_consistency(
        moves in prop::collection::vec(position_strategy(), 1..80),
    ) {
        let mut state = new_game();
        for pos in moves {
            match GameEngine::place_stone(&state, pos) {
                Some(next) => {
                    prop_assert_eq!(next.history.last(), Some(&HistoryMove::place(state.current_player, pos)));
                    if next.phase == Phase::Playing {
                        prop_assert_eq!(next.current_player, state.current_player.opposite());
                        prop_assert_eq!(next.turn, state.turn + 1);
                    }
                    state = next;
                }
                None => {
                    prop_assert!(state.phase == Phase::Ended || !state.board.is_empty(pos));
                }
            }
        }

        prop_assert_eq!(state.board.count_stones(), state.history.len());
        let (black, white) = state.board.count_pieces();
        prop_assert!(black == white || black == white + 1);
    }
}
