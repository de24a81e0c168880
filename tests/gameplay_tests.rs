//! 対局シナリオの統合テスト
//! 着手・スキル・勝敗判定・カード配布を公開APIだけで検証する。

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

use skill_gomoku::{
    game::{BlockedZone, GameAction, GameEngine, GameState, GomokuRules, Outcome, Phase, PlayerState, Position, Stone},
    skills::{
        DistributionConfig, DrawMethod, EffectKind, Rarity, SkillCard, SkillDefinition, SkillPoolConfig,
        SkillPoolManager,
    },
};

fn engine() -> GameEngine {
    GameEngine::new(Arc::new(SkillPoolManager::with_builtin_pools().build_registry().unwrap()))
}

/// 標準プールの5スキルを1枚ずつ持たせた対局
fn game_with_all_cards() -> GameState {
    let pools = SkillPoolManager::with_builtin_pools();
    let pool = pools.load_pool("draft").unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let black = PlayerState::new("p1", "alice", Stone::Black).with_cards(pool.draw_cards(Some(5), &mut rng));
    let white = PlayerState::new("p2", "bob", Stone::White).with_cards(pool.draw_cards(Some(5), &mut rng));
    GameEngine::create_initial_state(15, black, white)
}

fn card_for(state: &GameState, color: Stone, skill_id: &str) -> String {
    state
        .players
        .get(color)
        .skill_cards
        .iter()
        .find(|card| card.skill_id == skill_id)
        .map(|card| card.id.clone())
        .unwrap()
}

fn place_all(state: &GameState, moves: &[(usize, usize)]) -> GameState {
    moves.iter().fold(state.clone(), |s, &(r, c)| {
        GameEngine::place_stone(&s, Position::new(r, c)).unwrap()
    })
}

#[test]
fn test_four_in_a_row_is_not_a_win_but_five_is() {
    let mut board = skill_gomoku::game::Board::new(15);
    for col in 5..=8 {
        board = board.with_stone(Position::new(7, col), Stone::Black);
    }
    assert_eq!(GomokuRules::check_winner(&board, Position::new(7, 8), Stone::Black), None);

    board = board.with_stone(Position::new(7, 9), Stone::Black);
    assert_eq!(
        GameEngine::check_winner(&board, Position::new(7, 9), Stone::Black),
        Some(Stone::Black)
    );
}

#[test]
fn test_double_move_turn_accounting() {
    let engine = engine();
    let state = game_with_all_cards();
    let card = card_for(&state, Stone::Black, "double_move");

    let doubled = engine.use_skill(&state, Stone::Black, &card, None).unwrap();
    assert_eq!(doubled.remaining_moves, 2);

    let first = GameEngine::place_stone(&doubled, Position::new(7, 7)).unwrap();
    assert_eq!(first.remaining_moves, 1);
    assert_eq!(first.current_player, Stone::Black);
    assert_eq!(first.turn, state.turn);

    let second = GameEngine::place_stone(&first, Position::new(7, 8)).unwrap();
    assert_eq!(second.remaining_moves, 1);
    assert_eq!(second.current_player, Stone::White);
    assert_eq!(second.turn, state.turn + 1);
}

#[test]
fn test_balanced_draw_takes_legendary_and_epic_first() {
    let skills = vec![
        SkillDefinition::new("legend", "Legend", Rarity::Legendary, EffectKind::FlipStones),
        SkillDefinition::new("epic", "Epic", Rarity::Epic, EffectKind::UndoMove),
        SkillDefinition::new("r1", "R1", Rarity::Rare, EffectKind::PlaceStone),
        SkillDefinition::new("r2", "R2", Rarity::Rare, EffectKind::BlockZone),
        SkillDefinition::new("c1", "C1", Rarity::Common, EffectKind::DoubleMove),
        SkillDefinition::new("c2", "C2", Rarity::Common, EffectKind::DoubleMove),
        SkillDefinition::new("c3", "C3", Rarity::Common, EffectKind::DoubleMove),
    ];
    let mut manager = SkillPoolManager::new();
    manager.register_pool(SkillPoolConfig {
        id: "mixed".to_string(),
        name: "Mixed".to_string(),
        description: String::new(),
        skills,
        distribution: DistributionConfig {
            method: DrawMethod::Balanced,
            count_per_player: 3,
            allow_duplicates: false,
        },
    });

    for seed in 0..20 {
        let cards: Vec<SkillCard> = manager
            .draw_cards("mixed", None, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        let ids: HashSet<&str> = cards.iter().map(|card| card.skill_id.as_str()).collect();

        assert_eq!(cards.len(), 3);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("legend"));
        assert!(ids.contains("epic"));
        assert!(cards.iter().all(|card| !card.used));
    }
}

#[test]
fn test_blocked_zone_expires_after_its_turn() {
    let mut state = game_with_all_cards();
    state.turn = 5;
    state.blocked_zones.push(BlockedZone::new(Position::new(7, 7), 5, Stone::White));

    assert!(GameEngine::place_stone(&state, Position::new(7, 7)).is_none());

    state.turn = 6;
    let placed = GameEngine::place_stone(&state, Position::new(7, 7)).unwrap();
    assert_eq!(placed.board.stone_at(Position::new(7, 7)), Some(Stone::Black));
    assert!(placed.blocked_zones.is_empty());
}

#[test]
fn test_block_zone_skill_blocks_opponent() {
    let engine = engine();
    let state = place_all(&game_with_all_cards(), &[(0, 0)]);
    let card = card_for(&state, Stone::White, "block_zone");

    let blocked = engine
        .use_skill(&state, Stone::White, &card, Some(Position::new(10, 10)))
        .unwrap();
    assert_eq!(blocked.current_player, Stone::White);
    assert_eq!(blocked.blocked_zones.len(), 1);

    let after_white = GameEngine::place_stone(&blocked, Position::new(0, 14)).unwrap();
    assert!(GameEngine::place_stone(&after_white, Position::new(11, 11)).is_none());
    assert!(GameEngine::place_stone(&after_white, Position::new(12, 12)).is_some());
}

#[test]
fn test_time_warp_then_replace_restores_position() {
    let engine = engine();
    let state = place_all(&game_with_all_cards(), &[(7, 7), (7, 8), (8, 8)]);
    let card = card_for(&state, Stone::White, "time_warp");

    let undone = engine.use_skill(&state, Stone::White, &card, None).unwrap();
    assert!(undone.board.is_empty(Position::new(8, 8)));
    assert_eq!(undone.current_player, Stone::Black);
    assert_eq!(undone.turn, state.turn - 1);

    let replayed = GameEngine::place_stone(&undone, Position::new(8, 8)).unwrap();
    assert_eq!(replayed.board, state.board);
    assert_eq!(replayed.turn, state.turn);
    assert_eq!(replayed.current_player, state.current_player);
}

#[test]
fn test_reverse_chaos_can_hand_opponent_a_win() {
    let engine = engine();
    // 黒の4連と、反転すれば白の5連になる黒石1つ
    let mut state = game_with_all_cards();
    for col in 0..4 {
        state.board = state.board.with_stone(Position::new(3, col), Stone::White);
    }
    state.board = state.board.with_stone(Position::new(3, 4), Stone::Black);
    state.board = state.board.with_stone(Position::new(10, 10), Stone::Black);
    state.current_player = Stone::Black;

    let card = card_for(&state, Stone::Black, "reverse_chaos");
    let action = GameAction::Skill {
        player: Stone::Black,
        card_id: card,
        target: None,
        flipped: Some(vec![Position::new(3, 4)]),
    };
    let ended = engine.apply(&state, &action, &mut StdRng::seed_from_u64(0)).unwrap();

    assert_eq!(ended.phase, Phase::Ended);
    assert_eq!(ended.winner, Some(Outcome::Win(Stone::White)));
    assert_eq!(ended.current_player, Stone::Black);
}

#[test]
fn test_replay_reproduces_skill_game() {
    let engine = engine();
    let initial = game_with_all_cards();
    let double = card_for(&initial, Stone::Black, "double_move");
    let clone = card_for(&initial, Stone::White, "clone");

    let actions = vec![
        GameAction::Skill {
            player: Stone::Black,
            card_id: double,
            target: None,
            flipped: None,
        },
        GameAction::Place { position: Position::new(7, 7) },
        GameAction::Place { position: Position::new(7, 8) },
        GameAction::Skill {
            player: Stone::White,
            card_id: clone,
            target: Some(Position::new(8, 8)),
            flipped: None,
        },
        GameAction::Resign { player: Stone::Black },
    ];

    let first = engine.replay(&initial, &actions).unwrap();
    let second = engine.replay(&initial, &actions).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.winner, Some(Outcome::Win(Stone::White)));

    let records = first.move_records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].skill_used.as_deref(), Some("double_move"));
    assert_eq!((records[1].row, records[1].col), (Some(7), Some(7)));
}

#[test]
fn test_replay_stops_at_rejected_action() {
    let engine = engine();
    let initial = game_with_all_cards();
    let actions = vec![
        GameAction::Place { position: Position::new(7, 7) },
        GameAction::Place { position: Position::new(7, 7) },
    ];
    assert!(engine.replay(&initial, &actions).is_none());
}
