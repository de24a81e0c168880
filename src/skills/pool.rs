//! スキルプールとカード配布
//! プール設定（JSON）を保持し、3種類の方式でプレイヤーにスキルカードを配る。

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::definition::{EffectKind, Rarity, SkillCard, SkillCondition, SkillDefinition, SkillParams};
use super::registry::SkillRegistry;
use crate::error::SkillPoolError;
use crate::game::Phase;

/// カードの選び方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMethod {
    /// プール全体からランダム
    Random,
    /// レジェンダリーとエピックを1枚ずつ優先し、残りをレア・コモンから
    Balanced,
    /// 宣言順に先頭から（乱数なし）
    Choice,
}

/// 配布方式の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    pub method: DrawMethod,
    pub count_per_player: usize,
    #[serde(default)]
    pub allow_duplicates: bool,
}

/// スキルプール設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPoolConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub skills: Vec<SkillDefinition>,
    pub distribution: DistributionConfig,
}

impl SkillPoolConfig {
    /// カードを配る
    /// `count`省略時はプールの`count_per_player`枚
    pub fn draw_cards<R: Rng + ?Sized>(&self, count: Option<usize>, rng: &mut R) -> Vec<SkillCard> {
        let count = count.unwrap_or(self.distribution.count_per_player);
        self.select(count, rng)
            .into_iter()
            .map(|definition| SkillCard::from_definition(definition, rng))
            .collect()
    }

    fn select<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&SkillDefinition> {
        match self.distribution.method {
            DrawMethod::Random if self.distribution.allow_duplicates => {
                (0..count).filter_map(|_| self.skills.choose(rng)).collect()
            }
            DrawMethod::Random => self.skills.choose_multiple(rng, count).collect(),
            DrawMethod::Balanced => self.balanced_select(count, rng),
            DrawMethod::Choice => self.skills.iter().take(count).collect(),
        }
    }

    fn balanced_select<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&SkillDefinition> {
        let of_rarity = |rarity: Rarity| -> Vec<&SkillDefinition> {
            self.skills.iter().filter(|skill| skill.rarity == rarity).collect()
        };

        let mut result: Vec<&SkillDefinition> = Vec::with_capacity(count);

        for rarity in [Rarity::Legendary, Rarity::Epic] {
            if result.len() < count {
                if let Some(&skill) = of_rarity(rarity).choose(rng) {
                    result.push(skill);
                }
            }
        }

        let mut filler = of_rarity(Rarity::Rare);
        filler.extend(of_rarity(Rarity::Common));
        filler.shuffle(rng);

        let mut picked: HashSet<String> = result.iter().map(|skill| skill.id.clone()).collect();
        for skill in filler {
            if result.len() >= count {
                break;
            }
            if picked.insert(skill.id.clone()) {
                result.push(skill);
            }
        }

        result
    }

    /// このプールの定義だけを登録した`SkillRegistry`を作る
    pub fn build_registry(&self) -> SkillRegistry {
        let mut registry = SkillRegistry::with_default_effects();
        registry.register_definitions(self.skills.iter().cloned());
        registry
    }

    /// 定義内容の検査
    /// 封鎖ゾーンの`size`は中心マスを持つ正方形になるよう1以上の奇数に限る
    pub fn validate(&self) -> Result<(), SkillPoolError> {
        for skill in &self.skills {
            if let Some(size) = skill.params.size {
                if size == 0 || size % 2 == 0 {
                    return Err(SkillPoolError::InvalidSkill {
                        pool_id: self.id.clone(),
                        skill_id: skill.id.clone(),
                        reason: format!("zone size must be a positive odd number, got {size}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// 全スキルプールを保持するマネージャー
/// 「現在のプール」という可変状態は持たず、呼び出しごとにプールIDを指定する
#[derive(Debug, Clone, Default)]
pub struct SkillPoolManager {
    pools: HashMap<String, SkillPoolConfig>,
}

impl SkillPoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みプール（standard, draft）を登録済みのマネージャー
    pub fn with_builtin_pools() -> Self {
        let mut manager = Self::new();
        for pool in builtin_pools() {
            manager.pools.insert(pool.id.clone(), pool);
        }
        manager
    }

    /// プールを登録する（同じIDがあれば置き換える）
    pub fn register_pool(&mut self, pool: SkillPoolConfig) {
        self.pools.insert(pool.id.clone(), pool);
    }

    /// ディレクトリ内の`*.json`をプール定義として読み込む
    /// 同じディレクトリ内でIDが重複した場合や、定義が不正な場合はエラー
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, SkillPoolError> {
        let mut seen = HashSet::new();
        let mut entries: Vec<_> = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries {
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                warn!(path = ?path, "skipping non-json file in skill pool directory");
                continue;
            }

            let content = fs::read_to_string(&path)?;
            let pool: SkillPoolConfig = serde_json::from_str(&content)
                .map_err(|source| SkillPoolError::Parse { path: path.clone(), source })?;
            pool.validate()?;

            if !seen.insert(pool.id.clone()) {
                return Err(SkillPoolError::DuplicatePool { pool_id: pool.id });
            }
            info!(pool_id = %pool.id, skills = pool.skills.len(), "loaded skill pool");
            self.register_pool(pool);
        }

        Ok(seen.len())
    }

    /// 指定IDのプールを取得する
    /// 見つからない場合は設定エラー
    pub fn load_pool(&self, pool_id: &str) -> Result<&SkillPoolConfig, SkillPoolError> {
        self.pools.get(pool_id).ok_or_else(|| SkillPoolError::PoolNotFound {
            pool_id: pool_id.to_string(),
        })
    }

    pub fn all_pools(&self) -> Vec<&SkillPoolConfig> {
        let mut pools: Vec<_> = self.pools.values().collect();
        pools.sort_by(|a, b| a.id.cmp(&b.id));
        pools
    }

    /// 指定プールからカードを配る
    pub fn draw_cards<R: Rng + ?Sized>(
        &self,
        pool_id: &str,
        count: Option<usize>,
        rng: &mut R,
    ) -> Result<Vec<SkillCard>, SkillPoolError> {
        Ok(self.load_pool(pool_id)?.draw_cards(count, rng))
    }

    /// 指定プールの定義だけを登録した`SkillRegistry`を作る
    pub fn registry_for(&self, pool_id: &str) -> Result<SkillRegistry, SkillPoolError> {
        Ok(self.load_pool(pool_id)?.build_registry())
    }

    /// 全プールの定義をまとめた`SkillRegistry`を作る
    /// 同じスキルIDがプール間で異なる内容で定義されている場合はエラー
    pub fn build_registry(&self) -> Result<SkillRegistry, SkillPoolError> {
        let mut owners: HashMap<&str, (&str, &SkillDefinition)> = HashMap::new();
        for pool in self.all_pools() {
            for skill in &pool.skills {
                match owners.get(skill.id.as_str()) {
                    Some(&(first_pool, existing)) if existing != skill => {
                        return Err(SkillPoolError::ConflictingSkill {
                            skill_id: skill.id.clone(),
                            first_pool: first_pool.to_string(),
                            second_pool: pool.id.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(skill.id.as_str(), (pool.id.as_str(), skill));
                    }
                }
            }
        }

        let mut registry = SkillRegistry::with_default_effects();
        registry.register_definitions(owners.into_values().map(|(_, skill)| skill.clone()));
        Ok(registry)
    }
}

/// 標準の5スキル
pub fn standard_skills() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition::new("reverse_chaos", "倒転乾坤", Rarity::Legendary, EffectKind::FlipStones)
            .with_description("盤上の石の30%をランダムに反転する")
            .with_condition(SkillCondition::MinStones(3))
            .with_params(SkillParams { flip_percent: Some(30), size: None }),
        SkillDefinition::new("time_warp", "時間回溯", Rarity::Epic, EffectKind::UndoMove)
            .with_description("直前の一手を取り消す")
            .with_condition(SkillCondition::HistoryNotEmpty),
        SkillDefinition::new("clone", "棋子複製", Rarity::Rare, EffectKind::PlaceStone)
            .with_description("指定した空きマスに自分の石を置く"),
        SkillDefinition::new("block_zone", "区域封鎖", Rarity::Rare, EffectKind::BlockZone)
            .with_description("指定位置の周囲3x3を2ターン封鎖する")
            .with_condition(SkillCondition::Phase(Phase::Playing))
            .with_params(SkillParams { flip_percent: None, size: Some(3) }),
        SkillDefinition::new("double_move", "双子", Rarity::Common, EffectKind::DoubleMove)
            .with_description("この手番で2手連続で打てる")
            .with_condition(SkillCondition::Phase(Phase::Playing)),
    ]
}

fn builtin_pools() -> Vec<SkillPoolConfig> {
    vec![
        SkillPoolConfig {
            id: "standard".to_string(),
            name: "Standard".to_string(),
            description: "レアリティのバランスを取った標準プール".to_string(),
            skills: standard_skills(),
            distribution: DistributionConfig {
                method: DrawMethod::Balanced,
                count_per_player: 3,
                allow_duplicates: false,
            },
        },
        SkillPoolConfig {
            id: "draft".to_string(),
            name: "Draft".to_string(),
            description: "宣言順に配る固定プール".to_string(),
            skills: standard_skills(),
            distribution: DistributionConfig {
                method: DrawMethod::Choice,
                count_per_player: 3,
                allow_duplicates: false,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(method: DrawMethod, skills: Vec<SkillDefinition>, allow_duplicates: bool) -> SkillPoolConfig {
        SkillPoolConfig {
            id: "test".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            skills,
            distribution: DistributionConfig {
                method,
                count_per_player: 3,
                allow_duplicates,
            },
        }
    }

    fn mixed_skills() -> Vec<SkillDefinition> {
        let mut skills = vec![
            SkillDefinition::new("legend", "Legend", Rarity::Legendary, EffectKind::FlipStones),
            SkillDefinition::new("epic", "Epic", Rarity::Epic, EffectKind::UndoMove),
        ];
        for i in 0..5 {
            let rarity = if i % 2 == 0 { Rarity::Rare } else { Rarity::Common };
            skills.push(SkillDefinition::new(&format!("filler{i}"), "Filler", rarity, EffectKind::DoubleMove));
        }
        skills
    }

    #[test]
    fn test_balanced_draw_prefers_legendary_and_epic() {
        let pool = pool(DrawMethod::Balanced, mixed_skills(), false);
        for seed in 0..20 {
            let cards = pool.draw_cards(Some(3), &mut StdRng::seed_from_u64(seed));
            let ids: Vec<_> = cards.iter().map(|c| c.skill_id.as_str()).collect();

            assert_eq!(cards.len(), 3);
            assert_eq!(ids[0], "legend");
            assert_eq!(ids[1], "epic");
            assert!(ids[2].starts_with("filler"));
        }
    }

    #[test]
    fn test_balanced_draw_stops_when_tier_exhausted() {
        let skills = vec![
            SkillDefinition::new("legend", "Legend", Rarity::Legendary, EffectKind::FlipStones),
            SkillDefinition::new("only_rare", "Rare", Rarity::Rare, EffectKind::BlockZone),
        ];
        let pool = pool(DrawMethod::Balanced, skills, false);
        let cards = pool.draw_cards(Some(5), &mut StdRng::seed_from_u64(3));
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_random_draw_without_duplicates() {
        let pool = pool(DrawMethod::Random, mixed_skills(), false);
        let cards = pool.draw_cards(Some(7), &mut StdRng::seed_from_u64(11));
        let unique: HashSet<_> = cards.iter().map(|c| c.skill_id.clone()).collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_random_draw_with_duplicates_can_exceed_pool() {
        let skills = vec![SkillDefinition::new("solo", "Solo", Rarity::Common, EffectKind::DoubleMove)];
        let pool = pool(DrawMethod::Random, skills, true);
        let cards = pool.draw_cards(Some(4), &mut StdRng::seed_from_u64(5));
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.skill_id == "solo"));
    }

    #[test]
    fn test_choice_draw_is_declared_order() {
        let pool = pool(DrawMethod::Choice, mixed_skills(), false);
        let cards = pool.draw_cards(None, &mut StdRng::seed_from_u64(0));
        let ids: Vec<_> = cards.iter().map(|c| c.skill_id.as_str()).collect();
        assert_eq!(ids, vec!["legend", "epic", "filler0"]);
    }

    #[test]
    fn test_unknown_pool_is_config_error() {
        let manager = SkillPoolManager::with_builtin_pools();
        let result = manager.load_pool("missing");
        assert!(matches!(result, Err(SkillPoolError::PoolNotFound { pool_id }) if pool_id == "missing"));
    }

    #[test]
    fn test_builtin_pools_and_registry() {
        let manager = SkillPoolManager::with_builtin_pools();
        assert_eq!(manager.all_pools().len(), 2);

        let cards = manager
            .draw_cards("standard", None, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].skill_id, "reverse_chaos");
        assert_eq!(cards[1].skill_id, "time_warp");

        let registry = manager.build_registry().unwrap();
        assert_eq!(registry.all_definitions().len(), 5);
        assert_eq!(registry.effect_of("clone"), Some(EffectKind::PlaceStone));
    }

    fn aggressive_pool() -> SkillPoolConfig {
        let mut skills = standard_skills();
        skills[0].params.flip_percent = Some(100);
        SkillPoolConfig {
            id: "aggressive".to_string(),
            ..pool(DrawMethod::Choice, skills, false)
        }
    }

    #[test]
    fn test_pool_registry_keeps_its_own_definitions() {
        let mut manager = SkillPoolManager::with_builtin_pools();
        manager.register_pool(aggressive_pool());

        let aggressive = manager.registry_for("aggressive").unwrap();
        let chaos = aggressive.get_definition("reverse_chaos").unwrap();
        assert_eq!(chaos.params.flip_percent, Some(100));

        let standard = manager.registry_for("standard").unwrap();
        let chaos = standard.get_definition("reverse_chaos").unwrap();
        assert_eq!(chaos.params.flip_percent, Some(30));

        assert!(matches!(manager.registry_for("missing"), Err(SkillPoolError::PoolNotFound { .. })));
    }

    #[test]
    fn test_merged_registry_rejects_conflicting_definitions() {
        let mut manager = SkillPoolManager::with_builtin_pools();
        manager.register_pool(aggressive_pool());

        let result = manager.build_registry();
        assert!(matches!(
            result,
            Err(SkillPoolError::ConflictingSkill { skill_id, .. }) if skill_id == "reverse_chaos"
        ));
    }

    #[test]
    fn test_zone_size_must_be_positive_odd() {
        let mut skills = standard_skills();
        assert!(pool(DrawMethod::Choice, skills.clone(), false).validate().is_ok());

        for size in [0, 4] {
            skills[3].params.size = Some(size);
            let result = pool(DrawMethod::Choice, skills.clone(), false).validate();
            assert!(matches!(
                result,
                Err(SkillPoolError::InvalidSkill { skill_id, .. }) if skill_id == "block_zone"
            ));
        }
    }

    #[test]
    fn test_pool_json_round_trip_keeps_conditions() {
        let manager = SkillPoolManager::with_builtin_pools();
        let standard = manager.load_pool("standard").unwrap();
        let json = serde_json::to_string(standard).unwrap();
        let parsed: SkillPoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, standard);
    }
}
