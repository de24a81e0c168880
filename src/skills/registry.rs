//! スキル定義と効果の登録簿
//! 対局ごと（ルームごと）にインスタンスを持ち、グローバルな状態は使わない。

use rand::Rng;
use std::collections::HashMap;

use super::definition::{EffectKind, Rarity, SkillCondition, SkillDefinition};
use super::effects::{SkillContext, SkillOutcome};

/// スキル定義（ID → 定義）と効果（効果ID → 実装）を別々の名前空間で保持する
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    definitions: HashMap<String, SkillDefinition>,
    effects: HashMap<String, EffectKind>,
}

impl SkillRegistry {
    /// 空の登録簿を作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 5つの標準効果を登録済みの登録簿を作成する
    pub fn with_default_effects() -> Self {
        let mut registry = Self::new();
        for kind in EffectKind::ALL {
            registry.register_effect(kind.id(), kind);
        }
        registry
    }

    pub fn register_definition(&mut self, definition: SkillDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn register_definitions(&mut self, definitions: impl IntoIterator<Item = SkillDefinition>) {
        for definition in definitions {
            self.register_definition(definition);
        }
    }

    /// 効果IDに実装を割り当てる（別名の登録も可）
    pub fn register_effect(&mut self, effect_id: &str, kind: EffectKind) {
        self.effects.insert(effect_id.to_string(), kind);
    }

    pub fn get_definition(&self, skill_id: &str) -> Option<&SkillDefinition> {
        self.definitions.get(skill_id)
    }

    pub fn all_definitions(&self) -> Vec<&SkillDefinition> {
        let mut definitions: Vec<_> = self.definitions.values().collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    pub fn by_rarity(&self, rarity: Rarity) -> Vec<&SkillDefinition> {
        self.all_definitions()
            .into_iter()
            .filter(|definition| definition.rarity == rarity)
            .collect()
    }

    /// 定義に対応する効果の種類
    pub fn effect_of(&self, skill_id: &str) -> Option<EffectKind> {
        let definition = self.definitions.get(skill_id)?;
        self.effects.get(&definition.effect_id).copied()
    }

    /// 前提条件をすべて満たしているか
    /// 未知のスキルIDはfalse
    pub fn can_use(&self, skill_id: &str, context: &SkillContext<'_>) -> bool {
        match self.definitions.get(skill_id) {
            Some(definition) => Self::check_conditions(&definition.conditions, context),
            None => false,
        }
    }

    /// 条件を再検証してから効果を実行する
    /// スキルや効果が未知、条件不成立、効果が適用不可のいずれでもNone
    pub fn execute<R: Rng + ?Sized>(
        &self,
        skill_id: &str,
        context: &SkillContext<'_>,
        rng: &mut R,
    ) -> Option<SkillOutcome> {
        let definition = self.definitions.get(skill_id)?;
        if !Self::check_conditions(&definition.conditions, context) {
            return None;
        }

        let effect = self.effects.get(&definition.effect_id)?;
        effect.apply(context, &definition.params, rng)
    }

    fn check_conditions(conditions: &[SkillCondition], context: &SkillContext<'_>) -> bool {
        let state = context.game_state;
        conditions.iter().all(|condition| match condition {
            SkillCondition::MinStones(min) => state.board.count_stones() >= *min,
            SkillCondition::HistoryNotEmpty => !state.history.is_empty(),
            SkillCondition::Phase(phase) => state.phase == *phase,
        })
    }
}
