use crate::nsga2::Fitness;

/// Per-objective extremes over one generation, for the training logbook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveSummary {
    pub min_self_damage: f32,
    pub max_self_damage: f32,
    pub min_damage_dealt: f32,
    pub max_damage_dealt: f32,
}

impl ObjectiveSummary {
    /// Computes extremes over the given fitnesses.
    ///
    /// Returns `None` for an empty generation.
    #[must_use]
    pub fn new<I>(fitnesses: I) -> Option<Self>
    where
        I: IntoIterator<Item = Fitness>,
    {
        let mut iter = fitnesses.into_iter();
        let first = iter.next()?;
        let mut summary = ObjectiveSummary {
            min_self_damage: first.self_damage,
            max_self_damage: first.self_damage,
            min_damage_dealt: first.damage_dealt,
            max_damage_dealt: first.damage_dealt,
        };
        for fitness in iter {
            summary.min_self_damage = summary.min_self_damage.min(fitness.self_damage);
            summary.max_self_damage = summary.max_self_damage.max(fitness.self_damage);
            summary.min_damage_dealt = summary.min_damage_dealt.min(fitness.damage_dealt);
            summary.max_damage_dealt = summary.max_damage_dealt.max(fitness.damage_dealt);
        }
        Some(summary)
    }
}
