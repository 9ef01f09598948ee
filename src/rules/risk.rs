//! Risk aggregation decision table
//!
//! Combines the three upstream signals into the ternary verdict. The rules
//! are an explicit ordered list so thresholds and priorities stay
//! independently testable and tunable.

use crate::model::RiskLevel;

/// Tunable similarity cutoffs for the decision table.
#[derive(Debug, Clone, Copy)]
pub struct RiskPolicy {
    /// Below this, the lot is high risk outright.
    pub high_similarity_floor: f32,
    /// Below this (and above the high floor), the lot is medium risk.
    pub medium_similarity_floor: f32,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            high_similarity_floor: 0.2,
            medium_similarity_floor: 0.4,
        }
    }
}

/// The signals the verdict is a pure function of.
#[derive(Debug, Clone, Copy)]
pub struct RiskSignals {
    pub is_ai_generated: bool,
    pub similarity_score: f32,
    pub has_forbidden: bool,
}

/// One ordered rule: first rule whose predicate holds decides the level.
pub struct RiskRule {
    pub name: &'static str,
    pub level: RiskLevel,
    pub applies: fn(&RiskSignals, &RiskPolicy) -> bool,
}

/// Decision table, evaluated top to bottom.
pub const RISK_RULES: &[RiskRule] = &[
    RiskRule {
        name: "ai_generated_image",
        level: RiskLevel::High,
        applies: |s, _| s.is_ai_generated,
    },
    RiskRule {
        name: "similarity_below_high_floor",
        level: RiskLevel::High,
        applies: |s, p| s.similarity_score < p.high_similarity_floor,
    },
    RiskRule {
        name: "forbidden_object_for_category",
        level: RiskLevel::High,
        applies: |s, _| s.has_forbidden,
    },
    RiskRule {
        name: "similarity_below_medium_floor",
        level: RiskLevel::Medium,
        applies: |s, p| s.similarity_score < p.medium_similarity_floor,
    },
];

/// Evaluate the decision table; falls back to low risk when no rule fires.
pub fn evaluate(policy: &RiskPolicy, signals: &RiskSignals) -> RiskLevel {
    for rule in RISK_RULES {
        if (rule.applies)(signals, policy) {
            tracing::debug!(rule = rule.name, level = %rule.level, "Risk rule matched");
            return rule.level;
        }
    }
    RiskLevel::Low
}
