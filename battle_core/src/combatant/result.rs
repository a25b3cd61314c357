//! Health change records produced by damage and healing

use serde::{Deserialize, Serialize};

/// Result of `receive_damage`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Incoming amount before resistance
    pub raw: f64,
    /// Portion removed by resistance
    pub resisted: f64,
    /// Health actually lost
    pub dealt: f64,
    pub health_before: f64,
    pub health_after: f64,
    pub is_killing_blow: bool,
}

impl DamageOutcome {
    /// Health lost that the combatant did not have
    pub fn overkill(&self) -> f64 {
        (self.raw - self.resisted - self.dealt).max(0.0)
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{:.1} damage taken", self.dealt)];
        if self.resisted > 0.0 {
            parts.push(format!("{:.1} resisted", self.resisted));
        }
        if self.is_killing_blow {
            parts.push("FATAL".to_string());
        }
        parts.join(", ")
    }
}

/// Result of `receive_healing`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealOutcome {
    pub amount: f64,
    /// Health actually restored after the max-health cap
    pub healed: f64,
    pub health_before: f64,
    pub health_after: f64,
}

impl HealOutcome {
    pub fn overheal(&self) -> f64 {
        (self.amount - self.healed).max(0.0)
    }
}
