//! Target resolution against a battle roster

use super::{Method, Quantity, Scope, TargetSpec};
use crate::types::{Attribute, Side};
use rand::Rng;

/// What target resolution reads from a roster entry
pub trait Targetable {
    fn side(&self) -> Side;

    fn is_alive(&self) -> bool;

    /// Current value of a numeric attribute
    fn attribute(&self, attribute: Attribute) -> f64;
}

/// Resolve a rule to roster indices
///
/// Pools are built in roster order from live combatants only. Random picks
/// sample without replacement; `highest`/`lowest` use a stable sort so ties
/// keep roster order. `self` always yields the actor.
pub fn select_targets<T, R>(spec: &TargetSpec, actor: usize, roster: &[T], rng: &mut R) -> Vec<usize>
where
    T: Targetable,
    R: Rng + ?Sized,
{
    let Some(acting) = roster.get(actor) else {
        return Vec::new();
    };

    let side = match spec.scope {
        Scope::Actor => return vec![actor],
        Scope::Mate => acting.side(),
        Scope::Enemy => acting.side().opponent(),
    };

    let mut pool: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, c)| c.side() == side && c.is_alive())
        .map(|(i, _)| i)
        .collect();

    let wanted = match spec.quantity {
        Quantity::Count(n) => n.min(pool.len()),
        Quantity::All => pool.len(),
    };

    match spec.method {
        Method::Random => {
            if wanted >= pool.len() {
                return pool;
            }
            rand::seq::index::sample(rng, pool.len(), wanted)
                .into_iter()
                .map(|i| pool[i])
                .collect()
        }
        Method::Highest(attribute) => {
            pool.sort_by(|&a, &b| {
                roster[b]
                    .attribute(attribute)
                    .total_cmp(&roster[a].attribute(attribute))
            });
            pool.truncate(wanted);
            pool
        }
        Method::Lowest(attribute) => {
            pool.sort_by(|&a, &b| {
                roster[a]
                    .attribute(attribute)
                    .total_cmp(&roster[b].attribute(attribute))
            });
            pool.truncate(wanted);
            pool
        }
    }
}
