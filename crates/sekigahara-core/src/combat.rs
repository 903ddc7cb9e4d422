//! Engagement and plot formulas.
//!
//! Every outcome is a pure function of the two units, the tiles they stand
//! on and a random value in `[0, 1)` drawn by the resolver from its seeded
//! generator, so a session replays identically for the same seed.

use crate::map::Tile;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Share of the attacking soldiers that become defender casualties at 1:1.
const DEFENDER_LOSS_RATE: f32 = 0.08;
/// Share of the defending soldiers that become attacker casualties at 1:1.
const ATTACKER_LOSS_RATE: f32 = 0.05;
/// Bonus for attacking from higher ground.
pub const HIGH_GROUND_BONUS: i32 = 10;

/// Hex steps at which an engagement can be fought (adjacent only).
pub const ATTACK_REACH: u32 = 1;

/// Maximum hex distance at which a plot can be attempted.
pub const PLOT_RANGE: u32 = 6;
/// Share of the target's soldiers that desert after a successful plot.
pub const DESERTION_RATE: f32 = 0.15;

/// Result of an engagement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatResult {
    /// Soldiers lost by the defender.
    pub defender_losses: u32,
    /// Soldiers lost by the attacker.
    pub attacker_losses: u32,
    /// Whether the defender was wiped out.
    pub defender_destroyed: bool,
    /// Whether the attacker was wiped out.
    pub attacker_destroyed: bool,
    /// Combat log for display.
    pub log: CombatLog,
}

/// Detailed combat log for UI display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatLog {
    pub attacker_base_strength: f32,
    pub defender_base_strength: f32,
    pub attacker_modifiers: Vec<CombatModifier>,
    pub defender_modifiers: Vec<CombatModifier>,
    pub attacker_final_strength: f32,
    pub defender_final_strength: f32,
    pub random_factor: f32,
}

/// A modifier that affects combat strength.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatModifier {
    pub name: String,
    pub percentage: i32,
}

/// Context for combat calculations.
pub struct CombatContext<'a> {
    pub attacker: &'a Unit,
    pub defender: &'a Unit,
    pub attacker_tile: &'a Tile,
    pub defender_tile: &'a Tile,
    /// Random value (0.0 to 1.0).
    pub random: f32,
}

/// Resolve an engagement between two units.
pub fn resolve_combat(ctx: &CombatContext) -> CombatResult {
    let mut attacker_modifiers = Vec::new();
    let mut defender_modifiers = Vec::new();

    let attacker_base = ctx.attacker.soldiers as f32 * ctx.attacker.atk as f32;
    let defender_base = ctx.defender.soldiers as f32 * ctx.defender.def as f32;

    let attacker_mod = calculate_attacker_modifiers(ctx, &mut attacker_modifiers);
    let defender_mod = calculate_defender_modifiers(ctx, &mut defender_modifiers);

    let attacker_final = attacker_base * (1.0 + attacker_mod / 100.0);
    let defender_final = defender_base * (1.0 + defender_mod / 100.0);

    let (defender_losses, attacker_losses) = calculate_damage(
        attacker_final,
        defender_final,
        ctx.attacker.soldiers,
        ctx.defender.soldiers,
        ctx.random,
    );

    CombatResult {
        defender_losses,
        attacker_losses,
        defender_destroyed: defender_losses >= ctx.defender.soldiers,
        attacker_destroyed: attacker_losses >= ctx.attacker.soldiers,
        log: CombatLog {
            attacker_base_strength: attacker_base,
            defender_base_strength: defender_base,
            attacker_modifiers,
            defender_modifiers,
            attacker_final_strength: attacker_final,
            defender_final_strength: defender_final,
            random_factor: ctx.random,
        },
    }
}

/// Calculate attacker combat modifiers.
fn calculate_attacker_modifiers(ctx: &CombatContext, mods: &mut Vec<CombatModifier>) -> f32 {
    let mut total = 0.0f32;

    if ctx.attacker_tile.height > ctx.defender_tile.height {
        mods.push(CombatModifier {
            name: "High ground".to_string(),
            percentage: HIGH_GROUND_BONUS,
        });
        total += HIGH_GROUND_BONUS as f32;
    }

    total
}

/// Calculate defender combat modifiers.
fn calculate_defender_modifiers(ctx: &CombatContext, mods: &mut Vec<CombatModifier>) -> f32 {
    let mut total = 0.0f32;

    let terrain_bonus = ctx.defender_tile.defense_bonus();
    if terrain_bonus != 0 {
        mods.push(CombatModifier {
            name: format!("Terrain ({})", ctx.defender_tile.terrain),
            percentage: terrain_bonus,
        });
        total += terrain_bonus as f32;
    }

    total
}

/// Calculate casualties from the strength ratio.
///
/// - Equal strength: 8% of the attackers' number to the defender, 5% of the
///   defenders' number to the attacker
/// - Every quadrupling of the ratio doubles the first and halves the second
/// - The random factor swings each side by up to 20%, in opposite directions
fn calculate_damage(
    attacker_strength: f32,
    defender_strength: f32,
    attacker_soldiers: u32,
    defender_soldiers: u32,
    random: f32,
) -> (u32, u32) {
    if attacker_strength <= 0.0 || defender_strength <= 0.0 {
        return (0, 0);
    }

    let ratio = (attacker_strength / defender_strength).sqrt();

    let random_factor = 0.8 + random * 0.4;
    let defender_losses =
        (attacker_soldiers as f32 * DEFENDER_LOSS_RATE * ratio * random_factor).round() as u32;

    let random_factor_def = 0.8 + (1.0 - random) * 0.4;
    let attacker_losses =
        (defender_soldiers as f32 * ATTACKER_LOSS_RATE / ratio * random_factor_def).round() as u32;

    (
        defender_losses.max(1).min(defender_soldiers),
        attacker_losses.min(attacker_soldiers),
    )
}

/// Chance that a plot against `target` succeeds. Leaders never turn.
pub fn plot_chance(plotter: &Unit, target: &Unit) -> f32 {
    if target.is_leader {
        return 0.0;
    }
    // Wavering, battered contingents listen more readily
    let wits = (plotter.atk as f32 - target.def as f32) / 200.0;
    let morale = (1.0 - target.strength_ratio()) * 0.3;
    (0.3 + wits + morale).clamp(0.05, 0.9)
}

/// Soldiers who leave after a successful plot.
pub fn desertion(target: &Unit) -> u32 {
    ((target.soldiers as f32 * DESERTION_RATE).round() as u32)
        .max(1)
        .min(target.soldiers)
}
