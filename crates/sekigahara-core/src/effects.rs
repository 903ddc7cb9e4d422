//! Transient visual feedback produced during resolution.
//!
//! The engine only ever appends effects; decaying and drawing them is the
//! renderer's job. Geometry is stored in world pixels so the renderer only
//! has to apply its camera.

use crate::hex::{hex_to_pixel, HexCoord, Point};
use serde::{Deserialize, Serialize};

/// Frames a beam stays visible.
pub const BEAM_LIFE: u32 = 30;
/// Frames a dust cloud stays visible.
pub const DUST_LIFE: u32 = 30;
/// Frames a shockwave ring keeps expanding.
pub const SHOCKWAVE_LIFE: u32 = 40;
/// Frames floating casualty text stays up.
pub const FLOATING_TEXT_LIFE: u32 = 60;
/// Frames a speech bubble stays up.
pub const SPEECH_BUBBLE_LIFE: u32 = 120;

/// Colour of dust clouds.
pub const DUST_COLOR: &str = "#C8C8B4";
/// Colour of an engagement shockwave.
pub const CLASH_COLOR: &str = "#FFAA00";
/// Colour used for everything a plot produces.
pub const PLOT_COLOR: &str = "#C800FF";
/// Colour of casualty numbers.
pub const CASUALTY_COLOR: &str = "#FF4444";

/// What an effect looks like.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// A line between attacker and target.
    Beam { from: Point, to: Point },
    /// A dust cloud left by marching troops.
    Dust { at: Point },
    /// An expanding ring.
    Shockwave { at: Point },
    /// Text drifting up from a point.
    FloatingText { at: Point, text: String },
    /// A commander's shout.
    SpeechBubble { at: Point, text: String },
}

/// One transient effect. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub color: String,
    /// Frames left before the renderer discards it.
    pub life: u32,
}

impl Effect {
    pub fn beam(from: HexCoord, to: HexCoord, color: &str) -> Self {
        Self {
            kind: EffectKind::Beam {
                from: hex_to_pixel(from),
                to: hex_to_pixel(to),
            },
            color: color.to_string(),
            life: BEAM_LIFE,
        }
    }

    pub fn dust(at: HexCoord) -> Self {
        Self {
            kind: EffectKind::Dust {
                at: hex_to_pixel(at),
            },
            color: DUST_COLOR.to_string(),
            life: DUST_LIFE,
        }
    }

    pub fn shockwave(at: HexCoord, color: &str) -> Self {
        Self {
            kind: EffectKind::Shockwave {
                at: hex_to_pixel(at),
            },
            color: color.to_string(),
            life: SHOCKWAVE_LIFE,
        }
    }

    pub fn floating_text(at: HexCoord, text: impl Into<String>, color: &str) -> Self {
        Self {
            kind: EffectKind::FloatingText {
                at: hex_to_pixel(at),
                text: text.into(),
            },
            color: color.to_string(),
            life: FLOATING_TEXT_LIFE,
        }
    }

    pub fn speech_bubble(at: HexCoord, text: impl Into<String>, color: &str) -> Self {
        Self {
            kind: EffectKind::SpeechBubble {
                at: hex_to_pixel(at),
                text: text.into(),
            },
            color: color.to_string(),
            life: SPEECH_BUBBLE_LIFE,
        }
    }

    /// Check if this is a speech bubble (drawn on a separate layer).
    pub fn is_bubble(&self) -> bool {
        matches!(self.kind, EffectKind::SpeechBubble { .. })
    }
}

/// Append-only sink for effects.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectBus {
    effects: Vec<Effect>,
}

impl EffectBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects in the order they were appended.
    pub fn as_slice(&self) -> &[Effect] {
        &self.effects
    }

    /// Effects appended at or after position `from`.
    pub fn since(&self, from: usize) -> &[Effect] {
        self.effects.get(from..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Hand every effect over to the renderer.
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        let a = HexCoord::new(1, 1);
        let b = HexCoord::new(2, 1);
        assert_eq!(Effect::beam(a, b, "#FFFFFF").life, 30);
        assert_eq!(Effect::dust(a).life, 30);
        assert_eq!(Effect::shockwave(a, PLOT_COLOR).life, 40);
    }

    #[test]
    fn test_geometry_in_pixels() {
        let effect = Effect::beam(HexCoord::new(0, 0), HexCoord::new(3, 2), "#FFFFFF");
        match effect.kind {
            EffectKind::Beam { from, to } => {
                assert_eq!(from, hex_to_pixel(HexCoord::new(0, 0)));
                assert_eq!(to, hex_to_pixel(HexCoord::new(3, 2)));
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_bus_appends_in_order() {
        let mut bus = EffectBus::new();
        assert!(bus.is_empty());
        bus.push(Effect::dust(HexCoord::new(0, 0)));
        bus.push(Effect::speech_bubble(HexCoord::new(0, 0), "Forward!", "#FFFFFF"));
        assert_eq!(bus.len(), 2);
        assert!(bus.as_slice()[1].is_bubble());
        assert_eq!(bus.since(1).len(), 1);
        assert!(bus.since(5).is_empty());

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_effect_json_tag() {
        let json = serde_json::to_value(Effect::dust(HexCoord::new(0, 0))).unwrap();
        assert_eq!(json["kind"]["type"], "dust");
        assert_eq!(json["life"], 30);
    }
}
