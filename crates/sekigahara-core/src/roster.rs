//! The order of battle: which warlords take the field and where.

use crate::hex::HexCoord;
use crate::types::{Side, SizeClass};
use serde::{Deserialize, Serialize};

/// One roster entry, as written in the session config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarlordSpec {
    pub name: String,
    pub side: Side,
    pub soldiers: u32,
    pub atk: u32,
    pub def: u32,
    pub position: HexCoord,
    #[serde(default)]
    pub size: SizeClass,
    #[serde(default)]
    pub leader: bool,
}

#[allow(clippy::too_many_arguments)]
fn warlord(
    name: &str,
    side: Side,
    soldiers: u32,
    atk: u32,
    def: u32,
    q: i32,
    r: i32,
    size: SizeClass,
    leader: bool,
) -> WarlordSpec {
    WarlordSpec {
        name: name.to_string(),
        side,
        soldiers,
        atk,
        def,
        position: HexCoord::new(q, r),
        size,
        leader,
    }
}

/// Historical deployment on the morning of the battle (60 x 60 field).
pub fn sekigahara() -> Vec<WarlordSpec> {
    use Side::{East, West};
    use SizeClass::{Large, Small};

    vec![
        // Eastern army
        warlord("Tokugawa Ieyasu", East, 30000, 80, 85, 42, 32, Large, true),
        warlord("Fukushima Masanori", East, 6000, 85, 60, 24, 20, Small, false),
        warlord("Kuroda Nagamasa", East, 5400, 75, 65, 20, 14, Small, false),
        warlord("Hosokawa Tadaoki", East, 5000, 70, 70, 22, 16, Small, false),
        warlord("Ii Naomasa", East, 3600, 90, 60, 27, 23, Small, false),
        warlord("Matsudaira Tadayoshi", East, 3000, 65, 60, 28, 22, Small, false),
        warlord("Todo Takatora", East, 2500, 70, 65, 30, 25, Small, false),
        warlord("Honda Tadakatsu", East, 500, 95, 80, 32, 26, Small, false),
        warlord("Kyogoku Takatomo", East, 3000, 60, 60, 33, 28, Small, false),
        // Western army
        warlord("Ishida Mitsunari", West, 6000, 65, 80, 8, 24, Large, true),
        warlord("Shimazu Yoshihiro", West, 1500, 95, 75, 10, 28, Small, false),
        warlord("Konishi Yukinaga", West, 4000, 65, 65, 11, 32, Small, false),
        warlord("Ukita Hideie", West, 17000, 75, 70, 12, 37, Large, false),
        warlord("Otani Yoshitsugu", West, 600, 80, 85, 10, 43, Small, false),
        warlord("Wakisaka Yasuharu", West, 1000, 55, 55, 12, 47, Small, false),
        warlord("Kobayakawa Hideaki", West, 15600, 60, 60, 5, 50, Large, false),
        warlord("Kikkawa Hiroie", West, 3000, 60, 65, 46, 48, Small, false),
        warlord("Mori Hidemoto", West, 15000, 60, 70, 50, 52, Large, false),
        warlord("Chosokabe Morichika", West, 6600, 65, 60, 53, 56, Small, false),
    ]
}
