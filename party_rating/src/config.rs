// ********* Category taxonomy ***********

// The category set is closed: the manually entered parties plus the
// derived その他. The display order and the colors are static lookups,
// independent of input or arrival order.

/// The categories that receive a manually entered rating, in the order
/// they appear on the entry form.
pub const MANUAL_PARTIES: [&str; 12] = [
    "自民党",
    "立憲民主党",
    "日本維新の会",
    "公明党",
    "共産党",
    "国民民主党",
    "れいわ新選組",
    "社民党",
    "参政党",
    "日本保守党",
    "みんなでつくる党",
    "支持なし",
];

/// The derived category, computed by subtraction from 100%.
pub const OTHER_PARTY: &str = "その他";

/// Display token for a rating that could not be derived because the
/// manual entries already exceed 100%.
pub const ERROR_TOKEN: &str = "エラー";

/// Canonical order for every chart and table.
pub const DISPLAY_ORDER: [&str; 13] = [
    "自民党",
    "公明党",
    "立憲民主党",
    "日本維新の会",
    "国民民主党",
    "参政党",
    "れいわ新選組",
    "共産党",
    "日本保守党",
    "社民党",
    "みんなでつくる党",
    "その他",
    "支持なし",
];

/// Default selection for the time-series chart.
pub const DEFAULT_TREND_PARTIES: [&str; 3] = ["自民党", "立憲民主党", "日本維新の会"];

/// Chart color for a category outside the canonical set (#888888).
pub const FALLBACK_COLOR: (u8, u8, u8) = (0x88, 0x88, 0x88);

/// Canonical chart color for a category, as an RGB triple.
pub fn party_color(party: &str) -> (u8, u8, u8) {
    match party {
        "自民党" => (255, 0, 0),             // red
        "公明党" => (0, 0, 128),             // navy
        "立憲民主党" => (0, 0, 255),         // blue
        "日本維新の会" => (154, 205, 50),    // yellowgreen
        "国民民主党" => (255, 215, 0),       // gold
        "参政党" => (255, 165, 0),           // orange
        "れいわ新選組" => (255, 20, 147),    // deeppink
        "共産党" => (178, 34, 34),           // firebrick
        "日本保守党" => (135, 206, 235),     // skyblue
        "社民党" => (186, 85, 211),          // mediumorchid
        "みんなでつくる党" => (128, 0, 128), // purple
        "その他" => (0, 0, 0),               // black
        "支持なし" => (128, 128, 128),       // gray
        _ => FALLBACK_COLOR,
    }
}

/// Position of a category in the canonical display order. Categories
/// outside the canonical set sort after all known ones.
pub fn display_rank(party: &str) -> usize {
    DISPLAY_ORDER
        .iter()
        .position(|p| *p == party)
        .unwrap_or(DISPLAY_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_parties_are_all_ranked() {
        for p in MANUAL_PARTIES.iter() {
            assert!(display_rank(p) < DISPLAY_ORDER.len(), "unranked party {}", p);
        }
        assert!(display_rank(OTHER_PARTY) < DISPLAY_ORDER.len());
    }

    #[test]
    fn unknown_party_sorts_last_and_gets_fallback_color() {
        assert_eq!(display_rank("新党X"), DISPLAY_ORDER.len());
        assert_eq!(party_color("新党X"), FALLBACK_COLOR);
        assert!(display_rank("支持なし") < display_rank("新党X"));
    }

    #[test]
    fn every_canonical_party_has_a_dedicated_color() {
        for p in DISPLAY_ORDER.iter() {
            assert_ne!(party_color(p), FALLBACK_COLOR, "fallback color for {}", p);
        }
    }
}
