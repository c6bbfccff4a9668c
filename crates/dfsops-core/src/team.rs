// NFL team abbreviation canonicalization.
//
// Sources disagree on a handful of abbreviations (PFR uses three letters for
// everyone, NFLverse still emits "LA" for the Rams, some books send "WSH").
// Everything is mapped onto the DraftKings spelling before comparison.

/// Return the DraftKings spelling of a team abbreviation: trimmed,
/// upper-cased, with known aliases and relocated franchises folded in.
pub fn canonical_team(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let mapped = match upper.as_str() {
        "JAC" => "JAX",
        "LA" | "STL" => "LAR",
        "WSH" => "WAS",
        "OAK" | "LVR" => "LV",
        "SD" => "LAC",
        "ARZ" => "ARI",
        "GNB" => "GB",
        "KAN" => "KC",
        "NOR" => "NO",
        "SFO" => "SF",
        "TAM" => "TB",
        "NWE" => "NE",
        "HST" => "HOU",
        "BLT" => "BAL",
        "CLV" => "CLE",
        other => return other.to_string(),
    };
    mapped.to_string()
}

/// Case- and alias-insensitive team comparison.
pub fn same_team(a: &str, b: &str) -> bool {
    canonical_team(a) == canonical_team(b)
}
