//! Presentation helpers for a detail record.

/// `mr-mime` → `Mr mime`.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('-', " "),
        None => String::new(),
    }
}

fn weak_to(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "normal" => &["fighting"],
        "fire" => &["water", "ground", "rock"],
        "water" => &["electric", "grass"],
        "grass" => &["fire", "ice", "poison", "flying", "bug"],
        "electric" => &["ground"],
        "ice" => &["fire", "fighting", "rock", "steel"],
        "fighting" => &["flying", "psychic", "fairy"],
        "poison" => &["ground", "psychic"],
        "ground" => &["water", "grass", "ice"],
        "flying" => &["electric", "ice", "rock"],
        "psychic" => &["bug", "ghost", "dark"],
        "bug" => &["flying", "rock", "fire"],
        "rock" => &["water", "grass", "fighting", "ground", "steel"],
        "ghost" => &["ghost", "dark"],
        "dragon" => &["ice", "dragon", "fairy"],
        "dark" => &["fighting", "bug", "fairy"],
        "steel" => &["fire", "fighting", "ground"],
        "fairy" => &["poison", "steel"],
        _ => &[],
    }
}

/// Attacking types each of `types` is weak to, first occurrence kept.
/// Resistances and immunities of a dual type are not cancelled out.
pub fn weaknesses(types: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for weakness in types.iter().flat_map(|type_name| weak_to(type_name)) {
        if !result.iter().any(|seen| seen == weakness) {
            result.push(weakness.to_string());
        }
    }
    result
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GenderRatio {
    Genderless,
    Split { male_pct: f64, female_pct: f64 },
}

/// PokeAPI `gender_rate` is the female share in eighths; -1 is genderless.
pub fn gender_ratio(rate: i8) -> GenderRatio {
    if rate < 0 {
        return GenderRatio::Genderless;
    }
    let female_pct = f64::from(rate.min(8)) / 8.0 * 100.0;
    GenderRatio::Split {
        male_pct: 100.0 - female_pct,
        female_pct,
    }
}

impl std::fmt::Display for GenderRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenderRatio::Genderless => write!(f, "genderless"),
            GenderRatio::Split { female_pct, .. } if *female_pct == 0.0 => write!(f, "100% ♂"),
            GenderRatio::Split { male_pct, .. } if *male_pct == 0.0 => write!(f, "100% ♀"),
            GenderRatio::Split {
                male_pct,
                female_pct,
            } => write!(f, "{male_pct}% ♂ / {female_pct}% ♀"),
        }
    }
}
