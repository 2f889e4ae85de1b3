// src/noyau/format.rs
//
// Formes d’un nombre :
// - stockage  : texte canonique, séparateur '.', jamais d’exposant (relisible par le tokenizer)
// - affichage : séparateur ',' (rien d’autre : pas de groupement, pas de troncature)

use super::jetons::Operator;
use super::lecture::clamp_precision;

/// Sentinelle “pas un nombre” (forme de stockage d’un non-fini).
pub const SENTINELLE_NAN: &str = "NaN";

/// Arrondit puis rend la forme de stockage. Non-fini => "NaN".
pub fn format_for_storage(x: f64, precision: usize) -> String {
    let v = clamp_precision(x, precision);
    if !v.is_finite() {
        return SENTINELLE_NAN.to_string();
    }
    if v == 0.0 {
        // pas de "-0"
        return "0".to_string();
    }
    // Display de f64 : plus courte écriture relisible, sans exposant
    format!("{v}")
}

/// Forme d’affichage : '.' -> ','.
pub fn format_for_display(stockage: &str) -> String {
    stockage.replace('.', ",")
}

/// Expression affichée : séparateur ',' et glyphes d’opérateurs (− × ÷).
pub fn format_expression_for_display(expression: &str) -> String {
    format_for_display(expression)
        .chars()
        .map(|c| Operator::from_char(c).map_or(c, Operator::glyphe))
        .collect()
}

/// Relit un nombre saisi ou affiché ('.' ou ',').
/// "" et "-" => NaN ; reste illisible ou non-fini => NaN.
pub fn parse_display_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return f64::NAN;
    }

    let normalise = s.replacen(',', ".", 1);
    match normalise.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}
