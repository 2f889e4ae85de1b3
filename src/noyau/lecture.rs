// src/noyau/lecture.rs
//
// Arrondi décimal exact d’un f64 (à la manière de toFixed) :
//   x (valeur binaire exacte) -> rationnel -> ×10^digits -> arrondi -> texte -> f64
//
// Le passage par le texte laisse le parseur de f64 choisir le flottant le plus proche.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

/// Précision par défaut (chiffres après la virgule).
pub const PRECISION_DEFAUT: usize = 12;

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal.
pub fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;

    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// x -> entier “scalé” = round(x * 10^digits), moitié loin de zéro.
/// None si x n’est pas fini.
fn arrondi_scaled(x: f64, digits: usize) -> Option<BigInt> {
    let r = BigRational::from_float(x)?;
    let scaled = r * BigRational::from_integer(pow10(digits));
    Some(scaled.round().to_integer())
}

/// Arrondit `x` à au plus `precision` décimales. NaN / ±∞ passent tels quels.
pub fn clamp_precision(x: f64, precision: usize) -> f64 {
    if !x.is_finite() {
        return x;
    }

    let Some(scaled) = arrondi_scaled(x, precision) else {
        return x;
    };
    if scaled.is_zero() {
        return 0.0;
    }

    scaled_to_decimal(scaled, precision).parse::<f64>().unwrap_or(x)
}
