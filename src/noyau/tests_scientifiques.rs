//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : vérifier le pipeline sur des propriétés arithmétiques connues,
//! sans faire chauffer la machine (budget temps, tailles bornées).

use std::time::{Duration, Instant};

use super::eval::{eval_expression, EvalError};
use super::format::{format_for_display, format_for_storage, parse_display_number};
use super::lecture::{clamp_precision, PRECISION_DEFAUT};

fn eval_ok(expr: &str) -> f64 {
    eval_expression(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .valeur
}

fn eval_clamp(expr: &str) -> f64 {
    clamp_precision(eval_ok(expr), PRECISION_DEFAUT)
}

fn assert_hors_domaine(expr: &str) {
    assert!(
        matches!(eval_expression(expr), Err(EvalError::Domaine { .. })),
        "attendu hors domaine pour expr={expr:?}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Précédence / associativité ------------------------ */

#[test]
fn sci_precedence_table() {
    let cas = [
        ("2+3*4", 14.0),
        ("2*3+4", 10.0),
        ("2+3^2", 11.0),
        ("2*3^2", 18.0),
        ("(2+3)^2", 25.0),
        ("2^3^2", 512.0),
        ("2^(3^2)", 512.0),
        ("(2^3)^2", 64.0),
        ("20-5-5", 10.0),
        ("20-(5-5)", 20.0),
        ("64/4/2", 8.0),
        ("64/(4/2)", 32.0),
        ("1+2*3-4/2^2", 6.0),
    ];
    for (expr, attendu) in cas {
        assert_eq!(eval_ok(expr), attendu, "expr={expr:?}");
    }
}

#[test]
fn sci_espaces_et_glyphes_equivalents() {
    let a = eval_ok("12*3-4/2");
    let b = eval_ok(" 12 × 3 − 4 ÷ 2 ");
    assert_eq!(a, b);
    assert_eq!(a, 34.0);
}

/* ------------------------ Domaine ------------------------ */

#[test]
fn sci_division_par_zero_contamine() {
    assert_hors_domaine("5/0");
    assert_hors_domaine("1 + 5/0");
    assert_hors_domaine("(5/0) * 0");
    assert_hors_domaine("0/0");
}

#[test]
fn sci_debordement() {
    assert_hors_domaine("10^400");
    assert_eq!(eval_ok("10^-400"), 0.0);
}

#[test]
fn sci_racines_par_puissance() {
    assert_eq!(eval_clamp("2^0,5 * 2^0,5"), 2.0);
    assert_hors_domaine("(0-8)^(1/3)");
}

/* ------------------------ Arrondi ------------------------ */

#[test]
fn sci_arrondi_absorbe_les_residus() {
    assert_eq!(eval_clamp("0.1+0.2"), 0.3);
    assert_eq!(eval_clamp("1-0.9"), 0.1);
    assert_eq!(eval_clamp("0.1*3"), 0.3);
    assert_eq!(eval_clamp("1/3*3"), 1.0);
}

#[test]
fn sci_affichage_relisible() {
    for expr in ["1/3", "2/3", "-7/4", "10^15+0.5", "123.456*1000"] {
        let v = eval_ok(expr);
        let affiche = format_for_display(&format_for_storage(v, PRECISION_DEFAUT));
        assert_eq!(
            parse_display_number(&affiche),
            clamp_precision(v, PRECISION_DEFAUT),
            "expr={expr:?} affiche={affiche:?}"
        );
        // l’affichage se réévalue tel quel
        assert_eq!(eval_clamp(&affiche), clamp_precision(v, PRECISION_DEFAUT));
    }
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_longue_somme() {
    let t0 = Instant::now();
    let max = Duration::from_millis(250);

    let expr = vec!["0.5"; 800].join("+");
    budget(t0, max);
    assert_eq!(eval_ok(&expr), 400.0);
    budget(t0, max);
}

#[test]
fn sci_stress_parentheses_imbriquees() {
    let t0 = Instant::now();
    let max = Duration::from_millis(250);

    let profondeur = 1000;
    let expr = format!("{}1{}", "(".repeat(profondeur), "+1)".repeat(profondeur));
    budget(t0, max);
    assert_eq!(eval_ok(&expr), 1001.0);
    budget(t0, max);
}
