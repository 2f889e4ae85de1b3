//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline et la session sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - longueur bornée
//! - budget temps global
//! - invariant clé : l’entrée est toujours une sentinelle ou un texte
//!   que le pavé a pu produire (jamais de panique, jamais d’état incohérent)

use std::time::{Duration, Instant};

use super::eval::{eval_expression, EvalError};
use super::format::{parse_display_number, SENTINELLE_NAN};
use super::jetons::Operator;
use super::session::{Etape, Session, Unaire, SENTINELLE_ERREUR};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération (bornée) ------------------------ */

const ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ',', '+', '-', '*', '/', '^', '(', ')',
    ' ', '×', '÷', '−', 'x', '%', 'é',
];

fn gen_texte(rng: &mut Rng, max_len: u32) -> String {
    let n = rng.pick(max_len + 1);
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
        .collect()
}

const OPERATEURS: [Operator; 5] = [
    Operator::Plus,
    Operator::Minus,
    Operator::Star,
    Operator::Slash,
    Operator::Caret,
];

const UNAIRES: [Unaire; 10] = [
    Unaire::Carre,
    Unaire::Racine,
    Unaire::Inverse,
    Unaire::Factorielle,
    Unaire::Ln,
    Unaire::Log10,
    Unaire::Exp,
    Unaire::Sin,
    Unaire::Cos,
    Unaire::Tan,
];

/// Une touche au hasard, avec un biais vers chiffres et opérateurs.
fn touche_au_hasard(rng: &mut Rng, s: &mut Session) {
    match rng.pick(20) {
        0..=7 => s.append(char::from(b'0' + rng.pick(10) as u8)),
        8 => s.append('.'),
        9 => s.append(if rng.pick(2) == 0 { '(' } else { ')' }),
        10..=12 => s.push_operator(OPERATEURS[rng.pick(5) as usize]),
        13 => s.evaluate(),
        14 => s.unaire(UNAIRES[rng.pick(10) as usize]),
        15 => s.toggle_sign(),
        16 => s.percent(),
        17 => s.delete_last(),
        18 => match rng.pick(4) {
            0 => s.memory_add(),
            1 => s.memory_subtract(),
            2 => s.memory_recall(),
            _ => s.load_last_result(),
        },
        _ => match rng.pick(3) {
            0 => s.clear_entry(),
            1 => s.clear_all(),
            _ => s.toggle_angle_mode(),
        },
    }
}

fn check_invariants(s: &Session) {
    let c = s.courant();
    assert!(!c.is_empty(), "entrée vide");

    if c != SENTINELLE_NAN && c != SENTINELLE_ERREUR {
        assert!(
            c.chars()
                .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '(' | ')')),
            "caractère inattendu dans l’entrée: {c:?}"
        );
        assert!(c.matches('.').count() <= 1, "deux séparateurs: {c:?}");
    }

    match s.etape() {
        Etape::Operande => assert_eq!(s.historique(), ""),
        Etape::Attente { .. } => assert!(s.historique().ends_with(' ')),
    }

    if let Some(d) = s.dernier() {
        assert!(d.is_finite(), "dernier résultat non fini");
    }
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_pipeline_ne_panique_jamais() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..2000 {
        budget(t0, max);

        let expr = gen_texte(&mut rng, 24);
        match eval_expression(&expr) {
            Ok(ev) => {
                assert!(ev.valeur.is_finite(), "expr={expr:?}");
                assert!(!ev.diagnostic.tokens.is_empty());
                seen_ok += 1;
            }
            Err(EvalError::Malformee) => {}
            Err(EvalError::Domaine { valeur, .. }) => {
                assert!(!valeur.is_finite(), "expr={expr:?}");
                seen_err += 1;
            }
            Err(e @ EvalError::Interne(_)) => panic!("erreur non attendue: expr={expr:?} err={e}"),
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 20, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let mut a = Rng::new(0xBADC0DE_u64);
    let mut b = Rng::new(0xBADC0DE_u64);

    for _ in 0..200 {
        let ea = gen_texte(&mut a, 16);
        let eb = gen_texte(&mut b, 16);
        assert_eq!(ea, eb);
        let (ra, rb) = (eval_expression(&ea), eval_expression(&eb));
        match (ra, rb) {
            (Ok(x), Ok(y)) => assert_eq!(x.valeur.to_bits(), y.valeur.to_bits()),
            (x, y) => assert_eq!(x.is_ok(), y.is_ok()),
        }
    }
}

#[test]
fn fuzz_safe_session_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1500);

    for seed in 0..20u64 {
        let mut rng = Rng::new(0x5EED_0000 + seed);
        let mut s = Session::default();

        for _ in 0..300 {
            budget(t0, max);
            touche_au_hasard(&mut rng, &mut s);
            check_invariants(&s);
        }
    }
}

#[test]
fn fuzz_safe_resultat_relu_par_le_pipeline() {
    // tout résultat affiché par "=" doit se réévaluer en lui-même
    let mut rng = Rng::new(0xFEED_u64);
    let mut s = Session::default();
    let mut verifies = 0usize;

    for _ in 0..3000 {
        touche_au_hasard(&mut rng, &mut s);
        if s.etape() != &Etape::Operande {
            continue;
        }
        let Some(d) = s.dernier() else { continue };
        if parse_display_number(s.courant()) != d {
            continue; // l’entrée a été retouchée depuis "="
        }
        let relu = eval_expression(s.courant())
            .unwrap_or_else(|e| panic!("courant={:?} err={e}", s.courant()))
            .valeur;
        assert_eq!(relu, d, "courant={:?}", s.courant());
        verifies += 1;
    }

    assert!(verifies > 0, "aucun résultat vérifié");
}
