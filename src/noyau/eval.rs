//! Noyau — évaluation (pipeline réel)
//!
//! tokenize -> RPN -> réduction sur pile de valeurs
//!
//! Le pipeline est atomique : jetons et RPN sont rendus avec le résultat
//! (démarche / historique) puis jetés.

use thiserror::Error;
use tracing::{debug, warn};

use super::jetons::{format_tokens, tokenize, Operator, Token};
use super::rpn::to_rpn;

/// Garde-fou : longueur maximale d’une expression (anti-abus / anti-gel).
pub const LONGUEUR_MAX: usize = 4096;

/// Jetons + RPN d’une évaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostic {
    pub tokens: Vec<Token>,
    pub postfix: Vec<Token>,
}

impl Diagnostic {
    pub fn jetons_txt(&self) -> String {
        format_tokens(&self.tokens)
    }

    pub fn rpn_txt(&self) -> String {
        format_tokens(&self.postfix)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub valeur: f64,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Aucun jeton : rien à évaluer.
    #[error("expression vide")]
    Malformee,

    /// Résultat non fini (division par zéro, opérande manquant, débordement…).
    #[error("résultat hors domaine: {valeur}")]
    Domaine { valeur: f64, diagnostic: Diagnostic },

    /// Garde-fou violé ou état imprévu.
    #[error("erreur interne: {0}")]
    Interne(String),
}

fn applique(op: Operator, a: f64, b: f64) -> f64 {
    match op {
        Operator::Plus => a + b,
        Operator::Minus => a - b,
        Operator::Star => a * b,
        Operator::Slash => {
            if b == 0.0 {
                f64::NAN
            } else {
                a / b
            }
        }
        Operator::Caret => a.powf(b),
    }
}

/// Réduit une RPN à une valeur. Jamais de panique : tout cas tordu donne NaN.
///
/// - opérande manquant => NaN
/// - pile vide à la fin => NaN
/// - plusieurs valeurs restantes => la dernière empilée
pub fn eval_rpn(rpn: &[Token]) -> f64 {
    let mut st: Vec<f64> = Vec::with_capacity(rpn.len());

    for tok in rpn {
        match tok {
            Token::Num(n) => st.push(n.parse::<f64>().unwrap_or(f64::NAN)),

            Token::Op(op) => {
                let b = st.pop().unwrap_or(f64::NAN);
                let a = st.pop().unwrap_or(f64::NAN);
                st.push(applique(*op, a, b));
            }

            // une parenthèse n’a rien à faire en RPN
            Token::LPar | Token::RPar => st.push(f64::NAN),
        }
    }

    if st.len() > 1 {
        debug!(restants = st.len(), "valeurs orphelines en fin de RPN");
    }
    st.pop().unwrap_or(f64::NAN)
}

/// API publique : évalue une expression saisie.
pub fn eval_expression(expr_str: &str) -> Result<Evaluation, EvalError> {
    if expr_str.chars().count() > LONGUEUR_MAX {
        warn!(longueur = expr_str.len(), "expression refusée (trop longue)");
        return Err(EvalError::Interne(format!(
            "expression trop longue (max {LONGUEUR_MAX} caractères)"
        )));
    }

    // 1) Jetons
    let tokens = tokenize(expr_str);
    if tokens.is_empty() {
        return Err(EvalError::Malformee);
    }

    // 2) RPN
    let postfix = to_rpn(&tokens);

    // 3) Réduction
    let valeur = eval_rpn(&postfix);

    let diagnostic = Diagnostic { tokens, postfix };
    debug!(
        jetons = %diagnostic.jetons_txt(),
        rpn = %diagnostic.rpn_txt(),
        valeur,
        "évaluation"
    );

    if !valeur.is_finite() {
        return Err(EvalError::Domaine { valeur, diagnostic });
    }

    Ok(Evaluation { valeur, diagnostic })
}
