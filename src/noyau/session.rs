//! Session de calcul : la machine à états du pavé.
//!
//! État explicite (pas d’inférence par motif sur le texte d’historique) :
//! - `Etape::Operande` : aucune expression en cours, seule l’entrée compte ;
//! - `Etape::Attente`  : préfixe validé + opérateur en attente d’opérande.
//!
//! Contrats :
//! - aucune action ne panique ni ne renvoie d’erreur : les erreurs s’affichent
//!   en place (sentinelles "NaN" / "Erreur") et un retour `Err` est émis ;
//! - l’entrée est toujours en forme de stockage (séparateur '.').

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use tracing::{debug, info, warn};

use super::eval::{eval_expression, EvalError};
use super::format::{
    format_expression_for_display, format_for_display, format_for_storage, parse_display_number,
    SENTINELLE_NAN,
};
use super::jetons::Operator;
use super::lecture::{clamp_precision, PRECISION_DEFAUT};
use super::ports::{AngleMode, AngleStore, Feedback, FeedbackSink, HistorySink, Rien};

/// Sentinelle d’échec imprévu (distincte de "NaN").
pub const SENTINELLE_ERREUR: &str = "Erreur";

/// Littéral zéro : entrée “vierge”.
const ZERO: &str = "0";

/// n! au-delà de cette borne déborde un f64.
const LIMITE_FACTORIELLE_DEFAUT: u32 = 170;

/// Réglages injectés à la construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Reglages {
    /// Décimales conservées (arrondi de chaque résultat).
    pub precision: usize,
    pub limite_factorielle: u32,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            precision: PRECISION_DEFAUT,
            limite_factorielle: LIMITE_FACTORIELLE_DEFAUT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Etape {
    Operande,
    Attente { prefixe: String, operateur: Operator },
}

/// Fonctions unaires “scientifiques”.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unaire {
    Carre,
    Racine,
    Inverse,
    Factorielle,
    Ln,
    Log10,
    Exp,
    Sin,
    Cos,
    Tan,
}

/// Photo de l’état visible (tests, debug).
#[derive(Clone, Debug, PartialEq)]
pub struct Instantane {
    pub courant: String,
    pub historique: String,
    pub dernier: Option<f64>,
    pub memoire: f64,
    pub angle: AngleMode,
}

pub struct Session {
    courant: String,
    etape: Etape,
    dernier: Option<f64>,
    memoire: f64,
    angle: AngleMode,
    reglages: Reglages,

    historique: Box<dyn HistorySink>,
    retour: Box<dyn FeedbackSink>,
    stockage_angle: Box<dyn AngleStore>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Reglages::default())
    }
}

impl Session {
    pub fn new(reglages: Reglages) -> Self {
        Self {
            courant: ZERO.to_string(),
            etape: Etape::Operande,
            dernier: None,
            memoire: 0.0,
            angle: AngleMode::default(),
            reglages,
            historique: Box::new(Rien),
            retour: Box::new(Rien),
            stockage_angle: Box::new(Rien),
        }
    }

    pub fn avec_historique(mut self, sink: impl HistorySink + 'static) -> Self {
        self.historique = Box::new(sink);
        self
    }

    pub fn avec_retour(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.retour = Box::new(sink);
        self
    }

    /// Branche le stockage du mode d’angle et y lit le mode initial
    /// (degrés si absent ou invalide).
    pub fn avec_stockage_angle(mut self, store: impl AngleStore + 'static) -> Self {
        self.angle = match store.charger() {
            None => AngleMode::default(),
            Some(brut) => brut.parse().unwrap_or_else(|e| {
                warn!("{e}, retour aux degrés");
                AngleMode::default()
            }),
        };
        self.stockage_angle = Box::new(store);
        self
    }

    /* ------------------------ Lecture ------------------------ */

    /// Entrée courante, forme de stockage.
    pub fn courant(&self) -> &str {
        &self.courant
    }

    /// Entrée courante, forme d’affichage.
    pub fn courant_affiche(&self) -> String {
        format_for_display(&self.courant)
    }

    /// Préfixe en attente, tel qu’il sera concaténé à l’entrée : "5 + 3 * ".
    pub fn historique(&self) -> String {
        match &self.etape {
            Etape::Operande => String::new(),
            Etape::Attente { prefixe, operateur } => format!("{prefixe} {operateur} "),
        }
    }

    /// Préfixe en attente, forme d’affichage (virgule + glyphes du pavé).
    pub fn historique_affiche(&self) -> String {
        format_expression_for_display(&self.historique())
    }

    pub fn etape(&self) -> &Etape {
        &self.etape
    }

    pub fn dernier(&self) -> Option<f64> {
        self.dernier
    }

    pub fn memoire(&self) -> f64 {
        self.memoire
    }

    pub fn angle(&self) -> AngleMode {
        self.angle
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn instantane(&self) -> Instantane {
        Instantane {
            courant: self.courant.clone(),
            historique: self.historique(),
            dernier: self.dernier,
            memoire: self.memoire,
            angle: self.angle,
        }
    }

    /* ------------------------ Outils internes ------------------------ */

    fn signaler(&mut self, kind: Feedback) {
        self.retour.signaler(kind);
    }

    fn est_sentinelle(&self) -> bool {
        self.courant == SENTINELLE_NAN || self.courant == SENTINELLE_ERREUR
    }

    fn valeur(&self) -> f64 {
        parse_display_number(&self.courant)
    }

    fn ecrire(&mut self, x: f64) {
        self.courant = format_for_storage(x, self.reglages.precision);
    }

    fn erreur_domaine(&mut self, quoi: &str) {
        debug!(operation = quoi, entree = %self.courant, "erreur de domaine");
        self.courant = SENTINELLE_NAN.to_string();
        self.signaler(Feedback::Err);
    }

    /// Dépose un résultat unaire : fini => tap, sinon erreur de domaine.
    fn deposer(&mut self, x: f64, quoi: &str) {
        if x.is_finite() {
            self.ecrire(x);
            self.signaler(Feedback::Tap);
        } else {
            self.erreur_domaine(quoi);
        }
    }

    /* ------------------------ Saisie ------------------------ */

    /// Chiffre, séparateur ('.' ou ','), ou parenthèse.
    pub fn append(&mut self, c: char) {
        self.signaler(Feedback::Tap);

        let c = if c == ',' { '.' } else { c };
        if !(c.is_ascii_digit() || matches!(c, '.' | '(' | ')')) {
            return;
        }

        if self.est_sentinelle() {
            self.courant = ZERO.to_string();
        }

        if c == '.' && self.courant.contains('.') {
            return;
        }

        if self.courant == ZERO && c != '.' && c != ')' {
            self.courant = c.to_string();
        } else {
            self.courant.push(c);
        }
    }

    /// Pousse un opérateur. Entrée vierge + opérateur en attente => on corrige l’opérateur.
    pub fn push_operator(&mut self, op: Operator) {
        self.signaler(Feedback::Tap);

        let etape = std::mem::replace(&mut self.etape, Etape::Operande);
        self.etape = match etape {
            Etape::Attente { prefixe, .. } if self.courant == ZERO => Etape::Attente {
                prefixe,
                operateur: op,
            },
            Etape::Attente { prefixe, operateur } => Etape::Attente {
                prefixe: format!("{prefixe} {operateur} {}", self.courant),
                operateur: op,
            },
            Etape::Operande => Etape::Attente {
                prefixe: self.courant.clone(),
                operateur: op,
            },
        };
        self.courant = ZERO.to_string();
    }

    /// AC
    pub fn clear_all(&mut self) {
        self.signaler(Feedback::Tap);
        self.courant = ZERO.to_string();
        self.etape = Etape::Operande;
        self.dernier = None;
    }

    /// CE
    pub fn clear_entry(&mut self) {
        self.signaler(Feedback::Tap);
        self.courant = ZERO.to_string();
    }

    /// DEL : retire le dernier caractère ; vide (ou sentinelle) => "0".
    pub fn delete_last(&mut self) {
        self.signaler(Feedback::Tap);
        if self.est_sentinelle() || self.courant.chars().count() <= 1 {
            self.courant = ZERO.to_string();
            return;
        }
        self.courant.pop();
    }

    /* ------------------------ Opérations unaires ------------------------ */

    /// ±
    pub fn toggle_sign(&mut self) {
        self.signaler(Feedback::Tap);
        if self.est_sentinelle() || self.courant == ZERO {
            return;
        }
        if let Some(reste) = self.courant.strip_prefix('-') {
            self.courant = if reste.is_empty() {
                ZERO.to_string()
            } else {
                reste.to_string()
            };
        } else {
            self.courant.insert(0, '-');
        }
    }

    /// % : pourcentage du dernier résultat s’il existe, sinon valeur / 100.
    pub fn percent(&mut self) {
        let v = self.valeur();
        if !v.is_finite() {
            return;
        }
        let x = match self.dernier {
            Some(d) => d * v / 100.0,
            None => v / 100.0,
        };
        self.deposer(x, "pourcentage");
    }

    pub fn unaire(&mut self, f: Unaire) {
        let v = self.valeur();

        match f {
            Unaire::Carre => {
                if v.is_finite() {
                    self.deposer(v * v, "carré");
                }
            }
            Unaire::Racine => {
                if v < 0.0 {
                    self.erreur_domaine("racine");
                } else {
                    self.deposer(v.sqrt(), "racine");
                }
            }
            Unaire::Inverse => {
                if !v.is_finite() || v == 0.0 {
                    self.erreur_domaine("inverse");
                } else {
                    self.deposer(1.0 / v, "inverse");
                }
            }
            Unaire::Factorielle => match factorielle(v, self.reglages.limite_factorielle) {
                Some(x) => self.deposer(x, "factorielle"),
                None => self.erreur_domaine("factorielle"),
            },
            Unaire::Ln => self.deposer(v.ln(), "ln"),
            Unaire::Log10 => self.deposer(v.log10(), "log10"),
            Unaire::Exp => self.deposer(v.exp(), "exp"),
            Unaire::Sin | Unaire::Cos | Unaire::Tan => {
                if !v.is_finite() {
                    return;
                }
                let a = self.angle.en_radians(v);
                let (x, quoi) = match f {
                    Unaire::Sin => (a.sin(), "sin"),
                    Unaire::Cos => (a.cos(), "cos"),
                    _ => (a.tan(), "tan"),
                };
                self.deposer(x, quoi);
            }
        }
    }

    /// π, e… : remplace l’entrée.
    pub fn set_constant(&mut self, x: f64) {
        self.signaler(Feedback::Tap);
        self.ecrire(x);
    }

    /// ANS : rien si aucun résultat encore.
    pub fn load_last_result(&mut self) {
        let Some(d) = self.dernier else {
            return;
        };
        self.signaler(Feedback::Tap);
        self.ecrire(d);
    }

    /// Reprend une valeur de l’historique comme nouveau point de départ.
    pub fn rappeler(&mut self, valeur: f64) {
        self.signaler(Feedback::Tap);
        self.etape = Etape::Operande;
        self.ecrire(valeur);
        self.dernier = Some(clamp_precision(valeur, self.reglages.precision));
    }

    /* ------------------------ Évaluation ------------------------ */

    /// "=" : historique + entrée -> pipeline complet.
    pub fn evaluate(&mut self) {
        let expression = format!("{}{}", self.historique(), self.courant);

        match eval_expression(&expression) {
            Err(EvalError::Malformee) => {
                debug!(%expression, "rien à évaluer");
            }
            Err(EvalError::Domaine { valeur, .. }) => {
                debug!(%expression, valeur, "résultat non fini");
                self.courant = SENTINELLE_NAN.to_string();
                self.signaler(Feedback::Err);
            }
            Err(e @ EvalError::Interne(_)) => {
                warn!(%expression, "{e}");
                self.courant = SENTINELLE_ERREUR.to_string();
                self.signaler(Feedback::Err);
            }
            Ok(ev) => {
                let v = clamp_precision(ev.valeur, self.reglages.precision);
                self.ecrire(v);
                self.etape = Etape::Operande;
                self.dernier = Some(v);
                self.signaler(Feedback::Ok);
                self.historique.consigner(expression.trim(), v, &ev.diagnostic);
            }
        }
    }

    /* ------------------------ Mémoire ------------------------ */

    pub fn memory_clear(&mut self) {
        self.signaler(Feedback::Tap);
        self.memoire = 0.0;
    }

    /// MR : mémoire débordée => erreur de domaine.
    pub fn memory_recall(&mut self) {
        let m = self.memoire;
        self.deposer(m, "rappel mémoire");
    }

    pub fn memory_add(&mut self) {
        self.signaler(Feedback::Tap);
        self.memoire += self.valeur_ou_zero();
    }

    pub fn memory_subtract(&mut self) {
        self.signaler(Feedback::Tap);
        self.memoire -= self.valeur_ou_zero();
    }

    fn valeur_ou_zero(&self) -> f64 {
        let v = self.valeur();
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /* ------------------------ Angle ------------------------ */

    pub fn toggle_angle_mode(&mut self) {
        self.signaler(Feedback::Tap);
        self.angle = self.angle.bascule();
        info!(angle = %self.angle, "mode d’angle");
        self.stockage_angle.enregistrer(self.angle);
    }
}

/// n! exact (entiers bornés), None hors domaine.
fn factorielle(v: f64, limite: u32) -> Option<f64> {
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > f64::from(limite) {
        return None;
    }
    let n = v as u32;
    let produit = (2..=n).fold(BigUint::one(), |acc, k| acc * k);
    produit.to_f64()
}
