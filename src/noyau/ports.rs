//! Collaborateurs externes de la session (historique, retour, préférence d’angle).
//!
//! La session ne connaît que ces traits : stockage, vibration et affichage
//! vivent côté app. Chaque trait a une implémentation neutre (`Rien`).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use super::eval::Diagnostic;

/// Classe de retour émise après une action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Tap,
    Ok,
    Err,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum AngleMode {
    #[default]
    Degres,
    Radians,
}

impl AngleMode {
    pub fn bascule(self) -> Self {
        match self {
            Self::Degres => Self::Radians,
            Self::Radians => Self::Degres,
        }
    }

    /// Convertit un angle saisi dans ce mode en radians.
    pub fn en_radians(self, x: f64) -> f64 {
        match self {
            Self::Degres => x * std::f64::consts::PI / 180.0,
            Self::Radians => x,
        }
    }

    pub fn cle(self) -> &'static str {
        match self {
            Self::Degres => "deg",
            Self::Radians => "rad",
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cle())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mode d’angle inconnu: {0:?}")]
pub struct AngleModeError(pub String);

impl FromStr for AngleMode {
    type Err = AngleModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deg" => Ok(Self::Degres),
            "rad" => Ok(Self::Radians),
            autre => Err(AngleModeError(autre.to_string())),
        }
    }
}

/// Reçoit chaque évaluation réussie.
pub trait HistorySink {
    fn consigner(&mut self, expression: &str, resultat: f64, diagnostic: &Diagnostic);
}

/// Reçoit la classe de retour (tap / ok / err). Sans accusé de réception.
pub trait FeedbackSink {
    fn signaler(&mut self, kind: Feedback);
}

/// Stockage clé-valeur opaque du mode d’angle.
pub trait AngleStore {
    fn charger(&self) -> Option<String>;
    fn enregistrer(&mut self, mode: AngleMode);
}

/// Collaborateur neutre : ne fait rien.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rien;

impl HistorySink for Rien {
    fn consigner(&mut self, _expression: &str, _resultat: f64, _diagnostic: &Diagnostic) {}
}

impl FeedbackSink for Rien {
    fn signaler(&mut self, _kind: Feedback) {}
}

impl AngleStore for Rien {
    fn charger(&self) -> Option<String> {
        None
    }
    fn enregistrer(&mut self, _mode: AngleMode) {}
}

// Partage mono-thread avec l’UI (l’app garde une poignée pour afficher).
impl<T: HistorySink> HistorySink for Rc<RefCell<T>> {
    fn consigner(&mut self, expression: &str, resultat: f64, diagnostic: &Diagnostic) {
        self.borrow_mut().consigner(expression, resultat, diagnostic);
    }
}

impl<T: FeedbackSink> FeedbackSink for Rc<RefCell<T>> {
    fn signaler(&mut self, kind: Feedback) {
        self.borrow_mut().signaler(kind);
    }
}

impl<T: AngleStore> AngleStore for Rc<RefCell<T>> {
    fn charger(&self) -> Option<String> {
        self.borrow().charger()
    }
    fn enregistrer(&mut self, mode: AngleMode) {
        self.borrow_mut().enregistrer(mode);
    }
}
