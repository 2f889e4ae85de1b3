//! Noyau du pavé (f64)
//!
//! Organisation interne :
//! - jetons.rs     : tokenisation + opérateurs (précédence, associativité)
//! - rpn.rs        : shunting-yard
//! - eval.rs       : réduction RPN + pipeline complet (erreurs typées)
//! - lecture.rs    : arrondi décimal exact (précision bornée)
//! - format.rs     : formes stockage / affichage + relecture tolérante
//! - ports.rs      : collaborateurs (historique, retour, mode d’angle)
//! - session.rs    : machine à états du pavé
//! - conversion.rs : convertisseur d’unités / devises

pub mod conversion;
pub mod eval;
pub mod format;
pub mod jetons;
pub mod lecture;
pub mod ports;
pub mod rpn;
pub mod session;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use eval::Diagnostic;
pub use ports::{AngleMode, AngleStore, Feedback, FeedbackSink, HistorySink};
pub use session::{Reglages, Session, Unaire};
