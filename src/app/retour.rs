//! Retour utilisateur : vibration (web) + trace + flash rouge sur erreur.

use tracing::trace;

use crate::noyau::{Feedback, FeedbackSink};

#[derive(Debug, Default)]
pub struct Retour {
    erreur_en_attente: bool,
}

impl Retour {
    /// Vrai une seule fois par erreur signalée (la vue déclenche le flash).
    pub fn prendre_erreur(&mut self) -> bool {
        std::mem::take(&mut self.erreur_en_attente)
    }
}

impl FeedbackSink for Retour {
    fn signaler(&mut self, kind: Feedback) {
        trace!(?kind, "retour");
        vibrer(kind);
        if kind == Feedback::Err {
            self.erreur_en_attente = true;
        }
    }
}

/// Motif de vibration (ms) : impulsion simple, ou vibre/pause/vibre pour ok.
fn motif_ms(kind: Feedback) -> &'static [u32] {
    match kind {
        Feedback::Tap => &[10],
        Feedback::Ok => &[15, 40, 15],
        Feedback::Err => &[80],
    }
}

#[cfg(target_arch = "wasm32")]
fn vibrer(kind: Feedback) {
    use wasm_bindgen::JsValue;

    // navigateur sans vibreur : on ignore
    let Some(w) = web_sys::window() else {
        return;
    };
    let navigateur = w.navigator();
    match motif_ms(kind) {
        [ms] => {
            let _ = navigateur.vibrate_with_duration(*ms);
        }
        motif => {
            let js: js_sys::Array = motif.iter().map(|&ms| JsValue::from(ms)).collect();
            let _ = navigateur.vibrate_with_pattern(&js);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn vibrer(kind: Feedback) {
    trace!(motif = ?motif_ms(kind), "pas de vibreur natif");
}
