//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : assembler la session du pavé avec ses collaborateurs (journal,
//! retour, préférences) et traduire chaque touche en une action.
//!
//! Contrats :
//! - Aucune évaluation ici : tout passe par la session (noyau).
//! - Une touche = une `Action`, que la vue et le clavier partagent.
//! - Collaborateurs partagés via Rc<RefCell<_>> (la vue les relit).

use std::cell::RefCell;
use std::f64::consts::{E, PI};
use std::rc::Rc;

use tracing::{info, trace};

use super::historique::Historique;
use super::preferences::Preferences;
use super::retour::Retour;
use crate::noyau::conversion::Convertisseur;
use crate::noyau::jetons::Operator;
use crate::noyau::{Feedback, FeedbackSink, Reglages, Session, Unaire};

/// Démarche de la dernière évaluation (panneau d’explication).
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
}

/// Toutes les touches du pavé (boutons + clavier).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Append(char),
    Operateur(Operator),
    Egal,
    ClearAll,
    ClearEntry,
    DeleteLast,
    Signe,
    Pourcent,
    Unaire(Unaire),
    Constante(f64),
    Ans,
    MemClear,
    MemRecall,
    MemAdd,
    MemSub,
    BasculeAngle,
    Rappel(f64),
    Copier,
    BasculeTheme,
    ViderHistorique,
}

impl Action {
    pub const PI: Action = Action::Constante(PI);
    pub const E: Action = Action::Constante(E);

    /// Caractère tapé au clavier => action (None : ignoré).
    pub fn depuis_touche(c: char) -> Option<Action> {
        match c {
            '0'..='9' | '(' | ')' => Some(Action::Append(c)),
            '.' | ',' => Some(Action::Append('.')),
            '=' => Some(Action::Egal),
            _ => Operator::from_char(c).map(Action::Operateur),
        }
    }
}

pub struct AppCalc {
    pub session: Session,
    pub convertisseur: Convertisseur,

    // --- collaborateurs partagés avec la session ---
    pub historique: Rc<RefCell<Historique>>,
    pub preferences: Rc<RefCell<Preferences>>,
    pub retour: Rc<RefCell<Retour>>,

    // --- UX ---
    pub avance: bool,                 // panneau “fonctions avancées” ouvert
    pub a_copier: Option<String>,     // texte à poser dans le presse-papiers
    pub copie_depuis: Option<f64>,    // instant du dernier “Copié ✓”
    pub erreur_depuis: Option<f64>,   // instant du dernier flash rouge
    pub saisie_conversion: String,
    pub saisie_taux: String,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppCalc {
    /// Assemble l’app à partir du stockage eframe (absent en test / premier lancement).
    pub fn new(storage: Option<&dyn eframe::Storage>) -> Self {
        let historique = Rc::new(RefCell::new(Historique::depuis_stockage(storage)));
        let preferences = Rc::new(RefCell::new(Preferences::depuis_stockage(storage)));
        let retour = Rc::new(RefCell::new(Retour::default()));

        let session = Session::new(Reglages::default())
            .avec_historique(historique.clone())
            .avec_retour(retour.clone())
            .avec_stockage_angle(preferences.clone());
        let convertisseur = Convertisseur::default().avec_retour(retour.clone());

        info!(
            angle = %session.angle(),
            precision = session.reglages().precision,
            entrees = historique.borrow().entrees().len(),
            "calculatrice prête"
        );

        Self {
            session,
            convertisseur,
            historique,
            preferences,
            retour,
            avance: false,
            a_copier: None,
            copie_depuis: None,
            erreur_depuis: None,
            saisie_conversion: String::new(),
            saisie_taux: "1".to_string(),
        }
    }

    pub fn enregistrer(&self, storage: &mut dyn eframe::Storage) {
        self.preferences.borrow().vers_stockage(storage);
        self.historique.borrow().vers_stockage(storage);
    }

    pub fn executer(&mut self, action: Action) {
        match action {
            Action::Append(c) => self.session.append(c),
            Action::Operateur(op) => self.session.push_operator(op),
            Action::Egal => self.session.evaluate(),
            Action::ClearAll => self.session.clear_all(),
            Action::ClearEntry => self.session.clear_entry(),
            Action::DeleteLast => self.session.delete_last(),
            Action::Signe => self.session.toggle_sign(),
            Action::Pourcent => self.session.percent(),
            Action::Unaire(f) => self.session.unaire(f),
            Action::Constante(x) => self.session.set_constant(x),
            Action::Ans => self.session.load_last_result(),
            Action::MemClear => self.session.memory_clear(),
            Action::MemRecall => self.session.memory_recall(),
            Action::MemAdd => self.session.memory_add(),
            Action::MemSub => self.session.memory_subtract(),
            Action::BasculeAngle => self.session.toggle_angle_mode(),
            Action::Rappel(v) => self.session.rappeler(v),
            Action::Copier => {
                self.retour.borrow_mut().signaler(Feedback::Tap);
                self.a_copier = Some(self.session.courant_affiche());
            }
            Action::BasculeTheme => {
                let mut p = self.preferences.borrow_mut();
                p.theme = p.theme.bascule();
                info!(theme = ?p.theme, "thème");
            }
            Action::ViderHistorique => {
                self.retour.borrow_mut().signaler(Feedback::Tap);
                self.historique.borrow_mut().vider();
            }
        }
        trace!(?action, etat = ?self.session.instantane(), "touche");
    }

    /// Tape une suite de caractères (clavier physique).
    pub fn taper(&mut self, texte: &str) {
        for a in texte.chars().filter_map(Action::depuis_touche) {
            self.executer(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::historique::tests::StockageMemoire;
    use crate::app::preferences::Theme;
    use crate::noyau::AngleMode;

    #[test]
    fn touches_clavier() {
        assert_eq!(Action::depuis_touche('7'), Some(Action::Append('7')));
        assert_eq!(Action::depuis_touche(','), Some(Action::Append('.')));
        assert_eq!(Action::depuis_touche('×'), Some(Action::Operateur(Operator::Star)));
        assert_eq!(Action::depuis_touche('='), Some(Action::Egal));
        assert_eq!(Action::depuis_touche('x'), None);
        assert_eq!(Action::depuis_touche(' '), None);
    }

    #[test]
    fn calcul_consigne_et_demarche() {
        let mut app = AppCalc::default();
        app.taper("12+3*2=");
        assert_eq!(app.session.courant(), "18");

        let h = app.historique.borrow();
        assert_eq!(h.entrees().len(), 1);
        assert_eq!(h.entrees()[0].expression, "12 + 3 * 2");
        assert_eq!(h.entrees()[0].resultat, 18.0);
        assert_eq!(h.derniere_demarche().map(|d| d.rpn.as_str()), Some("12 3 2 * +"));
    }

    #[test]
    fn rappel_depuis_historique() {
        let mut app = AppCalc::default();
        app.taper("2^10=");
        app.executer(Action::ClearAll);
        let v = app.historique.borrow().entrees()[0].resultat;
        app.executer(Action::Rappel(v));
        assert_eq!(app.session.courant(), "1024");
        assert_eq!(app.session.dernier(), Some(1024.0));
    }

    #[test]
    fn erreur_declenche_le_flash() {
        let mut app = AppCalc::default();
        app.taper("1/0=");
        assert_eq!(app.session.courant(), "NaN");
        assert!(app.retour.borrow_mut().prendre_erreur());
        assert!(app.historique.borrow().entrees().is_empty());
    }

    #[test]
    fn copier_prend_l_affichage() {
        let mut app = AppCalc::default();
        app.taper("1,5");
        app.executer(Action::Copier);
        assert_eq!(app.a_copier.as_deref(), Some("1,5"));
    }

    #[test]
    fn constantes_et_fonctions() {
        let mut app = AppCalc::default();
        app.executer(Action::PI);
        assert_eq!(app.session.courant(), "3.14159265359");
        app.executer(Action::ClearAll);
        app.taper("5");
        app.executer(Action::Unaire(Unaire::Factorielle));
        assert_eq!(app.session.courant(), "120");
    }

    #[test]
    fn preferences_suivent_les_bascules() {
        let mut app = AppCalc::default();
        app.executer(Action::BasculeAngle);
        app.executer(Action::BasculeTheme);
        let p = app.preferences.borrow();
        assert_eq!(p.angle.as_deref(), Some("rad"));
        assert_eq!(p.theme, Theme::Clair);
    }

    #[test]
    fn enregistrer_puis_relancer() {
        let mut app = AppCalc::default();
        app.taper("6*7=");
        app.executer(Action::BasculeAngle);

        let mut st = StockageMemoire::default();
        app.enregistrer(&mut st);

        let relance = AppCalc::new(Some(&st));
        assert_eq!(relance.session.angle(), AngleMode::Radians);
        assert_eq!(relance.historique.borrow().entrees()[0].resultat, 42.0);
        // la saisie ne survit pas au redémarrage
        assert_eq!(relance.session.courant(), "0");
    }

    #[test]
    fn vider_historique() {
        let mut app = AppCalc::default();
        app.taper("1+1=");
        app.executer(Action::ViderHistorique);
        assert!(app.historique.borrow().entrees().is_empty());
    }
}
