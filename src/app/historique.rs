//! Journal des calculs (collaborateur “historique” de la session).
//!
//! - plus récent en tête, 50 entrées max (les plus anciennes sortent)
//! - résultats arrondis à la précision de stockage
//! - persisté via eframe::Storage (clé "calc-log")

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::etat::Demarche;
use crate::noyau::lecture::{clamp_precision, PRECISION_DEFAUT};
use crate::noyau::{Diagnostic, HistorySink};

/// Garde-fou : nombre d’entrées conservées.
pub const HISTORIQUE_MAX: usize = 50;

const CLE_STOCKAGE: &str = "calc-log";

/// Date courte + heure : distingue les entrées de jours différents.
const FORMAT_HORODATAGE: &str = "%d.%m.%y %H:%M";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entree {
    pub id: u64,
    pub expression: String,
    pub resultat: f64,
    pub horodatage: DateTime<Utc>,
}

impl Entree {
    /// Horodatage en heure locale.
    pub fn horodatage_affiche(&self) -> String {
        format_horodatage(&self.horodatage.with_timezone(&Local))
    }
}

fn format_horodatage<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format(FORMAT_HORODATAGE).to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Historique {
    entrees: Vec<Entree>,
    prochain_id: u64,

    // démarche de la dernière évaluation (non persistée)
    #[serde(skip)]
    derniere: Option<Demarche>,
}

impl Historique {
    /// Relit le journal ; absent ou illisible => journal vide.
    pub fn depuis_stockage(storage: Option<&dyn eframe::Storage>) -> Self {
        let Some(storage) = storage else {
            return Self::default();
        };
        let mut h: Self = eframe::get_value(storage, CLE_STOCKAGE).unwrap_or_default();

        h.entrees.retain(|e| e.resultat.is_finite());
        h.entrees.truncate(HISTORIQUE_MAX);
        for e in &mut h.entrees {
            e.resultat = clamp_precision(e.resultat, PRECISION_DEFAUT);
        }
        if let Some(max) = h.entrees.iter().map(|e| e.id).max() {
            h.prochain_id = h.prochain_id.max(max.saturating_add(1));
        }

        debug!(entrees = h.entrees.len(), "historique relu");
        h
    }

    pub fn vers_stockage(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, CLE_STOCKAGE, self);
    }

    pub fn ajouter(&mut self, expression: &str, resultat: f64) {
        let entree = Entree {
            id: self.prochain_id,
            expression: expression.to_string(),
            resultat: clamp_precision(resultat, PRECISION_DEFAUT),
            horodatage: Utc::now(),
        };
        self.prochain_id = self.prochain_id.saturating_add(1);

        self.entrees.insert(0, entree);
        self.entrees.truncate(HISTORIQUE_MAX);
    }

    pub fn entrees(&self) -> &[Entree] {
        &self.entrees
    }

    pub fn derniere_demarche(&self) -> Option<&Demarche> {
        self.derniere.as_ref()
    }

    pub fn vider(&mut self) {
        self.entrees.clear();
    }
}

impl HistorySink for Historique {
    fn consigner(&mut self, expression: &str, resultat: f64, diagnostic: &Diagnostic) {
        self.derniere = Some(Demarche {
            jetons: diagnostic.jetons_txt(),
            rpn: diagnostic.rpn_txt(),
        });
        self.ajouter(expression, resultat);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Stockage en mémoire (remplace le localStorage / fichier d’eframe).
    #[derive(Default)]
    pub(crate) struct StockageMemoire(pub HashMap<String, String>);

    impl eframe::Storage for StockageMemoire {
        fn get_string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
        fn set_string(&mut self, key: &str, value: String) {
            self.0.insert(key.to_string(), value);
        }
        fn flush(&mut self) {}
    }

    #[test]
    fn plus_recent_en_tete() {
        let mut h = Historique::default();
        h.ajouter("1 + 1", 2.0);
        h.ajouter("2 * 3", 6.0);
        assert_eq!(h.entrees()[0].expression, "2 * 3");
        assert_eq!(h.entrees()[1].expression, "1 + 1");
        assert!(h.entrees()[0].id > h.entrees()[1].id);
    }

    #[test]
    fn borne_les_plus_anciens_sortent() {
        let mut h = Historique::default();
        for i in 0..(HISTORIQUE_MAX + 5) {
            h.ajouter(&format!("{i}"), i as f64);
        }
        assert_eq!(h.entrees().len(), HISTORIQUE_MAX);
        assert_eq!(h.entrees()[0].resultat, (HISTORIQUE_MAX + 4) as f64);
        assert_eq!(h.entrees().last().map(|e| e.resultat), Some(5.0));
    }

    #[test]
    fn resultat_arrondi() {
        let mut h = Historique::default();
        h.ajouter("0.1 + 0.2", 0.1 + 0.2);
        assert_eq!(h.entrees()[0].resultat, 0.3);
    }

    #[test]
    fn consigne_la_demarche() {
        let mut h = Historique::default();
        let ev = crate::noyau::eval::eval_expression("2 + 3 * 4").unwrap();
        h.consigner("2 + 3 * 4", ev.valeur, &ev.diagnostic);
        let d = h.derniere_demarche().unwrap();
        assert_eq!(d.rpn, "2 3 4 * +");
        assert_eq!(h.entrees()[0].resultat, 14.0);
    }

    #[test]
    fn persistance() {
        let mut h = Historique::default();
        h.ajouter("1 + 1", 2.0);
        h.ajouter("9 / 3", 3.0);

        let mut st = StockageMemoire::default();
        h.vers_stockage(&mut st);

        let mut relu = Historique::depuis_stockage(Some(&st));
        assert_eq!(relu.entrees(), h.entrees());
        assert!(relu.derniere_demarche().is_none());

        // les ids continuent après relecture
        relu.ajouter("4 - 1", 3.0);
        assert_eq!(relu.entrees()[0].id, 2);
    }

    #[test]
    fn ids_au_plafond_sans_debordement() {
        let mut h = Historique::default();
        h.ajouter("1 + 1", 2.0);
        h.entrees[0].id = u64::MAX;
        h.prochain_id = u64::MAX;

        let mut st = StockageMemoire::default();
        h.vers_stockage(&mut st);

        let mut relu = Historique::depuis_stockage(Some(&st));
        relu.ajouter("2 + 2", 4.0);
        relu.ajouter("3 + 3", 6.0);
        assert_eq!(relu.entrees().len(), 3);
        assert_eq!(relu.entrees()[0].id, u64::MAX);
    }

    #[test]
    fn horodatage_date_et_heure() {
        let t = Utc.with_ymd_and_hms(2026, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_horodatage(&t), "05.03.26 14:07");

        let mut h = Historique::default();
        h.ajouter("1", 1.0);
        assert_eq!(h.entrees()[0].horodatage_affiche().len(), "05.03.26 14:07".len());
    }

    #[test]
    fn stockage_absent_ou_illisible() {
        assert!(Historique::depuis_stockage(None).entrees().is_empty());

        let mut st = StockageMemoire::default();
        st.0.insert(CLE_STOCKAGE.into(), "pas du ron".into());
        assert!(Historique::depuis_stockage(Some(&st)).entrees().is_empty());
    }
}
