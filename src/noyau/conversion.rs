//! Convertisseur d’unités / devises (hors pipeline d’évaluation).
//!
//! Tables de facteurs vers l’unité de base de chaque catégorie.
//! Devises : taux saisi à la main, ou demandé en ligne (réponse reçue
//! en arrière-plan, appliquée au prochain relevé).

use std::sync::mpsc::{channel, Receiver, Sender};

use serde_json::Value;
use tracing::{debug, warn};

use super::format::{format_for_storage, parse_display_number};
use super::ports::{Feedback, FeedbackSink, Rien};

/// Décimales d’un résultat de conversion.
const PRECISION_CONVERSION: usize = 6;

const LONGUEURS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("km", 1000.0),
    ("cm", 0.01),
    ("mm", 0.001),
    ("mi", 1609.344),
    ("ft", 0.3048),
    ("in", 0.0254),
];

const MASSES: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("g", 0.001),
    ("t", 1000.0),
    ("lb", 0.45359237),
    ("oz", 0.028349523125),
];

const DEVISES: &[&str] = &["EUR", "USD", "GBP", "TRY", "CHF"];

/// Service de taux : `?base=EUR&symbols=USD` => `{"rates": {"USD": 1.08}}`.
const URL_TAUX: &str = "https://api.exchangerate.host/latest";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Categorie {
    #[default]
    Longueur,
    Masse,
    Devise,
}

impl Categorie {
    pub const TOUTES: [Categorie; 3] = [Self::Longueur, Self::Masse, Self::Devise];

    pub fn libelle(self) -> &'static str {
        match self {
            Self::Longueur => "Longueur",
            Self::Masse => "Masse",
            Self::Devise => "Devise",
        }
    }

    pub fn unites(self) -> Vec<&'static str> {
        match self {
            Self::Longueur => LONGUEURS.iter().map(|(u, _)| *u).collect(),
            Self::Masse => MASSES.iter().map(|(u, _)| *u).collect(),
            Self::Devise => DEVISES.to_vec(),
        }
    }

    fn unites_par_defaut(self) -> (&'static str, &'static str) {
        match self {
            Self::Longueur => ("m", "km"),
            Self::Masse => ("kg", "g"),
            Self::Devise => ("EUR", "USD"),
        }
    }

    fn facteur(self, unite: &str) -> Option<f64> {
        let table = match self {
            Self::Longueur => LONGUEURS,
            Self::Masse => MASSES,
            Self::Devise => return None,
        };
        table.iter().find(|(u, _)| *u == unite).map(|(_, f)| *f)
    }
}

/// Issue d’une demande de taux.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultatTaux {
    Taux(f64),
    /// Réponse lisible mais sans taux exploitable : rien ne change.
    Absent,
    Echec(String),
}

/// Réponse du service, pour la paire demandée.
#[derive(Clone, Debug, PartialEq)]
pub struct ReponseTaux {
    pub de: &'static str,
    pub vers: &'static str,
    pub resultat: ResultatTaux,
}

/// Interprète le corps JSON renvoyé par le service.
pub fn lire_reponse_taux(corps: &[u8], vers: &str) -> ResultatTaux {
    let json: Value = match serde_json::from_slice(corps) {
        Ok(v) => v,
        Err(e) => return ResultatTaux::Echec(format!("réponse illisible: {e}")),
    };
    json.get("rates")
        .and_then(|r| r.get(vers))
        .and_then(Value::as_f64)
        .filter(|x| x.is_finite())
        .map_or(ResultatTaux::Absent, ResultatTaux::Taux)
}

fn lire_nombre(brut: &str) -> Option<f64> {
    let v = parse_display_number(brut);
    v.is_finite().then_some(v)
}

pub struct Convertisseur {
    categorie: Categorie,
    de: &'static str,
    vers: &'static str,
    pub entree: String,
    taux: f64,
    retour: Box<dyn FeedbackSink>,

    // réponses de taux (le rappel réseau tourne hors du thread UI)
    envoi: Sender<ReponseTaux>,
    reception: Receiver<ReponseTaux>,
}

impl Default for Convertisseur {
    fn default() -> Self {
        let categorie = Categorie::default();
        let (de, vers) = categorie.unites_par_defaut();
        let (envoi, reception) = channel();
        Self {
            categorie,
            de,
            vers,
            entree: String::new(),
            taux: 1.0,
            retour: Box::new(Rien),
            envoi,
            reception,
        }
    }
}

impl Convertisseur {
    pub fn avec_retour(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.retour = Box::new(sink);
        self
    }

    pub fn categorie(&self) -> Categorie {
        self.categorie
    }

    pub fn de(&self) -> &'static str {
        self.de
    }

    pub fn vers(&self) -> &'static str {
        self.vers
    }

    pub fn taux(&self) -> f64 {
        self.taux
    }

    /// Change de catégorie : unités par défaut, taux remis à 1.
    pub fn set_categorie(&mut self, categorie: Categorie) {
        self.categorie = categorie;
        (self.de, self.vers) = categorie.unites_par_defaut();
        self.taux = 1.0;
        self.retour.signaler(Feedback::Tap);
    }

    pub fn set_de(&mut self, unite: &'static str) {
        self.de = unite;
        self.retour.signaler(Feedback::Tap);
    }

    pub fn set_vers(&mut self, unite: &'static str) {
        self.vers = unite;
        self.retour.signaler(Feedback::Tap);
    }

    /// Taux saisi ; illisible => 0.
    pub fn set_taux(&mut self, brut: &str) {
        self.taux = lire_nombre(brut).unwrap_or(0.0);
        self.retour.signaler(Feedback::Tap);
    }

    pub fn set_entree(&mut self, brut: impl Into<String>) {
        self.entree = brut.into();
        self.retour.signaler(Feedback::Tap);
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.de, &mut self.vers);
        self.retour.signaler(Feedback::Tap);
    }

    /// Demande le taux `de -> vers` en ligne (devises seulement).
    /// Même devise des deux côtés : tap, rien d’autre. `reveil` est appelé
    /// à l’arrivée de la réponse (depuis un autre thread en natif).
    pub fn demander_taux(&mut self, reveil: impl Fn() + Send + 'static) {
        if self.categorie != Categorie::Devise {
            return;
        }
        self.retour.signaler(Feedback::Tap);
        if self.de == self.vers {
            return;
        }

        let (de, vers) = (self.de, self.vers);
        let url = format!("{URL_TAUX}?base={de}&symbols={vers}");
        debug!(%url, "demande de taux");

        let envoi = self.envoi.clone();
        ehttp::fetch(ehttp::Request::get(url), move |reponse| {
            let resultat = match reponse {
                Ok(r) if r.ok => lire_reponse_taux(&r.bytes, vers),
                Ok(r) => ResultatTaux::Echec(format!("HTTP {} {}", r.status, r.status_text)),
                Err(e) => ResultatTaux::Echec(e),
            };
            // convertisseur détruit entre-temps : réponse perdue
            let _ = envoi.send(ReponseTaux { de, vers, resultat });
            reveil();
        });
    }

    /// Applique les réponses arrivées depuis le dernier relevé.
    /// Vrai si le taux a changé.
    pub fn relever_taux(&mut self) -> bool {
        let mut change = false;
        while let Ok(reponse) = self.reception.try_recv() {
            change |= self.appliquer_taux(reponse);
        }
        change
    }

    /// Taux fini => ok ; taux absent => rien ; échec => err.
    /// Une réponse pour une autre paire (unités changées entre-temps) est ignorée.
    pub fn appliquer_taux(&mut self, reponse: ReponseTaux) -> bool {
        if self.categorie != Categorie::Devise || (reponse.de, reponse.vers) != (self.de, self.vers) {
            debug!(de = reponse.de, vers = reponse.vers, "taux périmé ignoré");
            return false;
        }
        match reponse.resultat {
            ResultatTaux::Taux(x) => {
                self.taux = x;
                self.retour.signaler(Feedback::Ok);
                true
            }
            ResultatTaux::Absent => {
                debug!(vers = reponse.vers, "pas de taux dans la réponse");
                false
            }
            ResultatTaux::Echec(e) => {
                warn!(de = reponse.de, vers = reponse.vers, "taux indisponible: {e}");
                self.retour.signaler(Feedback::Err);
                false
            }
        }
    }

    /// Résultat (forme de stockage, 6 décimales) ; vide si entrée illisible ou unité inconnue.
    pub fn resultat(&self) -> String {
        let Some(v) = lire_nombre(&self.entree) else {
            return String::new();
        };

        let x = match self.categorie {
            Categorie::Devise if self.de == self.vers => v,
            Categorie::Devise => v * self.taux,
            cat => {
                let (Some(f_de), Some(f_vers)) = (cat.facteur(self.de), cat.facteur(self.vers)) else {
                    debug!(de = self.de, vers = self.vers, "unité inconnue");
                    return String::new();
                };
                v * f_de / f_vers
            }
        };

        format_for_storage(x, PRECISION_CONVERSION)
    }
}
