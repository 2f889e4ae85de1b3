//! Préférences persistées (mode d’angle, thème).
//!
//! Le mode d’angle est gardé tel que lu : c’est la session qui le valide
//! (valeur inconnue => degrés).

use serde::{Deserialize, Serialize};

use crate::noyau::{AngleMode, AngleStore};

const CLE_ANGLE: &str = "calc-angle";
const CLE_THEME: &str = "calc-theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Sombre,
    Clair,
}

impl Theme {
    pub fn bascule(self) -> Self {
        match self {
            Self::Sombre => Self::Clair,
            Self::Clair => Self::Sombre,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preferences {
    pub angle: Option<String>,
    pub theme: Theme,
}

impl Preferences {
    pub fn depuis_stockage(storage: Option<&dyn eframe::Storage>) -> Self {
        let Some(storage) = storage else {
            return Self::default();
        };
        Self {
            angle: eframe::get_value(storage, CLE_ANGLE),
            theme: eframe::get_value(storage, CLE_THEME).unwrap_or_default(),
        }
    }

    pub fn vers_stockage(&self, storage: &mut dyn eframe::Storage) {
        if let Some(angle) = &self.angle {
            eframe::set_value(storage, CLE_ANGLE, angle);
        }
        eframe::set_value(storage, CLE_THEME, &self.theme);
    }
}

impl AngleStore for Preferences {
    fn charger(&self) -> Option<String> {
        self.angle.clone()
    }

    fn enregistrer(&mut self, mode: AngleMode) {
        self.angle = Some(mode.cle().to_string());
    }
}
