// src/app.rs
//
// Calculatrice — module App (racine)
// ----------------------------------
// Rôle:
// - Déclarer les sous-modules (état, vue, collaborateurs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Clavier global : ignoré dès qu’un champ texte a le focus
// (sinon le convertisseur recevrait les chiffres en double).

pub mod etat;
pub mod historique;
pub mod preferences;
pub mod retour;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;

use eframe::egui;

use etat::Action;
use preferences::Theme;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuels = match self.preferences.borrow().theme {
            Theme::Sombre => egui::Visuals::dark(),
            Theme::Clair => egui::Visuals::light(),
        };
        ctx.set_visuals(visuels);

        self.clavier(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.enregistrer(storage);
    }
}

impl AppCalc {
    fn clavier(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let actions: Vec<Action> = ctx.input(|i| {
            i.events
                .iter()
                .flat_map(|e| match e {
                    egui::Event::Text(texte) => {
                        texte.chars().filter_map(Action::depuis_touche).collect::<Vec<_>>()
                    }
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => action_touche(*key).into_iter().collect(),
                    _ => Vec::new(),
                })
                .collect()
        });

        for a in actions {
            self.executer(a);
        }
    }
}

/// Touches sans caractère (Enter, Backspace…).
fn action_touche(key: egui::Key) -> Option<Action> {
    match key {
        egui::Key::Enter => Some(Action::Egal),
        egui::Key::Backspace => Some(Action::DeleteLast),
        egui::Key::Delete => Some(Action::ClearEntry),
        egui::Key::Escape => Some(Action::ClearAll),
        _ => None,
    }
}
