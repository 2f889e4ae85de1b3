// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// - Écran : ligne d’historique (ou “Copié ✓”) + entrée en grand
// - Pavé principal 4 colonnes, pavé avancé repliable
// - Panneaux : historique (clic = rappel), démarche, convertisseur
//
// Toute touche passe par `AppCalc::executer` (etat.rs).

use std::time::Duration;

use eframe::egui;

use super::etat::{Action, AppCalc};
use super::preferences::Theme;
use crate::noyau::conversion::Categorie;
use crate::noyau::format::{format_expression_for_display, format_for_display, format_for_storage};
use crate::noyau::jetons::Operator;
use crate::noyau::lecture::PRECISION_DEFAUT;
use crate::noyau::session::Etape;
use crate::noyau::{AngleMode, Unaire};

/// Durée du “Copié ✓” (secondes).
const DUREE_COPIE: f64 = 0.8;
const DUREE_FLASH: f64 = 0.4;

const HAUTEUR_TOUCHE: f32 = 44.0;

struct Touche {
    libelle: &'static str,
    action: Action,
}

const fn t(libelle: &'static str, action: Action) -> Touche {
    Touche { libelle, action }
}

const PAVE: &[&[Touche]] = &[
    &[
        t("AC", Action::ClearAll),
        t("DEL", Action::DeleteLast),
        t("(", Action::Append('(')),
        t(")", Action::Append(')')),
    ],
    &[
        t("%", Action::Pourcent),
        t("±", Action::Signe),
        t("x²", Action::Unaire(Unaire::Carre)),
        t("√", Action::Unaire(Unaire::Racine)),
    ],
    &[
        t("7", Action::Append('7')),
        t("8", Action::Append('8')),
        t("9", Action::Append('9')),
        t("÷", Action::Operateur(Operator::Slash)),
    ],
    &[
        t("4", Action::Append('4')),
        t("5", Action::Append('5')),
        t("6", Action::Append('6')),
        t("×", Action::Operateur(Operator::Star)),
    ],
    &[
        t("1", Action::Append('1')),
        t("2", Action::Append('2')),
        t("3", Action::Append('3')),
        t("−", Action::Operateur(Operator::Minus)),
    ],
    &[
        t("0", Action::Append('0')),
        t(",", Action::Append('.')),
        t("=", Action::Egal),
        t("+", Action::Operateur(Operator::Plus)),
    ],
    &[t("CE", Action::ClearEntry), t("Copier", Action::Copier)],
];

const PAVE_AVANCE: &[&[Touche]] = &[
    &[
        t("π", Action::PI),
        t("e", Action::E),
        t("ANS", Action::Ans),
        t("1/x", Action::Unaire(Unaire::Inverse)),
    ],
    &[
        t("x^y", Action::Operateur(Operator::Caret)),
        t("n!", Action::Unaire(Unaire::Factorielle)),
        t("exp", Action::Unaire(Unaire::Exp)),
        t("log", Action::Unaire(Unaire::Log10)),
    ],
    &[
        t("ln", Action::Unaire(Unaire::Ln)),
        t("sin", Action::Unaire(Unaire::Sin)),
        t("cos", Action::Unaire(Unaire::Cos)),
        t("tan", Action::Unaire(Unaire::Tan)),
    ],
    &[
        t("MC", Action::MemClear),
        t("MR", Action::MemRecall),
        t("M+", Action::MemAdd),
        t("M−", Action::MemSub),
    ],
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let maintenant = ui.input(|i| i.time);

        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.ui_barre(ui);
                ui.add_space(6.0);

                self.ui_ecran(ui, maintenant);
                ui.add_space(8.0);

                self.ui_pave(ui, "pave_principal", PAVE);
                if self.avance {
                    ui.add_space(6.0);
                    self.ui_pave(ui, "pave_avance", PAVE_AVANCE);
                }

                ui.add_space(8.0);
                ui.separator();

                self.ui_historique(ui);
                self.ui_demarche(ui);
                self.ui_convertisseur(ui);
            });

        // effets de la frame (presse-papiers, flash)
        if let Some(texte) = self.a_copier.take() {
            ui.ctx().copy_text(texte);
            self.copie_depuis = Some(maintenant);
        }
        if self.retour.borrow_mut().prendre_erreur() {
            self.erreur_depuis = Some(maintenant);
        }
        if recent(self.copie_depuis, maintenant, DUREE_COPIE)
            || recent(self.erreur_depuis, maintenant, DUREE_FLASH)
        {
            ui.ctx().request_repaint_after(Duration::from_millis(50));
        }
    }

    fn ui_barre(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Calculatrice");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme = match self.preferences.borrow().theme {
                    Theme::Sombre => "☀",
                    Theme::Clair => "🌙",
                };
                if ui.button(theme).on_hover_text("Changer de thème").clicked() {
                    self.executer(Action::BasculeTheme);
                }

                if ui
                    .selectable_label(self.avance, "f(x)")
                    .on_hover_text("Fonctions avancées")
                    .clicked()
                {
                    self.avance = !self.avance;
                }

                let angle = match self.session.angle() {
                    AngleMode::Degres => "DEG",
                    AngleMode::Radians => "RAD",
                };
                if ui.button(angle).on_hover_text("Mode d’angle").clicked() {
                    self.executer(Action::BasculeAngle);
                }
            });
        });
    }

    fn ui_ecran(&mut self, ui: &mut egui::Ui, maintenant: f64) {
        let ligne = if recent(self.copie_depuis, maintenant, DUREE_COPIE) {
            "Copié ✓".to_string()
        } else {
            self.session.historique_affiche()
        };
        let flash = recent(self.erreur_depuis, maintenant, DUREE_FLASH);

        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    ui.horizontal(|ui| {
                        if self.session.memoire() != 0.0 {
                            ui.small("M");
                        }
                        ui.monospace(egui::RichText::new(ligne).weak());
                    });

                    let mut texte = egui::RichText::new(self.session.courant_affiche())
                        .monospace()
                        .size(34.0);
                    if flash {
                        texte = texte.color(ui.visuals().error_fg_color);
                    }
                    ui.label(texte);
                });
            });
    }

    fn ui_pave(&mut self, ui: &mut egui::Ui, id: &str, rangees: &[&[Touche]]) {
        let espace = 6.0;
        let largeur = ((ui.available_width() - 3.0 * espace) / 4.0).max(40.0);

        egui::Grid::new(id)
            .num_columns(4)
            .spacing([espace, espace])
            .show(ui, |ui| {
                for rangee in rangees {
                    for touche in rangee.iter() {
                        let bouton = egui::Button::new(egui::RichText::new(touche.libelle).size(18.0))
                            .selected(self.operateur_en_attente(touche.action));
                        if ui.add_sized([largeur, HAUTEUR_TOUCHE], bouton).clicked() {
                            self.executer(touche.action);
                        }
                    }
                    ui.end_row();
                }
            });
    }

    /// Opérateur en attente : sa touche reste marquée.
    fn operateur_en_attente(&self, action: Action) -> bool {
        match (self.session.etape(), action) {
            (Etape::Attente { operateur, .. }, Action::Operateur(op)) => *operateur == op,
            _ => false,
        }
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Historique")
            .default_open(false)
            .show(ui, |ui| {
                // copie : un clic modifie le journal emprunté ici
                let lignes: Vec<(String, String, f64)> = self
                    .historique
                    .borrow()
                    .entrees()
                    .iter()
                    .map(|e| {
                        let texte = format!(
                            "{} = {}",
                            format_expression_for_display(&e.expression),
                            format_for_display(&format_for_storage(e.resultat, PRECISION_DEFAUT))
                        );
                        (texte, e.horodatage_affiche(), e.resultat)
                    })
                    .collect();

                if lignes.is_empty() {
                    ui.weak("Aucun calcul pour l’instant.");
                    return;
                }

                for (texte, heure, valeur) in lignes {
                    ui.horizontal(|ui| {
                        ui.weak(heure);
                        if ui.button(egui::RichText::new(texte).monospace()).clicked() {
                            self.executer(Action::Rappel(valeur));
                        }
                    });
                }

                ui.add_space(4.0);
                if ui.button("Effacer l’historique").clicked() {
                    self.executer(Action::ViderHistorique);
                }
            });
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                let d = self
                    .historique
                    .borrow()
                    .derniere_demarche()
                    .cloned()
                    .unwrap_or_default();
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &d.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &d.rpn);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.monospace(contenu);
                });
            });
    }

    fn ui_convertisseur(&mut self, ui: &mut egui::Ui) {
        // réponses de taux arrivées depuis la dernière frame (panneau ouvert ou non)
        if self.convertisseur.relever_taux() {
            self.saisie_taux =
                format_for_display(&format_for_storage(self.convertisseur.taux(), PRECISION_DEFAUT));
        }

        egui::CollapsingHeader::new("Convertisseur")
            .default_open(false)
            .show(ui, |ui| {
                let conv = &self.convertisseur;
                let mut categorie = None;
                let mut de = None;
                let mut vers = None;

                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_salt("conv_categorie")
                        .selected_text(conv.categorie().libelle())
                        .show_ui(ui, |ui| {
                            for c in Categorie::TOUTES {
                                if ui.selectable_label(conv.categorie() == c, c.libelle()).clicked() {
                                    categorie = Some(c);
                                }
                            }
                        });
                });

                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_salt("conv_de")
                        .selected_text(conv.de())
                        .show_ui(ui, |ui| {
                            for u in conv.categorie().unites() {
                                if ui.selectable_label(conv.de() == u, u).clicked() {
                                    de = Some(u);
                                }
                            }
                        });
                    ui.label("→");
                    egui::ComboBox::from_id_salt("conv_vers")
                        .selected_text(conv.vers())
                        .show_ui(ui, |ui| {
                            for u in conv.categorie().unites() {
                                if ui.selectable_label(conv.vers() == u, u).clicked() {
                                    vers = Some(u);
                                }
                            }
                        });
                });

                if let Some(c) = categorie {
                    self.convertisseur.set_categorie(c);
                    self.saisie_taux = "1".to_string();
                }
                if let Some(u) = de {
                    self.convertisseur.set_de(u);
                }
                if let Some(u) = vers {
                    self.convertisseur.set_vers(u);
                }

                ui.horizontal(|ui| {
                    if ui.button("⇄").on_hover_text("Inverser").clicked() {
                        self.convertisseur.swap();
                    }
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.saisie_conversion)
                            .hint_text("Valeur")
                            .desired_width(120.0),
                    );
                    if resp.changed() {
                        self.convertisseur.set_entree(self.saisie_conversion.clone());
                    }
                });

                if self.convertisseur.categorie() == Categorie::Devise {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "Taux 1 {} = ? {}",
                            self.convertisseur.de(),
                            self.convertisseur.vers()
                        ));
                        let resp = ui.add(
                            egui::TextEdit::singleline(&mut self.saisie_taux).desired_width(80.0),
                        );
                        if resp.changed() {
                            self.convertisseur.set_taux(&self.saisie_taux);
                        }
                        if ui.button("Taux en direct").clicked() {
                            let ctx = ui.ctx().clone();
                            self.convertisseur.demander_taux(move || ctx.request_repaint());
                        }
                    });
                }

                let resultat = self.convertisseur.resultat();
                if !resultat.is_empty() {
                    ui.monospace(format!(
                        "= {} {}",
                        format_for_display(&resultat),
                        self.convertisseur.vers()
                    ));
                }
            });
    }
}

fn recent(depuis: Option<f64>, maintenant: f64, duree: f64) -> bool {
    depuis.is_some_and(|t| maintenant - t < duree)
}
