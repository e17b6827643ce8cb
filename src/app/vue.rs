// src/app/vue.rs
//
// Vue (texte) — terminal
// ----------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour les sous-commandes et le mode ligne
// - Une évaluation = un appel au noyau, puis rendu en lignes de texte
// - Mode verbeux : démarche (jetons, RPN, arbre, clé canonique)
//
// Note :
// - Aucune écriture ici : main.rs décide de stdout / stderr.

use crate::noyau::liste_blanche::{liste_blanche, Liaison, VERSION_LISTE_BLANCHE};
use crate::noyau::{self, cle_canonique, format_valeur};

use super::etat::{AppCalc, Demarche};

impl AppCalc {
    /// Évalue `self.entree` via le noyau et range le résultat (ou l'erreur) dans l'état.
    /// Rend `true` si l'évaluation a réussi.
    pub fn eval_via_noyau(&mut self) -> bool {
        let entree = self.entree.trim().to_string();
        if entree.is_empty() {
            self.clear_resultats();
            return true;
        }

        match noyau::evaluer_avec_demarche(&entree) {
            Ok((v, d)) => {
                let demarche = Demarche {
                    jetons: d.jetons,
                    rpn: d.rpn,
                    arbre: d.arbre,
                    cle: cle_canonique(&entree),
                };
                self.set_resultat(format_valeur(&v), demarche);
                true
            }
            Err(e) => {
                self.set_erreur(e.to_string());
                false
            }
        }
    }

    /// Tire un lot d'exemples selon `self.generateur` (graine fixe si fournie).
    pub fn generer_exemples(&mut self) {
        let g = &self.generateur;
        let exemples = noyau::generer_depuis_libelles(
            &g.operation,
            g.chiffres,
            g.operandes,
            &g.nombres,
            &g.difficulte,
            g.nombre,
            &g.reponse,
            g.avec_reponses,
            g.graine,
        );
        self.set_exemples(exemples);
    }

    /// Lignes à afficher après une évaluation.
    pub fn lignes_resultat(&self, verbeux: bool) -> Vec<String> {
        let mut lignes = Vec::new();

        if !self.erreur.is_empty() {
            lignes.push(format!("Erreur : {}", self.erreur));
            return lignes;
        }
        if self.affichage.is_empty() {
            return lignes;
        }

        lignes.push(self.affichage.clone());
        if let Some(complet) = &self.resultat_complet {
            lignes.push(complet.clone());
        }

        if verbeux {
            lignes.extend(self.lignes_demarche());
        }
        lignes
    }

    fn lignes_demarche(&self) -> Vec<String> {
        let d = &self.demarche;
        vec![
            format!("  jetons : {}", d.jetons),
            format!("  RPN    : {}", d.rpn),
            format!("  arbre  : {}", d.arbre),
            format!("  clé    : {}", d.cle),
        ]
    }

    /// "1. 12 + 7", "2. 43 + 8", ...
    pub fn lignes_exemples(&self) -> Vec<String> {
        self.exemples
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {p}", i + 1))
            .collect()
    }
}

/// Contenu de la liste blanche : ce qu'une expression a le droit de nommer.
pub fn lignes_liste_blanche() -> Vec<String> {
    let lb = liste_blanche();
    let (constantes, fonctions): (Vec<&str>, Vec<&str>) = lb
        .noms()
        .into_iter()
        .partition(|n| matches!(lb.get(n), Some(Liaison::Constante(_))));

    vec![
        format!("liste blanche v{VERSION_LISTE_BLANCHE}"),
        format!("constantes : {}", constantes.join(", ")),
        format!("fonctions  : {}", fonctions.join(", ")),
    ]
}
