//! src/app/etat.rs
//!
//! État de session (sans vue, sans noyau).
//!
//! Rôle : contenir l'état de la calculatrice (entrée, résultat, erreur, démarche) et les
//! paramètres du générateur d'exemples, avec des opérations simples sans logique d'affichage.
//!
//! Contrats :
//! - Aucune évaluation ici (pas de parsing).
//! - Actions déterministes, sans effet de bord caché.
//! - Paramètres du générateur bornés à chaque saisie.

use crate::noyau::exemples::{
    CHIFFRES_MAX, CHIFFRES_MIN, NOMBRE_MAX, NOMBRE_MIN, OPERANDES_MAX, OPERANDES_MIN,
};

use super::reglages::ReglagesGenerateur;

/// Au-delà, le champ résultat n'affiche qu'un message ; la valeur complète part à côté.
pub const LONGUEUR_AFFICHAGE_MAX: usize = 32;

pub const MESSAGE_TROP_LONG: &str = "Résultat trop long";

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub arbre: String,
    pub cle: String,
}

#[derive(Clone, Debug, Default)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub affichage: String,                // champ résultat (ou MESSAGE_TROP_LONG)
    pub resultat_complet: Option<String>, // valeur entière si trop longue pour le champ
    pub erreur: String,

    // --- démarche (mode verbeux) ---
    pub demarche: Demarche,

    // --- générateur (libellés tels que saisis, nombres bornés) ---
    pub generateur: ReglagesGenerateur,
    pub exemples: Vec<String>,
}

impl AppCalc {
    /* ------------------------ Actions (état seulement) ------------------------ */

    /// C : effacer seulement l'entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
    }

    fn clear_demarche(&mut self) {
        self.demarche = Demarche::default();
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l'entrée).
    pub fn clear_resultats(&mut self) {
        self.affichage.clear();
        self.resultat_complet = None;
        self.erreur.clear();
        self.clear_demarche();
    }

    /// Utilitaire : placer une erreur.
    ///
    /// On CONSERVE `affichage` (dernier résultat) pour ne pas “effacer l'écran” sur une faute ;
    /// la démarche, elle, n'a plus de sens.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.resultat_complet = None;
        self.clear_demarche();
    }

    /// Utilitaire : déposer un résultat (texte déjà formaté) et sa démarche.
    pub fn set_resultat(&mut self, texte: impl Into<String>, demarche: Demarche) {
        let texte = texte.into();
        self.erreur.clear();
        self.demarche = demarche;

        if texte.chars().count() > LONGUEUR_AFFICHAGE_MAX {
            self.affichage = MESSAGE_TROP_LONG.to_string();
            self.resultat_complet = Some(texte);
        } else {
            self.affichage = texte;
            self.resultat_complet = None;
        }
    }

    pub fn set_exemples(&mut self, exemples: Vec<String>) {
        self.exemples = exemples;
    }

    /* ------------------------ Paramètres du générateur ------------------------ */

    pub fn set_operation(&mut self, libelle: &str) {
        self.generateur.operation = libelle.to_string();
    }

    pub fn set_nombres(&mut self, libelle: &str) {
        self.generateur.nombres = libelle.to_string();
    }

    pub fn set_difficulte(&mut self, libelle: &str) {
        self.generateur.difficulte = libelle.to_string();
    }

    pub fn set_reponse(&mut self, libelle: &str) {
        self.generateur.reponse = libelle.to_string();
    }

    /// Garde-fou : largeur des opérandes bornée à [1, 12].
    pub fn set_chiffres(&mut self, chiffres: i64) {
        self.generateur.chiffres = chiffres.clamp(i64::from(CHIFFRES_MIN), i64::from(CHIFFRES_MAX));
    }

    /// Garde-fou : nombre d'opérandes borné à [2, 5].
    pub fn set_operandes(&mut self, operandes: i64) {
        self.generateur.operandes = operandes.clamp(OPERANDES_MIN as i64, OPERANDES_MAX as i64);
    }

    /// Garde-fou : taille du lot bornée à [1, 500].
    pub fn set_nombre(&mut self, nombre: i64) {
        self.generateur.nombre = nombre.clamp(NOMBRE_MIN as i64, NOMBRE_MAX as i64);
    }

    pub fn set_avec_reponses(&mut self, oui: bool) {
        self.generateur.avec_reponses = oui;
    }

    pub fn set_graine(&mut self, graine: Option<u64>) {
        self.generateur.graine = graine;
    }

    /// Applique une section [generateur] (fichier de réglages), avec les mêmes bornes.
    pub fn appliquer_reglages(&mut self, r: &ReglagesGenerateur) {
        self.generateur = r.clone();
        self.set_chiffres(r.chiffres);
        self.set_operandes(r.operandes);
        self.set_nombre(r.nombre);
    }
}
