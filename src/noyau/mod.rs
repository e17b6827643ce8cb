//! Noyau de calcul sûr
//!
//! Organisation interne :
//! - jetons.rs        : normalisation + tokenisation (constructions interdites nommées)
//! - rpn.rs           : shunting-yard + construction Expr (atomique, profondeur bornée)
//! - expr.rs          : arbre d'analyse
//! - liste_blanche.rs : constantes + fonctions autorisées (table fixe, versionnée)
//! - valeur.rs        : tour numérique Entier / Reel / Complexe + opérateurs
//! - fonctions.rs     : fonctions numériques de la liste blanche
//! - eval.rs          : pipeline complet (validation + interprétation scellée)
//! - canon.rs         : clé canonique (dédoublonnage)
//! - format.rs        : affichage des résultats et des exemples
//! - exemples.rs      : générateur d'exemples d'entraînement

pub mod canon;
pub mod erreurs;
pub mod eval;
pub mod exemples;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod liste_blanche;
pub mod rpn;
pub mod valeur;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale (celle qu'utilise le front)
pub use canon::cle_canonique;
pub use eval::evaluer_avec_demarche;
pub use exemples::generer_depuis_libelles;
pub use format::format_valeur;
