// src/app.rs
//
// Calculatrice sûre — module App (racine)
// ---------------------------------------
//
// Rôle:
// - Déclarer les sous-modules (etat.rs + reglages.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
//
// Important:
// - L'évaluation passe toujours par le noyau (vue.rs), jamais ici.

pub mod etat;
pub mod reglages;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;
pub use reglages::Reglages;
