//! src/app/reglages.rs
//!
//! Réglages (fichier TOML optionnel) : valeurs par défaut du générateur d'exemples.
//!
//! ```toml
//! [generateur]
//! operation = "Деление"
//! chiffres = 2
//! difficulte = "Лёгкая"
//! nombre = 20
//! avec_reponses = true
//! graine = 42
//! ```
//!
//! Les libellés restent des chaînes : le noyau les interprète
//! avec repli sur la valeur par défaut. Les clés absentes prennent
//! la valeur par défaut ; une clé inconnue est une erreur (faute de frappe).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Reglages {
    pub generateur: ReglagesGenerateur,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReglagesGenerateur {
    pub operation: String,
    pub chiffres: i64,
    pub operandes: i64,
    pub nombres: String,
    pub difficulte: String,
    pub nombre: i64,
    pub reponse: String,
    pub avec_reponses: bool,
    pub graine: Option<u64>,
}

impl Default for ReglagesGenerateur {
    fn default() -> Self {
        Self {
            operation: "Сложение".to_string(),
            chiffres: 2,
            operandes: 2,
            nombres: "int".to_string(),
            difficulte: "Лёгкая".to_string(),
            nombre: 10,
            reponse: "Любой".to_string(),
            avec_reponses: false,
            graine: None,
        }
    }
}

impl Reglages {
    pub fn depuis_texte(texte: &str) -> Result<Self> {
        toml::from_str(texte).context("réglages TOML invalides")
    }

    pub fn charger(chemin: &Path) -> Result<Self> {
        let texte = fs::read_to_string(chemin)
            .with_context(|| format!("lecture des réglages {}", chemin.display()))?;
        Self::depuis_texte(&texte).with_context(|| format!("fichier {}", chemin.display()))
    }
}
