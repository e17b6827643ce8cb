// src/noyau/erreurs.rs
//
// Taxonomie des erreurs du noyau.
// - ExpressionInvalide : syntaxe, construction interdite, nom/appel hors liste blanche,
//   caractère banni, erreur de domaine mathématique
// - DivisionParZero
// - Depassement : résultat non représentable (flottant infini, entier trop grand)

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    #[error("expression invalide : {raison}")]
    ExpressionInvalide { raison: String },

    #[error("division par zéro")]
    DivisionParZero,

    #[error("dépassement numérique")]
    Depassement,
}

impl ErreurCalcul {
    pub fn invalide(raison: impl Into<String>) -> Self {
        Self::ExpressionInvalide {
            raison: raison.into(),
        }
    }

    /// Erreur de domaine (sqrt(-1), log(0), acos(2)...).
    pub fn domaine(fonction: &str) -> Self {
        Self::invalide(format!("erreur de domaine mathématique dans {fonction}()"))
    }
}

pub type Resultat<T> = Result<T, ErreurCalcul>;
