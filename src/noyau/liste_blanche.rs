// src/noyau/liste_blanche.rs
//
// Liste blanche : nom -> constante | fonction.
// - table fixe, versionnée (VERSION_LISTE_BLANCHE) : la modifier casse la compatibilité
// - construite une seule fois (OnceLock), jamais modifiée ensuite : lecture concurrente sûre
// - c'est le SEUL environnement visible depuis une expression

use std::collections::HashMap;
use std::f64::consts::{E, PI, TAU};
use std::sync::OnceLock;

use super::erreurs::Resultat;
use super::fonctions as f;
use super::valeur::Valeur;

pub const VERSION_LISTE_BLANCHE: u32 = 1;

pub type FnNumerique = fn(&[Valeur]) -> Resultat<Valeur>;

/// Nombre d'arguments accepté : min..=max (max = None : variadique).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arite {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arite {
    const fn fixe(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    const fn entre(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    const fn au_moins(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn accepte(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |m| n <= m)
    }
}

#[derive(Clone, Copy)]
pub enum Liaison {
    Constante(f64),
    Fonction { arite: Arite, f: FnNumerique },
}

pub struct ListeBlanche {
    entrees: HashMap<&'static str, Liaison>,
}

impl ListeBlanche {
    fn construire() -> Self {
        let mut entrees: HashMap<&'static str, Liaison> = HashMap::new();

        for (nom, v) in [
            ("pi", PI),
            ("e", E),
            ("tau", TAU),
            ("inf", f64::INFINITY),
            ("nan", f64::NAN),
        ] {
            entrees.insert(nom, Liaison::Constante(v));
        }

        let un = Arite::fixe(1);
        let deux = Arite::fixe(2);

        let fonctions: [(&'static str, Arite, FnNumerique); 51] = [
            // built-ins
            ("abs", un, f::abs),
            ("round", Arite::entre(1, 2), f::round),
            ("min", Arite::au_moins(2), f::min),
            ("max", Arite::au_moins(2), f::max),
            // puissances / logarithmes
            ("sqrt", un, f::sqrt),
            ("cbrt", un, f::cbrt),
            ("exp", un, f::exp),
            ("exp2", un, f::exp2),
            ("expm1", un, f::expm1),
            ("log", Arite::entre(1, 2), f::log),
            ("log2", un, f::log2),
            ("log10", un, f::log10),
            ("log1p", un, f::log1p),
            ("pow", deux, f::pow),
            // trigonométrie
            ("sin", un, f::sin),
            ("cos", un, f::cos),
            ("tan", un, f::tan),
            ("asin", un, f::asin),
            ("acos", un, f::acos),
            ("atan", un, f::atan),
            ("atan2", deux, f::atan2),
            ("sinh", un, f::sinh),
            ("cosh", un, f::cosh),
            ("tanh", un, f::tanh),
            ("asinh", un, f::asinh),
            ("acosh", un, f::acosh),
            ("atanh", un, f::atanh),
            ("degrees", un, f::degrees),
            ("radians", un, f::radians),
            ("hypot", Arite::au_moins(0), f::hypot),
            // arrondis / parties
            ("ceil", un, f::ceil),
            ("floor", un, f::floor),
            ("trunc", un, f::trunc),
            ("fabs", un, f::fabs),
            ("fmod", deux, f::fmod),
            ("remainder", deux, f::remainder),
            ("copysign", deux, f::copysign),
            ("ldexp", deux, f::ldexp),
            // entiers / combinatoire
            ("factorial", un, f::factorial),
            ("comb", deux, f::comb),
            ("perm", Arite::entre(1, 2), f::perm),
            ("gcd", Arite::au_moins(0), f::gcd),
            ("lcm", Arite::au_moins(0), f::lcm),
            ("isqrt", un, f::isqrt),
            // fonctions spéciales
            ("gamma", un, f::gamma),
            ("lgamma", un, f::lgamma),
            // alias usuels sur calculatrice
            ("ln", un, f::log),
            ("lg", un, f::log10),
            ("arcsin", un, f::asin),
            ("arccos", un, f::acos),
            ("arctan", un, f::atan),
        ];

        for (nom, arite, fonction) in fonctions {
            entrees.insert(nom, Liaison::Fonction { arite, f: fonction });
        }

        Self { entrees }
    }

    pub fn get(&self, nom: &str) -> Option<&Liaison> {
        self.entrees.get(nom)
    }

    /// Noms triés (affichage d'aide, tests).
    pub fn noms(&self) -> Vec<&'static str> {
        let mut v: Vec<&'static str> = self.entrees.keys().copied().collect();
        v.sort_unstable();
        v
    }
}

static LISTE_BLANCHE: OnceLock<ListeBlanche> = OnceLock::new();

/// Accès process-wide (construit au premier appel).
pub fn liste_blanche() -> &'static ListeBlanche {
    LISTE_BLANCHE.get_or_init(ListeBlanche::construire)
}
