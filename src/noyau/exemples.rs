// src/noyau/exemples.rs
//
// Générateur d'exemples d'entraînement (tirage avec rejet).
// - chaque tentative construit une expression candidate selon la demande
// - rejet : clé déjà vue, échec d'évaluation, résultat complexe, |v| > 1e9, type de réponse
// - plafond de tentatives max(1000, nombre*50) : on rend ce qu'on a trouvé, jamais d'erreur
//
// L'aléa est injecté (rand::Rng) : une graine fixe donne exactement les mêmes exemples.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::canon::cle_canonique;
use super::eval::evaluer;
use super::format::{format_pour_affichage, format_valeur};
use super::valeur::Valeur;

/// Au-delà, un exemple n'est plus “agréable” à calculer.
pub const MAGNITUDE_MAX: f64 = 1e9;

pub const CHIFFRES_MIN: u32 = 1;
pub const CHIFFRES_MAX: u32 = 12;
pub const OPERANDES_MIN: usize = 2;
pub const OPERANDES_MAX: usize = 5;
pub const NOMBRE_MIN: usize = 1;
pub const NOMBRE_MAX: usize = 500;

/// Probabilités de tirage.
const P_ANTI_REPETITION: f64 = 0.6;
const P_PARENTHESES: f64 = 0.6;

const OPERATEURS_MELANGE: [&str; 4] = ["+", "-", "*", "/"];

/* ------------------------ Libellés ------------------------ */

fn libelle_normalise(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeOperation {
    #[default]
    Addition,
    Soustraction,
    Multiplication,
    Division,
    Puissance,
    Melange,
}

impl TypeOperation {
    /// Libellé inconnu => addition.
    pub fn depuis_libelle(s: &str) -> Self {
        match libelle_normalise(s).as_str() {
            "вычитание" | "sub" | "soustraction" => Self::Soustraction,
            "умножение" | "mul" | "multiplication" => Self::Multiplication,
            "деление" | "div" | "division" => Self::Division,
            "степень" | "pow" | "puissance" => Self::Puissance,
            "смешанные" | "mixed" | "melange" | "mélange" => Self::Melange,
            _ => Self::Addition,
        }
    }

    pub fn libelle(self) -> &'static str {
        match self {
            Self::Addition => "Сложение",
            Self::Soustraction => "Вычитание",
            Self::Multiplication => "Умножение",
            Self::Division => "Деление",
            Self::Puissance => "Степень",
            Self::Melange => "Смешанные",
        }
    }

    /// Opérateur fixe des modes à un seul opérateur.
    fn symbole(self) -> &'static str {
        match self {
            Self::Soustraction => "-",
            Self::Multiplication => "*",
            Self::Division => "/",
            Self::Puissance => "**",
            Self::Addition | Self::Melange => "+",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeNombres {
    /// Un seul chiffre, 0 à 9.
    Chiffres,
    /// Entiers, largeur min(chiffres, 6).
    #[default]
    Entiers,
    /// Entiers larges, largeur = chiffres (bornée à 9).
    Grands,
    /// Partie entière min(chiffres, 6) + 1 à 3 décimales.
    Decimaux,
}

impl TypeNombres {
    /// Libellé inconnu => entiers.
    pub fn depuis_libelle(s: &str) -> Self {
        match libelle_normalise(s).as_str() {
            "digits" | "цифры (0-9)" | "цифры" | "chiffres" => Self::Chiffres,
            "big" | "большие целые" | "grands" => Self::Grands,
            "decimal" | "десятичные" | "decimaux" | "décimaux" => Self::Decimaux,
            _ => Self::Entiers,
        }
    }

    pub fn libelle(self) -> &'static str {
        match self {
            Self::Chiffres => "digits",
            Self::Entiers => "int",
            Self::Grands => "big",
            Self::Decimaux => "decimal",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difficulte {
    Facile,
    #[default]
    Moyenne,
    Difficile,
}

impl Difficulte {
    /// Libellé inconnu => moyenne (ni division exacte, ni parenthèses).
    pub fn depuis_libelle(s: &str) -> Self {
        match libelle_normalise(s).as_str() {
            "лёгкая" | "легкая" | "easy" | "facile" => Self::Facile,
            "сложная" | "hard" | "difficile" => Self::Difficile,
            _ => Self::Moyenne,
        }
    }

    pub fn libelle(self) -> &'static str {
        match self {
            Self::Facile => "Лёгкая",
            Self::Moyenne => "Средняя",
            Self::Difficile => "Сложная",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeReponse {
    #[default]
    Quelconque,
    Entier,
    Naturel,
    NonNegatif,
    Fractionnaire,
}

impl TypeReponse {
    /// Libellé inconnu => aucune contrainte.
    pub fn depuis_libelle(s: &str) -> Self {
        match libelle_normalise(s).as_str() {
            "целое" | "integer" | "entier" => Self::Entier,
            "натуральное" | "natural" | "naturel" => Self::Naturel,
            "неотрицательное" | "nonnegative" | "positif" => Self::NonNegatif,
            "дробное" | "fractional" | "fractionnaire" => Self::Fractionnaire,
            _ => Self::Quelconque,
        }
    }

    pub fn libelle(self) -> &'static str {
        match self {
            Self::Quelconque => "Любой",
            Self::Entier => "Целое",
            Self::Naturel => "Натуральное",
            Self::NonNegatif => "Неотрицательное",
            Self::Fractionnaire => "Дробное",
        }
    }

    /// Prédicat sur une valeur réelle (un complexe est rejeté avant).
    pub fn accepte(self, v: &Valeur) -> bool {
        let entier = v.est_entier_semblable();
        let signe = v.cmp_zero();
        match self {
            Self::Quelconque => true,
            Self::Entier => entier,
            Self::Naturel => entier && signe == Some(std::cmp::Ordering::Greater),
            Self::NonNegatif => entier && matches!(signe, Some(o) if o.is_ge()),
            Self::Fractionnaire => !entier,
        }
    }
}

/* ------------------------ Demande ------------------------ */

#[derive(Clone, Debug, PartialEq)]
pub struct Demande {
    pub operation: TypeOperation,
    pub chiffres: u32,
    pub operandes: usize,
    pub nombres: TypeNombres,
    pub difficulte: Difficulte,
    pub nombre: usize,
    pub reponse: TypeReponse,
    pub avec_reponses: bool,
}

impl Default for Demande {
    fn default() -> Self {
        Self {
            operation: TypeOperation::Addition,
            chiffres: 2,
            operandes: 2,
            nombres: TypeNombres::Entiers,
            difficulte: Difficulte::Facile,
            nombre: 10,
            reponse: TypeReponse::Quelconque,
            avec_reponses: false,
        }
    }
}

impl Demande {
    /// Libellés interprétés avec repli, valeurs numériques bornées.
    #[allow(clippy::too_many_arguments)]
    pub fn depuis_libelles(
        operation: &str,
        chiffres: i64,
        operandes: i64,
        nombres: &str,
        difficulte: &str,
        nombre: i64,
        reponse: &str,
        avec_reponses: bool,
    ) -> Self {
        Self {
            operation: TypeOperation::depuis_libelle(operation),
            chiffres: chiffres.clamp(CHIFFRES_MIN as i64, CHIFFRES_MAX as i64) as u32,
            operandes: operandes.clamp(OPERANDES_MIN as i64, OPERANDES_MAX as i64) as usize,
            nombres: TypeNombres::depuis_libelle(nombres),
            difficulte: Difficulte::depuis_libelle(difficulte),
            nombre: nombre.clamp(NOMBRE_MIN as i64, NOMBRE_MAX as i64) as usize,
            reponse: TypeReponse::depuis_libelle(reponse),
            avec_reponses,
        }
    }

    /// Ramène chaque paramètre dans sa plage sûre.
    pub fn bornee(mut self) -> Self {
        self.chiffres = self.chiffres.clamp(CHIFFRES_MIN, CHIFFRES_MAX);
        self.operandes = self.operandes.clamp(OPERANDES_MIN, OPERANDES_MAX);
        self.nombre = self.nombre.clamp(NOMBRE_MIN, NOMBRE_MAX);
        self
    }

    pub fn plafond_tentatives(&self) -> usize {
        (self.nombre * 50).max(1000)
    }
}

/* ------------------------ Tirage des opérandes ------------------------ */

/// Entier de `chiffres` chiffres exactement (sans zéro de tête), largeur bornée à [1, 9].
fn entier_a_chiffres<R: Rng + ?Sized>(rng: &mut R, chiffres: u32) -> u64 {
    let c = chiffres.clamp(1, 9);
    if c == 1 {
        rng.gen_range(1..=9)
    } else {
        rng.gen_range(10u64.pow(c - 1)..=10u64.pow(c) - 1)
    }
}

fn operande_decimal<R: Rng + ?Sized>(rng: &mut R, chiffres: u32) -> String {
    let entier = entier_a_chiffres(rng, chiffres.min(6));
    let largeur = rng.gen_range(1..=3u32);
    let frac = rng.gen_range(0..10u64.pow(largeur));
    format!("{entier}.{frac:0w$}", w = largeur as usize)
}

fn operande<R: Rng + ?Sized>(rng: &mut R, nombres: TypeNombres, chiffres: u32) -> String {
    match nombres {
        TypeNombres::Chiffres => rng.gen_range(0..=9u32).to_string(),
        TypeNombres::Decimaux => operande_decimal(rng, chiffres),
        TypeNombres::Grands => entier_a_chiffres(rng, chiffres).to_string(),
        TypeNombres::Entiers => entier_a_chiffres(rng, chiffres.min(6)).to_string(),
    }
}

/// (diviseur * multiplicateur, diviseur) : quotient entier garanti.
fn paire_division<R: Rng + ?Sized>(rng: &mut R, chiffres: u32) -> (String, String) {
    let diviseur = rng.gen_range(2..=9u64);
    let haut = (10u64.pow(chiffres.min(2)) - 1).max(2);
    let multiplicateur = rng.gen_range(1..=haut);
    (
        (diviseur * multiplicateur).to_string(),
        diviseur.to_string(),
    )
}

/* ------------------------ Candidats ------------------------ */

fn candidat_puissance<R: Rng + ?Sized>(rng: &mut R, d: &Demande) -> String {
    let base = operande(rng, d.nombres, d.chiffres.min(3));
    let haut = if d.chiffres <= 3 { 4 } else { 3 };
    let exposant = rng.gen_range(2..=haut);
    format!("{base}**{exposant}")
}

fn candidat_chaine<R: Rng + ?Sized>(rng: &mut R, d: &Demande) -> String {
    let n = d.operandes;
    let ops: Vec<&str> = if d.operation == TypeOperation::Melange {
        (0..n - 1)
            .map(|_| OPERATEURS_MELANGE[rng.gen_range(0..OPERATEURS_MELANGE.len())])
            .collect()
    } else {
        vec![d.operation.symbole(); n - 1]
    };

    let facile = d.difficulte == Difficulte::Facile;
    let mut operandes: Vec<String> = Vec::with_capacity(n + 1);
    for i in 0..n {
        if facile && ops.get(i) == Some(&"/") {
            let (numerateur, diviseur) = paire_division(rng, d.chiffres);
            // la paire n'est placée entière qu'en tête ; ensuite seul le diviseur entre
            if operandes.is_empty() {
                operandes.push(numerateur);
                if operandes.len() < n {
                    operandes.push(diviseur);
                }
            } else {
                operandes.push(diviseur);
            }
        } else {
            let mut o = operande(rng, d.nombres, d.chiffres);
            if operandes.last() == Some(&o) && rng.gen_bool(P_ANTI_REPETITION) {
                o = operande(rng, d.nombres, d.chiffres);
            }
            operandes.push(o);
        }
    }
    operandes.truncate(n);

    let mut jetons: Vec<String> = Vec::with_capacity(2 * n);
    for (i, o) in operandes.into_iter().enumerate() {
        jetons.push(o);
        if let Some(op) = ops.get(i) {
            jetons.push((*op).to_string());
        }
    }

    if d.difficulte == Difficulte::Difficile && n >= 3 && rng.gen_bool(P_PARENTHESES) {
        entourer_sous_chaine(rng, &mut jetons);
    }

    jetons.join(" ")
}

/// Parenthèses autour d'une plage contiguë d'opérandes (début strictement avant fin).
fn entourer_sous_chaine<R: Rng + ?Sized>(rng: &mut R, jetons: &mut [String]) {
    let indices: Vec<usize> = (0..jetons.len()).step_by(2).collect();
    if indices.len() < 2 {
        return;
    }
    let Some(&debut) = indices[..indices.len() - 1].choose(rng) else {
        return;
    };
    let fins: Vec<usize> = indices.iter().copied().filter(|&i| i > debut).collect();
    let Some(&fin) = fins.choose(rng) else {
        return;
    };
    jetons[debut].insert(0, '(');
    jetons[fin].push(')');
}

/// Raison du rejet d'une valeur, ou None si elle convient.
fn motif_rejet(v: &Valeur, reponse: TypeReponse) -> Option<&'static str> {
    let Some(x) = v.approx() else {
        return Some("résultat complexe");
    };
    if x.abs() > MAGNITUDE_MAX {
        return Some("résultat trop grand");
    }
    if !reponse.accepte(v) {
        return Some("type de réponse");
    }
    None
}

/* ------------------------ API ------------------------ */

/// Génère au plus `demande.nombre` exemples distincts (par clé canonique).
pub fn generer<R: Rng + ?Sized>(demande: &Demande, rng: &mut R) -> Vec<String> {
    let d = demande.clone().bornee();
    let plafond = d.plafond_tentatives();
    debug!(
        operation = d.operation.libelle(),
        nombres = d.nombres.libelle(),
        difficulte = d.difficulte.libelle(),
        reponse = d.reponse.libelle(),
        chiffres = d.chiffres,
        operandes = d.operandes,
        nombre = d.nombre,
        "génération"
    );

    let mut resultats: Vec<String> = Vec::with_capacity(d.nombre);
    let mut vues: HashSet<String> = HashSet::new();
    let mut tentatives = 0usize;

    while resultats.len() < d.nombre && tentatives < plafond {
        tentatives += 1;

        let brut = if d.operation == TypeOperation::Puissance {
            candidat_puissance(rng, &d)
        } else {
            candidat_chaine(rng, &d)
        };

        let cle = cle_canonique(&brut);
        if vues.contains(&cle) {
            trace!(tentative = tentatives, expression = %brut, "doublon");
            continue;
        }

        let v = match evaluer(&brut) {
            Ok(v) => v,
            Err(e) => {
                trace!(tentative = tentatives, expression = %brut, erreur = %e, "rejet");
                continue;
            }
        };
        if let Some(motif) = motif_rejet(&v, d.reponse) {
            trace!(tentative = tentatives, expression = %brut, motif, "rejet");
            continue;
        }

        vues.insert(cle);
        let affichage = format_pour_affichage(&brut);
        resultats.push(if d.avec_reponses {
            format!("{affichage} = {}", format_valeur(&v))
        } else {
            affichage
        });
    }

    if resultats.len() < d.nombre {
        debug!(
            trouves = resultats.len(),
            demandes = d.nombre,
            tentatives,
            "plafond de tentatives atteint"
        );
    } else {
        debug!(trouves = resultats.len(), tentatives, "génération terminée");
    }
    resultats
}

/// Même demande + même graine => mêmes exemples.
pub fn generer_avec_graine(demande: &Demande, graine: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(graine);
    generer(demande, &mut rng)
}

/// Porte d'entrée par libellés (russes, ou leurs alias ASCII / français).
/// Graine fournie => lot reproductible ; sinon tirage système.
#[allow(clippy::too_many_arguments)]
pub fn generer_depuis_libelles(
    operation: &str,
    chiffres: i64,
    operandes: i64,
    nombres: &str,
    difficulte: &str,
    nombre: i64,
    reponse: &str,
    avec_reponses: bool,
    graine: Option<u64>,
) -> Vec<String> {
    let demande = Demande::depuis_libelles(
        operation,
        chiffres,
        operandes,
        nombres,
        difficulte,
        nombre,
        reponse,
        avec_reponses,
    );
    match graine {
        Some(g) => generer_avec_graine(&demande, g),
        None => generer(&demande, &mut rand::thread_rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::erreurs::Resultat;

    fn demande(operation: TypeOperation) -> Demande {
        Demande {
            operation,
            nombre: 20,
            ..Demande::default()
        }
    }

    fn valeur(p: &str) -> Resultat<Valeur> {
        evaluer(p.split(" = ").next().unwrap_or(p))
    }

    #[test]
    fn addition_facile_unique_et_bornee() {
        let p = generer_avec_graine(&demande(TypeOperation::Addition), 7);
        assert_eq!(p.len(), 20);

        let cles: HashSet<String> = p.iter().map(|e| cle_canonique(e)).collect();
        assert_eq!(cles.len(), p.len());

        for e in &p {
            assert!(e.contains(" + "), "{e}");
            let v = valeur(e).unwrap().approx().unwrap();
            assert!(v.abs() <= MAGNITUDE_MAX);
        }
    }

    #[test]
    fn libelles_russes() {
        let p = generer_depuis_libelles("Сложение", 2, 2, "int", "Лёгкая", 20, "Любой", false, None);
        assert!(p.len() <= 20);
        assert!(!p.is_empty());
        for e in &p {
            assert!(valeur(e).is_ok(), "{e}");
        }

        let a = generer_depuis_libelles("Деление", 2, 2, "int", "Лёгкая", 10, "Целое", true, Some(3));
        let b = generer_avec_graine(
            &Demande::depuis_libelles("div", 2, 2, "int", "easy", 10, "integer", true),
            3,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn demande_depuis_libelles_bornee() {
        let d = Demande::depuis_libelles("Степень", 99, -4, "???", "Сложная", 0, "Дробное", true);
        assert_eq!(d.operation, TypeOperation::Puissance);
        assert_eq!((d.chiffres, d.operandes, d.nombre), (12, 2, 1));
        assert_eq!(d.nombres, TypeNombres::Entiers);
        assert_eq!(d.difficulte, Difficulte::Difficile);
        assert_eq!(d.reponse, TypeReponse::Fractionnaire);
        assert!(d.avec_reponses);
    }

    #[test]
    fn reponses_naturelles() {
        let d = Demande {
            reponse: TypeReponse::Naturel,
            ..demande(TypeOperation::Soustraction)
        };
        let p = generer_avec_graine(&d, 3);
        assert!(!p.is_empty());
        for e in &p {
            match valeur(e).unwrap() {
                Valeur::Entier(n) => assert!(n > num_bigint::BigInt::from(0), "{e}"),
                autre => panic!("{e} -> {autre:?}"),
            }
        }
    }

    #[test]
    fn division_facile_exacte() {
        let p = generer_avec_graine(&demande(TypeOperation::Division), 11);
        assert!(!p.is_empty());
        for e in &p {
            let (a, b) = e.split_once(" ÷ ").unwrap();
            let a: u64 = a.parse().unwrap();
            let b: u64 = b.parse().unwrap();
            assert_eq!(a % b, 0, "{e}");
        }
    }

    #[test]
    fn division_facile_chaine() {
        // au-delà de deux opérandes : seule la paire de tête est exacte, puis troncature
        let d = Demande {
            operandes: 3,
            nombre: 30,
            ..demande(TypeOperation::Division)
        };
        let p = generer_avec_graine(&d, 4);
        assert!(!p.is_empty());
        for e in &p {
            let termes: Vec<u64> = e.split(" ÷ ").map(|t| t.parse().unwrap()).collect();
            assert_eq!(termes.len(), 3, "{e}");
            assert_eq!(termes[0] % termes[1], 0, "{e}");
            assert_ne!(termes[2], 0, "{e}");
        }
    }

    #[test]
    fn puissances_bornees() {
        let d = Demande {
            chiffres: 5,
            ..demande(TypeOperation::Puissance)
        };
        for e in generer_avec_graine(&d, 5) {
            let (base, exposant) = e.split_once(" ^ ").unwrap();
            assert!(base.len() <= 3, "{e}");
            let x: u32 = exposant.parse().unwrap();
            assert!((2..=3).contains(&x), "{e}");
        }
    }

    #[test]
    fn difficile_avec_parentheses() {
        let d = Demande {
            operandes: 4,
            difficulte: Difficulte::Difficile,
            nombre: 30,
            ..demande(TypeOperation::Melange)
        };
        let p = generer_avec_graine(&d, 1);
        assert!(p.iter().any(|e| e.contains('(')));
        for e in &p {
            assert_eq!(e.matches('(').count(), e.matches(')').count(), "{e}");
        }
    }

    #[test]
    fn decimaux_et_reponses() {
        let d = Demande {
            nombres: TypeNombres::Decimaux,
            avec_reponses: true,
            ..demande(TypeOperation::Multiplication)
        };
        for e in generer_avec_graine(&d, 9) {
            assert!(e.contains(" × ") && e.contains(" = "), "{e}");
            let (expr, _) = e.split_once(" = ").unwrap();
            assert!(expr.split(" × ").all(|o| o.contains('.')), "{e}");
        }
    }

    #[test]
    fn contrainte_impossible_termine() {
        // somme de deux chiffres : jamais fractionnaire
        let d = Demande {
            nombres: TypeNombres::Chiffres,
            reponse: TypeReponse::Fractionnaire,
            ..demande(TypeOperation::Addition)
        };
        assert!(generer_avec_graine(&d, 0).is_empty());
    }

    #[test]
    fn meme_graine_memes_exemples() {
        let d = Demande {
            operandes: 3,
            ..demande(TypeOperation::Melange)
        };
        assert_eq!(generer_avec_graine(&d, 42), generer_avec_graine(&d, 42));
        assert!(generer_avec_graine(&d, 42).len() <= 20);
    }

    #[test]
    fn bornes_de_la_demande() {
        let d = Demande {
            chiffres: 50,
            operandes: 9,
            nombre: 0,
            ..Demande::default()
        }
        .bornee();
        assert_eq!((d.chiffres, d.operandes, d.nombre), (12, 5, 1));
        assert_eq!(d.plafond_tentatives(), 1000);
        assert_eq!(
            Demande {
                nombre: 500,
                ..Demande::default()
            }
            .plafond_tentatives(),
            25_000
        );
    }

    #[test]
    fn libelles() {
        assert_eq!(TypeOperation::depuis_libelle("Деление"), TypeOperation::Division);
        assert_eq!(TypeOperation::depuis_libelle("mixed"), TypeOperation::Melange);
        assert_eq!(TypeOperation::depuis_libelle("???"), TypeOperation::Addition);
        assert_eq!(TypeNombres::depuis_libelle("Большие целые"), TypeNombres::Grands);
        assert_eq!(TypeNombres::depuis_libelle("x"), TypeNombres::Entiers);
        assert_eq!(Difficulte::depuis_libelle("Лёгкая"), Difficulte::Facile);
        assert_eq!(Difficulte::depuis_libelle("hard"), Difficulte::Difficile);
        assert_eq!(Difficulte::depuis_libelle("???"), Difficulte::Moyenne);
        assert_eq!(TypeReponse::depuis_libelle("Натуральное"), TypeReponse::Naturel);
        assert_eq!(TypeReponse::depuis_libelle(""), TypeReponse::Quelconque);
    }

    #[test]
    fn predicats_de_reponse() {
        let deux = Valeur::entier(2);
        let zero = Valeur::entier(0);
        let demi = Valeur::Reel(0.5);
        assert!(TypeReponse::Naturel.accepte(&deux));
        assert!(!TypeReponse::Naturel.accepte(&zero));
        assert!(TypeReponse::NonNegatif.accepte(&zero));
        assert!(!TypeReponse::NonNegatif.accepte(&Valeur::entier(-1)));
        assert!(TypeReponse::Entier.accepte(&Valeur::Reel(4.0)));
        assert!(TypeReponse::Fractionnaire.accepte(&demi));
        assert!(!TypeReponse::Fractionnaire.accepte(&deux));
    }
}
