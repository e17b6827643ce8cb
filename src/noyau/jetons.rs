// src/noyau/jetons.rs
//
// Normalisation + tokenisation.
// - normaliser : ^ -> **, × -> *, ÷ -> /, ',' -> '.', trim, refus de '_'
// - tokenize   : nombres (entiers, flottants, imaginaires), identifiants, opérateurs, ( ) ;
//
// Toute construction hors grammaire est refusée ICI avec son nom (affectation, attribut,
// chaîne, indexation...), avant même la construction de l'arbre.

use num_bigint::BigInt;
use num_traits::Num;

use super::erreurs::{ErreurCalcul, Resultat};

/// Garde-fou : longueur maximale d'une entrée (anti-gel).
pub const LONGUEUR_MAX: usize = 10_000;

/// Mots-clés de langage qui n'ont rien à faire dans une expression.
const MOTS_CLES_INTERDITS: &[&str] = &[
    "lambda", "import", "from", "for", "in", "if", "else", "while", "def", "class", "return",
    "yield", "await", "async", "global", "nonlocal", "del", "pass", "with", "as", "try", "except",
    "raise", "assert", "not", "and", "or", "is", "None", "True", "False",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Litteral {
    Entier(BigInt),
    Reel(f64),
    Imaginaire(f64), // 2j, 1.5J
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(Litteral),
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    DoubleStar,  // **
    DoubleSlash, // //
    Percent,

    LPar,
    RPar,
    PointVirgule, // séparateur d'arguments (la virgule est devenue un point décimal)
}

/// Normalise le texte saisi (glyphes alternatifs, virgule décimale).
/// Refuse le caractère '_' partout (vecteur classique d'accès privé / dunder).
pub fn normaliser(s: &str) -> Resultat<String> {
    let src = s
        .replace('^', "**")
        .replace('×', "*")
        .replace('÷', "/")
        .replace(',', ".");
    let src = src.trim();

    if src.is_empty() {
        return Err(ErreurCalcul::invalide("expression vide"));
    }
    if src.contains('_') {
        return Err(ErreurCalcul::invalide("le caractère '_' est interdit"));
    }
    if src.chars().count() > LONGUEUR_MAX {
        return Err(ErreurCalcul::invalide("expression trop longue"));
    }
    Ok(src.to_string())
}

/// Tokenize une chaîne DÉJÀ normalisée.
pub fn tokenize(s: &str) -> Resultat<Vec<Tok>> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        let suivant = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            ';' => {
                out.push(Tok::PointVirgule);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '%' => {
                out.push(Tok::Percent);
                i += 1;
                continue;
            }
            '*' => {
                if suivant == Some('*') {
                    out.push(Tok::DoubleStar);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                if suivant == Some('/') {
                    out.push(Tok::DoubleSlash);
                    i += 2;
                } else {
                    out.push(Tok::Slash);
                    i += 1;
                }
                continue;
            }
            _ => {}
        }

        // Nombre : chiffre, ou '.' suivi d'un chiffre (".5")
        if c.is_ascii_digit() || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit())) {
            let (lit, fin) = lire_nombre(&chars, i)?;
            // "2pi", "3x" : pas de multiplication implicite
            if let Some(&apres) = chars.get(fin) {
                if apres.is_alphanumeric() {
                    return Err(ErreurCalcul::invalide(format!(
                        "littéral numérique mal formé près de '{apres}'"
                    )));
                }
            }
            out.push(Tok::Num(lit));
            i = fin;
            continue;
        }

        // Point restant : accès à un attribut (ex: "pi.real", "(1).conjugate")
        if c == '.' {
            return Err(ErreurCalcul::invalide("accès à un attribut interdit"));
        }

        // Identifiants : lettres/chiffres (le '_' a déjà été refusé par normaliser)
        if c.is_alphabetic() {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_alphanumeric() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if MOTS_CLES_INTERDITS.contains(&word.as_str()) {
                return Err(ErreurCalcul::invalide(format!("mot-clé interdit : '{word}'")));
            }
            out.push(Tok::Ident(word));
            continue;
        }

        return Err(construction_interdite(c, suivant));
    }

    Ok(out)
}

/// Nomme la construction correspondant à un caractère hors grammaire.
fn construction_interdite(c: char, suivant: Option<char>) -> ErreurCalcul {
    let raison = match c {
        '=' if suivant == Some('=') => "comparaison interdite".to_string(),
        '=' => "affectation interdite".to_string(),
        '<' | '>' | '!' => "comparaison interdite".to_string(),
        '\'' | '"' => "chaînes de caractères interdites".to_string(),
        '[' | ']' => "indexation / listes interdites".to_string(),
        '{' | '}' => "ensembles / dictionnaires interdits".to_string(),
        '&' | '|' | '~' => "opérateurs binaires bit à bit interdits".to_string(),
        '@' => "opérateur matriciel / décorateur interdit".to_string(),
        ':' => "tranche / annotation interdite".to_string(),
        '\\' | '#' | '$' | '?' | '`' => format!("caractère interdit : '{c}'"),
        _ => format!("caractère inattendu : '{c}'"),
    };
    ErreurCalcul::invalide(raison)
}

/// Lit un littéral numérique à partir de `start`.
/// Formes : 12, 0x1f, 0o17, 0b101, 1.5, .5, 1., 1e10, 2.5E-3, 3j, 1.5J
/// Renvoie (littéral, indice de fin).
fn lire_nombre(chars: &[char], start: usize) -> Resultat<(Litteral, usize)> {
    let mut i = start;

    // Préfixes de base (entiers seulement)
    if chars[i] == '0' {
        let base = match chars.get(i + 1) {
            Some('x') | Some('X') => Some(16),
            Some('o') | Some('O') => Some(8),
            Some('b') | Some('B') => Some(2),
            _ => None,
        };
        if let Some(radix) = base {
            i += 2;
            let d0 = i;
            while i < chars.len() && chars[i].is_digit(radix) {
                i += 1;
            }
            if i == d0 {
                return Err(ErreurCalcul::invalide("littéral entier mal formé"));
            }
            let txt: String = chars[d0..i].iter().collect();
            let n = BigInt::from_str_radix(&txt, radix)
                .map_err(|_| ErreurCalcul::invalide("littéral entier mal formé"))?;
            return Ok((Litteral::Entier(n), i));
        }
    }

    let mut flottant = false;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        flottant = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exposant : seulement si suivi de chiffres (éventuellement signés)
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut k = i + 1;
        if k < chars.len() && (chars[k] == '+' || chars[k] == '-') {
            k += 1;
        }
        if k < chars.len() && chars[k].is_ascii_digit() {
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }
            flottant = true;
            i = k;
        }
    }

    let txt: String = chars[start..i].iter().collect();

    // Suffixe imaginaire
    if i < chars.len() && (chars[i] == 'j' || chars[i] == 'J') {
        let v: f64 = txt
            .parse()
            .map_err(|_| ErreurCalcul::invalide("littéral imaginaire mal formé"))?;
        return Ok((Litteral::Imaginaire(v), i + 1));
    }

    if flottant {
        let v: f64 = txt
            .parse()
            .map_err(|_| ErreurCalcul::invalide("littéral flottant mal formé"))?;
        return Ok((Litteral::Reel(v), i));
    }

    // Entier décimal : zéros de tête refusés ("007"), sauf "0", "00"...
    if txt.len() > 1 && txt.starts_with('0') && txt.chars().any(|d| d != '0') {
        return Err(ErreurCalcul::invalide(
            "zéros de tête interdits dans un entier décimal",
        ));
    }
    let n = BigInt::parse_bytes(txt.as_bytes(), 10)
        .ok_or_else(|| ErreurCalcul::invalide("nombre invalide"))?;
    Ok((Litteral::Entier(n), i))
}

/// Format utilitaire (debug / mode -v) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(Litteral::Entier(n)) => format!("{n}"),
            Tok::Num(Litteral::Reel(x)) => format!("{x:?}"),
            Tok::Num(Litteral::Imaginaire(x)) => format!("{x:?}j"),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::DoubleStar => "**".to_string(),
            Tok::DoubleSlash => "//".to_string(),
            Tok::Percent => "%".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::PointVirgule => ";".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
