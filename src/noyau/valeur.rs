// src/noyau/valeur.rs
//
// Tour numérique de l'interpréteur :
// - Entier(BigInt)      : exact, sans limite autre que le garde-fou BITS_MAX
// - Reel(f64)
// - Complexe(Complex64) : seulement si un opérande porte le marqueur imaginaire (j/J)
//
// Règles de promotion : Entier < Reel < Complexe.
// Sémantique des opérateurs alignée sur l'arithmétique “calculatrice scientifique” usuelle :
// - / est une division vraie (toujours flottante)
// - // et % arrondissent vers -∞ (le reste a le signe du diviseur)
// - Entier ** Entier(>= 0) reste exact

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

use super::erreurs::{ErreurCalcul, Resultat};
use super::expr::{OpBinaire, OpUnaire};

/// Garde-fou : taille maximale (en bits) d'un entier produit par l'interpréteur.
pub const BITS_MAX: u64 = 1_000_000;

#[derive(Clone, Debug, PartialEq)]
pub enum Valeur {
    Entier(BigInt),
    Reel(f64),
    Complexe(Complex64),
}

impl Valeur {
    pub fn entier(n: i64) -> Self {
        Valeur::Entier(BigInt::from(n))
    }

    /// Conversion vers f64 (un entier trop grand => Depassement).
    pub fn en_reel(&self) -> Resultat<f64> {
        match self {
            Valeur::Entier(n) => entier_en_reel(n),
            Valeur::Reel(x) => Ok(*x),
            Valeur::Complexe(_) => Err(ErreurCalcul::invalide(
                "un nombre complexe ne peut pas être converti en réel",
            )),
        }
    }

    pub fn en_complexe(&self) -> Resultat<Complex64> {
        match self {
            Valeur::Complexe(z) => Ok(*z),
            autre => Ok(Complex64::new(autre.en_reel()?, 0.0)),
        }
    }

    /// Valeur approchée en f64 (jamais d'erreur : un entier énorme devient ±inf).
    pub fn approx(&self) -> Option<f64> {
        match self {
            Valeur::Entier(n) => Some(n.to_f64().unwrap_or(f64::INFINITY)),
            Valeur::Reel(x) => Some(*x),
            Valeur::Complexe(_) => None,
        }
    }

    /// Entier, ou réel égal à son arrondi à 1e-9 près.
    pub fn est_entier_semblable(&self) -> bool {
        match self {
            Valeur::Entier(_) => true,
            Valeur::Reel(x) => (x - x.round()).abs() < 1e-9,
            Valeur::Complexe(_) => false,
        }
    }

    /// Signe strict (> 0) pour les prédicats de réponse. Un complexe n'a pas de signe.
    pub fn cmp_zero(&self) -> Option<Ordering> {
        match self {
            Valeur::Entier(n) => Some(n.cmp(&BigInt::zero())),
            Valeur::Reel(x) => x.partial_cmp(&0.0),
            Valeur::Complexe(_) => None,
        }
    }
}

pub fn entier_en_reel(n: &BigInt) -> Resultat<f64> {
    match n.to_f64() {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(ErreurCalcul::Depassement),
    }
}

/// Vérifie qu'un résultat flottant reste fini quand ses opérandes l'étaient.
fn reel_fini(r: f64, a: f64, b: f64) -> Resultat<f64> {
    if !r.is_finite() && a.is_finite() && b.is_finite() && !r.is_nan() {
        return Err(ErreurCalcul::Depassement);
    }
    Ok(r)
}

fn complexe_fini(r: Complex64, a: Complex64, b: Complex64) -> Resultat<Complex64> {
    if (r.re.is_infinite() || r.im.is_infinite()) && a.is_finite() && b.is_finite() {
        return Err(ErreurCalcul::Depassement);
    }
    Ok(r)
}

fn verifier_bits(n: BigInt) -> Resultat<BigInt> {
    if n.bits() > BITS_MAX {
        return Err(ErreurCalcul::Depassement);
    }
    Ok(n)
}

/* ------------------------ Unaire ------------------------ */

pub fn appliquer_unaire(op: OpUnaire, x: Valeur) -> Valeur {
    match op {
        OpUnaire::Plus => x,
        OpUnaire::Moins => match x {
            Valeur::Entier(n) => Valeur::Entier(-n),
            Valeur::Reel(v) => Valeur::Reel(-v),
            Valeur::Complexe(z) => Valeur::Complexe(-z),
        },
    }
}

/* ------------------------ Binaire ------------------------ */

enum Paire {
    Entiers(BigInt, BigInt),
    Reels(f64, f64),
    Complexes(Complex64, Complex64),
}

fn promouvoir(a: Valeur, b: Valeur) -> Resultat<Paire> {
    Ok(match (a, b) {
        (Valeur::Entier(x), Valeur::Entier(y)) => Paire::Entiers(x, y),
        (a @ Valeur::Complexe(_), b) | (a, b @ Valeur::Complexe(_)) => {
            Paire::Complexes(a.en_complexe()?, b.en_complexe()?)
        }
        (a, b) => Paire::Reels(a.en_reel()?, b.en_reel()?),
    })
}

pub fn appliquer_binaire(op: OpBinaire, a: Valeur, b: Valeur) -> Resultat<Valeur> {
    match promouvoir(a, b)? {
        Paire::Entiers(x, y) => binaire_entiers(op, x, y),
        Paire::Reels(x, y) => binaire_reels(op, x, y).map(Valeur::Reel),
        Paire::Complexes(x, y) => binaire_complexes(op, x, y).map(Valeur::Complexe),
    }
}

fn binaire_entiers(op: OpBinaire, x: BigInt, y: BigInt) -> Resultat<Valeur> {
    use OpBinaire::*;

    let n = match op {
        Add => x + y,
        Sub => x - y,
        Mul => {
            if x.bits() + y.bits() > BITS_MAX {
                return Err(ErreurCalcul::Depassement);
            }
            x * y
        }
        Div => return division_vraie(&x, &y).map(Valeur::Reel),
        FloorDiv => {
            if y.is_zero() {
                return Err(ErreurCalcul::DivisionParZero);
            }
            x.div_floor(&y)
        }
        Mod => {
            if y.is_zero() {
                return Err(ErreurCalcul::DivisionParZero);
            }
            x.mod_floor(&y)
        }
        Pow => return puissance_entiere(&x, &y),
    };
    verifier_bits(n).map(Valeur::Entier)
}

/// Division vraie entre entiers, correctement arrondie (même pour de très grands entiers).
fn division_vraie(x: &BigInt, y: &BigInt) -> Resultat<f64> {
    if y.is_zero() {
        return Err(ErreurCalcul::DivisionParZero);
    }
    let q = BigRational::new(x.clone(), y.clone());
    match q.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ErreurCalcul::Depassement),
    }
}

fn puissance_entiere(x: &BigInt, y: &BigInt) -> Resultat<Valeur> {
    if y.is_negative() {
        if x.is_zero() {
            return Err(ErreurCalcul::DivisionParZero);
        }
        let b = entier_en_reel(x)?;
        let e = y.to_f64().unwrap_or(f64::NEG_INFINITY);
        return binaire_reels(OpBinaire::Pow, b, e).map(Valeur::Reel);
    }

    // bases triviales : pas de garde-fou nécessaire
    if x.is_zero() || x.is_one() {
        return Ok(Valeur::Entier(if y.is_zero() {
            BigInt::one()
        } else {
            x.clone()
        }));
    }
    if *x == BigInt::from(-1) {
        let pair = (y % 2u32).is_zero();
        return Ok(Valeur::entier(if pair { 1 } else { -1 }));
    }

    let e = y.to_u64().ok_or(ErreurCalcul::Depassement)?;
    if x.bits().saturating_mul(e) > BITS_MAX {
        return Err(ErreurCalcul::Depassement);
    }
    let e = u32::try_from(e).map_err(|_| ErreurCalcul::Depassement)?;
    Ok(Valeur::Entier(x.pow(e)))
}

/// (quotient plancher, reste) flottants, reste du signe du diviseur.
pub fn divmod_reels(x: f64, y: f64) -> Resultat<(f64, f64)> {
    if y == 0.0 {
        return Err(ErreurCalcul::DivisionParZero);
    }
    let mut m = x % y;
    let mut div = (x - m) / y;
    if m != 0.0 {
        if (y < 0.0) != (m < 0.0) {
            m += y;
            div -= 1.0;
        }
    } else {
        m = 0.0_f64.copysign(y);
    }
    let q = if div != 0.0 {
        let mut f = div.floor();
        if div - f > 0.5 {
            f += 1.0;
        }
        f
    } else {
        0.0_f64.copysign(x / y)
    };
    Ok((q, m))
}

fn binaire_reels(op: OpBinaire, x: f64, y: f64) -> Resultat<f64> {
    use OpBinaire::*;

    let r = match op {
        Add => x + y,
        Sub => x - y,
        Mul => x * y,
        Div => {
            if y == 0.0 {
                return Err(ErreurCalcul::DivisionParZero);
            }
            x / y
        }
        FloorDiv => divmod_reels(x, y)?.0,
        Mod => divmod_reels(x, y)?.1,
        Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(ErreurCalcul::DivisionParZero);
            }
            if x < 0.0 && x.is_finite() && y.is_finite() && y.fract() != 0.0 {
                return Err(ErreurCalcul::invalide(
                    "puissance fractionnaire d'un nombre négatif (résultat complexe)",
                ));
            }
            x.powf(y)
        }
    };
    reel_fini(r, x, y)
}

fn binaire_complexes(op: OpBinaire, x: Complex64, y: Complex64) -> Resultat<Complex64> {
    use OpBinaire::*;

    let r = match op {
        Add => x + y,
        Sub => x - y,
        Mul => x * y,
        Div => {
            if y.is_zero() {
                return Err(ErreurCalcul::DivisionParZero);
            }
            x / y
        }
        FloorDiv | Mod => {
            return Err(ErreurCalcul::invalide(
                "division entière / modulo impossibles sur un complexe",
            ))
        }
        Pow => puissance_complexe(x, y)?,
    };
    complexe_fini(r, x, y)
}

fn puissance_complexe(x: Complex64, y: Complex64) -> Resultat<Complex64> {
    if y.is_zero() {
        return Ok(Complex64::one());
    }
    if x.is_zero() {
        if y.im != 0.0 || y.re < 0.0 {
            return Err(ErreurCalcul::DivisionParZero);
        }
        return Ok(Complex64::zero());
    }
    // exposant entier “raisonnable” : multiplications répétées (résultats exacts, ex: 1j**2)
    if y.im == 0.0 && y.re.fract() == 0.0 && y.re.abs() <= 100.0 {
        let n = y.re as i64;
        let p = puissance_complexe_entiere(x, n.unsigned_abs());
        return Ok(if n < 0 { Complex64::one() / p } else { p });
    }
    Ok(x.powc(y))
}

fn puissance_complexe_entiere(mut base: Complex64, mut e: u64) -> Complex64 {
    let mut acc = Complex64::one();
    while e > 0 {
        if (e & 1) == 1 {
            acc *= base;
        }
        e >>= 1;
        if e > 0 {
            base *= base;
        }
    }
    acc
}

/// Ordre numérique réel (min/max). Complexe => erreur.
pub fn comparer(a: &Valeur, b: &Valeur) -> Resultat<Ordering> {
    match (a, b) {
        (Valeur::Entier(x), Valeur::Entier(y)) => Ok(x.cmp(y)),
        (Valeur::Complexe(_), _) | (_, Valeur::Complexe(_)) => Err(ErreurCalcul::invalide(
            "les nombres complexes ne sont pas ordonnés",
        )),
        _ => {
            let x = a.approx().unwrap_or(f64::NAN);
            let y = b.approx().unwrap_or(f64::NAN);
            // NaN : jamais “plus grand” ni “plus petit”
            Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
        }
    }
}
