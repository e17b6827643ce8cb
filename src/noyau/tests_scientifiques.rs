//! Tests scientifiques (campagne) : invariants numériques + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - identités vérifiées à 1e-12 près (flottants), exactement pour les entiers
//!
//! Notes :
//! - La clé canonique ne trie qu'à chaque niveau : "1+2+3" et "3+2+1" restent distincts.
//! - Les sommes très longues passent par une forme balancée (profondeur log n) ;
//!   la forme “chaîne” est bornée par PROFONDEUR_MAX.

use std::time::{Duration, Instant};

use num_traits::{Signed, Zero};

use super::canon::cle_canonique;
use super::erreurs::ErreurCalcul;
use super::eval::evaluer;
use super::format::format_valeur;
use super::rpn::PROFONDEUR_MAX;
use super::valeur::Valeur;

fn eval_ok(expr: &str) -> Valeur {
    evaluer(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn eval_texte(expr: &str) -> String {
    format_valeur(&eval_ok(expr))
}

fn eval_reel(expr: &str) -> f64 {
    eval_ok(expr)
        .approx()
        .unwrap_or_else(|| panic!("expr={expr:?} : résultat complexe"))
}

fn assert_proche(a: &str, b: &str) {
    let (x, y) = (eval_reel(a), eval_reel(b));
    assert!((x - y).abs() < 1e-12, "{a:?}={x} ≠ {b:?}={y}");
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Identités trig (flottantes) ------------------------ */

#[test]
fn sci_identites_symetrie() {
    // sin(-x) = -sin(x), cos(-x) = cos(x), tan(-x) = -tan(x)
    assert_proche("sin(-pi/4)", "-sin(pi/4)");
    assert_proche("cos(-pi/3)", "cos(pi/3)");
    assert_proche("tan(-pi/6)", "-tan(pi/6)");
    assert_proche("sin(pi/6)", "0.5");
}

#[test]
fn sci_periodicite_angles() {
    assert_proche("sin(pi/4 + 2*pi)", "sin(pi/4)");
    assert_proche("cos(pi/3 + tau)", "cos(pi/3)");
    assert_proche("tan(pi/6 + pi)", "tan(pi/6)");
}

#[test]
fn sci_pythagore() {
    for k in 0..24 {
        let x = format!("{k}*pi/12");
        assert_proche(&format!("sin({x})**2 + cos({x})**2"), "1");
    }
}

#[test]
fn sci_reciproques() {
    assert_proche("exp(log(7))", "7");
    assert_proche("log10(1000)", "3");
    assert_proche("lg(100)", "2");
    assert_proche("ln(e)", "1");
    assert_proche("degrees(radians(30))", "30");
    assert_proche("sqrt(2)**2", "2");
}

/* ------------------------ Entiers exacts ------------------------ */

#[test]
fn sci_entiers_exacts() {
    assert_eq!(eval_texte("2**100 - 2**99"), eval_texte("2**99"));
    assert_eq!(eval_texte("(10**20 + 1) - 10**20"), "1");
    assert_eq!(eval_texte("factorial(25)"), "15511210043330985984000000");
    assert_eq!(eval_texte("comb(50;25)"), "126410606437752");
    assert_eq!(eval_texte("gcd(2**40;6**20)"), eval_texte("2**20"));
}

#[test]
fn sci_division_plancher_coherente() {
    // (a // b) * b + a % b == a, pour tous les signes
    for a in -12i64..=12 {
        for b in [-5i64, -3, -1, 1, 2, 7] {
            let expr = format!("(({a}) // ({b})) * ({b}) + ({a}) % ({b})");
            assert_eq!(eval_ok(&expr), Valeur::entier(a), "expr={expr:?}");

            let reste = eval_ok(&format!("({a}) % ({b})"));
            let Valeur::Entier(r) = reste else {
                panic!("reste non entier pour {a} % {b}");
            };
            // le reste a le signe du diviseur (ou est nul)
            assert!(r.is_zero() || r.is_negative() == (b < 0), "{a} % {b} = {r}");
        }
    }
}

#[test]
fn sci_division_vraie_grands_entiers() {
    assert_eq!(eval_texte("10**30 / 10**15"), "1000000000000000.0");
    assert_eq!(eval_texte("10**31 / 10**15"), "1e+16");
    assert_eq!(eval_texte("(10**400 + 1) / 10**399"), "10.0");
    assert_eq!(evaluer("10**400 * 1.0"), Err(ErreurCalcul::Depassement));
}

/* ------------------------ Clé canonique ------------------------ */

#[test]
fn sci_cle_invariante_par_niveau() {
    let paires = [
        ("12 + 34", "34 + 12"),
        ("(1 + 2) * 3", "3 * (2 + 1)"),
        ("sqrt(2 * 8)", "sqrt(8 * 2)"),
        ("-(4 * 5)", "-(5 * 4)"),
    ];
    for (a, b) in paires {
        assert_eq!(cle_canonique(a), cle_canonique(b), "{a:?} / {b:?}");
        // même clé => même valeur
        assert_eq!(eval_ok(a), eval_ok(b));
    }
    assert_ne!(cle_canonique("12 - 34"), cle_canonique("34 - 12"));
    assert_ne!(cle_canonique("1+2+3"), cle_canonique("3+2+1"));
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_chaine_longue_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    // chaîne gauche : profondeur = nombre de termes, juste sous la limite
    let termes = PROFONDEUR_MAX - 1;
    let expr = vec!["1"; termes].join(" + ");
    budget(t0, max);

    assert_eq!(eval_ok(&expr), Valeur::entier(termes as i64));
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    // gros entier contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let expr = format!("({big} + 1) // 10**99");
    budget(t0, max);

    assert_eq!(eval_texte(&expr), "10");
    assert_eq!(eval_texte("2**10000 % 1000"), "376");
    budget(t0, max);
}

#[test]
fn sci_limites_refusees_vite() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    // refus sur garde-fous, pas sur calcul
    assert_eq!(evaluer("9**9**9"), Err(ErreurCalcul::Depassement));
    assert_eq!(evaluer("factorial(100000)"), Err(ErreurCalcul::Depassement));
    assert!(matches!(
        evaluer(&"1+".repeat(6000)),
        Err(ErreurCalcul::ExpressionInvalide { .. })
    ));
    budget(t0, max);
}
