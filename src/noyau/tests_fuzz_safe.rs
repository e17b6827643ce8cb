//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (StdRng, graine fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte les erreurs de calcul attendues (division par zéro, dépassement, domaine)
//! - invariant clé : une entrée hostile échoue TOUJOURS en ExpressionInvalide

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::canon::cle_canonique;
use super::erreurs::ErreurCalcul;
use super::eval::evaluer;
use super::exemples::{generer_avec_graine, Demande, TypeOperation};

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurCalcul) -> bool {
    // erreurs *normales* pour un fuzz arithmétique
    match e {
        ErreurCalcul::DivisionParZero | ErreurCalcul::Depassement => true,
        ErreurCalcul::ExpressionInvalide { raison } => {
            raison.contains("domaine")
                || raison.contains("complexe")
                || raison.contains("négatif")
                || raison.contains("NaN")
        }
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const FONCTIONS_1: [&str; 8] = ["sqrt", "sin", "cos", "tan", "exp", "log", "abs", "floor"];
const OPS: [&str; 7] = ["+", "-", "*", "/", "**", "%", "//"];

fn gen_atom(rng: &mut StdRng) -> String {
    // complexes rares : ils ferment beaucoup de fonctions réelles
    match rng.gen_range(0..12) {
        0..=2 => rng.gen_range(0..10).to_string(),
        3 | 4 => rng.gen_range(10..1000).to_string(),
        5 | 6 => format!("{}.{}", rng.gen_range(0..100), rng.gen_range(0..100)),
        7 | 8 => "pi".to_string(),
        9 | 10 => "e".to_string(),
        _ => format!("{}j", rng.gen_range(1..5)),
    }
}

fn gen_expr(rng: &mut StdRng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }
    match rng.gen_range(0..10) {
        0 | 1 => gen_atom(rng),
        2 => format!("-{}", gen_expr(rng, depth - 1)),
        3 => {
            let f = FONCTIONS_1[rng.gen_range(0..FONCTIONS_1.len())];
            format!("{f}({})", gen_expr(rng, depth - 1))
        }
        4 => format!(
            "max({};{})",
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        _ => {
            let op = OPS[rng.gen_range(0..OPS.len())];
            // exposants gardés petits : on teste le pipeline, pas les garde-fous
            let droite = if op == "**" {
                rng.gen_range(0..4).to_string()
            } else {
                gen_expr(rng, depth - 1)
            };
            format!("({} {op} {droite})", gen_expr(rng, depth - 1))
        }
    }
}

/* ------------------------ Entrées hostiles ------------------------ */

const HOSTILES: [&str; 20] = [
    "__import__('os').system('ls')",
    "open('/etc/passwd').read()",
    "eval('1+1')",
    "exec(1)",
    "globals()",
    "locals()",
    "vars()",
    "getattr(1;'real')",
    "(1).real",
    "pi.hex()",
    "a=1",
    "x",
    "lambda: 1",
    "[1;2][0]",
    "{1}",
    "1 if 1 else 2",
    "1 < 2",
    "sqrt(x=4)",
    "(sin)(1)",
    "1 & 2",
];

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::with_capacity(items.len() / 2 + 1);
        let mut it = items.into_iter();
        while let Some(a) = it.next() {
            match it.next() {
                Some(b) => next.push(format!("({a}+{b})")),
                None => next.push(a),
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_erreurs_typees() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1500);

    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut rng_bis = StdRng::seed_from_u64(0xC0FFEE);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..300 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        // même graine => même expression => même sortie
        assert_eq!(expr, gen_expr(&mut rng_bis, 4));

        let r = evaluer(&expr);
        assert_eq!(r, evaluer(&expr), "non déterministe: {expr:?}");
        match r {
            Ok(_) => seen_ok += 1,
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 30, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_entrees_hostiles() {
    for h in HOSTILES {
        assert!(
            matches!(evaluer(h), Err(ErreurCalcul::ExpressionInvalide { .. })),
            "entrée hostile acceptée: {h:?}"
        );
    }
}

#[test]
fn fuzz_safe_octets_aleatoires() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1500);
    let alphabet: Vec<char> = "0123456789+-*/%^().,;eijpx _'=[]{}<>!&|~@#×÷ ".chars().collect();

    let mut rng = StdRng::seed_from_u64(0xBADC0DE);
    for _ in 0..2000 {
        budget(t0, max);

        let n = rng.gen_range(1..24);
        let s: String = (0..n)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();

        // jamais de panique ; la clé est totale
        let _ = evaluer(&s);
        let _ = cle_canonique(&s);
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    // 800 * 0.5 = 400
    assert_eq!(evaluer(&expr), Ok(super::valeur::Valeur::Reel(400.0)));
    budget(t0, max);
}

#[test]
fn fuzz_safe_generateur_graines() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    let operations = [
        TypeOperation::Addition,
        TypeOperation::Soustraction,
        TypeOperation::Multiplication,
        TypeOperation::Division,
        TypeOperation::Puissance,
        TypeOperation::Melange,
    ];
    for (graine, op) in operations.into_iter().enumerate() {
        budget(t0, max);
        let d = Demande {
            operation: op,
            operandes: 3,
            nombre: 15,
            ..Demande::default()
        };
        let p = generer_avec_graine(&d, graine as u64);
        assert!(p.len() <= 15);
        for e in &p {
            assert!(evaluer(e).is_ok(), "exemple non évaluable : {e}");
        }
    }
}
