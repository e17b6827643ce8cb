//! Noyau — évaluation (pipeline réel)
//!
//! normaliser -> jetons -> RPN -> Expr -> validation (liste blanche) -> interprétation
//!
//! Chaque étape est une barrière : un échec arrête tout, sans évaluation partielle.
//! L'interprète ne connaît QUE la liste blanche : aucun mécanisme d'évaluation générique,
//! aucun accès à l'environnement du processus.

use tracing::debug;

use super::erreurs::{ErreurCalcul, Resultat};
use super::expr::{Expr, OpBinaire, OpUnaire};
use super::jetons::{format_tokens, normaliser, tokenize, Litteral, Tok};
use super::liste_blanche::{liste_blanche, FnNumerique, Liaison, ListeBlanche};
use super::rpn::{from_rpn, to_rpn, ElemRpn};
use super::valeur::{appliquer_binaire, appliquer_unaire, Valeur};

use num_complex::Complex64;

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub rpn: String,
    pub arbre: String,
}

/// API publique : évalue une expression.
pub fn evaluer(texte: &str) -> Resultat<Valeur> {
    journaliser_refus(texte, etapes(texte).map(|(v, ..)| v))
}

/// Même pipeline, en rendant aussi la démarche (jetons, RPN, arbre) pour le mode -v.
pub fn evaluer_avec_demarche(texte: &str) -> Resultat<(Valeur, DemarcheNoyau)> {
    let resultat = etapes(texte).map(|(v, jetons, rpn, arbre)| {
        let d = DemarcheNoyau {
            jetons: format_tokens(&jetons),
            rpn: format!("{rpn:?}"),
            arbre: arbre.to_string(),
        };
        (v, d)
    });
    journaliser_refus(texte, resultat)
}

fn journaliser_refus<T>(texte: &str, r: Resultat<T>) -> Resultat<T> {
    if let Err(e) = &r {
        debug!(expression = texte, erreur = %e, "expression refusée");
    }
    r
}

fn etapes(texte: &str) -> Resultat<(Valeur, Vec<Tok>, Vec<ElemRpn>, Expr)> {
    // 1-2) Normalisation + caractères bannis
    let src = normaliser(texte)?;

    // 3) Jetons, RPN, arbre (atomique)
    let jetons = tokenize(&src)?;
    let rpn = to_rpn(&jetons)?;
    let arbre = from_rpn(&rpn)?;

    // 4) Validation contre la liste blanche
    let lb = liste_blanche();
    valider(&arbre, lb)?;

    // 5-6) Interprétation scellée
    let v = interpreter(&arbre, lb)?;
    Ok((v, jetons, rpn, arbre))
}

/// Vérifie que chaque Nom est une constante autorisée et chaque Appel une fonction
/// autorisée avec une arité valide. Itératif ; s'arrête au premier échec.
pub fn valider(expr: &Expr, lb: &ListeBlanche) -> Resultat<()> {
    let mut pile: Vec<&Expr> = vec![expr];

    while let Some(e) = pile.pop() {
        match e {
            Expr::Lit(_) => {}

            Expr::Nom(nom) => match lb.get(nom) {
                Some(Liaison::Constante(_)) => {}
                Some(Liaison::Fonction { .. }) => {
                    return Err(ErreurCalcul::invalide(format!(
                        "la fonction '{nom}' doit être appelée"
                    )));
                }
                None => {
                    return Err(ErreurCalcul::invalide(format!(
                        "nom '{nom}' non autorisé"
                    )));
                }
            },

            Expr::Appel(nom, args) => {
                match lb.get(nom) {
                    Some(Liaison::Fonction { arite, .. }) => {
                        if !arite.accepte(args.len()) {
                            return Err(ErreurCalcul::invalide(format!(
                                "{nom}() : nombre d'arguments invalide ({})",
                                args.len()
                            )));
                        }
                    }
                    Some(Liaison::Constante(_)) => {
                        return Err(ErreurCalcul::invalide(format!(
                            "'{nom}' n'est pas une fonction"
                        )));
                    }
                    None => {
                        return Err(ErreurCalcul::invalide(format!(
                            "fonction '{nom}' non autorisée"
                        )));
                    }
                }
                // ordre de visite : gauche d'abord (premier échec = le plus à gauche)
                pile.extend(args.iter().rev());
            }

            Expr::Unaire(_, x) => pile.push(x),

            Expr::Binaire(_, a, b) => {
                pile.push(b);
                pile.push(a);
            }
        }
    }

    Ok(())
}

/// Tâches de l'interprète : visiter un noeud, ou appliquer un opérateur aux valeurs déjà
/// empilées.
enum Tache<'a> {
    Visiter(&'a Expr),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    Appel(FnNumerique, usize),
}

fn pile_incoherente() -> ErreurCalcul {
    ErreurCalcul::invalide("pile d'évaluation incohérente")
}

/// Interprète un arbre VALIDÉ. Les seules liaisons accessibles sont celles de `lb`.
///
/// Itératif (pile de tâches + pile de valeurs) : la profondeur de l'arbre ne consomme pas
/// la pile du thread. Ordre d'évaluation gauche -> droite, premier échec = le plus à gauche.
pub fn interpreter(expr: &Expr, lb: &ListeBlanche) -> Resultat<Valeur> {
    let mut taches: Vec<Tache<'_>> = vec![Tache::Visiter(expr)];
    let mut valeurs: Vec<Valeur> = Vec::new();

    while let Some(t) = taches.pop() {
        match t {
            Tache::Visiter(e) => match e {
                Expr::Lit(Litteral::Entier(n)) => valeurs.push(Valeur::Entier(n.clone())),
                Expr::Lit(Litteral::Reel(x)) => valeurs.push(Valeur::Reel(*x)),
                Expr::Lit(Litteral::Imaginaire(x)) => {
                    valeurs.push(Valeur::Complexe(Complex64::new(0.0, *x)))
                }

                Expr::Nom(nom) => match lb.get(nom) {
                    Some(Liaison::Constante(v)) => valeurs.push(Valeur::Reel(*v)),
                    _ => return Err(ErreurCalcul::invalide(format!("nom '{nom}' non autorisé"))),
                },

                Expr::Unaire(op, x) => {
                    taches.push(Tache::Unaire(*op));
                    taches.push(Tache::Visiter(x));
                }

                Expr::Binaire(op, a, b) => {
                    taches.push(Tache::Binaire(*op));
                    taches.push(Tache::Visiter(b));
                    taches.push(Tache::Visiter(a));
                }

                Expr::Appel(nom, args) => {
                    let Some(Liaison::Fonction { arite, f }) = lb.get(nom) else {
                        return Err(ErreurCalcul::invalide(format!(
                            "fonction '{nom}' non autorisée"
                        )));
                    };
                    if !arite.accepte(args.len()) {
                        return Err(ErreurCalcul::invalide(format!(
                            "{nom}() : nombre d'arguments invalide ({})",
                            args.len()
                        )));
                    }
                    taches.push(Tache::Appel(*f, args.len()));
                    taches.extend(args.iter().rev().map(Tache::Visiter));
                }
            },

            Tache::Unaire(op) => {
                let x = valeurs.pop().ok_or_else(pile_incoherente)?;
                valeurs.push(appliquer_unaire(op, x));
            }

            Tache::Binaire(op) => {
                let vb = valeurs.pop().ok_or_else(pile_incoherente)?;
                let va = valeurs.pop().ok_or_else(pile_incoherente)?;
                valeurs.push(appliquer_binaire(op, va, vb)?);
            }

            Tache::Appel(f, n) => {
                let debut = valeurs.len().checked_sub(n).ok_or_else(pile_incoherente)?;
                let args = valeurs.split_off(debut);
                valeurs.push(f(&args)?);
            }
        }
    }

    match (valeurs.pop(), valeurs.is_empty()) {
        (Some(v), true) => Ok(v),
        _ => Err(pile_incoherente()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::format::format_valeur;

    fn ok(s: &str) -> Valeur {
        evaluer(s).unwrap_or_else(|e| panic!("evaluer({s:?}) erreur: {e}"))
    }

    fn texte(s: &str) -> String {
        format_valeur(&ok(s))
    }

    fn invalide(s: &str) -> String {
        match evaluer(s) {
            Err(ErreurCalcul::ExpressionInvalide { raison }) => raison,
            other => panic!("attendu ExpressionInvalide pour {s:?}, obtenu {other:?}"),
        }
    }

    fn proche(s: &str, attendu: f64) {
        let v = ok(s).approx().unwrap_or(f64::NAN);
        assert!((v - attendu).abs() < 1e-12, "{s:?} = {v}, attendu {attendu}");
    }

    // --- Arithmétique ---

    #[test]
    fn priorites() {
        assert_eq!(ok("2+3*4"), Valeur::entier(14));
        assert_eq!(ok("2**3**2"), Valeur::entier(512));
        assert_eq!(ok("-2**2"), Valeur::entier(-4));
        assert_eq!(ok("(2+3)*4"), Valeur::entier(20));
        assert_eq!(ok("2^10"), Valeur::entier(1024));
    }

    #[test]
    fn glyphes_et_virgule() {
        assert_eq!(ok("6 × 7"), Valeur::entier(42));
        assert_eq!(ok("7 ÷ 2"), Valeur::Reel(3.5));
        assert_eq!(ok("1,5 + 1"), Valeur::Reel(2.5));
    }

    #[test]
    fn types_de_resultat() {
        assert_eq!(texte("6/3"), "2.0");
        assert_eq!(texte("7//2"), "3");
        assert_eq!(texte("-7%3"), "2");
        assert_eq!(texte("2**-1"), "0.5");
        assert_eq!(texte("2**100"), "1267650600228229401496703205376");
    }

    #[test]
    fn complexes() {
        assert_eq!(texte("1j*1j"), "(-1+0j)");
        assert_eq!(texte("2+3j"), "(2+3j)");
        assert_eq!(texte("abs(3+4j)"), "5.0");
    }

    // --- Fonctions / constantes ---

    #[test]
    fn fonctions_autorisees() {
        proche("sin(pi/2)", 1.0);
        proche("sqrt(16)", 4.0);
        proche("log(8;2)", 3.0);
        assert_eq!(ok("max(1;5;3)"), Valeur::entier(5));
        assert_eq!(ok("factorial(5)"), Valeur::entier(120));
        assert_eq!(ok("round(2.5)"), Valeur::entier(2));
        assert_eq!(ok("floor(-2.5)"), Valeur::entier(-3));
    }

    // --- Erreurs ---

    #[test]
    fn division_par_zero() {
        assert_eq!(evaluer("5/0"), Err(ErreurCalcul::DivisionParZero));
        assert_eq!(evaluer("5//0"), Err(ErreurCalcul::DivisionParZero));
        assert_eq!(evaluer("5%0"), Err(ErreurCalcul::DivisionParZero));
        assert_eq!(evaluer("0**-1"), Err(ErreurCalcul::DivisionParZero));
    }

    #[test]
    fn depassement() {
        assert_eq!(evaluer("10.0**400"), Err(ErreurCalcul::Depassement));
        assert_eq!(evaluer("9**9**9"), Err(ErreurCalcul::Depassement));
        assert_eq!(evaluer("exp(1000)"), Err(ErreurCalcul::Depassement));
    }

    #[test]
    fn constructions_interdites() {
        assert!(invalide("__import__('os')").contains('_'));
        assert!(invalide("open('x')").contains("chaînes"));
        assert!(invalide("a=1").contains("affectation"));
        assert!(invalide("max(x=1)").contains("affectation"));
        assert!(invalide("(1).real").contains("attribut"));
    }

    #[test]
    fn noms_et_appels_hors_liste() {
        assert!(invalide("x").contains("'x'"));
        assert!(invalide("open(1)").contains("open"));
        assert!(invalide("eval(1)").contains("eval"));
        assert!(invalide("sin").contains("appelée"));
        assert!(invalide("pi(2)").contains("pas une fonction"));
        assert!(invalide("sqrt(1;2)").contains("arguments"));
    }

    #[test]
    fn premier_echec_le_plus_a_gauche() {
        assert!(invalide("foo + bar").contains("'foo'"));
    }

    #[test]
    fn demarche_disponible() {
        let (_, d) = evaluer_avec_demarche("1+2*3").unwrap();
        assert_eq!(d.jetons, "1 + 2 * 3");
        assert_eq!(d.arbre, "(1 + (2 * 3))");
    }

    // --- Profondeur ---

    #[test]
    fn appels_profonds_sur_petite_pile() {
        use crate::noyau::rpn::PROFONDEUR_MAX;

        let n = PROFONDEUR_MAX - 1;
        let expr = format!("{}7{}", "abs(".repeat(n), ")".repeat(n));
        let binaire = format!("{}1{}", "(1+".repeat(n), ")".repeat(n));

        // pile de thread standard (2 Mio), pas celle du thread principal
        let r = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || (evaluer(&expr), evaluer(&binaire)))
            .expect("thread de test")
            .join()
            .expect("pas de débordement de pile");

        assert_eq!(r.0, Ok(Valeur::entier(7)));
        assert_eq!(r.1, Ok(Valeur::entier(n as i64 + 1)));
    }

    #[test]
    fn ordre_d_evaluation() {
        // la validation précède toute évaluation
        assert!(invalide("1/0 + x").contains("'x'"));
        assert_eq!(evaluer("1/0 + 10.0**400"), Err(ErreurCalcul::DivisionParZero));
        assert_eq!(evaluer("max(1;2;abs(-3))"), Ok(Valeur::entier(3)));
    }
}
