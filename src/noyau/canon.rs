// src/noyau/canon.rs
//
// Clé canonique (déterministe) d'une expression, pour dédoublonner les exemples générés :
// - littéraux : valeur exacte (3, 2.5, 2j) ; noms : identifiant
// - unaires   : préfixe u+ / u-
// - binaires  : (Op:gauche,droite), opérandes TRIÉS pour Add et Mult (commutatifs)
// - appels    : (Call:nom,arg1,...) dans l'ordre
//
// Les parenthèses ne laissent aucune trace (elles n'existent pas dans l'arbre).
// Le tri est local à chaque niveau : pas d'aplatissement des chaînes d'additions.
// Jamais évaluée. Totale : si l'analyse échoue, la clé est le texte sans espaces.

use super::expr::{Expr, OpUnaire};
use super::format::{format_complexe, format_reel};
use super::jetons::Litteral;
use super::rpn::analyser;

use num_complex::Complex64;

pub fn cle_canonique(texte: &str) -> String {
    match analyser(texte) {
        Ok(e) => cle_expr(&e),
        Err(_) => texte.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}

pub fn cle_expr(e: &Expr) -> String {
    match e {
        Expr::Lit(Litteral::Entier(n)) => n.to_string(),
        Expr::Lit(Litteral::Reel(x)) => format_reel(*x),
        Expr::Lit(Litteral::Imaginaire(x)) => format_complexe(Complex64::new(0.0, *x)),

        Expr::Nom(nom) => nom.clone(),

        Expr::Unaire(OpUnaire::Plus, x) => format!("u+{}", cle_expr(x)),
        Expr::Unaire(OpUnaire::Moins, x) => format!("u-{}", cle_expr(x)),

        Expr::Binaire(op, a, b) => {
            let mut g = cle_expr(a);
            let mut d = cle_expr(b);
            if op.est_commutatif() && d < g {
                std::mem::swap(&mut g, &mut d);
            }
            format!("({}:{g},{d})", op.nom())
        }

        Expr::Appel(nom, args) => {
            let mut s = format!("(Call:{nom}");
            for a in args {
                s.push(',');
                s.push_str(&cle_expr(a));
            }
            s.push(')');
            s
        }
    }
}
