// src/noyau/expr.rs
//
// Arbre d'analyse (parse tree) d'une expression.
// - Lit   : littéral numérique (entier exact, flottant, imaginaire)
// - Nom   : référence nommée (constante de la liste blanche)
// - Unaire / Binaire : opérateurs
// - Appel : appel DIRECT d'un nom (jamais d'une valeur calculée), arguments positionnels
//
// IMPORTANT (SAFE):
// - l'arbre est construit en entier ou pas du tout (rpn::from_rpn)
// - il ne contient aucune référence à l'environnement : les noms restent des chaînes,
//   résolues plus tard dans la liste blanche seulement.

use std::fmt;

use super::jetons::Litteral;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Plus,
    Moins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    FloorDiv,
}

impl OpBinaire {
    /// Nom stable de l'opérateur (sert aussi à la clé canonique).
    pub fn nom(self) -> &'static str {
        match self {
            OpBinaire::Add => "Add",
            OpBinaire::Sub => "Sub",
            OpBinaire::Mul => "Mult",
            OpBinaire::Div => "Div",
            OpBinaire::Pow => "Pow",
            OpBinaire::Mod => "Mod",
            OpBinaire::FloorDiv => "FloorDiv",
        }
    }

    pub fn symbole(self) -> &'static str {
        match self {
            OpBinaire::Add => "+",
            OpBinaire::Sub => "-",
            OpBinaire::Mul => "*",
            OpBinaire::Div => "/",
            OpBinaire::Pow => "**",
            OpBinaire::Mod => "%",
            OpBinaire::FloorDiv => "//",
        }
    }

    /// Addition et multiplication : l'ordre des opérandes est indifférent.
    pub fn est_commutatif(self) -> bool {
        matches!(self, OpBinaire::Add | OpBinaire::Mul)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Lit(Litteral),
    Nom(String),

    Unaire(OpUnaire, Box<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),

    Appel(String, Vec<Expr>),
}

impl Expr {
    pub fn binaire(op: OpBinaire, a: Expr, b: Expr) -> Expr {
        Expr::Binaire(op, Box::new(a), Box::new(b))
    }
}

/// Rendu entièrement parenthésé (debug / démarche), relisible par tokenize.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(Litteral::Entier(n)) => write!(f, "{n}"),
            Expr::Lit(Litteral::Reel(x)) => write!(f, "{x:?}"),
            Expr::Lit(Litteral::Imaginaire(x)) => write!(f, "{x:?}j"),
            Expr::Nom(s) => write!(f, "{s}"),
            Expr::Unaire(OpUnaire::Plus, x) => write!(f, "(+{x})"),
            Expr::Unaire(OpUnaire::Moins, x) => write!(f, "(-{x})"),
            Expr::Binaire(op, a, b) => write!(f, "({a} {} {b})", op.symbole()),
            Expr::Appel(nom, args) => {
                write!(f, "{nom}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}
