// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr (atomiquement : tout l'arbre ou une erreur)
//
// Règles:
// - Ident(name) suivi de '(' => appel de fonction (marqueur sur la pile, arité comptée)
// - Ident(name) seul        => référence nommée (Expr::Nom)
// - '(' juste après une valeur => appel sur une valeur calculée : refusé
// - '+' / '-' quand on n'attend PAS d'opérateur => unaire (préfixe)
//
// Précédences (de la plus faible à la plus forte) :
//   + -  <  * / // %  <  unaire + -  <  **
// ** est associatif à droite, et son opérande droit peut être unaire : 2**-1.

use super::erreurs::{ErreurCalcul, Resultat};
use super::expr::{Expr, OpBinaire, OpUnaire};
use super::jetons::{normaliser, tokenize, Litteral, Tok};

#[derive(Clone, Debug, PartialEq)]
pub enum ElemRpn {
    Lit(Litteral),
    Nom(String),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    Appel(String, usize), // (nom, nombre d'arguments)
}

/// Éléments de la pile d'opérateurs.
#[derive(Clone, Debug)]
enum Pile {
    LPar,
    Appel(String),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
}

const PREC_UNAIRE: i32 = 3;

fn precedence(op: OpBinaire) -> i32 {
    match op {
        OpBinaire::Add | OpBinaire::Sub => 1,
        OpBinaire::Mul | OpBinaire::Div | OpBinaire::FloorDiv | OpBinaire::Mod => 2,
        OpBinaire::Pow => 4,
    }
}

fn is_right_associative(op: OpBinaire) -> bool {
    matches!(op, OpBinaire::Pow)
}

fn op_binaire(t: &Tok) -> Option<OpBinaire> {
    match t {
        Tok::Plus => Some(OpBinaire::Add),
        Tok::Minus => Some(OpBinaire::Sub),
        Tok::Star => Some(OpBinaire::Mul),
        Tok::Slash => Some(OpBinaire::Div),
        Tok::DoubleStar => Some(OpBinaire::Pow),
        Tok::DoubleSlash => Some(OpBinaire::FloorDiv),
        Tok::Percent => Some(OpBinaire::Mod),
        _ => None,
    }
}

/// Compteur d'arguments d'un appel ouvert.
struct AppelOuvert {
    separateurs: usize,
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("max"), LPar, Num(1), PointVirgule, Num(2), RPar, Plus, Num(3)]
///   rpn:    [Lit(1), Lit(2), Appel("max", 2), Lit(3), Binaire(Add)]
pub fn to_rpn(tokens: &[Tok]) -> Resultat<Vec<ElemRpn>> {
    if tokens.is_empty() {
        return Err(ErreurCalcul::invalide("expression vide"));
    }

    let mut out: Vec<ElemRpn> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Pile> = Vec::new();
    let mut appels: Vec<AppelOuvert> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter les unaires et les opérandes manquants.
    let mut prev_was_value = false;

    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;

        match tok {
            Tok::Num(lit) => {
                if prev_was_value {
                    return Err(ErreurCalcul::invalide(
                        "deux valeurs consécutives (opérateur manquant)",
                    ));
                }
                out.push(ElemRpn::Lit(lit.clone()));
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if prev_was_value {
                    return Err(ErreurCalcul::invalide(
                        "deux valeurs consécutives (opérateur manquant)",
                    ));
                }
                if matches!(tokens.get(i), Some(Tok::LPar)) {
                    // appel direct : le marqueur reste sur la pile jusqu'à ')'
                    ops.push(Pile::Appel(name.clone()));
                    appels.push(AppelOuvert { separateurs: 0 });
                    i += 1;
                    prev_was_value = false;
                } else {
                    out.push(ElemRpn::Nom(name.clone()));
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(ErreurCalcul::invalide(
                        "appel sur une valeur calculée interdit (seuls les appels directs de fonctions autorisées)",
                    ));
                }
                ops.push(Pile::LPar);
                prev_was_value = false;
            }

            Tok::PointVirgule => {
                if !prev_was_value {
                    return Err(ErreurCalcul::invalide("argument manquant"));
                }
                loop {
                    match ops.last() {
                        Some(Pile::Appel(_)) => break,
                        Some(Pile::LPar) | None => {
                            return Err(ErreurCalcul::invalide(
                                "';' hors d'un appel de fonction",
                            ));
                        }
                        Some(_) => depiler_vers(&mut ops, &mut out),
                    }
                }
                if let Some(a) = appels.last_mut() {
                    a.separateurs += 1;
                }
                prev_was_value = false;
            }

            Tok::RPar => {
                // dépile jusqu'à '(' ou au marqueur d'appel
                let ouvrante = loop {
                    match ops.pop() {
                        Some(Pile::Unaire(op)) => out.push(ElemRpn::Unaire(op)),
                        Some(Pile::Binaire(op)) => out.push(ElemRpn::Binaire(op)),
                        Some(p) => break p,
                        None => {
                            return Err(ErreurCalcul::invalide(
                                "parenthèse fermante sans ouvrante",
                            ))
                        }
                    }
                };

                match ouvrante {
                    Pile::Appel(name) => {
                        let separateurs = appels.pop().map(|a| a.separateurs).unwrap_or(0);
                        let nargs = if prev_was_value {
                            separateurs + 1
                        } else if separateurs == 0 {
                            0
                        } else {
                            return Err(ErreurCalcul::invalide("argument manquant"));
                        };
                        out.push(ElemRpn::Appel(name, nargs));
                    }
                    _ => {
                        if !prev_was_value {
                            return Err(ErreurCalcul::invalide("parenthèses vides"));
                        }
                    }
                }

                prev_was_value = true;
            }

            Tok::Plus | Tok::Minus if !prev_was_value => {
                // unaire préfixe : ne dépile rien
                let op = if matches!(tok, Tok::Plus) {
                    OpUnaire::Plus
                } else {
                    OpUnaire::Moins
                };
                ops.push(Pile::Unaire(op));
            }

            _ => {
                let Some(op) = op_binaire(tok) else {
                    return Err(ErreurCalcul::invalide("jeton inattendu"));
                };
                if !prev_was_value {
                    return Err(ErreurCalcul::invalide(format!(
                        "opérateur '{}' sans opérande gauche",
                        op.symbole()
                    )));
                }

                // dépile tant que la précédence/associativité exige de sortir le haut
                while let Some(top) = ops.last() {
                    let p_top = match top {
                        Pile::Unaire(_) => PREC_UNAIRE,
                        Pile::Binaire(o) => precedence(*o),
                        Pile::LPar | Pile::Appel(_) => break,
                    };
                    let p_tok = precedence(op);

                    let doit_pop = if is_right_associative(op) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if doit_pop {
                        depiler_vers(&mut ops, &mut out);
                    } else {
                        break;
                    }
                }

                ops.push(Pile::Binaire(op));
                prev_was_value = false;
            }
        }
    }

    if !prev_was_value {
        return Err(ErreurCalcul::invalide("expression incomplète"));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        match op {
            Pile::Unaire(o) => out.push(ElemRpn::Unaire(o)),
            Pile::Binaire(o) => out.push(ElemRpn::Binaire(o)),
            Pile::LPar | Pile::Appel(_) => {
                return Err(ErreurCalcul::invalide("parenthèses non fermées"));
            }
        }
    }

    Ok(out)
}

fn depiler_vers(ops: &mut Vec<Pile>, out: &mut Vec<ElemRpn>) {
    match ops.pop() {
        Some(Pile::Unaire(o)) => out.push(ElemRpn::Unaire(o)),
        Some(Pile::Binaire(o)) => out.push(ElemRpn::Binaire(o)),
        Some(autre) => ops.push(autre),
        None => {}
    }
}

/// Garde-fou : profondeur maximale de l'arbre (l'affichage et la clé canonique sont récursifs).
pub const PROFONDEUR_MAX: usize = 1000;

/// Construit une Expr à partir d'une RPN. Échec => aucun arbre partiel.
pub fn from_rpn(rpn: &[ElemRpn]) -> Resultat<Expr> {
    // (sous-arbre, profondeur) : la profondeur est suivie sans parcourir l'arbre
    let mut st: Vec<(Expr, usize)> = Vec::new();
    let invalide = || ErreurCalcul::invalide("expression invalide");
    let trop_profonde = |p: usize| -> Resultat<usize> {
        if p > PROFONDEUR_MAX {
            return Err(ErreurCalcul::invalide("expression trop profonde"));
        }
        Ok(p)
    };

    for elem in rpn.iter().cloned() {
        match elem {
            ElemRpn::Lit(l) => st.push((Expr::Lit(l), 1)),
            ElemRpn::Nom(n) => st.push((Expr::Nom(n), 1)),

            ElemRpn::Unaire(op) => {
                let (x, p) = st.pop().ok_or_else(invalide)?;
                st.push((Expr::Unaire(op, Box::new(x)), trop_profonde(p + 1)?));
            }

            ElemRpn::Binaire(op) => {
                let (b, pb) = st.pop().ok_or_else(invalide)?;
                let (a, pa) = st.pop().ok_or_else(invalide)?;
                st.push((Expr::binaire(op, a, b), trop_profonde(pa.max(pb) + 1)?));
            }

            ElemRpn::Appel(name, nargs) => {
                if st.len() < nargs {
                    return Err(ErreurCalcul::invalide("fonction sans argument"));
                }
                let (args, profs): (Vec<Expr>, Vec<usize>) =
                    st.split_off(st.len() - nargs).into_iter().unzip();
                let p = profs.into_iter().max().unwrap_or(0) + 1;
                st.push((Expr::Appel(name, args), trop_profonde(p)?));
            }
        }
    }

    if st.len() != 1 {
        return Err(invalide());
    }
    st.pop().map(|(e, _)| e).ok_or_else(invalide)
}

/// Chaîne complète : normaliser -> jetons -> RPN -> Expr.
/// Aucune résolution de nom ici (voir eval::valider).
pub fn analyser(texte: &str) -> Resultat<Expr> {
    let src = normaliser(texte)?;
    let jetons = tokenize(&src)?;
    let rpn = to_rpn(&jetons)?;
    from_rpn(&rpn)
}
