// src/noyau/format.rs
//
// Affichage :
// - format_valeur : texte d'un résultat (entier complet, flottant “repr” le plus court,
//   complexe (a+bj))
// - format_pour_affichage : expression brute -> glyphes d'affichage (^, ×, ÷)

use num_complex::Complex64;

use super::valeur::Valeur;

/* ------------------------ Flottants ------------------------ */

/// Plus courte représentation relisible d'un f64.
/// - notation positionnelle pour 1e-4 <= |x| < 1e16, avec ".0" si entier
/// - notation scientifique sinon : 1e+16, 1.5e-05
pub fn format_reel(x: f64) -> String {
    format_reel_opt(x, true)
}

fn format_reel_opt(x: f64, point_zero: bool) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        let s = if x.is_sign_negative() { "-0" } else { "0" };
        return if point_zero {
            format!("{s}.0")
        } else {
            s.to_string()
        };
    }

    // `{:e}` donne déjà les chiffres les plus courts : "1.5e-5", "-1e20"
    let sci = format!("{x:e}");
    let (mantisse, exposant) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exposant: i32 = exposant.parse().unwrap_or(0);
    let negatif = mantisse.starts_with('-');
    let chiffres: String = mantisse.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut out = String::new();
    if negatif {
        out.push('-');
    }

    if (-4..16).contains(&exposant) {
        if exposant >= 0 {
            let entiers = (exposant + 1) as usize;
            if chiffres.len() <= entiers {
                out.push_str(&chiffres);
                out.push_str(&"0".repeat(entiers - chiffres.len()));
                if point_zero {
                    out.push_str(".0");
                }
            } else {
                out.push_str(&chiffres[..entiers]);
                out.push('.');
                out.push_str(&chiffres[entiers..]);
            }
        } else {
            out.push_str("0.");
            out.push_str(&"0".repeat((-exposant - 1) as usize));
            out.push_str(&chiffres);
        }
    } else {
        out.push_str(&chiffres[..1]);
        if chiffres.len() > 1 {
            out.push('.');
            out.push_str(&chiffres[1..]);
        }
        let signe = if exposant < 0 { '-' } else { '+' };
        out.push_str(&format!("e{signe}{:02}", exposant.abs()));
    }
    out
}

/* ------------------------ Complexes ------------------------ */

pub fn format_complexe(z: Complex64) -> String {
    let im = format_reel_opt(z.im, false);
    if z.re == 0.0 && z.re.is_sign_positive() {
        return format!("{im}j");
    }
    let re = format_reel_opt(z.re, false);
    let signe = if im.starts_with('-') { "" } else { "+" };
    format!("({re}{signe}{im}j)")
}

/* ------------------------ Valeur ------------------------ */

pub fn format_valeur(v: &Valeur) -> String {
    match v {
        Valeur::Entier(n) => n.to_string(),
        Valeur::Reel(x) => format_reel(*x),
        Valeur::Complexe(z) => format_complexe(*z),
    }
}

/* ------------------------ Expressions (affichage d'exemples) ------------------------ */

fn espaces_simples(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "12 * 3 ** 2 / 4" -> "12 × 3 ^ 2 ÷ 4"
pub fn format_pour_affichage(expr: &str) -> String {
    let s = expr.replace("**", "^");
    let s = s.replace('*', " × ");
    let s = s.replace('/', " ÷ ");
    let s = espaces_simples(&s);
    let s = s.replace('^', " ^ ");
    espaces_simples(&s)
}
