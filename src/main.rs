// src/main.rs
//
// Calculatrice sûre — point d’entrée (terminal)
// ---------------------------------------------
// But:
// - `calculatrice eval <EXPR>`  : évalue une expression (code 1 si refusée)
// - `calculatrice cle <EXPR>`   : affiche la clé canonique
// - `calculatrice generer ...`  : lot d'exemples d'entraînement
// - `calculatrice noms`         : constantes et fonctions autorisées
// - sans sous-commande          : mode ligne (une expression par ligne sur stdin)
//
// Journalisation: stderr, filtre RUST_LOG (défaut "warn", "debug" avec -v).
// Les réglages TOML (--config) donnent les valeurs de base ; les options CLI priment.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app;
mod noyau;

use app::{AppCalc, Reglages};

#[derive(Debug, Parser)]
#[command(name = "calculatrice", author, version, about, long_about = None)]
struct CLIArgs {
    /// Démarche détaillée (jetons, RPN, arbre, clé) + journal "debug"
    #[clap(short, long, global = true)]
    verbeux: bool,

    #[command(subcommand)]
    commande: Option<Commande>,
}

#[derive(Debug, Subcommand)]
enum Commande {
    /// Évalue une expression
    Eval {
        #[clap(allow_hyphen_values = true)]
        expression: String,
    },
    /// Affiche la clé canonique d'une expression
    Cle {
        #[clap(allow_hyphen_values = true)]
        expression: String,
    },
    /// Génère des exemples d'entraînement
    Generer(OptionsGenerer),
    /// Liste les constantes et fonctions autorisées
    Noms,
}

#[derive(Debug, Args)]
struct OptionsGenerer {
    /// Fichier de réglages TOML (section [generateur])
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Opération : Сложение, Вычитание, Умножение, Деление, Степень, Смешанные (ou alias)
    #[clap(long = "op")]
    operation: Option<String>,

    /// Chiffres par opérande, borné à [1, 12]
    #[clap(long, allow_hyphen_values = true)]
    chiffres: Option<i64>,

    /// Opérandes par exemple, borné à [2, 5]
    #[clap(long, allow_hyphen_values = true)]
    operandes: Option<i64>,

    /// Type de nombres : digits, int, big, decimal
    #[clap(long)]
    nombres: Option<String>,

    /// Difficulté : Лёгкая, Средняя, Сложная (ou alias)
    #[clap(long)]
    difficulte: Option<String>,

    /// Taille du lot, bornée à [1, 500]
    #[clap(short, long, allow_hyphen_values = true)]
    nombre: Option<i64>,

    /// Contrainte sur la réponse : Любой, Целое, Натуральное, Неотрицательное, Дробное
    #[clap(long)]
    reponse: Option<String>,

    /// Ajoute " = réponse" à chaque exemple
    #[clap(long, conflicts_with = "sans_reponses")]
    avec_reponses: bool,

    /// Exemples sans réponse (l'emporte sur le fichier de réglages)
    #[clap(long)]
    sans_reponses: bool,

    /// Graine fixe (lot reproductible)
    #[clap(long)]
    graine: Option<u64>,
}

fn installer_journal(verbeux: bool) {
    let defaut = if verbeux { "debug" } else { "warn" };
    let filtre = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(defaut));
    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = CLIArgs::parse();
    installer_journal(args.verbeux);

    match args.commande {
        Some(Commande::Eval { expression }) => evaluer_une(&expression, args.verbeux),
        Some(Commande::Cle { expression }) => {
            println!("{}", noyau::cle_canonique(&expression));
            Ok(ExitCode::SUCCESS)
        }
        Some(Commande::Generer(opts)) => generer(opts),
        Some(Commande::Noms) => {
            for l in app::vue::lignes_liste_blanche() {
                println!("{l}");
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let stdin = io::stdin();
            traiter_lignes(stdin.lock(), &mut io::stdout().lock(), args.verbeux)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/* ------------------------ Sous-commandes ------------------------ */

fn evaluer_une(expression: &str, verbeux: bool) -> Result<ExitCode> {
    let mut app = AppCalc {
        entree: expression.to_string(),
        ..AppCalc::default()
    };
    let ok = app.eval_via_noyau();
    let lignes = app.lignes_resultat(verbeux);

    if ok {
        let mut out = io::stdout().lock();
        for l in lignes {
            writeln!(out, "{l}")?;
        }
        Ok(ExitCode::SUCCESS)
    } else {
        for l in lignes {
            eprintln!("{l}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn generer(opts: OptionsGenerer) -> Result<ExitCode> {
    let reglages = match &opts.config {
        Some(chemin) => Reglages::charger(chemin)?,
        None => Reglages::default(),
    };

    let mut app = AppCalc::default();
    app.appliquer_reglages(&reglages.generateur);

    // options CLI par-dessus le fichier
    if let Some(op) = &opts.operation {
        app.set_operation(op);
    }
    if let Some(n) = opts.chiffres {
        app.set_chiffres(n);
    }
    if let Some(n) = opts.operandes {
        app.set_operandes(n);
    }
    if let Some(s) = &opts.nombres {
        app.set_nombres(s);
    }
    if let Some(s) = &opts.difficulte {
        app.set_difficulte(s);
    }
    if let Some(n) = opts.nombre {
        app.set_nombre(n);
    }
    if let Some(s) = &opts.reponse {
        app.set_reponse(s);
    }
    if opts.avec_reponses {
        app.set_avec_reponses(true);
    }
    if opts.sans_reponses {
        app.set_avec_reponses(false);
    }
    if opts.graine.is_some() {
        app.set_graine(opts.graine);
    }

    debug!(reglages = ?app.generateur, "génération demandée");
    app.generer_exemples();
    info!(
        trouves = app.exemples.len(),
        demandes = app.generateur.nombre,
        "exemples générés"
    );

    let mut out = io::stdout().lock();
    for l in app.lignes_exemples() {
        writeln!(out, "{l}")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Mode ligne : une expression par ligne ; une faute n'arrête pas la session
/// (ligne non UTF-8 comprise). Seule une erreur d'E/S y met fin.
fn traiter_lignes<R: BufRead, W: Write>(entree: R, sortie: &mut W, verbeux: bool) -> Result<()> {
    let mut app = AppCalc::default();

    for octets in entree.split(b'\n') {
        let octets = octets.context("lecture de l'entrée standard")?;
        match String::from_utf8(octets) {
            Ok(ligne) => {
                app.entree = ligne;
                app.eval_via_noyau();
            }
            Err(_) => app.set_erreur("ligne illisible (UTF-8 invalide)"),
        }
        for l in app.lignes_resultat(verbeux) {
            writeln!(sortie, "{l}")?;
        }
        sortie.flush()?;
        app.clear_entree();
        app.clear_resultats();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyser(args: &[&str]) -> CLIArgs {
        CLIArgs::try_parse_from(args.iter().copied()).unwrap_or_else(|e| panic!("{args:?}: {e}"))
    }

    #[test]
    fn expression_negative_acceptee() {
        match analyser(&["calculatrice", "eval", "-2**2"]).commande {
            Some(Commande::Eval { expression }) => assert_eq!(expression, "-2**2"),
            autre => panic!("{autre:?}"),
        }
        let args = analyser(&["calculatrice", "-v", "cle", "-3+5"]);
        assert!(args.verbeux);
        match args.commande {
            Some(Commande::Cle { expression }) => assert_eq!(expression, "-3+5"),
            autre => panic!("{autre:?}"),
        }
    }

    #[test]
    fn options_de_generation() {
        let args = analyser(&[
            "calculatrice", "generer", "--op", "Деление", "--chiffres", "3", "-n", "5",
            "--sans-reponses", "--graine", "9",
        ]);
        let Some(Commande::Generer(o)) = args.commande else {
            panic!("sous-commande attendue");
        };
        assert_eq!(o.operation.as_deref(), Some("Деление"));
        assert_eq!((o.chiffres, o.nombre, o.graine), (Some(3), Some(5), Some(9)));
        assert!(o.sans_reponses && !o.avec_reponses);

        assert!(CLIArgs::try_parse_from([
            "calculatrice", "generer", "--avec-reponses", "--sans-reponses"
        ])
        .is_err());
    }

    #[test]
    fn mode_ligne_continue_apres_une_faute() {
        let entree: &[u8] = b"2+3*4\n\xff\xfe\n1/0\n\n-2**2\n";
        let mut sortie = Vec::new();
        traiter_lignes(entree, &mut sortie, false).unwrap();

        let texte = String::from_utf8(sortie).unwrap();
        let lignes: Vec<&str> = texte.lines().collect();
        assert_eq!(lignes.len(), 4, "{texte}");
        assert_eq!(lignes[0], "14");
        assert!(lignes[1].contains("UTF-8"));
        assert!(lignes[2].starts_with("Erreur : division par zéro"));
        assert_eq!(lignes[3], "-4");
    }
}
