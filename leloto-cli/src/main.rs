mod display;
mod export;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use leloto_data::loader::{LoadReport, load_history};
use leloto_data::models::{DrawHistory, Pool};
use leloto_engine::backtest::{BacktestEngine, BacktestOptions, summarize};
use leloto_engine::calendar::next_draw_date;
use leloto_engine::config::{EngineConfig, MAX_WINDOW_DAYS, load_config, save_config};
use leloto_engine::frequency::FrequencyTable;
use leloto_engine::grids::{Grid, GridGenerator};
use leloto_engine::links::analyze_links;
use leloto_engine::window::select;
use crate::display::{
    display_draws, display_frequencies, display_grid_balls, display_grids, display_links,
    display_load_summary, display_match_chart, display_summary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DrawDay {
    Monday,
    Wednesday,
    Saturday,
}

impl DrawDay {
    pub fn weekday(self) -> Weekday {
        match self {
            DrawDay::Monday => Weekday::Mon,
            DrawDay::Wednesday => Weekday::Wed,
            DrawDay::Saturday => Weekday::Sat,
        }
    }
}

#[derive(Parser)]
#[command(name = "leloto", about = "Générateur de grilles Loto France")]
struct Cli {
    /// Export CSV des résultats (séparateur `;`)
    #[arg(short, long, global = true, default_value = "assets/loto.csv")]
    file: PathBuf,

    /// Fichier de configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Fréquences des numéros sur la fenêtre glissante
    Stats {
        /// Fenêtre d'analyse en jours (défaut : configuration)
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS))]
        window: Option<i64>,
    },

    /// Générer les grilles du prochain tirage
    Generate {
        /// Jour du tirage visé
        #[arg(short, long, default_value = "monday")]
        day: DrawDay,

        /// Date de départ (AAAA-MM-JJ, défaut : aujourd'hui)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Exporter les grilles en CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rejouer les règles sur les derniers tirages
    Evaluate {
        /// Ne garder que les tirages de ce jour
        #[arg(short, long)]
        day: Option<DrawDay>,

        /// Nombre de tirages évalués
        #[arg(short, long, default_value = "180")]
        last: usize,

        /// Afficher l'évolution des bons numéros
        #[arg(long)]
        chart: bool,

        /// Sauvegarder le rapport en JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Styles dominants de liaison par jour de tirage
    Links {
        /// Jour du tirage pour lequel les grilles sont générées
        #[arg(short, long, default_value = "monday")]
        day: DrawDay,

        /// Date de départ (AAAA-MM-JJ, défaut : aujourd'hui)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Nombre de tirages analysés
        #[arg(short, long, default_value = "180")]
        last: usize,
    },

    /// Afficher la configuration effective
    Config {
        /// Écrire la configuration dans ce fichier
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Impossible de charger la configuration {:?}", path))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Config { save } => cmd_config(&config, save.as_deref()),
        Command::List { last } => cmd_list(&cli.file, last),
        Command::Stats { window } => {
            let history = load(&cli.file)?.0;
            cmd_stats(&history, window.unwrap_or(config.window_days))
        }
        Command::Generate { day, date, output } => {
            let history = load(&cli.file)?.0;
            cmd_generate(&history, &config, day, date, output.as_deref())
        }
        Command::Evaluate {
            day,
            last,
            chart,
            json,
        } => {
            let history = load(&cli.file)?.0;
            cmd_evaluate(&history, &config, day, last, chart, json.as_deref())
        }
        Command::Links { day, date, last } => {
            let history = load(&cli.file)?.0;
            cmd_links(&history, &config, day, date, last)
        }
    }
}

fn load(file: &Path) -> Result<(DrawHistory, LoadReport)> {
    let (history, report) = load_history(file)?;
    if history.is_empty() {
        bail!("Aucun tirage exploitable dans {:?}", file);
    }
    Ok((history, report))
}

fn cmd_config(config: &EngineConfig, save: Option<&Path>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if let Some(path) = save {
        save_config(config, path)?;
        println!("\nConfiguration sauvegardée dans : {}", path.display());
    }
    Ok(())
}

fn cmd_list(file: &Path, last: usize) -> Result<()> {
    let (history, report) = load(file)?;
    let mut draws = history.tail(last).to_vec();
    draws.reverse();
    display_draws(&draws);
    display_load_summary(&report);
    Ok(())
}

fn cmd_stats(history: &DrawHistory, window_days: i64) -> Result<()> {
    let Some(latest) = history.last() else {
        bail!("Historique vide");
    };
    // Fenêtre se terminant sur le dernier tirage connu, inclus
    let window = select(history.draws(), latest.date + Duration::days(1), window_days);
    let balls = FrequencyTable::from_draws(window, Pool::Balls);
    let chances = FrequencyTable::from_draws(window, Pool::Chance);
    display_frequencies(&balls, &chances, window_days, window.len());
    Ok(())
}

fn grids_for(
    history: &DrawHistory,
    config: &EngineConfig,
    day: DrawDay,
    date: Option<NaiveDate>,
) -> (NaiveDate, Vec<Grid>) {
    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let target = next_draw_date(today, day.weekday());
    let window = select(history.draws(), target, config.window_days);
    info!(%target, window = window.len(), "génération des grilles");
    (target, GridGenerator::new(config).generate(window))
}

fn cmd_generate(
    history: &DrawHistory,
    config: &EngineConfig,
    day: DrawDay,
    date: Option<NaiveDate>,
    output: Option<&Path>,
) -> Result<()> {
    let (target, grids) = grids_for(history, config, day, date);
    if grids.is_empty() {
        println!(
            "Historique insuffisant : moins de {} tirages dans les {} jours précédant le {}.",
            config.min_history, config.window_days, target
        );
        return Ok(());
    }

    display_grids(target, day.weekday(), &grids);
    display_grid_balls(&grids);

    if let Some(path) = output {
        export::write_grids_csv(path, &grids)?;
        println!("\nGrilles exportées dans : {}", path.display());
    }
    Ok(())
}

fn cmd_evaluate(
    history: &DrawHistory,
    config: &EngineConfig,
    day: Option<DrawDay>,
    last: usize,
    chart: bool,
    json: Option<&Path>,
) -> Result<()> {
    let engine = BacktestEngine::new(config.clone());
    let options = BacktestOptions {
        weekday: day.map(DrawDay::weekday),
        last: Some(last),
    };

    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("=> "));
    pb.set_message("tirages");

    let records = engine.evaluate_with_progress(history.draws(), options, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    if records.is_empty() {
        println!("Aucun tirage évaluable (historique insuffisant ou filtre trop strict).");
        return Ok(());
    }

    let summary = summarize(&records);
    display_summary(&summary, last, options.weekday);

    if chart {
        display_match_chart(&records);
    }

    if let Some(path) = json {
        export::save_report(path, &summary, &records)?;
        println!("\nRapport sauvegardé dans : {}", path.display());
    }
    Ok(())
}

fn cmd_links(
    history: &DrawHistory,
    config: &EngineConfig,
    day: DrawDay,
    date: Option<NaiveDate>,
    last: usize,
) -> Result<()> {
    let (target, grids) = grids_for(history, config, day, date);
    if grids.is_empty() {
        println!("Historique insuffisant pour générer les grilles du {}.", target);
        return Ok(());
    }
    let report = analyze_links(history.tail(last), &grids);
    display_links(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_day_weekday() {
        assert_eq!(DrawDay::Monday.weekday(), Weekday::Mon);
        assert_eq!(DrawDay::Wednesday.weekday(), Weekday::Wed);
        assert_eq!(DrawDay::Saturday.weekday(), Weekday::Sat);
    }

    #[test]
    fn test_cli_parses_evaluate() {
        let cli = Cli::try_parse_from(["leloto", "evaluate", "--day", "wednesday", "--last", "50", "--chart"]).unwrap();
        match cli.command {
            Command::Evaluate { day, last, chart, json } => {
                assert_eq!(day, Some(DrawDay::Wednesday));
                assert_eq!(last, 50);
                assert!(chart);
                assert!(json.is_none());
            }
            _ => panic!("sous-commande inattendue"),
        }
        assert_eq!(cli.file, PathBuf::from("assets/loto.csv"));
    }

    #[test]
    fn test_cli_parses_generate_date() {
        let cli = Cli::try_parse_from(["leloto", "generate", "-d", "saturday", "--date", "2024-01-03", "-f", "data.csv"]).unwrap();
        match cli.command {
            Command::Generate { day, date, output } => {
                assert_eq!(day, DrawDay::Saturday);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 3));
                assert!(output.is_none());
            }
            _ => panic!("sous-commande inattendue"),
        }
        assert_eq!(cli.file, PathBuf::from("data.csv"));
    }

    #[test]
    fn test_cli_rejects_window_out_of_range() {
        for window in ["0", "-5", "1000000000"] {
            assert!(Cli::try_parse_from(["leloto", "stats", "--window", window]).is_err(), "{}", window);
        }
        let cli = Cli::try_parse_from(["leloto", "stats", "--window", "365"]).unwrap();
        match cli.command {
            Command::Stats { window } => assert_eq!(window, Some(365)),
            _ => panic!("sous-commande inattendue"),
        }
    }
}
