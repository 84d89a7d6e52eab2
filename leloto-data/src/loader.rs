use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{Draw, DrawHistory, validate_draw};

const DATE_COLUMN: &str = "date_de_tirage";
const BALL_COLUMNS: [&str; 5] = ["boule_1", "boule_2", "boule_3", "boule_4", "boule_5"];
const CHANCE_COLUMN: &str = "numero_chance";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_records: u32,
    pub loaded: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// Position des colonnes utiles dans l'en-tête du fichier.
struct Columns {
    date: usize,
    balls: [usize; 5],
    chance: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .with_context(|| format!("Colonne '{}' absente de l'en-tête", name))
        };
        Ok(Self {
            date: find(DATE_COLUMN)?,
            balls: [
                find(BALL_COLUMNS[0])?,
                find(BALL_COLUMNS[1])?,
                find(BALL_COLUMNS[2])?,
                find(BALL_COLUMNS[3])?,
                find(BALL_COLUMNS[4])?,
            ],
            chance: find(CHANCE_COLUMN)?,
        })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    // Certains exports ajoutent une heure : "2019-11-04T00:00:00"
    let day = raw.split(['T', ' ']).next().unwrap_or(raw);
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(day, format) {
            return Ok(date);
        }
    }
    bail!("Format de date invalide: '{}'", raw)
}

fn parse_record(record: &csv::StringRecord, columns: &Columns) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let date = parse_date(&get(columns.date)?)?;
    let balls: [u8; 5] = [
        get_u8(columns.balls[0])?,
        get_u8(columns.balls[1])?,
        get_u8(columns.balls[2])?,
        get_u8(columns.balls[3])?,
        get_u8(columns.balls[4])?,
    ];
    let chance = get_u8(columns.chance)?;

    validate_draw(&balls, chance)?;
    Ok(Draw::new(date, balls, chance))
}

/// Lit un export CSV (séparateur `;`) et construit l'historique.
/// Les lignes incomplètes ou invalides sont ignorées et comptées.
pub fn load_history_from_reader<R: Read>(input: R) -> Result<(DrawHistory, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers().context("En-tête CSV illisible")?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut draws = Vec::new();

    for record_result in reader.records() {
        report.total_records += 1;
        let line = report.total_records;
        match record_result {
            Ok(record) => match parse_record(&record, &columns) {
                Ok(draw) => {
                    if seen.insert(draw.date) {
                        draws.push(draw);
                        report.loaded += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    warn!(line, "ligne ignorée : {:#}", e);
                    report.errors += 1;
                }
            },
            Err(e) => {
                warn!(line, "erreur de lecture : {}", e);
                report.errors += 1;
            }
        }
    }

    let history = DrawHistory::new(draws);
    info!(
        loaded = report.loaded,
        duplicates = report.duplicates,
        errors = report.errors,
        "historique chargé"
    );
    Ok((history, report))
}

pub fn load_history(path: &Path) -> Result<(DrawHistory, LoadReport)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    load_history_from_reader(file)
        .with_context(|| format!("Échec de l'import de {:?}", path))
}
