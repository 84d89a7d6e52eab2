use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use leloto_data::models::{Draw, Pool};
use crate::config::{ChanceScope, EngineConfig};
use crate::frequency::FrequencyTable;
use crate::grids::{GridGenerator, GridLabel};
use crate::window::SlidingWindow;

/// Résultat d'une grille rejouée contre un tirage réel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub label: GridLabel,
    pub matches: usize,
    pub chance_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub label: GridLabel,
    pub draws: usize,
    pub mean_matches: f64,
    pub chance_hit_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BacktestOptions {
    /// Ne rejouer que les tirages de ce jour.
    pub weekday: Option<Weekday>,
    /// Ne rejouer que les `n` derniers tirages de l'historique.
    pub last: Option<usize>,
}

pub struct BacktestEngine {
    config: EngineConfig,
    generator: GridGenerator,
}

impl BacktestEngine {
    pub fn new(config: EngineConfig) -> Self {
        let generator = GridGenerator::new(&config);
        Self { config, generator }
    }

    pub fn evaluate(&self, history: &[Draw], options: BacktestOptions) -> Vec<EvaluationRecord> {
        self.evaluate_with_progress(history, options, |_, _| {})
    }

    /// Rejoue la génération avant chaque tirage retenu et compare les grilles au tirage.
    ///
    /// `history` est trié par date croissante. Les tirages dont la fenêtre contient
    /// moins de `min_history` tirages sont ignorés. `on_step(fait, total)` est appelé
    /// après chaque tirage retenu.
    pub fn evaluate_with_progress<F>(
        &self,
        history: &[Draw],
        options: BacktestOptions,
        mut on_step: F,
    ) -> Vec<EvaluationRecord>
    where
        F: FnMut(usize, usize),
    {
        let first = history.len().saturating_sub(options.last.unwrap_or(history.len()));
        let selected = |draw: &Draw| options.weekday.map_or(true, |w| draw.weekday == w);
        let total = history[first..].iter().filter(|d| selected(*d)).count();

        let mut window = SlidingWindow::new(history, self.config.window_days);
        let global = match self.config.chance_scope {
            ChanceScope::Global => FrequencyTable::from_draws(history, Pool::Chance),
            _ => FrequencyTable::new(),
        };
        // Chances de tous les tirages antérieurs au tirage courant
        let mut prior = FrequencyTable::new();
        let mut records = Vec::with_capacity(total * GridLabel::ALL.len());
        let mut done = 0usize;

        for (i, draw) in history.iter().enumerate() {
            if i >= first && selected(draw) {
                let past = window.window_before(i);
                if past.len() < self.config.min_history {
                    debug!(date = %draw.date, window = past.len(), "historique insuffisant, tirage ignoré");
                } else {
                    let grids = match self.config.chance_scope {
                        ChanceScope::Global => self.generator.generate_with_chances(past, &global),
                        ChanceScope::Prior => self.generator.generate_with_chances(past, &prior),
                        ChanceScope::Window => self.generator.generate(past),
                    };
                    records.extend(grids.iter().map(|grid| EvaluationRecord {
                        date: draw.date,
                        weekday: draw.weekday,
                        label: grid.label,
                        matches: grid.matches(draw),
                        chance_hit: grid.chance == draw.chance,
                    }));
                }
                done += 1;
                on_step(done, total);
            }
            prior.add_draw(draw, Pool::Chance);
        }

        debug!(draws = done, records = records.len(), "backtest terminé");
        records
    }
}

/// Backtest avec la configuration par défaut sur tout l'historique.
pub fn evaluate(history: &[Draw], weekday: Option<Weekday>) -> Vec<EvaluationRecord> {
    BacktestEngine::new(EngineConfig::default()).evaluate(
        history,
        BacktestOptions {
            weekday,
            last: None,
        },
    )
}

/// Moyennes par grille, arrondies à deux décimales, dans l'ordre des grilles.
pub fn summarize(records: &[EvaluationRecord]) -> Vec<GridSummary> {
    GridLabel::ALL
        .iter()
        .filter_map(|&label| {
            let rows: Vec<&EvaluationRecord> = records.iter().filter(|r| r.label == label).collect();
            if rows.is_empty() {
                return None;
            }
            let n = rows.len() as f64;
            let matches: usize = rows.iter().map(|r| r.matches).sum();
            let hits = rows.iter().filter(|r| r.chance_hit).count();
            Some(GridSummary {
                label,
                draws: rows.len(),
                mean_matches: round2(matches as f64 / n),
                chance_hit_rate: round2(hits as f64 / n),
            })
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
