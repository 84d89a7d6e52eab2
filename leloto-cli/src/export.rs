use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use leloto_engine::backtest::{EvaluationRecord, GridSummary};
use leloto_engine::grids::Grid;

#[derive(Serialize)]
struct BacktestReport<'a> {
    summary: &'a [GridSummary],
    records: &'a [EvaluationRecord],
}

/// Une ligne par grille : `grille;numeros;chance`, numéros triés séparés par `-`.
pub fn write_grids<W: Write>(output: W, grids: &[Grid]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(output);

    writer.write_record(["grille", "numeros", "chance"])?;
    for grid in grids {
        let numbers = grid
            .sorted()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-");
        writer.write_record([grid.label.to_string(), numbers, grid.chance.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_grids_csv(path: &Path, grids: &[Grid]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    write_grids(file, grids)
}

pub fn save_report(path: &Path, summary: &[GridSummary], records: &[EvaluationRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(&BacktestReport { summary, records })?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}
