use chrono::{NaiveDate, Weekday};
use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::Plot;

use leloto_data::loader::LoadReport;
use leloto_data::models::Draw;
use leloto_engine::backtest::{EvaluationRecord, GridSummary};
use leloto_engine::frequency::FrequencyTable;
use leloto_engine::grids::{Grid, GridLabel};
use leloto_engine::links::{DayLinks, LinkCount, LinkReport};

const SCHEMA_POSITIONS: usize = 5;
const SCHEMA_SPACING: usize = 4;
const SCHEMA_ROWS: usize = 4;

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Jour", "Boules", "Chance"]);

    for draw in draws {
        let mut sorted_balls = draw.balls;
        sorted_balls.sort();

        table.add_row(vec![
            draw.date.to_string(),
            day_name(draw.weekday).to_string(),
            join_numbers(&sorted_balls),
            format!("{:2}", draw.chance),
        ]);
    }

    println!("{table}");
}

pub fn display_load_summary(report: &LoadReport) {
    println!("\nImport :");
    println!("  Lignes lues      : {}", report.total_records);
    println!("  Tirages chargés  : {}", report.loaded);
    if report.duplicates > 0 {
        println!("  Doublons ignorés : {}", report.duplicates);
    }
    if report.errors > 0 {
        println!("  Lignes rejetées  : {}", report.errors);
    }
}

pub fn display_frequencies(balls: &FrequencyTable, chances: &FrequencyTable, window_days: i64, n_draws: usize) {
    println!("\n📊 Fréquences sur {} jours ({} tirages)\n", window_days, n_draws);

    println!("── Boules (1-49) ──");
    display_frequency_table(balls);

    println!("\n── Numéro chance (1-10) ──");
    display_frequency_table(chances);
}

fn display_frequency_table(table_data: &FrequencyTable) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rang", "Numéro", "Sorties"]);

    for (rank, entry) in table_data.most_common().iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            format!("{:2}", entry.number),
            entry.count.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_grids(target: NaiveDate, weekday: Weekday, grids: &[Grid]) {
    println!("\n🔮 Tirage prévu le {} ({})\n", target, day_name(weekday));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Grille", "Numéros", "Chance"]);

    for grid in grids {
        table.add_row(vec![
            grid.label.to_string(),
            join_numbers(&grid.sorted()),
            format!("{:2}", grid.chance),
        ]);
    }
    println!("{table}");
}

/// Une ligne par grille : boules en bleu, numéro chance en rouge.
pub fn display_grid_balls(grids: &[Grid]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for grid in grids {
        let mut row = vec![Cell::new(grid.label.to_string())];
        row.extend(grid.sorted().iter().map(|n| Cell::new(format!("({:2})", n)).fg(Color::Blue)));
        row.push(Cell::new(format!("({:2})", grid.chance)).fg(Color::Red));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_summary(summary: &[GridSummary], last: usize, weekday: Option<Weekday>) {
    let scope = weekday.map(day_name).unwrap_or("tous les jours");
    println!("\n📈 Évaluation sur les {} derniers tirages ({})\n", last, scope);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Grille", "Tirages", "Bons numéros (moy.)", "Chance OK (taux)"]);

    for s in summary {
        table.add_row(vec![
            s.label.to_string(),
            s.draws.to_string(),
            format!("{:.2}", s.mean_matches),
            format!("{:.2}", s.chance_hit_rate),
        ]);
    }
    println!("{table}");
}

pub fn display_match_chart(records: &[EvaluationRecord]) {
    println!("\n== Évolution des bons numéros par grille ==\n");

    let Some(first) = records.iter().map(|r| r.date).min() else {
        println!("  (Pas de données à afficher)");
        return;
    };
    let x_max = records
        .iter()
        .map(|r| (r.date - first).num_days() as f32)
        .fold(1.0f32, f32::max);

    for label in GridLabel::ALL {
        let points: Vec<(f32, f32)> = records
            .iter()
            .filter(|r| r.label == label)
            .map(|r| ((r.date - first).num_days() as f32, r.matches as f32))
            .collect();

        if points.is_empty() {
            continue;
        }

        println!("  {} (jours depuis le {}) :", label, first);
        let shape = textplots::Shape::Lines(&points);
        let mut chart = textplots::Chart::new_with_y_range(120, 40, 0.0, x_max, 0.0, 5.0);
        println!("{}", chart.lineplot(&shape));
    }
}

pub fn display_links(report: &LinkReport) {
    for (weekday, links) in &report.days {
        println!("\n🗓️  Style dominant - {}\n", day_name(*weekday));

        let top = match links {
            DayLinks::NoSignal => {
                println!("Aucune liaison détectée pour ce jour.");
                continue;
            }
            DayLinks::Top(top) => top,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Liaison (Grille A → B)", "Fréquence"]);

        for link in top {
            table.add_row(vec![
                format!("({}, {})", link.pos_a, link.pos_b),
                link.frequency.to_string(),
            ]);
        }
        println!("{table}");
        println!("{}", render_link_schema(top));
    }
}

/// Schéma texte : rangs 1..5 de la grille A en haut, de la grille B en bas,
/// un segment par liaison.
pub fn render_link_schema(links: &[LinkCount]) -> String {
    let width = (SCHEMA_POSITIONS - 1) * SCHEMA_SPACING + 1;
    let column = |pos: usize| (pos.clamp(1, SCHEMA_POSITIONS) - 1) * SCHEMA_SPACING;

    let mut rows = vec![vec![' '; width]; SCHEMA_ROWS];
    for link in links {
        let (xa, xb) = (column(link.pos_a) as f64, column(link.pos_b) as f64);
        let glyph = if xb > xa {
            '\\'
        } else if xb < xa {
            '/'
        } else {
            '|'
        };
        for (r, row) in rows.iter_mut().enumerate() {
            let t = (r as f64 + 0.5) / SCHEMA_ROWS as f64;
            let x = (xa + (xb - xa) * t).round() as usize;
            row[x.min(width - 1)] = glyph;
        }
    }

    let mut markers = vec![' '; width];
    for pos in 1..=SCHEMA_POSITIONS {
        markers[column(pos)] = char::from_digit(pos as u32, 10).unwrap_or('?');
    }

    let mut lines = Vec::with_capacity(SCHEMA_ROWS + 2);
    lines.push(markers.iter().collect::<String>());
    lines.extend(rows.iter().map(|row| row.iter().collect::<String>().trim_end().to_string()));
    lines.push(markers.iter().collect::<String>());
    lines.join("\n")
}
