use std::collections::HashMap;

use chrono::Weekday;
use serde::Serialize;

use leloto_data::models::Draw;
use crate::grids::{Grid, GridLabel};

/// Jours de tirage suivis par l'analyse.
pub const TRACKED_DAYS: [Weekday; 3] = [Weekday::Mon, Weekday::Wed, Weekday::Sat];

const TOP_LINKS: usize = 3;

/// Liaison (rang dans la grille A → rang dans la grille B) et son nombre d'occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkCount {
    pub pos_a: usize,
    pub pos_b: usize,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DayLinks {
    /// Aucune liaison observée pour ce jour.
    NoSignal,
    Top(Vec<LinkCount>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub days: Vec<(Weekday, DayLinks)>,
}

impl LinkReport {
    pub fn day(&self, weekday: Weekday) -> Option<&DayLinks> {
        self.days.iter().find(|(d, _)| *d == weekday).map(|(_, links)| links)
    }

    /// Triplets bruts (jour, rang A, rang B, fréquence) pour le tracé des schémas.
    pub fn triples(&self) -> Vec<(Weekday, usize, usize, u32)> {
        self.days
            .iter()
            .flat_map(|(day, links)| match links {
                DayLinks::NoSignal => Vec::new(),
                DayLinks::Top(top) => top.iter().map(|l| (*day, l.pos_a, l.pos_b, l.frequency)).collect(),
            })
            .collect()
    }
}

/// Compteur qui conserve l'ordre de première observation des liaisons.
#[derive(Default)]
struct LinkCounter {
    counts: Vec<((usize, usize), u32)>,
    index: HashMap<(usize, usize), usize>,
}

impl LinkCounter {
    fn add(&mut self, link: (usize, usize)) {
        match self.index.get(&link) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(link, self.counts.len());
                self.counts.push((link, 1));
            }
        }
    }

    fn top(&self, n: usize) -> DayLinks {
        if self.counts.is_empty() {
            return DayLinks::NoSignal;
        }
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        DayLinks::Top(
            ranked
                .into_iter()
                .take(n)
                .map(|((pos_a, pos_b), frequency)| LinkCount { pos_a, pos_b, frequency })
                .collect(),
        )
    }
}

/// Pour chaque tirage d'un jour suivi, et pour chaque paire de grilles de règle
/// (grille 1/2, 1/3, 2/3), les numéros présents dans les deux grilles et dans le
/// tirage donnent une liaison (rang dans A, rang dans B). Les rangs suivent l'ordre
/// d'émission des grilles. Retourne les trois liaisons les plus fréquentes par jour.
pub fn analyze_links(draws: &[Draw], grids: &[Grid]) -> LinkReport {
    let rules: Vec<&Grid> = GridLabel::RULES
        .iter()
        .filter_map(|&label| grids.iter().find(|g| g.label == label))
        .collect();

    let mut counters: Vec<(Weekday, LinkCounter)> =
        TRACKED_DAYS.iter().map(|&d| (d, LinkCounter::default())).collect();

    for draw in draws {
        let Some((_, counter)) = counters.iter_mut().find(|(d, _)| *d == draw.weekday) else {
            continue;
        };
        for (i, a) in rules.iter().enumerate() {
            for b in &rules[i + 1..] {
                for (pos_a, &n) in a.numbers.iter().enumerate() {
                    if !draw.balls.contains(&n) {
                        continue;
                    }
                    if let Some(pos_b) = b.position(n) {
                        counter.add((pos_a + 1, pos_b));
                    }
                }
            }
        }
    }

    LinkReport {
        days: counters
            .into_iter()
            .map(|(day, counter)| (day, counter.top(TOP_LINKS)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-01-01 lundi, 2024-01-03 mercredi, 2024-01-06 samedi, 2024-01-02 mardi
    fn draw_on(day: u32, balls: [u8; 5]) -> Draw {
        Draw::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), balls, 1)
    }

    fn sample_grids() -> Vec<Grid> {
        vec![
            Grid::new(GridLabel::Rule1, [7, 23, 40, 1, 11], 1),
            Grid::new(GridLabel::Rule2, [3, 19, 40, 8, 9], 3),
            Grid::new(GridLabel::Rule3, [5, 6, 12, 13, 14], 5),
            Grid::new(GridLabel::Fusion, [7, 23, 40, 3, 19], 7),
        ]
    }

    #[test]
    fn test_wednesday_link() {
        let report = analyze_links(&[draw_on(3, [3, 7, 19, 23, 40])], &sample_grids());
        assert_eq!(
            report.day(Weekday::Wed),
            Some(&DayLinks::Top(vec![LinkCount { pos_a: 3, pos_b: 3, frequency: 1 }]))
        );
        assert_eq!(report.day(Weekday::Mon), Some(&DayLinks::NoSignal));
        assert_eq!(report.day(Weekday::Sat), Some(&DayLinks::NoSignal));
    }

    #[test]
    fn test_fusion_ignored() {
        // 7 et 23 sont communs à la grille 1 et à la fusion seulement
        let report = analyze_links(&[draw_on(1, [7, 23, 30, 31, 32])], &sample_grids());
        assert_eq!(report.day(Weekday::Mon), Some(&DayLinks::NoSignal));
    }

    #[test]
    fn test_untracked_day_ignored() {
        let report = analyze_links(&[draw_on(2, [3, 7, 19, 23, 40])], &sample_grids());
        assert!(report.triples().is_empty());
        assert_eq!(report.days.len(), 3);
    }

    #[test]
    fn test_top_three_with_first_seen_ties() {
        let grids = vec![
            Grid::new(GridLabel::Rule1, [1, 2, 3, 4, 5], 1),
            Grid::new(GridLabel::Rule2, [5, 4, 3, 2, 1], 1),
            Grid::new(GridLabel::Rule3, [10, 11, 12, 13, 14], 1),
        ];
        let draws = vec![
            draw_on(6, [1, 2, 3, 4, 5]),
            draw_on(13, [4, 5, 20, 21, 22]),
        ];
        let report = analyze_links(&draws, &grids);
        // (4,2) et (5,1) vus deux fois ; puis (1,5) vu en premier parmi les autres
        assert_eq!(
            report.day(Weekday::Sat),
            Some(&DayLinks::Top(vec![
                LinkCount { pos_a: 4, pos_b: 2, frequency: 2 },
                LinkCount { pos_a: 5, pos_b: 1, frequency: 2 },
                LinkCount { pos_a: 1, pos_b: 5, frequency: 1 },
            ]))
        );
    }

    #[test]
    fn test_accumulates_over_pairs() {
        let grids = vec![
            Grid::new(GridLabel::Rule1, [9, 1, 2, 3, 4], 1),
            Grid::new(GridLabel::Rule2, [9, 5, 6, 7, 8], 1),
            Grid::new(GridLabel::Rule3, [9, 10, 11, 12, 13], 1),
        ];
        let report = analyze_links(&[draw_on(1, [9, 20, 21, 22, 23])], &grids);
        assert_eq!(
            report.day(Weekday::Mon),
            Some(&DayLinks::Top(vec![LinkCount { pos_a: 1, pos_b: 1, frequency: 3 }]))
        );
        assert_eq!(report.triples(), vec![(Weekday::Mon, 1, 1, 3)]);
    }

    #[test]
    fn test_no_grids_no_signal() {
        let report = analyze_links(&[draw_on(1, [1, 2, 3, 4, 5])], &[]);
        assert!(report.days.iter().all(|(_, l)| *l == DayLinks::NoSignal));
    }
}
