use serde::Serialize;

use leloto_data::models::{Draw, Pool};
use crate::config::EngineConfig;
use crate::frequency::FrequencyTable;
use crate::window::tail;

pub const GRID_SIZE: usize = 5;
pub const DEFAULT_CHANCE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GridLabel {
    Rule1,
    Rule2,
    Rule3,
    Fusion,
}

impl GridLabel {
    pub const ALL: [GridLabel; 4] = [GridLabel::Rule1, GridLabel::Rule2, GridLabel::Rule3, GridLabel::Fusion];
    /// Grilles issues directement d'une règle (hors fusion).
    pub const RULES: [GridLabel; 3] = [GridLabel::Rule1, GridLabel::Rule2, GridLabel::Rule3];
}

impl std::fmt::Display for GridLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridLabel::Rule1 => write!(f, "Grille 1"),
            GridLabel::Rule2 => write!(f, "Grille 2"),
            GridLabel::Rule3 => write!(f, "Grille 3"),
            GridLabel::Fusion => write!(f, "Fusion"),
        }
    }
}

/// Grille proposée. `numbers` garde l'ordre d'émission de la règle ;
/// `sorted()` donne l'ordre d'affichage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub label: GridLabel,
    pub numbers: [u8; GRID_SIZE],
    pub chance: u8,
}

impl Grid {
    pub fn new(label: GridLabel, numbers: [u8; GRID_SIZE], chance: u8) -> Self {
        Self { label, numbers, chance }
    }

    pub fn sorted(&self) -> [u8; GRID_SIZE] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }

    /// Rang (à partir de 1) du numéro dans l'ordre d'émission.
    pub fn position(&self, number: u8) -> Option<usize> {
        self.numbers.iter().position(|&n| n == number).map(|i| i + 1)
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    /// Nombre de boules de la grille présentes dans le tirage.
    pub fn matches(&self, draw: &Draw) -> usize {
        self.numbers.iter().filter(|n| draw.balls.contains(n)).count()
    }
}

#[derive(Debug, Clone)]
pub struct GridGenerator {
    min_history: usize,
    recent_draws: usize,
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl GridGenerator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_history: config.min_history,
            recent_draws: config.recent_draws,
        }
    }

    /// Les quatre grilles pour la fenêtre, le numéro chance étant choisi
    /// d'après les chances de cette même fenêtre. Vide si l'historique est insuffisant.
    pub fn generate(&self, window: &[Draw]) -> Vec<Grid> {
        let chances = FrequencyTable::from_draws(window, Pool::Chance);
        self.generate_with_chances(window, &chances)
    }

    /// Comme `generate`, avec une table de chances fournie par l'appelant.
    pub fn generate_with_chances(&self, window: &[Draw], chances: &FrequencyTable) -> Vec<Grid> {
        if window.len() < self.min_history.max(1) {
            return Vec::new();
        }

        let table = FrequencyTable::from_draws(window, Pool::Balls);
        let g1 = most_frequent(&table);
        let g2 = recency_biased(window, &table, &g1, self.recent_draws);
        let g3 = balanced(&table);
        let fusion = fusion(&g1, &g2, &g3);

        [
            (GridLabel::Rule1, g1),
            (GridLabel::Rule2, g2),
            (GridLabel::Rule3, g3),
            (GridLabel::Fusion, fusion),
        ]
        .into_iter()
        .map(|(label, numbers)| {
            let numbers = to_grid(&numbers);
            Grid::new(label, numbers, best_chance(&numbers, chances))
        })
        .collect()
    }
}

/// Raccourci avec la configuration par défaut.
pub fn generate(window: &[Draw]) -> Vec<Grid> {
    GridGenerator::default().generate(window)
}

/// Parmi les numéros de la grille compris entre 1 et 10, celui qui est sorti le plus
/// souvent comme numéro chance ; à égalité le plus petit ; 1 si aucun candidat.
pub fn best_chance(numbers: &[u8], chances: &FrequencyTable) -> u8 {
    numbers
        .iter()
        .copied()
        .filter(|&n| Pool::Chance.contains(n))
        .max_by(|&a, &b| chances.count(a).cmp(&chances.count(b)).then(b.cmp(&a)))
        .unwrap_or(DEFAULT_CHANCE)
}

fn most_frequent(table: &FrequencyTable) -> Vec<u8> {
    let mut picked = table.top(GRID_SIZE);
    complete(&mut picked, table, &[]);
    picked
}

fn recency_biased(window: &[Draw], table: &FrequencyTable, g1: &[u8], recent_draws: usize) -> Vec<u8> {
    let recent = FrequencyTable::from_draws(tail(window, recent_draws), Pool::Balls);
    let mut picked: Vec<u8> = recent
        .most_common()
        .iter()
        .map(|e| e.number)
        .filter(|n| !g1.contains(n))
        .take(GRID_SIZE)
        .collect();
    // Complément dans l'ordre global décroissant, hors grille 1
    complete(&mut picked, table, g1);
    picked
}

fn balanced(table: &FrequencyTable) -> Vec<u8> {
    let mut picked = table.top(3);
    let rare: Vec<u8> = table.least_common().iter().map(|e| e.number).collect();
    fill(&mut picked, rare, &[], GRID_SIZE);
    complete(&mut picked, table, &[]);
    picked
}

fn fusion(g1: &[u8], g2: &[u8], g3: &[u8]) -> Vec<u8> {
    let merged = FrequencyTable::from_numbers(g1.iter().chain(g2).chain(g3).copied());
    let mut picked = merged.top(GRID_SIZE);
    complete(&mut picked, &merged, &[]);
    picked
}

/// Ajoute les candidats absents de `picked` et de `excluded` jusqu'à `limit` numéros.
fn fill<I: IntoIterator<Item = u8>>(picked: &mut Vec<u8>, candidates: I, excluded: &[u8], limit: usize) {
    for n in candidates {
        if picked.len() >= limit {
            break;
        }
        if !excluded.contains(&n) && !picked.contains(&n) {
            picked.push(n);
        }
    }
}

/// Complète à 5 numéros : d'abord le classement global, puis les plus petits numéros libres.
fn complete(picked: &mut Vec<u8>, table: &FrequencyTable, excluded: &[u8]) {
    let ranked: Vec<u8> = table.most_common().iter().map(|e| e.number).collect();
    fill(picked, ranked, excluded, GRID_SIZE);
    fill(picked, 1..=Pool::Balls.size() as u8, excluded, GRID_SIZE);
}

fn to_grid(numbers: &[u8]) -> [u8; GRID_SIZE] {
    let mut grid = [0u8; GRID_SIZE];
    for (i, &n) in numbers.iter().take(GRID_SIZE).enumerate() {
        grid[i] = n;
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use leloto_data::models::make_test_draws;

    fn window_from(rows: &[([u8; 5], u8)]) -> Vec<Draw> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, (balls, chance))| Draw::new(start + Duration::days(2 * i as i64), *balls, *chance))
            .collect()
    }

    /// Fréquences : 7→4, 23→3, 40→3, 1→2, 11→2, le reste une fois.
    fn reference_window() -> Vec<Draw> {
        window_from(&[
            ([7, 23, 40, 1, 11], 1),
            ([7, 23, 40, 1, 11], 2),
            ([7, 23, 40, 2, 12], 2),
            ([7, 3, 13, 14, 15], 3),
            ([16, 17, 18, 19, 20], 1),
            ([21, 22, 24, 25, 26], 5),
        ])
    }

    fn grid(grids: &[Grid], label: GridLabel) -> &Grid {
        grids.iter().find(|g| g.label == label).unwrap()
    }

    #[test]
    fn test_insufficient_history() {
        let draws = make_test_draws(4);
        assert!(generate(&draws).is_empty());
        assert!(generate(&[]).is_empty());
    }

    #[test]
    fn test_rule1_most_frequent() {
        let grids = generate(&reference_window());
        assert_eq!(grid(&grids, GridLabel::Rule1).numbers, [7, 23, 40, 1, 11]);
    }

    #[test]
    fn test_rule2_recent_excluding_rule1() {
        let grids = generate(&reference_window());
        // 3 derniers tirages, 7 exclu car déjà en grille 1
        assert_eq!(grid(&grids, GridLabel::Rule2).numbers, [3, 13, 14, 15, 16]);
    }

    #[test]
    fn test_rule2_padded_from_global_ranking() {
        let window = window_from(&[
            ([30, 31, 32, 36, 37], 1),
            ([30, 31, 32, 33, 34], 1),
            ([30, 31, 32, 33, 35], 1),
            ([30, 31, 32, 33, 34], 1),
            ([30, 31, 32, 33, 34], 1),
        ]);
        let grids = generate(&window);
        let g1 = grid(&grids, GridLabel::Rule1);
        assert_eq!(g1.numbers, [30, 31, 32, 33, 34]);
        // Récents hors grille 1 : 35 seulement, puis 36, 37 (classement global),
        // puis les plus petits numéros libres.
        assert_eq!(grid(&grids, GridLabel::Rule2).numbers, [35, 36, 37, 1, 2]);
    }

    #[test]
    fn test_rule3_balanced() {
        let grids = generate(&reference_window());
        assert_eq!(grid(&grids, GridLabel::Rule3).numbers, [7, 23, 40, 2, 12]);
    }

    #[test]
    fn test_rule3_overlap_completed() {
        // Cinq numéros distincts seulement : les rares recoupent les fréquents
        let window = window_from(&[([1, 2, 3, 4, 5], 1); 5]);
        let grids = generate(&window);
        let g3 = grid(&grids, GridLabel::Rule3);
        assert_eq!(g3.numbers, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fusion_from_rules() {
        let grids = generate(&reference_window());
        assert_eq!(grid(&grids, GridLabel::Fusion).numbers, [7, 23, 40, 1, 11]);
    }

    #[test]
    fn test_fusion_subset_of_rules() {
        let draws = make_test_draws(60);
        for end in 5..draws.len() {
            let grids = generate(&draws[..end]);
            let fusion = grid(&grids, GridLabel::Fusion);
            for n in fusion.numbers {
                assert!(
                    GridLabel::RULES.iter().any(|&l| grid(&grids, l).contains(n)),
                    "{} absent des règles",
                    n
                );
            }
        }
    }

    #[test]
    fn test_grids_well_formed() {
        let draws = make_test_draws(80);
        for end in 5..draws.len() {
            let grids = generate(&draws[..end]);
            assert_eq!(grids.len(), 4);
            for g in &grids {
                let sorted = g.sorted();
                assert!(sorted.windows(2).all(|w| w[0] < w[1]), "{:?}", g);
                assert!(g.numbers.iter().all(|&n| (1..=49).contains(&n)));
                assert!((1..=10).contains(&g.chance));
            }
        }
    }

    #[test]
    fn test_rule1_is_window_top5() {
        let draws = make_test_draws(80);
        for end in 5..draws.len() {
            let window = &draws[end.saturating_sub(20)..end];
            let table = FrequencyTable::from_draws(window, Pool::Balls);
            let grids = generate(window);
            assert_eq!(grid(&grids, GridLabel::Rule1).numbers.to_vec(), table.top(GRID_SIZE), "end={}", end);
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let draws = make_test_draws(40);
        assert_eq!(generate(&draws), generate(&draws));
    }

    #[test]
    fn test_chance_picks() {
        let grids = generate(&reference_window());
        assert_eq!(grid(&grids, GridLabel::Rule1).chance, 1);
        assert_eq!(grid(&grids, GridLabel::Rule2).chance, 3);
        // 2 sorti deux fois comme chance, 7 jamais
        assert_eq!(grid(&grids, GridLabel::Rule3).chance, 2);
    }

    #[test]
    fn test_best_chance_single_candidate() {
        let chances = FrequencyTable::from_numbers([5, 5, 5]);
        assert_eq!(best_chance(&[17, 23, 40, 1, 11], &chances), 1);
        let sevens = FrequencyTable::from_numbers([7, 7]);
        assert_eq!(best_chance(&[7, 23, 40, 1, 11], &sevens), 7);
        // 7 et 1 jamais sortis : le plus petit l'emporte
        assert_eq!(best_chance(&[7, 23, 40, 1, 11], &chances), 1);
    }

    #[test]
    fn test_best_chance_tie_smallest() {
        let chances = FrequencyTable::from_numbers([8, 2, 2, 8]);
        assert_eq!(best_chance(&[8, 2, 30, 31, 32], &chances), 2);
        let empty = FrequencyTable::new();
        assert_eq!(best_chance(&[9, 4, 30, 31, 32], &empty), 4);
    }

    #[test]
    fn test_best_chance_default() {
        let chances = FrequencyTable::from_numbers([3]);
        assert_eq!(best_chance(&[11, 23, 40, 41, 42], &chances), DEFAULT_CHANCE);
    }

    #[test]
    fn test_min_history_from_config() {
        let config = EngineConfig {
            min_history: 10,
            ..EngineConfig::default()
        };
        let generator = GridGenerator::new(&config);
        let draws = make_test_draws(9);
        assert!(generator.generate(&draws).is_empty());
        assert_eq!(generator.generate(&make_test_draws(10)).len(), 4);
    }

    #[test]
    fn test_position_and_sorted() {
        let g = Grid::new(GridLabel::Rule2, [40, 3, 19, 8, 9], 3);
        assert_eq!(g.position(40), Some(1));
        assert_eq!(g.position(9), Some(5));
        assert_eq!(g.position(1), None);
        assert_eq!(g.sorted(), [3, 8, 9, 19, 40]);
    }
}
