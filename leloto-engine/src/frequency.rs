use std::collections::HashMap;

use serde::Serialize;

use leloto_data::models::{Draw, Pool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

/// Comptage d'occurrences qui mémorise l'ordre de première apparition.
///
/// Les classements sont stables : à effectif égal, le numéro vu en premier passe devant.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<NumberCount>,
    index: HashMap<u8, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_numbers<I: IntoIterator<Item = u8>>(numbers: I) -> Self {
        let mut table = Self::new();
        for n in numbers {
            table.add(n);
        }
        table
    }

    /// Aplatit les numéros du pool, tirage par tirage, dans l'ordre des tirages.
    pub fn from_draws(draws: &[Draw], pool: Pool) -> Self {
        let mut table = Self::new();
        for draw in draws {
            table.add_draw(draw, pool);
        }
        table
    }

    pub fn add(&mut self, number: u8) {
        match self.index.get(&number) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(number, self.entries.len());
                self.entries.push(NumberCount { number, count: 1 });
            }
        }
    }

    pub fn add_draw(&mut self, draw: &Draw, pool: Pool) {
        for &n in pool.numbers_from(draw) {
            self.add(n);
        }
    }

    pub fn count(&self, number: u8) -> u32 {
        self.index
            .get(&number)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// Nombre de numéros distincts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effectifs décroissants, égalités dans l'ordre de première apparition.
    pub fn most_common(&self) -> Vec<NumberCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// Effectifs croissants, égalités dans l'ordre de première apparition.
    pub fn least_common(&self) -> Vec<NumberCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| a.count.cmp(&b.count));
        ranked
    }

    pub fn top(&self, n: usize) -> Vec<u8> {
        self.most_common().iter().take(n).map(|e| e.number).collect()
    }

    pub fn rarest(&self, n: usize) -> Vec<u8> {
        self.least_common().iter().take(n).map(|e| e.number).collect()
    }
}
