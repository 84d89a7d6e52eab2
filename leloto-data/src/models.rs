use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub balls: [u8; 5],
    pub chance: u8,
}

impl Draw {
    /// Le jour de la semaine est déduit de la date.
    pub fn new(date: NaiveDate, balls: [u8; 5], chance: u8) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            balls,
            chance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Balls,
    Chance,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Balls => 49,
            Pool::Chance => 10,
        }
    }

    pub fn contains(&self, n: u8) -> bool {
        n >= 1 && n as usize <= self.size()
    }

    pub fn numbers_from<'a>(&self, draw: &'a Draw) -> &'a [u8] {
        match self {
            Pool::Balls => &draw.balls,
            Pool::Chance => std::slice::from_ref(&draw.chance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Boule {0} hors limites (1-49)")]
    BallOutOfRange(u8),
    #[error("Numéro chance {0} hors limites (1-10)")]
    ChanceOutOfRange(u8),
    #[error("Boule en double : {0}")]
    DuplicateBall(u8),
}

pub fn validate_draw(balls: &[u8; 5], chance: u8) -> Result<(), DrawError> {
    for &b in balls {
        if !Pool::Balls.contains(b) {
            return Err(DrawError::BallOutOfRange(b));
        }
    }
    if !Pool::Chance.contains(chance) {
        return Err(DrawError::ChanceOutOfRange(chance));
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                return Err(DrawError::DuplicateBall(balls[i]));
            }
        }
    }
    Ok(())
}

/// Historique des tirages, trié par date croissante, une entrée par date.
///
/// Contrairement à une requête `ORDER BY date DESC`, `draws()[0]` est le tirage
/// le plus ancien et le dernier élément le plus récent.
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    draws: Vec<Draw>,
}

impl DrawHistory {
    /// Trie par date et ne garde que la première occurrence de chaque date.
    pub fn new(mut draws: Vec<Draw>) -> Self {
        draws.sort_by_key(|d| d.date);
        draws.dedup_by_key(|d| d.date);
        Self { draws }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn last(&self) -> Option<&Draw> {
        self.draws.last()
    }

    /// Les `n` derniers tirages, en ordre chronologique.
    pub fn tail(&self, n: usize) -> &[Draw] {
        &self.draws[self.draws.len().saturating_sub(n)..]
    }
}

/// Tirages synthétiques espacés de deux ou trois jours, à partir du lundi 2024-01-01.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut date = start;
    (0..n)
        .map(|i| {
            let base = (i % 9) as u8;
            let draw = Draw::new(
                date,
                [
                    base * 5 + 1,
                    base * 5 + 2,
                    base * 5 + 3,
                    base * 5 + 4,
                    base * 5 + 5,
                ],
                (i % 10) as u8 + 1,
            );
            // lundi -> mercredi -> samedi -> lundi
            let step = match date.weekday() {
                Weekday::Mon => 2,
                Weekday::Wed => 3,
                _ => 2,
            };
            date += chrono::Duration::days(step);
            draw
        })
        .collect()
}
