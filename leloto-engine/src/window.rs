use chrono::{Duration, NaiveDate};

use leloto_data::models::Draw;

/// Tirages strictement antérieurs à `reference` et datés d'au plus `window_days` jours avant.
/// `draws` doit être trié par date croissante ; le résultat est une sous-tranche contiguë.
pub fn select(draws: &[Draw], reference: NaiveDate, window_days: i64) -> &[Draw] {
    let start = window_start(reference, window_days);
    let lo = draws.partition_point(|d| d.date < start);
    let hi = draws.partition_point(|d| d.date < reference);
    if lo >= hi {
        return &[];
    }
    &draws[lo..hi]
}

/// Premier jour de la fenêtre ; une durée hors du calendrier remonte au début des temps.
fn window_start(reference: NaiveDate, window_days: i64) -> NaiveDate {
    Duration::try_days(window_days)
        .and_then(|span| reference.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Les `n` derniers tirages de la tranche.
pub fn tail(draws: &[Draw], n: usize) -> &[Draw] {
    &draws[draws.len().saturating_sub(n)..]
}

/// Fenêtre glissante pour parcourir l'historique dans l'ordre chronologique.
///
/// Les deux bornes ne font qu'avancer : `window_before(i)` appelé avec des `i`
/// croissants donne le même résultat que `select(draws, draws[i].date, window_days)`
/// sans reparcourir l'historique.
pub struct SlidingWindow<'a> {
    draws: &'a [Draw],
    window_days: i64,
    lo: usize,
}

impl<'a> SlidingWindow<'a> {
    pub fn new(draws: &'a [Draw], window_days: i64) -> Self {
        Self {
            draws,
            window_days,
            lo: 0,
        }
    }

    /// Fenêtre précédant le tirage d'indice `idx`. Les indices doivent être croissants.
    pub fn window_before(&mut self, idx: usize) -> &'a [Draw] {
        let reference = self.draws[idx].date;
        let start = window_start(reference, self.window_days);
        while self.lo < idx && self.draws[self.lo].date < start {
            self.lo += 1;
        }
        let lo = self.lo.min(idx);
        &self.draws[lo..idx]
    }
}
