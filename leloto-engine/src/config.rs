use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// Borne haute de `window_days` (environ un siècle).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Historique utilisé pour choisir le numéro chance pendant le backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanceScope {
    /// Une seule table sur tout l'historique chargé, réutilisée pour chaque tirage.
    Global,
    /// Tous les tirages antérieurs au tirage évalué.
    #[serde(alias = "history")]
    Prior,
    /// Seulement la fenêtre glissante, comme pour la génération.
    Window,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longueur de la fenêtre glissante, en jours.
    pub window_days: i64,
    /// En dessous de ce nombre de tirages dans la fenêtre, aucune grille n'est produite.
    pub min_history: usize,
    /// Nombre de tirages récents utilisés par la grille 2.
    pub recent_draws: usize,
    pub chance_scope: ChanceScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: 180,
            min_history: 5,
            recent_draws: 3,
            chance_scope: ChanceScope::Global,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            bail!("window_days doit être compris entre 1 et {} (reçu {})", MAX_WINDOW_DAYS, self.window_days);
        }
        if self.recent_draws == 0 {
            bail!("recent_draws doit être au moins 1");
        }
        Ok(())
    }
}

pub fn save_config(config: &EngineConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &std::path::Path) -> anyhow::Result<EngineConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&json)?;
    config.validate().context("Configuration invalide")?;
    Ok(config)
}
