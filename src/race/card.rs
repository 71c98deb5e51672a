use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::form::EntryRecord;
use super::types::{HorseEntry, RaceClass, TrackCondition};

/// Race-level settings shared by every horse added to a card.
///
/// Each field is optional; an entry that leaves a race-level field out takes
/// it from here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RaceSetup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub class: Option<RaceClass>,
    #[serde(default)]
    pub distance_furlongs: Option<f64>,
    #[serde(default)]
    pub track_condition: Option<TrackCondition>,
    #[serde(default)]
    pub field_size: Option<u32>,
}

impl RaceSetup {
    /// Fill every field this setup leaves empty from `fallback`
    pub fn or(self, fallback: &RaceSetup) -> RaceSetup {
        RaceSetup {
            name: self.name.or_else(|| fallback.name.clone()),
            track: self.track.or_else(|| fallback.track.clone()),
            class: self.class.or(fallback.class),
            distance_furlongs: self.distance_furlongs.or(fallback.distance_furlongs),
            track_condition: self.track_condition.or(fallback.track_condition),
            field_size: self.field_size.or(fallback.field_size),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled Race")
    }
}

/// The horses entered for one race, in the order they were added.
///
/// Owned by whoever drives the session (the TUI, the `predict` command);
/// the scoring engine only borrows the entries.
#[derive(Debug, Clone, Default)]
pub struct RaceCard {
    pub setup: RaceSetup,
    entries: Vec<HorseEntry>,
}

impl RaceCard {
    pub fn new(setup: RaceSetup) -> Self {
        Self {
            setup,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HorseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Predictions need at least two runners to mean anything
    pub fn is_ready(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn add(&mut self, entry: HorseEntry) {
        self.entries.push(entry);
    }

    /// Re-insert an entry at its old position (clamped to the end)
    pub fn insert(&mut self, index: usize, entry: HorseEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    pub fn remove(&mut self, index: usize) -> Option<HorseEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Remove every entry, handing them back for undo
    pub fn clear(&mut self) -> Vec<HorseEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn restore(&mut self, entries: Vec<HorseEntry>) {
        self.entries = entries;
    }
}

/// On-disk race card: race setup plus the horses.
///
/// Example YAML:
/// ```yaml
/// race:
///   name: Challenge Stakes
///   distance_furlongs: 8.5
///   track_condition: fast
///   field_size: 8
///   class: allowance
/// horses:
///   - name: Secretariat
///     speed_figure: 92
///     recent_speed_figures: [88, 90, 92]
///     recent_finishes: [2, 1, 1]
///     horse_class: stakes
///     jockey_win_pct: 0.18
///     trainer_win_pct: 0.21
///     jockey_trainer_combo_win_pct: 0.25
///     post_position: 4
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RaceCardFile {
    #[serde(default)]
    pub race: RaceSetup,
    #[serde(default)]
    pub horses: Vec<EntryRecord>,
}

impl RaceCardFile {
    /// Validate every horse, filling race-level gaps from the card's own
    /// setup first and `defaults` second.
    pub fn into_card(self, defaults: &RaceSetup) -> Result<RaceCard> {
        let setup = self.race.or(defaults);
        let mut card = RaceCard::new(setup);

        for (i, record) in self.horses.into_iter().enumerate() {
            let label = record
                .name
                .clone()
                .unwrap_or_else(|| "(unnamed)".to_string());
            let entry = record
                .into_entry(&card.setup)
                .with_context(|| format!("horses[{}] ({})", i, label))?;
            card.add(entry);
        }

        Ok(card)
    }
}

/// Load and validate a race card YAML file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, or any
/// horse fails validation (the message names the horse index and field).
pub fn load_race_card(path: &Path, defaults: &RaceSetup) -> Result<RaceCard> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read race card at {}", path.display()))?;

    let file: RaceCardFile = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse race card: invalid YAML in {}", path.display()))?;

    let card = file
        .into_card(defaults)
        .with_context(|| format!("Invalid race card {}", path.display()))?;

    tracing::debug!(
        entries = card.len(),
        race = card.setup.display_name(),
        "loaded race card"
    );

    Ok(card)
}
