use crate::output::export_csv;
use crate::race::{EntryForm, FormField, HorseEntry, RaceCard, RaceClass, TrackCondition};
use crate::scoring::{predict_race, PredictionResult, ScoringWeights};
use crate::tui::theme::ThemeColors;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

const MAX_UNDO: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    AddEntry,
    Help,
    Breakdown,
}

#[derive(Debug, Clone)]
pub enum UndoAction {
    Added {
        index: usize,
    },
    Removed {
        index: usize,
        entry: HorseEntry,
    },
    Cleared(Vec<HorseEntry>),
}

pub struct App {
    pub card: RaceCard,
    pub weights: ScoringWeights,
    /// Ranked view of `card`, recomputed on every change
    pub predictions: Vec<PredictionResult>,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub form: EntryForm,
    pub focused_field: usize,
    pub form_error: Option<String>,
    pub flash_message: Option<(String, Instant)>,
    pub undo_stack: VecDeque<UndoAction>,
    pub export_dir: PathBuf,
    pub colors: ThemeColors,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        card: RaceCard,
        weights: ScoringWeights,
        export_dir: PathBuf,
        colors: ThemeColors,
    ) -> Self {
        let form = EntryForm::with_defaults(&card.setup);
        let mut app = Self {
            card,
            weights,
            predictions: Vec::new(),
            table_state: ratatui::widgets::TableState::default(),
            input_mode: InputMode::Normal,
            form,
            focused_field: 0,
            form_error: None,
            flash_message: None,
            undo_stack: VecDeque::new(),
            export_dir,
            colors,
            should_quit: false,
        };
        app.recompute();
        app
    }

    /// Re-rank after the card changed and keep the selection in range
    fn recompute(&mut self) {
        self.predictions = predict_race(self.card.entries(), &self.weights);

        if self.predictions.is_empty() {
            self.table_state.select(None);
        } else if let Some(selected) = self.table_state.selected() {
            if selected >= self.predictions.len() {
                self.table_state.select(Some(self.predictions.len() - 1));
            }
        } else {
            self.table_state.select(Some(0));
        }
    }

    /// Select the ranking row that belongs to card entry `index`
    fn select_entry(&mut self, index: usize) {
        if let Some(row) = self.predictions.iter().position(|p| p.entry_index == index) {
            self.table_state.select(Some(row));
        }
    }

    pub fn next_row(&mut self) {
        if self.predictions.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.predictions.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        if self.predictions.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.predictions.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_prediction(&self) -> Option<&PredictionResult> {
        self.table_state
            .selected()
            .and_then(|i| self.predictions.get(i))
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Open the add-horse form, prefilled from the race setup
    pub fn start_add_entry(&mut self) {
        self.form = EntryForm::with_defaults(&self.card.setup);
        self.focused_field = 0;
        self.form_error = None;
        self.input_mode = InputMode::AddEntry;
    }

    pub fn cancel_add_entry(&mut self) {
        self.form_error = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focused_field % FormField::ALL.len()]
    }

    pub fn next_field(&mut self) {
        self.focused_field = (self.focused_field + 1) % FormField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.focused_field = (self.focused_field + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    pub fn input_char(&mut self, c: char) {
        let field = self.focused();
        self.form.get_mut(field).push(c);
        self.form_error = None;
    }

    pub fn delete_char(&mut self) {
        let field = self.focused();
        self.form.get_mut(field).pop();
    }

    /// Step through the choices of a class or track-condition field.
    /// Does nothing on free-text fields.
    pub fn cycle_choice(&mut self, forward: bool) {
        let field = self.focused();
        let labels: Vec<&'static str> = match field {
            FormField::RaceClass | FormField::HorseClass => {
                RaceClass::ALL.iter().map(|c| c.label()).collect()
            }
            FormField::TrackCondition => TrackCondition::ALL.iter().map(|c| c.label()).collect(),
            _ => return,
        };

        let value = self.form.get_mut(field);
        let current = labels.iter().position(|label| *label == value.as_str());
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % labels.len(),
            (Some(i), false) => (i + labels.len() - 1) % labels.len(),
            (None, _) => 0,
        };
        *value = labels[next].to_string();
        self.form_error = None;
    }

    /// Parse the form and add the horse. Validation errors keep the form
    /// open with the message shown and the offending field focused.
    pub fn confirm_add_entry(&mut self) {
        match self.form.parse(&self.card.setup) {
            Ok(horse) => {
                let name = horse.name.clone();
                self.card.add(horse);
                let index = self.card.len() - 1;
                self.push_undo(UndoAction::Added { index });
                self.recompute();
                self.select_entry(index);
                self.input_mode = InputMode::Normal;
                self.form_error = None;
                self.show_flash(format!("Added: {} (z to undo)", name));
            }
            Err(e) => {
                if let Some(pos) = FormField::ALL.iter().position(|f| f.key() == e.field()) {
                    self.focused_field = pos;
                }
                self.form_error = Some(e.to_string());
            }
        }
    }

    /// Remove the horse on the selected ranking row
    pub fn remove_selected(&mut self) {
        let index = match self.selected_prediction() {
            Some(p) => p.entry_index,
            None => return,
        };

        if let Some(entry) = self.card.remove(index) {
            let name = entry.name.clone();
            self.push_undo(UndoAction::Removed { index, entry });
            self.recompute();
            self.show_flash(format!("Removed: {} (z to undo)", name));
        }
    }

    pub fn clear_all(&mut self) {
        if self.card.is_empty() {
            self.show_flash("No horses to clear".to_string());
            return;
        }

        let entries = self.card.clear();
        let count = entries.len();
        self.push_undo(UndoAction::Cleared(entries));
        self.recompute();
        self.show_flash(format!("Cleared {} horses (z to undo)", count));
    }

    /// Undo the last add, remove or clear
    pub fn undo_last(&mut self) {
        let action = match self.undo_stack.pop_front() {
            Some(action) => action,
            None => {
                self.show_flash("Nothing to undo".to_string());
                return;
            }
        };

        match action {
            UndoAction::Added { index } => {
                if let Some(entry) = self.card.remove(index) {
                    self.recompute();
                    self.show_flash(format!("Undid add: {}", entry.name));
                }
            }
            UndoAction::Removed { index, entry } => {
                let name = entry.name.clone();
                self.card.insert(index, entry);
                self.recompute();
                self.select_entry(index);
                self.show_flash(format!("Undid remove: {}", name));
            }
            UndoAction::Cleared(entries) => {
                let count = entries.len();
                self.card.restore(entries);
                self.recompute();
                self.show_flash(format!("Restored {} horses", count));
            }
        }
    }

    /// Write the current ranking to a timestamped CSV in the export dir
    pub fn export(&mut self) {
        if self.predictions.is_empty() {
            self.show_flash("Nothing to export".to_string());
            return;
        }
        if !self.card.is_ready() {
            self.show_flash("Add at least 2 horses before exporting".to_string());
            return;
        }

        match export_csv(&self.export_dir, &self.predictions) {
            Ok(path) => self.show_flash(format!("Exported: {}", path.display())),
            Err(e) => self.show_flash(format!("Failed to export: {:#}", e)),
        }
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Dismiss help overlay
    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show score breakdown overlay
    pub fn show_breakdown(&mut self) {
        if self.selected_prediction().is_some() {
            self.input_mode = InputMode::Breakdown;
        }
    }

    /// Dismiss score breakdown overlay
    pub fn dismiss_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::RaceSetup;
    use std::env;
    use std::fs;

    fn app() -> App {
        App::new(
            RaceCard::new(RaceSetup::default()),
            ScoringWeights::default(),
            env::temp_dir().join("furlong_test_tui_export"),
            ThemeColors::dark(),
        )
    }

    fn add(app: &mut App, name: &str, speed: &str) {
        app.start_add_entry();
        app.form.name = name.to_string();
        app.form.speed_figure = speed.to_string();
        app.confirm_add_entry();
    }

    #[test]
    fn test_add_entry_ranks_and_selects() {
        let mut app = app();
        add(&mut app, "Slow Poke", "70");
        add(&mut app, "Thunder Bolt", "95");

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.card.len(), 2);
        assert_eq!(app.predictions[0].horse, "Thunder Bolt");
        // Newly added horse is selected wherever it ranks
        assert_eq!(app.table_state.selected(), Some(0));
        let total: f64 = app.predictions.iter().map(|p| p.win_probability).sum();
        assert!((total - 100.0).abs() <= 0.1 + 1e-9, "total was {}", total);
    }

    #[test]
    fn test_invalid_form_stays_open_and_focuses_field() {
        let mut app = app();
        app.start_add_entry();
        app.form.name = "Broken".to_string();
        app.form.recent_finishes = "2,x,3".to_string();
        app.confirm_add_entry();

        assert_eq!(app.input_mode, InputMode::AddEntry);
        assert!(app.card.is_empty());
        assert_eq!(app.focused(), FormField::RecentFinishes);
        assert!(app.form_error.as_deref().unwrap().contains("recent_finishes"));
    }

    #[test]
    fn test_missing_name_is_reported() {
        let mut app = app();
        app.start_add_entry();
        app.confirm_add_entry();
        assert_eq!(app.focused(), FormField::Name);
        assert!(app.form_error.is_some());
    }

    #[test]
    fn test_remove_and_undo_restores_position() {
        let mut app = app();
        add(&mut app, "Alpha", "90");
        add(&mut app, "Bravo", "80");
        add(&mut app, "Charlie", "85");

        // Select Charlie (ranked 2nd) and remove it
        app.table_state.select(Some(1));
        app.remove_selected();
        assert_eq!(app.card.len(), 2);
        assert!(app.card.position_of("Charlie").is_none());

        app.undo_last();
        assert_eq!(app.card.position_of("Charlie"), Some(2));
        assert_eq!(app.predictions[1].horse, "Charlie");
    }

    #[test]
    fn test_clear_and_undo() {
        let mut app = app();
        add(&mut app, "Alpha", "90");
        add(&mut app, "Bravo", "80");

        app.clear_all();
        assert!(app.card.is_empty());
        assert!(app.predictions.is_empty());
        assert_eq!(app.table_state.selected(), None);

        app.undo_last();
        assert_eq!(app.card.len(), 2);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_undo_add_then_nothing_left() {
        let mut app = app();
        add(&mut app, "Alpha", "90");
        app.undo_last();
        assert!(app.card.is_empty());

        app.undo_last();
        let (msg, _) = app.flash_message.as_ref().unwrap();
        assert_eq!(msg, "Nothing to undo");
    }

    #[test]
    fn test_undo_stack_is_bounded() {
        let mut app = app();
        for i in 0..(MAX_UNDO + 5) {
            app.push_undo(UndoAction::Added { index: i });
        }
        assert_eq!(app.undo_stack.len(), MAX_UNDO);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        add(&mut app, "Alpha", "90");
        add(&mut app, "Bravo", "80");
        app.table_state.select(Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_cycle_choice_on_class_field() {
        let mut app = app();
        app.start_add_entry();
        app.focused_field = FormField::ALL
            .iter()
            .position(|f| *f == FormField::HorseClass)
            .unwrap();
        assert_eq!(app.form.horse_class, "Maiden");
        app.cycle_choice(true);
        assert_eq!(app.form.horse_class, "Claiming");
        app.cycle_choice(false);
        app.cycle_choice(false);
        assert_eq!(app.form.horse_class, "Grade 1");

        // Free-text fields are untouched
        app.focused_field = 0;
        app.cycle_choice(true);
        assert_eq!(app.form.name, "");
    }

    #[test]
    fn test_export_writes_csv() {
        let mut app = app();
        let _ = fs::remove_dir_all(&app.export_dir);
        add(&mut app, "Alpha", "90");
        add(&mut app, "Bravo", "80");

        app.export();
        let (msg, _) = app.flash_message.clone().unwrap();
        assert!(msg.starts_with("Exported: "), "{}", msg);

        let _ = fs::remove_dir_all(&app.export_dir);
    }

    #[test]
    fn test_export_empty_card() {
        let mut app = app();
        app.export();
        let (msg, _) = app.flash_message.as_ref().unwrap();
        assert_eq!(msg, "Nothing to export");
    }

    #[test]
    fn test_export_needs_two_horses() {
        let mut app = app();
        app.export_dir = env::temp_dir().join("furlong_test_tui_export_single");
        let _ = fs::remove_dir_all(&app.export_dir);
        add(&mut app, "Lonely", "88");

        app.export();
        let (msg, _) = app.flash_message.clone().unwrap();
        assert_eq!(msg, "Add at least 2 horses before exporting");
        assert!(!app.export_dir.exists());
    }
}
