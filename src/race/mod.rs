pub mod card;
pub mod form;
pub mod types;

pub use card::{load_race_card, RaceCard, RaceCardFile, RaceSetup};
pub use form::{parse_int_list, EntryError, EntryForm, EntryRecord, FormField, DEFAULT_FINISHES};
pub use types::{HorseEntry, RaceClass, TrackCondition};
