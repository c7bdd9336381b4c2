use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card value marking a competitor without a timing card. Card numbers are
/// kept as text so leading zeros survive round-trips through import files.
pub const NO_CARD: &str = "none";

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Entry {
    pub id: Uuid,
    pub name: String,
    /// May hold several club names separated by `/` for competitors
    /// running for more than one club.
    pub club: String,
    pub class_id: String,
    pub card_number: String,
    pub ranking_id: Option<String>,
}

impl Entry {
    pub fn new(
        id: Uuid,
        name: String,
        club: String,
        class_id: &str,
        card_number: String,
        ranking_id: Option<String>,
    ) -> Self {
        Entry {
            id,
            name,
            club,
            class_id: class_id.trim().to_string(),
            card_number,
            ranking_id,
        }
    }

    pub fn has_card(&self) -> bool {
        !self.card_number.is_empty() && self.card_number != NO_CARD
    }
}
