use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One shuttle reservation. `createdBy`/`createdAt` keep the original column
/// spelling the mobile client expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub notes: String,
    #[sqlx(rename = "createdBy")]
    #[serde(rename = "createdBy")]
    pub created_by: i64,
    #[sqlx(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Validated input for a new reservation. All trip fields are required;
/// `notes` defaults to empty.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub name: String,
    pub phone: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

/// Merge patch: only supplied fields overwrite stored values. `id`,
/// `createdBy` and `createdAt` are immutable and have no patch slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl Reservation {
    pub fn apply(&mut self, patch: &ReservationPatch) {
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &patch.from {
            self.from = v.clone();
        }
        if let Some(v) = &patch.to {
            self.to = v.clone();
        }
        if let Some(v) = &patch.date {
            self.date = v.clone();
        }
        if let Some(v) = &patch.time {
            self.time = v.clone();
        }
        if let Some(v) = &patch.notes {
            self.notes = v.clone();
        }
    }
}
