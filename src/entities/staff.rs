//! Staff entity - An employee with a daily shift window.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    /// Unique identifier for the staff member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Role, e.g. "barista"
    pub role: String,
    /// Shift start, "HH:MM" wall-clock time
    pub shift_start: String,
    /// Shift end, "HH:MM" wall-clock time
    pub shift_end: String,
    /// Performance score on a 0-5 scale
    pub performance_score: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
