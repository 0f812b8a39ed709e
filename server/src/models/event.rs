use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use super::transaction::SelectedMenus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Blocked,
}

/// A timed point during the event at which the buyer picks one menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuMoment {
    pub date_time: DateTime<Utc>,
    pub menu_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
    pub start_date: DateTime<Utc>,
    pub end_purchase_date: DateTime<Utc>,
    pub has_menu: bool,
    pub menu_moments: Json<Vec<MenuMoment>>,
    pub cover_image: Option<String>,
    pub status: EventStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
    pub start_date: DateTime<Utc>,
    pub end_purchase_date: DateTime<Utc>,
    pub has_menu: bool,
    pub menu_moments: Vec<MenuMoment>,
    pub cover_image: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuSelectionError {
    #[error("This event does not offer menus")]
    MenuNotOffered,

    #[error("Unknown menu moment '{0}'")]
    UnknownMoment(String),

    #[error("'{option}' is not a menu option for moment {moment}")]
    UnknownOption { moment: String, option: String },
}

impl Event {
    /// The status this event should have at `now`, if it differs from the
    /// stored one. Sales close once the purchase cutoff has passed and reopen
    /// if the cutoff is moved back into the future.
    pub fn pending_transition(&self, now: DateTime<Utc>) -> Option<EventStatus> {
        let target = if self.end_purchase_date < now {
            EventStatus::Blocked
        } else {
            EventStatus::Active
        };

        (target != self.status).then_some(target)
    }

    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Active && self.end_purchase_date >= now
    }

    pub fn validate_menu_selection(
        &self,
        selections: &SelectedMenus,
    ) -> Result<(), MenuSelectionError> {
        if selections.is_empty() {
            return Ok(());
        }
        if !self.has_menu {
            return Err(MenuSelectionError::MenuNotOffered);
        }

        for (moment, option) in selections {
            let menu = moment
                .parse::<usize>()
                .ok()
                .and_then(|index| self.menu_moments.get(index))
                .ok_or_else(|| MenuSelectionError::UnknownMoment(moment.clone()))?;

            if !menu.menu_options.iter().any(|candidate| candidate == option) {
                return Err(MenuSelectionError::UnknownOption {
                    moment: moment.clone(),
                    option: option.clone(),
                });
            }
        }

        Ok(())
    }
}
