pub mod admin;
pub mod event;
pub mod transaction;

pub use admin::{Admin, NewAdmin};
pub use event::{Event, EventStatus, MenuMoment, NewEvent};
pub use transaction::{EventSalesStats, MetadataType, NewTransaction, SelectedMenus, Transaction};
