// ── Reactive data store ──
//
// Latest domain values with push-based change notification.

mod data_store;

pub use data_store::{DashboardSnapshot, DataOrigin, DataOrigins, DataStore};
