mod expiration_reconciler;

pub use expiration_reconciler::{ExpirationReconciler, SweepSummary};
