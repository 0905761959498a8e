//! Business services containing domain logic and use cases.

pub mod background;
pub mod booking;
pub mod clock;
pub mod context;
pub mod hostel;
pub mod reminder;
pub mod review;
pub mod support;
pub mod sync;
pub mod traits;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use background::{spawn_periodic, BackgroundHandle};
pub use booking::{
    Actor, BookingCache, BookingReceipt, BookingService, BookingServiceConfig, MutationOutcome,
    PriceQuote,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::ServiceContext;
pub use hostel::{HostelService, SuspensionReport};
pub use reminder::{ReminderRun, ReminderService, ReminderServiceConfig};
pub use review::{ReviewOutcome, ReviewService};
pub use support::{NoopNotifier, Notification, Recipient, RecordingNotifier, SwitchableConnectivity};
pub use sync::{DrainReport, SyncQueue, SyncQueueConfig, SyncTask};
pub use traits::{ConnectivityProbe, Notifier};
pub use user::{Registration, UserService};
