pub mod client;
pub mod clock;
pub mod handlers;
pub mod history;
pub mod ladder;
pub mod manager;
pub mod types;

pub use client::{ConsoleNotificationClient, DeliveryError, NotificationClient, SlackNotificationClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use handlers::{DecisionContext, DecisionHandler, HandlerChain, HandlerKind, HandlerSettings};
pub use history::{
    FileNotificationHistoryStore, HistoryError, InMemoryNotificationHistoryStore, NotificationHistoryStore,
};
pub use ladder::{EscalationLadder, LadderError};
pub use manager::{NotificationError, NotificationManager};
pub use types::*;
