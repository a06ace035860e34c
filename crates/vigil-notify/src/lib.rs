pub mod dispatcher;
pub mod message;
pub mod notifier;
pub mod providers;

pub use dispatcher::{DispatchResult, Dispatcher};
pub use message::{NotifyLevel, NotifyMessage};
pub use notifier::{Notifier, NotifyResult};
pub use providers::{EmailConfig, EmailNotifier, WebhookConfig, WebhookNotifier};
