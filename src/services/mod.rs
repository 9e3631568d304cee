pub mod case;
pub mod identity;
pub mod messaging;
pub mod notification;
pub mod presence;
pub mod profile;
pub mod scheduler;
pub mod security;
pub mod storage;

pub use case::CaseService;
pub use identity::{IdentityService, IdentityVerifier};
pub use messaging::MessagingService;
pub use notification::{EmailSender, NotificationService, PushSender};
pub use presence::{InMemoryPresence, PresenceService};
pub use profile::DirectoryService;
pub use security::*;
pub use storage::ObjectStorage;
