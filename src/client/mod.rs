// Client access layer for the livestock API

pub mod api_client;
pub mod error;
pub mod interceptors;
pub mod models;
pub mod payload;
pub mod services;
pub mod session;

pub use api_client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use interceptors::{BearerAuth, LogNavigator, Navigator, SessionExpiry, LOGIN_PATH};
pub use services::ApiClients;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionKey, SessionStore};
