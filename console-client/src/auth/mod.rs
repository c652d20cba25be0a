pub mod callback;
pub mod guard;
pub mod navigator;
pub mod session;
pub mod store;

pub use callback::CallbackTokens;
pub use guard::{authorize, Access, RoleRequirement};
pub use navigator::{Navigator, NoopNavigator};
pub use session::{AuthState, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
