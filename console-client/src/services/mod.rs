pub mod api;
pub mod auth;
pub mod policies;
pub mod sessions;
pub mod subscriptions;
pub mod usage;
pub mod users;

pub use api::ApiClient;
pub use auth::AuthApi;
pub use policies::PoliciesApi;
pub use sessions::SessionsApi;
pub use subscriptions::SubscriptionsApi;
pub use usage::UsageApi;
pub use users::UsersApi;
