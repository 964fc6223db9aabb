//! CLI command implementations

mod apps;
mod respond;
mod reviews;
mod stores;

pub use apps::AppsCommand;
pub use respond::{DeleteResponseCommand, RespondCommand};
pub use reviews::ReviewsCommand;
pub use stores::StoresCommand;
