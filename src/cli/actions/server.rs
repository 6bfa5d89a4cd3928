use anyhow::Result;

use crate::api;
use crate::cli::actions::Action;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, config } => api::serve(port, *config).await,
    }
}
