//! Test error type aggregating the failures a test can bubble up.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error(transparent)]
    App(#[from] heimdall::error::Error),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Esi(#[from] heimdall::error::esi::EsiError),
    #[error(transparent)]
    Discord(#[from] heimdall::error::discord::DiscordError),
}
