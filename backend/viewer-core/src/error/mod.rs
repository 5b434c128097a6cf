pub mod activation;
pub mod config;
pub mod export;
pub mod launch;
pub mod server;

pub use activation::ActivationError;
pub use config::ConfigError;
pub use export::ExportError;
pub use launch::LaunchError;
pub use server::ServerError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Activation(#[from] ActivationError),
}
