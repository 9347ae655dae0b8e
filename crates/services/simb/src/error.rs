#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] sim_config::error::Error),

    #[error(transparent)]
    Jobs(#[from] sim_jobs::error::Error),

    #[error(transparent)]
    Stats(#[from] sim_stats::error::Error),
}
