use thiserror::Error;

use crate::truco::TrucoError;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Truco(#[from] TrucoError),

    #[error("Invalid config path: {1}")]
    InvalidConfigPath(#[source] std::io::Error, String),

    #[error("Cannot write game record to: {1}")]
    InvalidRecordPath(#[source] std::io::Error, String),

    #[error("Cannot parse JSON file.")]
    ParseJsonError(#[from] serde_json::Error),

    #[error("Cannot write CSV results.")]
    CsvError(#[from] csv::Error),

    #[error("Cannot start advisor process: {1}")]
    AdvisorProcess(#[source] std::io::Error, String),

    #[error("Se necesitan dos agentes y hay {0}")]
    NumeroAgentes(usize),

    #[error("El jugador {0} no tiene acciones legales")]
    SinAcciones(usize),
}
