use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::ArenaError;
use crate::truco::Partida;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub puntos_para_ganar: u8,
    /// Tiempo máximo que se espera la decisión de un agente antes de jugar al azar.
    pub timeout_agente_ms: u64,
    /// Pausa con las cartas de una baza en la mesa antes de seguir.
    pub pausa_baza_ms: u64,
    pub semilla: Option<u64>,
}

impl ArenaConfig {
    pub fn timeout_agente(&self) -> Duration {
        Duration::from_millis(self.timeout_agente_ms)
    }

    pub fn pausa_baza(&self) -> Duration {
        Duration::from_millis(self.pausa_baza_ms)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ArenaError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents).map_err(|err| {
            ArenaError::InvalidConfigPath(err, path.as_ref().display().to_string())
        })?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|err| {
            ArenaError::InvalidConfigPath(err, path.as_ref().display().to_string())
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            puntos_para_ganar: Partida::PUNTOS_PARA_GANAR,
            timeout_agente_ms: 5000,
            pausa_baza_ms: 0,
            semilla: None,
        }
    }
}
