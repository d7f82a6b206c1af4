use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{ArenaError, Kibitzer, TrucoAction};
use crate::truco::{Fase, Partida};

/// Entrada del registro de una partida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evento {
    pub momento: DateTime<Local>,
    pub version: u64,
    pub fase: Fase,
    pub tantos: [u8; 2],
    pub accion: TrucoAction,
}

/// Kibitzer que guarda todos los eventos de las partidas para escribirlos después en JSON. Los
/// clones comparten el mismo registro, así que puede conservarse una copia tras entregar el
/// kibitzer a la arena.
#[derive(Debug, Clone, Default)]
pub struct RegistroPartida {
    eventos: Arc<Mutex<Vec<Evento>>>,
}

impl RegistroPartida {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eventos(&self) -> Vec<Evento> {
        self.eventos
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ArenaError> {
        let contents = serde_json::to_string_pretty(&self.eventos())?;
        fs::write(path.as_ref(), contents).map_err(|err| {
            ArenaError::InvalidRecordPath(err, path.as_ref().display().to_string())
        })?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|err| {
            ArenaError::InvalidRecordPath(err, path.as_ref().display().to_string())
        })?;
        let eventos: Vec<Evento> = serde_json::from_str(&contents)?;
        Ok(Self {
            eventos: Arc::new(Mutex::new(eventos)),
        })
    }
}

impl Kibitzer for RegistroPartida {
    fn record(&mut self, partida: &Partida, action: TrucoAction) {
        if let Ok(mut eventos) = self.eventos.lock() {
            eventos.push(Evento {
                momento: Local::now(),
                version: partida.version(),
                fase: partida.fase(),
                tantos: partida.tantos(),
                accion: action,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truco::Accion;

    #[test]
    fn guardar_y_cargar() {
        let partida = Partida::new(15, 1, [3, 4]);
        let copia = RegistroPartida::new();
        let mut registro = copia.clone();
        registro.record(&partida, TrucoAction::GameStart(1));
        registro.record(&partida, TrucoAction::PlayerAction(1, Accion::CantarTruco));
        let path = std::env::temp_dir().join("trucosolver_registro_test.json");
        copia.to_file(&path).unwrap();
        let leido = RegistroPartida::from_file(&path).unwrap();
        assert_eq!(leido.eventos().len(), 2);
        assert_eq!(leido.eventos()[0].tantos, [3, 4]);
        assert_eq!(
            leido.eventos()[1].accion,
            TrucoAction::PlayerAction(1, Accion::CantarTruco)
        );
        let _ = fs::remove_file(path);
    }
}
