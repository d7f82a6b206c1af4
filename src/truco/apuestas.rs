//! Estados de las apuestas de truco y de envido dentro de una ronda.

use serde::{Deserialize, Serialize};

use super::MotivoIlegal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NivelTruco {
    Truco,
    Retruco,
    Vale4,
}

impl NivelTruco {
    /// Tantos que gana el vencedor de la ronda si el nivel fue querido.
    pub fn puntos(&self) -> u8 {
        match self {
            NivelTruco::Truco => 2,
            NivelTruco::Retruco => 3,
            NivelTruco::Vale4 => 4,
        }
    }

    /// Tantos que gana quien cantó el nivel si el rival no lo quiere.
    pub fn puntos_no_querido(&self) -> u8 {
        self.puntos() - 1
    }

    pub fn siguiente(&self) -> Option<NivelTruco> {
        match self {
            NivelTruco::Truco => Some(NivelTruco::Retruco),
            NivelTruco::Retruco => Some(NivelTruco::Vale4),
            NivelTruco::Vale4 => None,
        }
    }
}

impl std::fmt::Display for NivelTruco {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NivelTruco::Truco => "truco",
            NivelTruco::Retruco => "retruco",
            NivelTruco::Vale4 => "vale cuatro",
        };
        write!(f, "{s}")
    }
}

/// Respuesta a un canto. Subir sólo es válido para el truco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Respuesta {
    Quiero,
    NoQuiero,
    Subir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstadoTruco {
    #[default]
    Nada,
    Cantado { nivel: NivelTruco, cantor: usize },
    Querido { nivel: NivelTruco, cantor: usize },
    NoQuerido { nivel: NivelTruco, cantor: usize },
}

impl EstadoTruco {
    pub fn nivel(&self) -> Option<NivelTruco> {
        match self {
            EstadoTruco::Nada => None,
            EstadoTruco::Cantado { nivel, .. }
            | EstadoTruco::Querido { nivel, .. }
            | EstadoTruco::NoQuerido { nivel, .. } => Some(*nivel),
        }
    }

    pub fn ultimo_cantor(&self) -> Option<usize> {
        match self {
            EstadoTruco::Nada => None,
            EstadoTruco::Cantado { cantor, .. }
            | EstadoTruco::Querido { cantor, .. }
            | EstadoTruco::NoQuerido { cantor, .. } => Some(*cantor),
        }
    }

    pub fn pendiente(&self) -> bool {
        matches!(self, EstadoTruco::Cantado { .. })
    }

    /// Tantos que se lleva el ganador de la ronda.
    pub fn puntos_ronda(&self) -> u8 {
        match self {
            EstadoTruco::Querido { nivel, .. } => nivel.puntos(),
            _ => 1,
        }
    }

    /// Nivel que puede cantar el jugador en este momento, si puede cantar alguno. Tras un truco
    /// querido sólo puede subir quien no lo cantó.
    pub fn siguiente_canto(&self, jugador: usize) -> Option<NivelTruco> {
        match self {
            EstadoTruco::Nada => Some(NivelTruco::Truco),
            EstadoTruco::Querido { nivel, cantor } if *cantor != jugador => nivel.siguiente(),
            _ => None,
        }
    }

    pub fn cantar(&self, jugador: usize) -> Result<EstadoTruco, MotivoIlegal> {
        match self {
            EstadoTruco::Cantado { .. } => Err(MotivoIlegal::ApuestaPendiente),
            EstadoTruco::Querido {
                nivel: NivelTruco::Vale4,
                ..
            } => Err(MotivoIlegal::NivelMaximo),
            _ => self
                .siguiente_canto(jugador)
                .map(|nivel| EstadoTruco::Cantado {
                    nivel,
                    cantor: jugador,
                })
                .ok_or(MotivoIlegal::TrucoNoPermitido),
        }
    }

    /// Responde al canto pendiente. Subir convierte al que responde en el nuevo cantor.
    pub fn responder(
        &self,
        jugador: usize,
        respuesta: Respuesta,
    ) -> Result<EstadoTruco, MotivoIlegal> {
        let EstadoTruco::Cantado { nivel, cantor } = *self else {
            return Err(MotivoIlegal::SinApuestaPendiente);
        };
        if jugador == cantor {
            return Err(MotivoIlegal::NoEsSuTurno(jugador));
        }
        match respuesta {
            Respuesta::Quiero => Ok(EstadoTruco::Querido { nivel, cantor }),
            Respuesta::NoQuiero => Ok(EstadoTruco::NoQuerido { nivel, cantor }),
            Respuesta::Subir => nivel
                .siguiente()
                .map(|nivel| EstadoTruco::Cantado {
                    nivel,
                    cantor: jugador,
                })
                .ok_or(MotivoIlegal::NivelMaximo),
        }
    }

    /// Jugador y tantos que se otorgan cuando el canto no fue querido.
    pub fn tantos_no_querido(&self) -> Option<(usize, u8)> {
        match self {
            EstadoTruco::NoQuerido { nivel, cantor } => Some((*cantor, nivel.puntos_no_querido())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstadoEnvido {
    #[default]
    Nada,
    Cantado {
        cantor: usize,
    },
    Querido {
        cantor: usize,
        puntos: [u8; 2],
        ganador: usize,
    },
    NoQuerido {
        cantor: usize,
    },
}

impl EstadoEnvido {
    pub const PUNTOS_QUERIDO: u8 = 2;
    pub const PUNTOS_NO_QUERIDO: u8 = 1;

    pub fn pendiente(&self) -> bool {
        matches!(self, EstadoEnvido::Cantado { .. })
    }

    pub fn cantar(&self, jugador: usize) -> Result<EstadoEnvido, MotivoIlegal> {
        match self {
            EstadoEnvido::Nada => Ok(EstadoEnvido::Cantado { cantor: jugador }),
            _ => Err(MotivoIlegal::EnvidoNoPermitido),
        }
    }

    /// Responde al envido pendiente. `puntos` son los puntos de envido de cada jugador,
    /// calculados con las manos repartidas. En caso de empate gana quien no cantó.
    pub fn responder(
        &self,
        jugador: usize,
        respuesta: Respuesta,
        puntos: [u8; 2],
    ) -> Result<EstadoEnvido, MotivoIlegal> {
        let EstadoEnvido::Cantado { cantor } = *self else {
            return Err(MotivoIlegal::SinApuestaPendiente);
        };
        if jugador == cantor {
            return Err(MotivoIlegal::NoEsSuTurno(jugador));
        }
        match respuesta {
            Respuesta::Quiero => {
                let ganador = if puntos[cantor] > puntos[1 - cantor] {
                    cantor
                } else {
                    1 - cantor
                };
                Ok(EstadoEnvido::Querido {
                    cantor,
                    puntos,
                    ganador,
                })
            }
            Respuesta::NoQuiero => Ok(EstadoEnvido::NoQuerido { cantor }),
            Respuesta::Subir => Err(MotivoIlegal::EnvidoSinSubida),
        }
    }

    /// Jugador y tantos que se otorgan una vez resuelto el envido.
    pub fn tantos(&self) -> Option<(usize, u8)> {
        match self {
            EstadoEnvido::Querido { ganador, .. } => Some((*ganador, Self::PUNTOS_QUERIDO)),
            EstadoEnvido::NoQuerido { cantor } => Some((*cantor, Self::PUNTOS_NO_QUERIDO)),
            _ => None,
        }
    }
}
