use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Resultado de una baza desde el punto de vista del jugador 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resultado {
    Gana,
    Pierde,
}

/// Bazas de una ronda. La ronda se decide en cuanto un jugador gana dos bazas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadoRonda {
    pub jugador_mano: usize,
    pub ultimo_ganador: Option<usize>,
    pub bazas_ganadas: [u8; 2],
    pub historial: ArrayVec<Resultado, 3>,
}

impl EstadoRonda {
    pub const BAZAS_PARA_GANAR: u8 = 2;

    pub fn new(jugador_mano: usize) -> Self {
        Self {
            jugador_mano,
            ultimo_ganador: None,
            bazas_ganadas: [0, 0],
            historial: ArrayVec::new(),
        }
    }

    pub fn registrar_baza(&mut self, ganador: usize) {
        self.bazas_ganadas[ganador] += 1;
        self.ultimo_ganador = Some(ganador);
        let resultado = if ganador == 0 {
            Resultado::Gana
        } else {
            Resultado::Pierde
        };
        // Una ronda nunca pasa de tres bazas.
        let _ = self.historial.try_push(resultado);
    }

    /// Jugador que ha ganado la ronda, si ya está decidida.
    pub fn ganador(&self) -> Option<usize> {
        (0..2).find(|&j| self.bazas_ganadas[j] >= Self::BAZAS_PARA_GANAR)
    }

    /// Jugador con más bazas ganadas. En caso de igualdad, el mano.
    pub fn lider(&self) -> usize {
        match self.bazas_ganadas[0].cmp(&self.bazas_ganadas[1]) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Equal => self.jugador_mano,
        }
    }

    /// Jugador que sale en la baza en curso.
    pub fn turno_inicial_baza(&self) -> usize {
        self.ultimo_ganador.unwrap_or(self.jugador_mano)
    }
}
