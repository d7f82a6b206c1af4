use arrayvec::ArrayVec;
use rand::Rng;
use rand::seq::SliceRandom;

use super::{Carta, Numero, Palo};

/// Cartas de una mano de truco.
pub type Mano = ArrayVec<Carta, 3>;

#[derive(Clone, Debug)]
pub struct Baraja(Vec<Carta>);

/// Resultado de repartir una ronda: tres cartas por jugador, la muestra y el resto del mazo.
#[derive(Clone, Debug)]
pub struct Reparto {
    pub manos: [Mano; 2],
    pub muestra: Carta,
    pub resto: Vec<Carta>,
}

impl Baraja {
    pub fn new() -> Self {
        Baraja(Vec::with_capacity(40))
    }

    /// Baraja española de 40 cartas, sin barajar.
    pub fn baraja_truco() -> Baraja {
        let mut b = Baraja::new();
        for palo in Palo::TODOS {
            for numero in Numero::TODOS {
                b.insertar(Carta::new(numero, palo));
            }
        }
        b
    }

    pub fn insertar(&mut self, c: Carta) {
        self.0.push(c);
    }

    pub fn barajar<R: Rng>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }

    pub fn repartir(&mut self) -> Option<Carta> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cartas(&self) -> &[Carta] {
        &self.0
    }

    /// Baraja y reparte tres cartas a cada jugador. La muestra se elige al azar entre las
    /// cartas que quedan en el mazo. Devuelve None si no hay cartas suficientes.
    pub fn repartir_ronda<R: Rng>(mut self, rng: &mut R) -> Option<Reparto> {
        if self.len() < 7 {
            return None;
        }
        self.barajar(rng);
        let mut manos = [Mano::new(), Mano::new()];
        for mano in manos.iter_mut() {
            for _ in 0..3 {
                mano.push(self.repartir()?);
            }
        }
        let idx = rng.gen_range(0..self.len());
        let muestra = self.0.remove(idx);
        Some(Reparto {
            manos,
            muestra,
            resto: self.0,
        })
    }
}

impl Default for Baraja {
    fn default() -> Self {
        Self::new()
    }
}
