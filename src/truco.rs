//! Reglas del truco uruguayo con muestra para dos jugadores.
mod carta;
pub use carta::*;

mod truco_error;
pub use truco_error::{MotivoIlegal, TrucoError};

mod baraja;
pub use baraja::*;

pub mod jerarquia;

pub mod envido;

mod apuestas;
pub use apuestas::*;

mod ronda;
pub use ronda::*;

mod partida;
pub use partida::*;

pub mod arena;
