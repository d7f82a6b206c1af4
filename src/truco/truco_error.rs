use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrucoError {
    #[error("Carácter no válido: {0}")]
    CaracterNoValido(char),

    #[error("Carta no válida: {0}")]
    CartaNoValida(String),

    #[error("La mano debe tener 3 cartas y tiene {0}")]
    TamanoManoInvalido(usize),

    #[error("Jugada ilegal: {0}")]
    JugadaIlegal(#[from] MotivoIlegal),

    #[error("Advisor no disponible: {0}")]
    AdvisorNoDisponible(String),
}

/// Motivo por el que se rechaza una acción. El estado de la partida no cambia.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MotivoIlegal {
    #[error("no es el turno del jugador {0}")]
    NoEsSuTurno(usize),

    #[error("no hay carta en la posición {0}")]
    IndiceFueraDeRango(usize),

    #[error("hay una apuesta pendiente de respuesta")]
    ApuestaPendiente,

    #[error("no hay ninguna apuesta que responder")]
    SinApuestaPendiente,

    #[error("no se puede cantar truco ahora")]
    TrucoNoPermitido,

    #[error("no se puede subir más allá de vale cuatro")]
    NivelMaximo,

    #[error("no se puede cantar envido ahora")]
    EnvidoNoPermitido,

    #[error("el envido no se puede subir")]
    EnvidoSinSubida,

    #[error("acción no permitida en la fase actual")]
    FaseIncorrecta,

    #[error("la decisión corresponde a un estado anterior ({0})")]
    DecisionObsoleta(u64),
}
