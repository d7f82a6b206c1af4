use std::sync::{Arc, Mutex};

use crate::truco::{Accion, EstadoEnvido, Fase, Partida};

use super::TrucoAction;

pub trait Kibitzer: Send {
    fn record(&mut self, partida: &Partida, action: TrucoAction);
}

/// Kibitzer that records every event of a game. The history can be shared through its history()
/// method and is cleared when a new game starts.
#[derive(Debug, Clone, Default)]
pub struct ActionRecorder {
    history: Arc<Mutex<Vec<TrucoAction>>>,
}

impl ActionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Arc<Mutex<Vec<TrucoAction>>> {
        self.history.clone()
    }

    /// Acciones jugadas hasta ahora, incluidas las que la arena jugó en nombre de un agente.
    pub fn acciones(&self) -> Vec<(usize, Accion)> {
        self.history
            .lock()
            .map(|h| {
                h.iter()
                    .filter_map(|a| match a {
                        TrucoAction::PlayerAction(j, accion) | TrucoAction::Fallback(j, accion) => {
                            Some((*j, *accion))
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Kibitzer for ActionRecorder {
    fn record(&mut self, _partida: &Partida, action: TrucoAction) {
        if let Ok(mut history) = self.history.lock() {
            if matches!(action, TrucoAction::GameStart(_)) {
                history.clear();
            }
            history.push(action);
        }
    }
}

/// Kibitzer que narra la partida por el terminal desde el punto de vista de un jugador.
#[derive(Debug, Clone)]
pub struct KibitzerCli {
    cli_player: usize,
}

impl KibitzerCli {
    pub fn new(cli_player: usize) -> Self {
        Self { cli_player }
    }
}

impl Kibitzer for KibitzerCli {
    fn record(&mut self, partida: &Partida, action: TrucoAction) {
        match &action {
            TrucoAction::GameStart(p) => {
                println!();
                println!("¡Empieza la partida! Sale el jugador {p}.");
            }
            TrucoAction::DealHand(p, m) => {
                if *p == 0 {
                    println!();
                    let [t0, t1] = partida.tantos();
                    println!("Marcador: {t0}-{t1}");
                    if let Some(muestra) = partida.muestra() {
                        println!("Muestra: {}", muestra.nombre());
                    }
                }
                if *p == self.cli_player {
                    let cartas: Vec<String> = m.iter().map(|c| c.nombre()).collect();
                    println!("Tu mano: {}", cartas.join(", "));
                }
            }
            TrucoAction::PlayerAction(..) | TrucoAction::Fallback(..) => {
                println!("{}", partida.mensaje());
                if let (Fase::MostrandoEnvido { .. }, EstadoEnvido::Querido { puntos, .. }) =
                    (partida.fase(), partida.envido())
                {
                    println!("Envido: {} a {}", puntos[0], puntos[1]);
                }
            }
            TrucoAction::Payoff(p, t) => {
                if *p == self.cli_player {
                    println!("Sumas {t} tantos.");
                } else {
                    println!("El rival suma {t} tantos.");
                }
            }
            TrucoAction::GameEnd(ganador) => {
                let [t0, t1] = partida.tantos();
                if *ganador == self.cli_player {
                    println!("¡Has ganado {t0}-{t1}!");
                } else {
                    println!("Has perdido {t0}-{t1}.");
                }
            }
        }
    }
}
