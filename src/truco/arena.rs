use std::{future::Future, time::Duration};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::truco::{Accion, EstadoTruco, Fase, Mano, MotivoIlegal, Partida, TrucoError};

mod agent;
pub use agent::{AgenteAleatorio, AgenteCli, AgenteProceso, Agent, DecisionJugada, Oferta};

mod kibitzer;
pub use kibitzer::{ActionRecorder, Kibitzer, KibitzerCli};

mod config;
pub use config::ArenaConfig;

mod arena_error;
pub use arena_error::ArenaError;

mod registro;
pub use registro::{Evento, RegistroPartida};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrucoAction {
    /// Game starts. The player is the mano of the first round.
    GameStart(usize),
    DealHand(usize, Mano),
    PlayerAction(usize, Accion),
    /// Action played by the arena on behalf of an agent that failed to decide in time.
    Fallback(usize, Accion),
    Payoff(usize, u8),
    GameEnd(usize),
}

/// Juega partidas completas entre dos agentes. La arena es la única que modifica la partida:
/// pide decisiones a los agentes, las aplica y avisa a los kibitzers de cada evento.
pub struct TrucoArena {
    pub agents: Vec<Box<dyn Agent>>,
    pub kibitzers: Vec<Box<dyn Kibitzer>>,
    config: ArenaConfig,
    partida: Partida,
    rng: StdRng,
}

impl TrucoArena {
    pub fn new(config: ArenaConfig) -> Self {
        let rng = match config.semilla {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            agents: vec![],
            kibitzers: vec![],
            partida: Partida::new(config.puntos_para_ganar, 0, [0, 0]),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn partida(&self) -> &Partida {
        &self.partida
    }

    fn record_action(&mut self, a: TrucoAction) {
        self.kibitzers
            .iter_mut()
            .for_each(|k| k.record(&self.partida, a.clone()));
    }

    /// Sustituye la partida y avisa de la acción y de los tantos que haya sumado cada jugador.
    fn transicion(&mut self, nueva: Partida, action: TrucoAction) {
        let previos = self.partida.tantos();
        self.partida = nueva;
        self.record_action(action);
        self.registrar_tantos(previos);
    }

    fn registrar_tantos(&mut self, previos: [u8; 2]) {
        let tantos = self.partida.tantos();
        for jugador in 0..2 {
            let ganados = tantos[jugador].saturating_sub(previos[jugador]);
            if ganados > 0 {
                self.record_action(TrucoAction::Payoff(jugador, ganados));
            }
        }
    }

    /// Juega una partida completa y devuelve su estado final.
    pub async fn start(&mut self) -> Result<Partida, ArenaError> {
        if self.agents.len() != 2 {
            return Err(ArenaError::NumeroAgentes(self.agents.len()));
        }
        // Las versiones siguen creciendo entre partidas porque los agentes se reutilizan y uno
        // puede contestar tarde a una petición de la partida anterior.
        self.partida = Partida::new_random(self.config.puntos_para_ganar, &mut self.rng)
            .con_version(self.partida.version());
        self.record_action(TrucoAction::GameStart(self.partida.ronda().jugador_mano));
        loop {
            match self.partida.fase() {
                Fase::Inicial | Fase::FinRonda => self.repartir()?,
                Fase::MostrandoBaza { .. } | Fase::MostrandoEnvido { .. } => {
                    let pausa = self.config.pausa_baza();
                    if !pausa.is_zero() {
                        tokio::time::sleep(pausa).await;
                    }
                    self.partida = self.partida.avanzar()?;
                }
                Fase::Turno(_) => self.pedir_decision().await?,
                Fase::FinPartida { ganador } => {
                    info!(ganador, tantos = ?self.partida.tantos(), "Partida terminada");
                    self.record_action(TrucoAction::GameEnd(ganador));
                    return Ok(self.partida.clone());
                }
            }
        }
    }

    fn repartir(&mut self) -> Result<(), ArenaError> {
        let previos = self.partida.tantos();
        self.partida = self.partida.nueva_ronda(&mut self.rng)?;
        let manos = self.partida.manos().clone();
        for (i, m) in manos.into_iter().enumerate() {
            self.record_action(TrucoAction::DealHand(i, m));
        }
        self.registrar_tantos(previos);
        Ok(())
    }

    async fn pedir_decision(&mut self) -> Result<(), ArenaError> {
        let Some(jugador) = self.partida.jugador_que_decide() else {
            return Ok(());
        };
        let vista = self.partida.vista(jugador);
        if vista.acciones.is_empty() {
            return Err(ArenaError::SinAcciones(jugador));
        }
        let limite = self.agents[jugador].limite_tiempo(self.config.timeout_agente());

        if self.partida.apuesta_pendiente() == Some(jugador) {
            let oferta = match self.partida.truco() {
                EstadoTruco::Cantado { nivel, .. } => Oferta::Truco(*nivel),
                _ => Oferta::Envido,
            };
            let respuesta =
                con_limite(limite, self.agents[jugador].decidir_respuesta(&vista, oferta)).await;
            let accion = respuesta.map(|r| match oferta {
                Oferta::Truco(_) => Accion::ResponderTruco(r),
                Oferta::Envido => Accion::ResponderEnvido(r),
            });
            let resultado = accion.and_then(|a| {
                self.partida
                    .aplicar_decision(vista.version, jugador, a)
                    .map(|p| (a, p))
            });
            return match resultado {
                Ok((a, nueva)) => {
                    self.transicion(nueva, TrucoAction::PlayerAction(jugador, a));
                    Ok(())
                }
                Err(err) => self.fallback(jugador, err),
            };
        }

        let decision = con_limite(limite, self.agents[jugador].decidir_jugada(&vista)).await;
        match decision.and_then(|d| self.aplicar_jugada(jugador, vista.version, d)) {
            Ok((a, nueva)) => {
                self.transicion(nueva, TrucoAction::PlayerAction(jugador, a));
                Ok(())
            }
            Err(err) => self.fallback(jugador, err),
        }
    }

    /// Traduce la decisión de un agente a una acción. Primero se intenta el envido, después el
    /// truco con la carta diferida y por último la carta.
    fn aplicar_jugada(
        &self,
        jugador: usize,
        version: u64,
        decision: DecisionJugada,
    ) -> Result<(Accion, Partida), TrucoError> {
        let mut ultimo_error = None;
        if decision.envido {
            match self
                .partida
                .aplicar_decision(version, jugador, Accion::CantarEnvido)
            {
                Ok(p) => return Ok((Accion::CantarEnvido, p)),
                Err(err) => ultimo_error = Some(err),
            }
        }
        if decision.truco {
            let truco = if version == self.partida.version() {
                self.partida.cantar_truco(jugador, decision.carta)
            } else {
                Err(MotivoIlegal::DecisionObsoleta(version).into())
            };
            match truco {
                Ok(p) => return Ok((Accion::CantarTruco, p)),
                Err(err) => ultimo_error = Some(err),
            }
        }
        if let Some(idx) = decision.carta {
            let accion = Accion::JugarCarta(idx);
            match self.partida.aplicar_decision(version, jugador, accion) {
                Ok(p) => return Ok((accion, p)),
                Err(err) => ultimo_error = Some(err),
            }
        }
        Err(ultimo_error
            .unwrap_or_else(|| TrucoError::AdvisorNoDisponible("decisión vacía".to_owned())))
    }

    /// Juega por el agente una acción legal elegida al azar.
    fn fallback(&mut self, jugador: usize, motivo: TrucoError) -> Result<(), ArenaError> {
        let acciones = self.partida.acciones_legales(jugador);
        let accion = *acciones
            .choose(&mut self.rng)
            .ok_or(ArenaError::SinAcciones(jugador))?;
        warn!(jugador, %motivo, ?accion, "Decisión no válida, se juega una acción al azar");
        let nueva = self.partida.actuar(jugador, accion)?;
        debug!(version = nueva.version(), "Acción al azar aplicada");
        self.transicion(nueva, TrucoAction::Fallback(jugador, accion));
        Ok(())
    }
}

async fn con_limite<T>(
    limite: Option<Duration>,
    decision: impl Future<Output = Result<T, TrucoError>>,
) -> Result<T, TrucoError> {
    match limite {
        Some(limite) => tokio::time::timeout(limite, decision)
            .await
            .map_err(|_| TrucoError::AdvisorNoDisponible("tiempo agotado".to_owned()))?,
        None => decision.await,
    }
}
