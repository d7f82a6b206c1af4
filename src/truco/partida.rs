use arrayvec::ArrayVec;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::baraja::{Mano, Reparto};
use super::envido::{puntos_envido, tiene_flor};
use super::jerarquia::gana;
use super::{
    Baraja, Carta, EstadoEnvido, EstadoRonda, EstadoTruco, MotivoIlegal, Respuesta, TrucoError,
};

/// Fases de una partida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fase {
    /// Todavía no se ha repartido ninguna ronda.
    Inicial,
    /// Turno del jugador indicado.
    Turno(usize),
    /// Las dos cartas de la baza siguen en la mesa antes de pasar a la siguiente.
    MostrandoBaza { siguiente: usize },
    /// Se muestran los puntos del envido querido antes de seguir jugando.
    MostrandoEnvido { siguiente: usize },
    FinRonda,
    FinPartida { ganador: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accion {
    JugarCarta(usize),
    CantarTruco,
    ResponderTruco(Respuesta),
    CantarEnvido,
    ResponderEnvido(Respuesta),
}

impl Accion {
    const CANDIDATAS: [Accion; 10] = [
        Accion::JugarCarta(0),
        Accion::JugarCarta(1),
        Accion::JugarCarta(2),
        Accion::CantarTruco,
        Accion::ResponderTruco(Respuesta::Quiero),
        Accion::ResponderTruco(Respuesta::NoQuiero),
        Accion::ResponderTruco(Respuesta::Subir),
        Accion::CantarEnvido,
        Accion::ResponderEnvido(Respuesta::Quiero),
        Accion::ResponderEnvido(Respuesta::NoQuiero),
    ];
}

/// Estado completo de una partida de truco entre dos jugadores.
///
/// Todas las transiciones son funciones puras: reciben el estado actual y devuelven uno nuevo, o
/// un error que deja el estado original intacto. Cada transición incrementa la versión del
/// estado, lo que permite descartar decisiones tomadas sobre un estado anterior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partida {
    manos: [Mano; 2],
    manos_originales: [Mano; 2],
    muestra: Option<Carta>,
    resto: Vec<Carta>,
    cartas_en_mesa: [Option<Carta>; 2],
    bazas: ArrayVec<[Carta; 2], 3>,
    fase: Fase,
    truco: EstadoTruco,
    envido: EstadoEnvido,
    ronda: EstadoRonda,
    tantos: [u8; 2],
    flor: [bool; 2],
    carta_diferida: Option<usize>,
    puntos_para_ganar: u8,
    version: u64,
    mensaje: String,
}

impl Partida {
    pub const PUNTOS_PARA_GANAR: u8 = 15;
    pub const PUNTOS_FLOR: u8 = 3;

    /// Crea una partida sin repartir. `jugador_mano` sale en la primera ronda.
    pub fn new(puntos_para_ganar: u8, jugador_mano: usize, tantos: [u8; 2]) -> Self {
        Self {
            manos: [Mano::new(), Mano::new()],
            manos_originales: [Mano::new(), Mano::new()],
            muestra: None,
            resto: Vec::new(),
            cartas_en_mesa: [None, None],
            bazas: ArrayVec::new(),
            fase: Fase::Inicial,
            truco: EstadoTruco::Nada,
            envido: EstadoEnvido::Nada,
            ronda: EstadoRonda::new(jugador_mano % 2),
            tantos,
            flor: [false, false],
            carta_diferida: None,
            puntos_para_ganar,
            version: 0,
            mensaje: "La partida está comenzando...".to_owned(),
        }
    }

    /// Crea una partida sin repartir sorteando quién es mano en la primera ronda.
    pub fn new_random<R: Rng>(puntos_para_ganar: u8, rng: &mut R) -> Self {
        Self::new(puntos_para_ganar, rng.gen_range(0..2), [0, 0])
    }

    /// Continúa la numeración de versiones de otra partida para que las decisiones pedidas en
    /// una partida anterior no se confundan con las de esta.
    pub fn con_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn manos(&self) -> &[Mano; 2] {
        &self.manos
    }

    pub fn mano(&self, jugador: usize) -> &[Carta] {
        &self.manos[jugador]
    }

    pub fn manos_originales(&self) -> &[Mano; 2] {
        &self.manos_originales
    }

    pub fn muestra(&self) -> Option<&Carta> {
        self.muestra.as_ref()
    }

    pub fn resto(&self) -> &[Carta] {
        &self.resto
    }

    pub fn cartas_en_mesa(&self) -> &[Option<Carta>; 2] {
        &self.cartas_en_mesa
    }

    /// Bazas completas de la ronda en curso, con la carta de cada jugador.
    pub fn bazas(&self) -> &[[Carta; 2]] {
        &self.bazas
    }

    pub fn fase(&self) -> Fase {
        self.fase
    }

    pub fn truco(&self) -> &EstadoTruco {
        &self.truco
    }

    pub fn envido(&self) -> &EstadoEnvido {
        &self.envido
    }

    pub fn ronda(&self) -> &EstadoRonda {
        &self.ronda
    }

    pub fn tantos(&self) -> [u8; 2] {
        self.tantos
    }

    pub fn flor(&self) -> [bool; 2] {
        self.flor
    }

    pub fn carta_diferida(&self) -> Option<usize> {
        self.carta_diferida
    }

    pub fn puntos_para_ganar(&self) -> u8 {
        self.puntos_para_ganar
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mensaje(&self) -> &str {
        &self.mensaje
    }

    pub fn turno(&self) -> Option<usize> {
        match self.fase {
            Fase::Turno(j) => Some(j),
            _ => None,
        }
    }

    pub fn ganador(&self) -> Option<usize> {
        match self.fase {
            Fase::FinPartida { ganador } => Some(ganador),
            _ => None,
        }
    }

    /// Jugador que debe responder a un canto pendiente.
    pub fn apuesta_pendiente(&self) -> Option<usize> {
        match (self.truco, self.envido) {
            (EstadoTruco::Cantado { cantor, .. }, _) | (_, EstadoEnvido::Cantado { cantor }) => {
                Some(1 - cantor)
            }
            _ => None,
        }
    }

    /// Jugador del que se espera una decisión: quien debe responder a un canto o, si no hay
    /// ninguno pendiente, quien tiene el turno.
    pub fn jugador_que_decide(&self) -> Option<usize> {
        if !matches!(self.fase, Fase::Turno(_)) {
            return None;
        }
        self.apuesta_pendiente().or(self.turno())
    }

    /// Aplica una transición sobre una copia del estado. Si falla el estado original no cambia.
    fn transicion<F>(&self, f: F) -> Result<Partida, TrucoError>
    where
        F: FnOnce(&mut Partida) -> Result<(), TrucoError>,
    {
        let mut siguiente = self.clone();
        f(&mut siguiente)?;
        siguiente.version += 1;
        Ok(siguiente)
    }

    /// Reparte una nueva ronda con la baraja completa.
    pub fn nueva_ronda<R: Rng>(&self, rng: &mut R) -> Result<Partida, TrucoError> {
        self.comprobar_nueva_ronda()?;
        let reparto = Baraja::baraja_truco()
            .repartir_ronda(rng)
            .ok_or(MotivoIlegal::FaseIncorrecta)?;
        self.nueva_ronda_con_reparto(reparto)
    }

    /// Comienza una ronda con un reparto dado. Las flores se cantan automáticamente: cada jugador
    /// con flor gana sus tantos antes de jugar la primera carta.
    pub fn nueva_ronda_con_reparto(&self, reparto: Reparto) -> Result<Partida, TrucoError> {
        self.comprobar_nueva_ronda()?;
        let Reparto {
            manos,
            muestra,
            resto,
        } = reparto;
        for mano in &manos {
            if mano.len() != 3 {
                return Err(TrucoError::TamanoManoInvalido(mano.len()));
            }
        }
        let flor = [
            tiene_flor(&manos[0], &muestra)?,
            tiene_flor(&manos[1], &muestra)?,
        ];
        let jugador_mano = match self.fase {
            Fase::Inicial => self.ronda.jugador_mano,
            _ => 1 - self.ronda.jugador_mano,
        };

        self.transicion(|p| {
            p.manos_originales = manos.clone();
            p.manos = manos;
            p.muestra = Some(muestra);
            p.resto = resto;
            p.cartas_en_mesa = [None, None];
            p.bazas.clear();
            p.truco = EstadoTruco::Nada;
            p.envido = EstadoEnvido::Nada;
            p.ronda = EstadoRonda::new(jugador_mano);
            p.flor = flor;
            p.carta_diferida = None;
            p.fase = Fase::Turno(jugador_mano);
            p.mensaje = match flor {
                [true, true] => "Ambos jugadores cantan flor.".to_owned(),
                [true, false] => "El jugador 0 canta flor.".to_owned(),
                [false, true] => "El jugador 1 canta flor.".to_owned(),
                [false, false] => format!("Sale el jugador {jugador_mano}."),
            };
            info!(
                version = p.version + 1,
                jugador_mano,
                muestra = %muestra,
                "Nueva ronda"
            );
            for (jugador, _) in flor.iter().enumerate().filter(|(_, f)| **f) {
                info!(jugador, "Flor");
                p.sumar_tantos(jugador, Self::PUNTOS_FLOR);
            }
            p.comprobar_fin_partida();
            Ok(())
        })
    }

    fn comprobar_nueva_ronda(&self) -> Result<(), TrucoError> {
        match self.fase {
            Fase::Inicial | Fase::FinRonda => Ok(()),
            _ => Err(MotivoIlegal::FaseIncorrecta.into()),
        }
    }

    /// Aplica la acción de un jugador.
    pub fn actuar(&self, jugador: usize, accion: Accion) -> Result<Partida, TrucoError> {
        match accion {
            Accion::JugarCarta(idx) => self.jugar_carta(jugador, idx),
            Accion::CantarTruco => self.cantar_truco(jugador, None),
            Accion::ResponderTruco(r) => self.responder_truco(jugador, r),
            Accion::CantarEnvido => self.cantar_envido(jugador),
            Accion::ResponderEnvido(r) => self.responder_envido(jugador, r),
        }
    }

    /// Aplica una decisión tomada sobre la versión `version` del estado. Si el estado ha
    /// cambiado desde entonces la decisión se descarta.
    pub fn aplicar_decision(
        &self,
        version: u64,
        jugador: usize,
        accion: Accion,
    ) -> Result<Partida, TrucoError> {
        if version != self.version {
            return Err(MotivoIlegal::DecisionObsoleta(version).into());
        }
        self.actuar(jugador, accion)
    }

    /// Acciones que el jugador puede realizar en el estado actual.
    pub fn acciones_legales(&self, jugador: usize) -> Vec<Accion> {
        Accion::CANDIDATAS
            .into_iter()
            .filter(|a| self.actuar(jugador, *a).is_ok())
            .collect()
    }

    fn comprobar_turno(&self, jugador: usize) -> Result<(), MotivoIlegal> {
        match self.fase {
            Fase::Turno(j) if j == jugador => Ok(()),
            Fase::Turno(_) => Err(MotivoIlegal::NoEsSuTurno(jugador)),
            _ => Err(MotivoIlegal::FaseIncorrecta),
        }
    }

    fn comprobar_sin_apuestas(&self) -> Result<(), MotivoIlegal> {
        if self.truco.pendiente() || self.envido.pendiente() {
            return Err(MotivoIlegal::ApuestaPendiente);
        }
        Ok(())
    }

    pub fn jugar_carta(&self, jugador: usize, idx: usize) -> Result<Partida, TrucoError> {
        self.comprobar_turno(jugador)?;
        self.comprobar_sin_apuestas()?;
        if idx >= self.manos[jugador].len() {
            return Err(MotivoIlegal::IndiceFueraDeRango(idx).into());
        }
        self.transicion(|p| p.colocar_carta(jugador, idx))
    }

    /// Canta el siguiente nivel de truco. Si se indica `carta_diferida`, esa carta se juega
    /// automáticamente en cuanto el canto sea querido.
    pub fn cantar_truco(
        &self,
        jugador: usize,
        carta_diferida: Option<usize>,
    ) -> Result<Partida, TrucoError> {
        self.comprobar_turno(jugador)?;
        self.comprobar_sin_apuestas()?;
        if let Some(idx) = carta_diferida {
            if idx >= self.manos[jugador].len() {
                return Err(MotivoIlegal::IndiceFueraDeRango(idx).into());
            }
        }
        let truco = self.truco.cantar(jugador)?;
        self.transicion(|p| {
            p.truco = truco;
            p.carta_diferida = carta_diferida;
            if let EstadoTruco::Cantado { nivel, .. } = truco {
                debug!(version = p.version + 1, jugador, %nivel, "Canto de truco");
                p.mensaje = format!("El jugador {jugador} canta {nivel}.");
            }
            Ok(())
        })
    }

    pub fn responder_truco(
        &self,
        jugador: usize,
        respuesta: Respuesta,
    ) -> Result<Partida, TrucoError> {
        if !matches!(self.fase, Fase::Turno(_)) {
            return Err(MotivoIlegal::FaseIncorrecta.into());
        }
        let truco = self.truco.responder(jugador, respuesta)?;
        self.transicion(|p| {
            p.truco = truco;
            debug!(version = p.version + 1, jugador, ?respuesta, "Respuesta al truco");
            match truco {
                EstadoTruco::Querido { nivel, .. } => {
                    p.mensaje = format!("El jugador {jugador} quiere {nivel}.");
                    if let (Some(idx), Fase::Turno(t)) = (p.carta_diferida.take(), p.fase) {
                        p.colocar_carta(t, idx)?;
                    }
                }
                EstadoTruco::NoQuerido { nivel, cantor } => {
                    p.carta_diferida = None;
                    p.mensaje = format!(
                        "El jugador {jugador} no quiere {nivel}. El jugador {cantor} gana {} tantos.",
                        nivel.puntos_no_querido()
                    );
                    p.terminar_ronda(cantor, nivel.puntos_no_querido());
                }
                EstadoTruco::Cantado { nivel, .. } => {
                    p.mensaje = format!("El jugador {jugador} canta {nivel}.");
                }
                EstadoTruco::Nada => {}
            }
            Ok(())
        })
    }

    /// El envido sólo puede cantarse antes de jugar ninguna carta, sin truco cantado y si
    /// ninguno de los dos jugadores tiene flor.
    pub fn cantar_envido(&self, jugador: usize) -> Result<Partida, TrucoError> {
        self.comprobar_turno(jugador)?;
        self.comprobar_sin_apuestas()?;
        let hay_cartas_jugadas =
            !self.bazas.is_empty() || self.cartas_en_mesa.iter().any(Option::is_some);
        if hay_cartas_jugadas || self.truco != EstadoTruco::Nada || self.flor.contains(&true) {
            return Err(MotivoIlegal::EnvidoNoPermitido.into());
        }
        let envido = self.envido.cantar(jugador)?;
        self.transicion(|p| {
            p.envido = envido;
            debug!(version = p.version + 1, jugador, "Canto de envido");
            p.mensaje = format!("El jugador {jugador} canta envido.");
            Ok(())
        })
    }

    pub fn responder_envido(
        &self,
        jugador: usize,
        respuesta: Respuesta,
    ) -> Result<Partida, TrucoError> {
        if !matches!(self.fase, Fase::Turno(_)) {
            return Err(MotivoIlegal::FaseIncorrecta.into());
        }
        let Some(muestra) = self.muestra else {
            return Err(MotivoIlegal::FaseIncorrecta.into());
        };
        let puntos = [
            puntos_envido(&self.manos_originales[0], &muestra)?,
            puntos_envido(&self.manos_originales[1], &muestra)?,
        ];
        let envido = self.envido.responder(jugador, respuesta, puntos)?;
        self.transicion(|p| {
            p.envido = envido;
            let Some((ganador, tantos)) = envido.tantos() else {
                return Ok(());
            };
            info!(version = p.version + 1, ganador, tantos, ?respuesta, "Envido resuelto");
            p.sumar_tantos(ganador, tantos);
            match envido {
                EstadoEnvido::Querido { cantor, puntos, .. } => {
                    p.mensaje = format!(
                        "Envido querido: {} a {}. El jugador {ganador} gana {tantos} tantos.",
                        puntos[0], puntos[1]
                    );
                    p.fase = Fase::MostrandoEnvido { siguiente: cantor };
                }
                _ => {
                    p.mensaje = format!(
                        "El jugador {jugador} no quiere el envido. El jugador {ganador} gana {tantos} tanto."
                    );
                }
            }
            p.comprobar_fin_partida();
            Ok(())
        })
    }

    /// Pasa al siguiente turno después de mostrar una baza o los puntos del envido. En cualquier
    /// otra fase no hace nada, así que puede llamarse más de una vez sin riesgo.
    pub fn avanzar(&self) -> Result<Partida, TrucoError> {
        match self.fase {
            Fase::MostrandoBaza { siguiente } => self.transicion(|p| {
                p.cartas_en_mesa = [None, None];
                p.fase = Fase::Turno(siguiente);
                p.mensaje = format!("Turno del jugador {siguiente}.");
                Ok(())
            }),
            Fase::MostrandoEnvido { siguiente } => self.transicion(|p| {
                p.fase = Fase::Turno(siguiente);
                p.mensaje = format!("Turno del jugador {siguiente}.");
                Ok(())
            }),
            _ => Ok(self.clone()),
        }
    }

    /// Pone en la mesa la carta `idx` del jugador y resuelve la baza si ya estaba la del rival.
    fn colocar_carta(&mut self, jugador: usize, idx: usize) -> Result<(), TrucoError> {
        if idx >= self.manos[jugador].len() {
            return Err(MotivoIlegal::IndiceFueraDeRango(idx).into());
        }
        let muestra = self.muestra.ok_or(MotivoIlegal::FaseIncorrecta)?;
        let carta = self.manos[jugador].remove(idx);
        self.cartas_en_mesa[jugador] = Some(carta);
        self.mensaje = format!("El jugador {jugador} juega el {}.", carta.nombre());

        let [Some(c0), Some(c1)] = self.cartas_en_mesa else {
            self.fase = Fase::Turno(1 - jugador);
            return Ok(());
        };

        let ganador = if gana(&c0, &c1, &muestra) { 0 } else { 1 };
        self.bazas.push([c0, c1]);
        self.ronda.registrar_baza(ganador);
        debug!(baza = self.bazas.len(), %c0, %c1, ganador, "Baza resuelta");

        let sin_cartas = self.manos.iter().all(|m| m.is_empty());
        let ganador_ronda = self
            .ronda
            .ganador()
            .or_else(|| sin_cartas.then(|| self.ronda.lider()));
        match ganador_ronda {
            Some(g) => {
                let tantos = self.truco.puntos_ronda();
                self.mensaje = format!("El jugador {g} gana la ronda y suma {tantos} tantos.");
                self.terminar_ronda(g, tantos);
            }
            None => {
                self.mensaje = format!("El jugador {ganador} gana la baza.");
                self.fase = Fase::MostrandoBaza { siguiente: ganador };
            }
        }
        Ok(())
    }

    fn sumar_tantos(&mut self, jugador: usize, tantos: u8) {
        self.tantos[jugador] = self.tantos[jugador].saturating_add(tantos);
    }

    fn terminar_ronda(&mut self, ganador: usize, tantos: u8) {
        info!(ganador, tantos, marcador = ?self.tantos, "Fin de la ronda");
        self.sumar_tantos(ganador, tantos);
        self.carta_diferida = None;
        self.fase = Fase::FinRonda;
        self.comprobar_fin_partida();
    }

    /// Termina la partida si algún jugador ha llegado a los tantos necesarios. Si llegan los dos
    /// a la vez gana el que tenga más y, a igualdad, el mano de la ronda.
    fn comprobar_fin_partida(&mut self) {
        let objetivo = self.puntos_para_ganar;
        let ganador = match (self.tantos[0] >= objetivo, self.tantos[1] >= objetivo) {
            (false, false) => return,
            (true, false) => 0,
            (false, true) => 1,
            (true, true) => match self.tantos[0].cmp(&self.tantos[1]) {
                std::cmp::Ordering::Greater => 0,
                std::cmp::Ordering::Less => 1,
                std::cmp::Ordering::Equal => self.ronda.jugador_mano,
            },
        };
        info!(ganador, marcador = ?self.tantos, "Fin de la partida");
        self.carta_diferida = None;
        self.fase = Fase::FinPartida { ganador };
        self.mensaje = format!("El jugador {ganador} gana la partida.");
    }

    /// Información que puede ver un jugador: nunca incluye las cartas en mano del rival.
    pub fn vista(&self, jugador: usize) -> VistaJugador {
        VistaJugador {
            jugador,
            version: self.version,
            mano: self.manos[jugador].clone(),
            muestra: self.muestra,
            carta_rival: self.cartas_en_mesa[1 - jugador],
            bazas: self.bazas.to_vec(),
            fase: self.fase,
            truco: self.truco,
            envido: self.envido,
            ronda: self.ronda.clone(),
            tantos: self.tantos,
            acciones: self.acciones_legales(jugador),
        }
    }
}

/// Estado visible por un jugador, que es lo que recibe un agente para decidir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VistaJugador {
    pub jugador: usize,
    pub version: u64,
    pub mano: Mano,
    pub muestra: Option<Carta>,
    pub carta_rival: Option<Carta>,
    pub bazas: Vec<[Carta; 2]>,
    pub fase: Fase,
    pub truco: EstadoTruco,
    pub envido: EstadoEnvido,
    pub ronda: EstadoRonda,
    pub tantos: [u8; 2],
    pub acciones: Vec<Accion>,
}
