use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    process::{Child, ChildStdin, ChildStdout, Command},
};
use tracing::warn;

use super::ArenaError;
use crate::truco::{Accion, NivelTruco, Respuesta, TrucoError, VistaJugador};

/// Canto al que tiene que responder un agente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oferta {
    Truco(NivelTruco),
    Envido,
}

/// Lo que quiere hacer un agente en su turno. Si canta truco y elige carta, la carta se juega en
/// cuanto el rival quiera el truco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionJugada {
    pub carta: Option<usize>,
    #[serde(default)]
    pub truco: bool,
    #[serde(default)]
    pub envido: bool,
}

impl DecisionJugada {
    pub fn carta(idx: usize) -> Self {
        Self {
            carta: Some(idx),
            ..Default::default()
        }
    }
}

/// Quien decide las jugadas de un jugador. Cualquier error se trata como agente no disponible y
/// la arena juega por él una acción legal al azar.
#[async_trait]
pub trait Agent: Send {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError>;

    async fn decidir_respuesta(
        &mut self,
        vista: &VistaJugador,
        oferta: Oferta,
    ) -> Result<Respuesta, TrucoError>;

    /// Tiempo máximo que la arena espera a este agente. None si no hay límite o si el agente
    /// controla su propio tiempo.
    fn limite_tiempo(&self, por_defecto: Duration) -> Option<Duration> {
        Some(por_defecto)
    }
}

/// Agente que elige al azar entre las acciones legales.
#[derive(Debug, Clone)]
pub struct AgenteAleatorio {
    rng: StdRng,
}

impl AgenteAleatorio {
    pub fn new(semilla: Option<u64>) -> Self {
        let rng = match semilla {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

#[async_trait]
impl Agent for AgenteAleatorio {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError> {
        let accion = vista
            .acciones
            .choose(&mut self.rng)
            .ok_or_else(|| TrucoError::AdvisorNoDisponible("sin acciones legales".to_owned()))?;
        let carta = (!vista.mano.is_empty()).then(|| self.rng.gen_range(0..vista.mano.len()));
        Ok(match accion {
            Accion::JugarCarta(idx) => DecisionJugada::carta(*idx),
            Accion::CantarTruco => DecisionJugada {
                carta,
                truco: true,
                envido: false,
            },
            Accion::CantarEnvido => DecisionJugada {
                carta,
                truco: false,
                envido: true,
            },
            _ => DecisionJugada {
                carta,
                ..Default::default()
            },
        })
    }

    async fn decidir_respuesta(
        &mut self,
        vista: &VistaJugador,
        _oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        let respuestas: Vec<Respuesta> = vista
            .acciones
            .iter()
            .filter_map(|a| match a {
                Accion::ResponderTruco(r) | Accion::ResponderEnvido(r) => Some(*r),
                _ => None,
            })
            .collect();
        respuestas
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| TrucoError::AdvisorNoDisponible("nada que responder".to_owned()))
    }
}

/// Agente para un jugador humano que decide desde el terminal.
#[derive(Debug, Clone, Default)]
pub struct AgenteCli;

impl AgenteCli {
    pub fn new() -> Self {
        Self
    }

    async fn leer_opcion(num_opciones: usize) -> Result<usize, TrucoError> {
        loop {
            let linea = tokio::task::spawn_blocking(|| {
                let mut input = String::new();
                std::io::stdin().read_line(&mut input).map(|_| input)
            })
            .await
            .map_err(|e| TrucoError::AdvisorNoDisponible(e.to_string()))?
            .map_err(|e| TrucoError::AdvisorNoDisponible(e.to_string()))?;
            if linea.is_empty() {
                return Err(TrucoError::AdvisorNoDisponible(
                    "entrada cerrada".to_owned(),
                ));
            }
            match linea.trim().parse::<usize>() {
                Ok(n) if n < num_opciones => return Ok(n),
                _ => println!("Opción no válida."),
            }
        }
    }
}

#[async_trait]
impl Agent for AgenteCli {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError> {
        println!("Elija una acción:");
        for (i, accion) in vista.acciones.iter().enumerate() {
            let texto = match accion {
                Accion::JugarCarta(idx) => match vista.mano.get(*idx) {
                    Some(c) => format!("Jugar el {}", c.nombre()),
                    None => format!("{accion:?}"),
                },
                Accion::CantarTruco => match vista.truco.nivel().and_then(|n| n.siguiente()) {
                    Some(nivel) => format!("Cantar {nivel}"),
                    None => "Cantar truco".to_owned(),
                },
                Accion::CantarEnvido => "Cantar envido".to_owned(),
                _ => format!("{accion:?}"),
            };
            println!("{i}: {texto}");
        }
        let n = Self::leer_opcion(vista.acciones.len()).await?;
        Ok(match vista.acciones[n] {
            Accion::JugarCarta(idx) => DecisionJugada::carta(idx),
            Accion::CantarTruco => DecisionJugada {
                truco: true,
                ..Default::default()
            },
            Accion::CantarEnvido => DecisionJugada {
                envido: true,
                ..Default::default()
            },
            _ => DecisionJugada::default(),
        })
    }

    async fn decidir_respuesta(
        &mut self,
        _vista: &VistaJugador,
        oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        let mut opciones = vec![Respuesta::Quiero, Respuesta::NoQuiero];
        match oferta {
            Oferta::Truco(nivel) => {
                println!("Te cantan {nivel}. ¿Qué respondes?");
                if let Some(siguiente) = nivel.siguiente() {
                    opciones.push(Respuesta::Subir);
                    println!("0: Quiero\n1: No quiero\n2: {siguiente}");
                } else {
                    println!("0: Quiero\n1: No quiero");
                }
            }
            Oferta::Envido => {
                println!("Te cantan envido. ¿Qué respondes?\n0: Quiero\n1: No quiero")
            }
        }
        let n = Self::leer_opcion(opciones.len()).await?;
        Ok(opciones[n])
    }

    fn limite_tiempo(&self, _por_defecto: Duration) -> Option<Duration> {
        None
    }
}

#[derive(Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
enum Peticion<'a> {
    Jugada {
        vista: &'a VistaJugador,
    },
    Respuesta {
        vista: &'a VistaJugador,
        oferta: Oferta,
    },
}

#[derive(Deserialize)]
struct RespuestaProceso<T> {
    version: u64,
    decision: T,
}

/// Agente externo que se ejecuta como un proceso aparte. Por cada decisión recibe por su entrada
/// estándar una línea JSON con la petición y debe contestar con una línea
/// `{"version": <versión de la vista>, "decision": ...}`. Las respuestas con una versión anterior
/// a la de la petición en curso se descartan.
///
/// El límite de tiempo sólo cuenta mientras se espera la respuesta: la petición siempre se
/// escribe completa.
pub struct AgenteProceso {
    _hijo: Child,
    entrada: ChildStdin,
    salida: Lines<BufReader<ChildStdout>>,
    limite: Duration,
}

fn no_disponible(err: impl std::fmt::Display) -> TrucoError {
    TrucoError::AdvisorNoDisponible(err.to_string())
}

impl AgenteProceso {
    pub fn new(programa: &str, args: &[String], limite: Duration) -> Result<Self, ArenaError> {
        let mut hijo = Command::new(programa)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ArenaError::AdvisorProcess(err, programa.to_owned()))?;
        let sin_tuberia = || {
            ArenaError::AdvisorProcess(std::io::ErrorKind::BrokenPipe.into(), programa.to_owned())
        };
        let entrada = hijo.stdin.take().ok_or_else(sin_tuberia)?;
        let salida = BufReader::new(hijo.stdout.take().ok_or_else(sin_tuberia)?).lines();
        Ok(Self {
            _hijo: hijo,
            entrada,
            salida,
            limite,
        })
    }

    async fn consultar<T: DeserializeOwned>(
        &mut self,
        peticion: &Peticion<'_>,
        version: u64,
    ) -> Result<T, TrucoError> {
        let mut linea = serde_json::to_string(peticion).map_err(no_disponible)?;
        linea.push('\n');
        self.entrada
            .write_all(linea.as_bytes())
            .await
            .map_err(no_disponible)?;
        self.entrada.flush().await.map_err(no_disponible)?;
        tokio::time::timeout(self.limite, self.leer_respuesta(version))
            .await
            .map_err(|_| no_disponible("tiempo agotado"))?
    }

    /// Lee respuestas hasta dar con la de `version`. Si se agota el tiempo, la respuesta tardía
    /// queda en la tubería y se descarta en la siguiente consulta.
    async fn leer_respuesta<T: DeserializeOwned>(&mut self, version: u64) -> Result<T, TrucoError> {
        loop {
            let Some(linea) = self.salida.next_line().await.map_err(no_disponible)? else {
                return Err(no_disponible("el proceso ha terminado"));
            };
            let respuesta: RespuestaProceso<T> =
                serde_json::from_str(&linea).map_err(no_disponible)?;
            if respuesta.version == version {
                return Ok(respuesta.decision);
            }
            if respuesta.version > version {
                return Err(no_disponible(format!(
                    "versión desconocida {}",
                    respuesta.version
                )));
            }
            warn!(
                respuesta.version,
                version, "Respuesta de una petición anterior descartada"
            );
        }
    }
}

#[async_trait]
impl Agent for AgenteProceso {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError> {
        self.consultar(&Peticion::Jugada { vista }, vista.version)
            .await
    }

    async fn decidir_respuesta(
        &mut self,
        vista: &VistaJugador,
        oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        self.consultar(&Peticion::Respuesta { vista, oferta }, vista.version)
            .await
    }

    fn limite_tiempo(&self, _por_defecto: Duration) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truco::{Partida, baraja::Reparto, carta::cartas};

    fn vista_inicial() -> VistaJugador {
        let reparto = Reparto {
            manos: [
                cartas("1e 3b 4c").unwrap().into_iter().collect(),
                cartas("7o 5b 6c").unwrap().into_iter().collect(),
            ],
            muestra: "12o".try_into().unwrap(),
            resto: vec![],
        };
        Partida::new(15, 0, [0, 0])
            .nueva_ronda_con_reparto(reparto)
            .unwrap()
            .vista(0)
    }

    #[tokio::test]
    async fn aleatorio_elige_acciones_legales() {
        let vista = vista_inicial();
        let mut agente = AgenteAleatorio::new(Some(1));
        for _ in 0..50 {
            let d = agente.decidir_jugada(&vista).await.unwrap();
            assert!(d.carta.is_some_and(|c| c < 3));
        }
    }

    #[tokio::test]
    async fn aleatorio_sin_nada_que_responder() {
        let vista = vista_inicial();
        let mut agente = AgenteAleatorio::new(Some(1));
        assert!(matches!(
            agente.decidir_respuesta(&vista, Oferta::Envido).await,
            Err(TrucoError::AdvisorNoDisponible(_))
        ));
    }

    #[test]
    fn decision_desde_json() {
        let d: DecisionJugada = serde_json::from_str(r#"{"carta": 2, "truco": true}"#).unwrap();
        assert_eq!(
            d,
            DecisionJugada {
                carta: Some(2),
                truco: true,
                envido: false
            }
        );
    }

    #[test]
    fn peticion_etiquetada() {
        let vista = vista_inicial();
        let json = serde_json::to_string(&Peticion::Respuesta {
            vista: &vista,
            oferta: Oferta::Truco(NivelTruco::Retruco),
        })
        .unwrap();
        assert!(json.starts_with(r#"{"tipo":"respuesta""#));
        assert!(json.contains(r#""oferta":{"Truco":"Retruco"}"#));
    }
}
