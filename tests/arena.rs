use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use trucosolver::truco::{
    Accion, MotivoIlegal, Partida, Respuesta, TrucoError, VistaJugador,
    arena::{
        ActionRecorder, Agent, AgenteAleatorio, AgenteProceso, ArenaConfig, ArenaError,
        DecisionJugada, Oferta, RegistroPartida, TrucoAction, TrucoArena,
    },
};

struct AgenteQueFalla;

#[async_trait]
impl Agent for AgenteQueFalla {
    async fn decidir_jugada(
        &mut self,
        _vista: &VistaJugador,
    ) -> Result<DecisionJugada, TrucoError> {
        Err(TrucoError::AdvisorNoDisponible("sin conexión".to_owned()))
    }

    async fn decidir_respuesta(
        &mut self,
        _vista: &VistaJugador,
        _oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        Err(TrucoError::AdvisorNoDisponible("sin conexión".to_owned()))
    }
}

struct AgenteLento;

#[async_trait]
impl Agent for AgenteLento {
    async fn decidir_jugada(
        &mut self,
        _vista: &VistaJugador,
    ) -> Result<DecisionJugada, TrucoError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(DecisionJugada::carta(0))
    }

    async fn decidir_respuesta(
        &mut self,
        _vista: &VistaJugador,
        _oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Respuesta::Quiero)
    }
}

/// Siempre pide cosas imposibles: una carta que no existe y subir el envido.
struct AgenteMalformado;

#[async_trait]
impl Agent for AgenteMalformado {
    async fn decidir_jugada(
        &mut self,
        _vista: &VistaJugador,
    ) -> Result<DecisionJugada, TrucoError> {
        Ok(DecisionJugada::carta(7))
    }

    async fn decidir_respuesta(
        &mut self,
        _vista: &VistaJugador,
        oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        Ok(match oferta {
            Oferta::Envido => Respuesta::Subir,
            Oferta::Truco(_) => Respuesta::Quiero,
        })
    }
}

/// Canta todo lo que puede y juega siempre la última carta.
struct AgenteCantor;

#[async_trait]
impl Agent for AgenteCantor {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError> {
        Ok(DecisionJugada {
            carta: vista.mano.len().checked_sub(1),
            truco: true,
            envido: true,
        })
    }

    async fn decidir_respuesta(
        &mut self,
        _vista: &VistaJugador,
        _oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        Ok(Respuesta::Quiero)
    }
}

/// Juega al azar y apunta la versión de cada vista que recibe.
struct AgenteEspia {
    agente: AgenteAleatorio,
    versiones: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl Agent for AgenteEspia {
    async fn decidir_jugada(&mut self, vista: &VistaJugador) -> Result<DecisionJugada, TrucoError> {
        self.versiones.lock().unwrap().push(vista.version);
        self.agente.decidir_jugada(vista).await
    }

    async fn decidir_respuesta(
        &mut self,
        vista: &VistaJugador,
        oferta: Oferta,
    ) -> Result<Respuesta, TrucoError> {
        self.versiones.lock().unwrap().push(vista.version);
        self.agente.decidir_respuesta(vista, oferta).await
    }
}

/// Advisor de shell que contesta a cada petición con su misma versión: quiere todo lo que le
/// cantan y juega siempre la primera carta. La primera respuesta llega con `retraso` segundos.
const ADVISOR_SH: &str = r#"
retraso="$1"
while IFS= read -r linea; do
    version=$(printf '%s\n' "$linea" | sed -n 's/.*"version":\([0-9]*\).*/\1/p')
    case "$linea" in
        *'"tipo":"respuesta"'*) decision='"Quiero"' ;;
        *) decision='{"carta":0}' ;;
    esac
    if [ -n "$retraso" ]; then
        sleep "$retraso"
        retraso=""
    fi
    printf '{"version":%s,"decision":%s}\n' "$version" "$decision"
done
"#;

fn advisor_sh(retraso: &str, limite: Duration) -> AgenteProceso {
    let args = [
        "-c".to_owned(),
        ADVISOR_SH.to_owned(),
        "advisor".to_owned(),
        retraso.to_owned(),
    ];
    AgenteProceso::new("sh", &args, limite).unwrap()
}

fn arena(semilla: u64, rival: Box<dyn Agent>) -> (TrucoArena, ActionRecorder) {
    let config = ArenaConfig {
        semilla: Some(semilla),
        timeout_agente_ms: 20,
        ..Default::default()
    };
    let mut arena = TrucoArena::new(config);
    arena.agents.push(rival);
    arena
        .agents
        .push(Box::new(AgenteAleatorio::new(Some(semilla))));
    let recorder = ActionRecorder::new();
    arena.kibitzers.push(Box::new(recorder.clone()));
    (arena, recorder)
}

/// Comprueba que el historial empieza y acaba bien y que los tantos anunciados suman el
/// marcador final.
fn comprobar_historial(partida: &Partida, recorder: &ActionRecorder) -> Vec<TrucoAction> {
    let history = recorder.history();
    let history = history.lock().unwrap().clone();
    assert!(matches!(history.first(), Some(TrucoAction::GameStart(_))));
    assert_eq!(
        history.last(),
        Some(&TrucoAction::GameEnd(partida.ganador().unwrap()))
    );
    let mut tantos = [0u8; 2];
    for action in &history {
        if let TrucoAction::Payoff(j, t) = action {
            tantos[*j] += t;
        }
    }
    assert_eq!(tantos, partida.tantos());
    assert!(partida.tantos()[partida.ganador().unwrap()] >= 15);
    history
}

#[tokio::test]
async fn partidas_entre_aleatorios() {
    for semilla in 0..10 {
        let (mut arena, recorder) = arena(semilla, Box::new(AgenteAleatorio::new(Some(100))));
        let partida = arena.start().await.unwrap();
        let history = comprobar_historial(&partida, &recorder);
        assert!(
            !history
                .iter()
                .any(|a| matches!(a, TrucoAction::Fallback(..)))
        );
    }
}

#[tokio::test]
async fn agente_que_falla_juega_al_azar() {
    let (mut arena, recorder) = arena(3, Box::new(AgenteQueFalla));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        history
            .iter()
            .any(|a| matches!(a, TrucoAction::Fallback(0, _)))
    );
    assert!(
        !history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, _)))
    );
}

#[tokio::test]
async fn agente_lento_agota_el_tiempo() {
    let (mut arena, recorder) = arena(4, Box::new(AgenteLento));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        history
            .iter()
            .filter(|a| matches!(a, TrucoAction::Fallback(..)))
            .all(|a| matches!(a, TrucoAction::Fallback(0, _)))
    );
}

#[tokio::test]
async fn agente_malformado_no_rompe_la_partida() {
    let (mut arena, recorder) = arena(5, Box::new(AgenteMalformado));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        !history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, Accion::JugarCarta(7))))
    );
    assert!(
        !history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, Accion::ResponderEnvido(_))))
    );
}

#[tokio::test]
async fn cantor_canta_envido_antes_que_truco() {
    let (mut arena, recorder) = arena(6, Box::new(AgenteCantor));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, Accion::CantarTruco)))
    );
    for pares in history.windows(2) {
        if let [TrucoAction::DealHand(1, _), TrucoAction::PlayerAction(0, accion)] = pares {
            assert!(matches!(accion, Accion::CantarEnvido | Accion::CantarTruco));
        }
    }
}

#[tokio::test]
async fn proceso_que_no_responde_json() {
    let config = ArenaConfig {
        semilla: Some(8),
        timeout_agente_ms: 500,
        ..Default::default()
    };
    let mut arena = TrucoArena::new(config);
    arena
        .agents
        .push(Box::new(AgenteProceso::new("cat", &[], Duration::from_millis(500)).unwrap()));
    arena.agents.push(Box::new(AgenteAleatorio::new(Some(8))));
    let recorder = ActionRecorder::new();
    arena.kibitzers.push(Box::new(recorder.clone()));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        !history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, _)))
    );
}

#[tokio::test]
async fn respuesta_tardia_del_proceso_descartada() {
    let (mut arena, recorder) = arena(10, Box::new(advisor_sh("0.4", Duration::from_millis(250))));
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    let primera = history
        .iter()
        .position(|a| matches!(a, TrucoAction::Fallback(0, _) | TrucoAction::PlayerAction(0, _)))
        .unwrap();
    assert!(matches!(history[primera], TrucoAction::Fallback(0, _)));
    // Tras descartar la respuesta tardía el advisor vuelve a decidir.
    assert!(
        history[primera + 1..]
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, _)))
    );
    let fallbacks = history
        .iter()
        .filter(|a| matches!(a, TrucoAction::Fallback(0, _)))
        .count();
    assert!(fallbacks <= 2, "{fallbacks} decisiones al azar");
}

#[tokio::test]
async fn proceso_reutilizado_en_dos_partidas() {
    let (mut arena, recorder) = arena(11, Box::new(advisor_sh("0.4", Duration::from_millis(250))));
    arena.start().await.unwrap();
    let partida = arena.start().await.unwrap();
    let history = comprobar_historial(&partida, &recorder);
    assert!(
        history
            .iter()
            .any(|a| matches!(a, TrucoAction::PlayerAction(0, _)))
    );
    assert!(
        !history
            .iter()
            .any(|a| matches!(a, TrucoAction::Fallback(0, _)))
    );
}

#[tokio::test]
async fn versiones_crecen_entre_partidas() {
    let versiones = Arc::new(Mutex::new(Vec::new()));
    let espia = AgenteEspia {
        agente: AgenteAleatorio::new(Some(12)),
        versiones: versiones.clone(),
    };
    let (mut arena, _recorder) = arena(12, Box::new(espia));
    let primera = arena.start().await.unwrap();
    let vistas_primera = versiones.lock().unwrap().len();
    let segunda = arena.start().await.unwrap();
    assert!(segunda.version() > primera.version());
    let versiones = versiones.lock().unwrap();
    assert!(versiones.len() > vistas_primera);
    assert!(versiones.windows(2).all(|v| v[0] < v[1]));
    assert!(versiones[vistas_primera] > primera.version());
}

#[tokio::test]
async fn proceso_inexistente() {
    assert!(matches!(
        AgenteProceso::new("/no/existe/advisor", &[], Duration::from_secs(1)),
        Err(ArenaError::AdvisorProcess(_, _))
    ));
}

#[tokio::test]
async fn registro_de_varias_partidas() {
    let (mut arena, recorder) = arena(9, Box::new(AgenteAleatorio::new(Some(9))));
    let registro = RegistroPartida::new();
    arena.kibitzers.push(Box::new(registro.clone()));
    arena.start().await.unwrap();
    let partida = arena.start().await.unwrap();
    comprobar_historial(&partida, &recorder);
    let eventos = registro.eventos();
    let inicios = eventos
        .iter()
        .filter(|e| matches!(e.accion, TrucoAction::GameStart(_)))
        .count();
    assert_eq!(inicios, 2);
    assert_eq!(
        eventos.last().map(|e| e.tantos),
        Some(partida.tantos())
    );
}

#[test]
fn decision_obsoleta_descartada() {
    let mut rng = StdRng::seed_from_u64(1);
    let partida = Partida::new(15, 0, [0, 0]).nueva_ronda(&mut rng).unwrap();
    let version = partida.version();
    let siguiente = partida.jugar_carta(0, 0).unwrap();
    assert!(matches!(
        siguiente.aplicar_decision(version, 1, Accion::JugarCarta(0)),
        Err(TrucoError::JugadaIlegal(MotivoIlegal::DecisionObsoleta(v))) if v == version
    ));
    assert!(
        siguiente
            .aplicar_decision(siguiente.version(), 1, Accion::JugarCarta(0))
            .is_ok()
    );
}
