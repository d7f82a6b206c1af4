use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use trucosolver::truco::arena::{
    ActionRecorder, Agent, AgenteAleatorio, AgenteProceso, ArenaConfig, ArenaError,
    RegistroPartida, TrucoAction, TrucoArena,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Número de partidas a simular.
    #[arg(short, long, default_value_t = 1)]
    partidas: usize,

    /// Fichero JSON con la configuración de la arena.
    #[arg(short, long)]
    config: Option<String>,

    /// Semilla del generador aleatorio. Sustituye a la del fichero de configuración.
    #[arg(short, long)]
    semilla: Option<u64>,

    /// Tantos necesarios para ganar la partida.
    #[arg(long)]
    puntos: Option<u8>,

    /// Fichero CSV donde escribir el resultado de cada partida.
    #[arg(long)]
    csv: Option<String>,

    /// Fichero JSON donde guardar todos los eventos de las partidas.
    #[arg(short, long)]
    registro: Option<String>,

    /// Programa externo que juega como jugador 0. Si no se indica juegan dos agentes aleatorios.
    #[arg(short, long)]
    advisor: Option<String>,

    /// Argumentos para el programa externo.
    #[arg(last = true)]
    advisor_args: Vec<String>,
}

#[derive(Serialize)]
struct Fila {
    partida: usize,
    ganador: usize,
    tantos_0: u8,
    tantos_1: u8,
    rondas: usize,
    fallbacks: usize,
}

fn resumen(partida: usize, recorder: &ActionRecorder) -> Option<Fila> {
    let history = recorder.history();
    let history = history.lock().ok()?;
    let mut fila = Fila {
        partida,
        ganador: 0,
        tantos_0: 0,
        tantos_1: 0,
        rondas: 0,
        fallbacks: 0,
    };
    for action in history.iter() {
        match action {
            TrucoAction::DealHand(0, _) => fila.rondas += 1,
            TrucoAction::Fallback(..) => fila.fallbacks += 1,
            TrucoAction::Payoff(0, t) => fila.tantos_0 += t,
            TrucoAction::Payoff(_, t) => fila.tantos_1 += t,
            TrucoAction::GameEnd(g) => fila.ganador = *g,
            _ => {}
        }
    }
    Some(fila)
}

async fn simular(args: Args) -> Result<(), ArenaError> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };
    if args.semilla.is_some() {
        config.semilla = args.semilla;
    }
    if let Some(puntos) = args.puntos {
        config.puntos_para_ganar = puntos;
    }

    let semilla_agentes = config.semilla;
    let mut arena = TrucoArena::new(config);
    let jugador_0: Box<dyn Agent> = match &args.advisor {
        Some(programa) => Box::new(AgenteProceso::new(
            programa,
            &args.advisor_args,
            arena.config().timeout_agente(),
        )?),
        None => Box::new(AgenteAleatorio::new(semilla_agentes)),
    };
    arena.agents.push(jugador_0);
    arena
        .agents
        .push(Box::new(AgenteAleatorio::new(semilla_agentes.map(|s| s.wrapping_add(1)))));

    let recorder = ActionRecorder::new();
    arena.kibitzers.push(Box::new(recorder.clone()));
    let registro = RegistroPartida::new();
    if args.registro.is_some() {
        arena.kibitzers.push(Box::new(registro.clone()));
    }
    let mut csv_writer = match &args.csv {
        Some(path) => Some(csv::Writer::from_path(path)?),
        None => None,
    };

    println!("Trucosolver 0.1");
    println!("Partidas: {}", args.partidas);
    let now = Instant::now();
    let pb = ProgressBar::new(args.partidas as u64);
    pb.set_style(
        ProgressStyle::with_template("{wide_bar:40.cyan/blue} {human_pos}/{human_len} {msg} ")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    let mut victorias = [0usize; 2];
    for i in 0..args.partidas {
        let partida = arena.start().await?;
        if let Some(ganador) = partida.ganador() {
            victorias[ganador] += 1;
        }
        if let (Some(writer), Some(fila)) = (csv_writer.as_mut(), resumen(i, &recorder)) {
            writer.serialize(fila)?;
        }
        pb.inc(1);
        pb.set_message(format!("Victorias: {}-{}", victorias[0], victorias[1]));
    }
    pb.finish();
    if let (Some(writer), Some(path)) = (csv_writer.as_mut(), &args.csv) {
        writer
            .flush()
            .map_err(|err| ArenaError::InvalidRecordPath(err, path.clone()))?;
    }
    if let Some(path) = &args.registro {
        registro.to_file(path)?;
    }
    println!("Elapsed: {:.2?}", now.elapsed());
    println!("Victorias: {} - {}", victorias[0], victorias[1]);
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(err) = simular(args).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
