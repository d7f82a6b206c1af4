use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use trucosolver::truco::arena::{
    AgenteAleatorio, AgenteCli, AgenteProceso, ArenaConfig, ArenaError, KibitzerCli, TrucoArena,
};

#[derive(Debug, ValueEnum, Clone, PartialEq)]
enum AgentType {
    Cli,
    Random,
    Proceso,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Agentes que juegan como jugador 0 y jugador 1.
    #[arg(short, long, num_args = 2, default_values = ["cli", "random"], value_enum)]
    agents: Vec<AgentType>,

    /// Fichero JSON con la configuración de la arena.
    #[arg(short, long)]
    config: Option<String>,

    /// Tantos necesarios para ganar la partida.
    #[arg(long)]
    puntos: Option<u8>,

    /// Milisegundos que se muestran las cartas de cada baza en la mesa.
    #[arg(long, default_value_t = 1500)]
    pausa: u64,

    /// Número de partidas. Si no se indica se juega hasta cerrar el programa.
    #[arg(short, long)]
    partidas: Option<usize>,

    /// Programa que se usa para los agentes de tipo proceso.
    #[arg(long)]
    advisor: Option<String>,

    /// Argumentos para el programa externo.
    #[arg(last = true)]
    advisor_args: Vec<String>,
}

async fn jugar(args: Args) -> Result<(), ArenaError> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(puntos) = args.puntos {
        config.puntos_para_ganar = puntos;
    }
    config.pausa_baza_ms = args.pausa;
    let semilla = config.semilla;

    let mut arena = TrucoArena::new(config);
    let mut cli_player = 0;
    for (i, agent) in args.agents.iter().enumerate() {
        match agent {
            AgentType::Cli => {
                arena.agents.push(Box::new(AgenteCli::new()));
                cli_player = i;
            }
            AgentType::Random => arena.agents.push(Box::new(AgenteAleatorio::new(
                semilla.map(|s| s.wrapping_add(i as u64)),
            ))),
            AgentType::Proceso => {
                let Some(programa) = &args.advisor else {
                    eprintln!("Falta el programa del agente externo (--advisor).");
                    process::exit(2);
                };
                let limite = arena.config().timeout_agente();
                arena.agents.push(Box::new(AgenteProceso::new(
                    programa,
                    &args.advisor_args,
                    limite,
                )?));
            }
        }
    }
    arena.kibitzers.push(Box::new(KibitzerCli::new(cli_player)));

    let mut jugadas = 0;
    while args.partidas.map_or(true, |n| jugadas < n) {
        arena.start().await?;
        jugadas += 1;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(err) = jugar(args).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
