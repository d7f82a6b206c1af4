use std::cmp::Ordering;

use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use trucosolver::truco::{
    Baraja, Carta, Fase, Numero, Palo, Partida,
    envido::{ENVIDO_MAXIMO, puntos_envido, tiene_flor},
    jerarquia::{compara, gana},
};

fn carta() -> impl Strategy<Value = Carta> {
    (0..Numero::TODOS.len(), 0..Palo::TODOS.len())
        .prop_map(|(n, p)| Carta::new(Numero::TODOS[n], Palo::TODOS[p]))
}

/// Tres cartas distintas: las dos primeras para comparar y la última como muestra.
fn tres_cartas() -> impl Strategy<Value = (Carta, Carta, Carta)> {
    (carta(), carta(), carta()).prop_filter("cartas repetidas", |(a, b, m)| {
        a != b && a != m && b != m
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Entre dos cartas distintas siempre gana exactamente una.
    #[test]
    fn prop_jerarquia_antisimetrica((a, b, muestra) in tres_cartas()) {
        prop_assert_ne!(gana(&a, &b, &muestra), gana(&b, &a, &muestra));
        prop_assert_eq!(compara(&a, &b, &muestra), compara(&b, &a, &muestra).reverse());
        prop_assert_ne!(compara(&a, &b, &muestra), Ordering::Equal);
    }

    #[test]
    fn prop_jerarquia_transitiva((a, b, muestra) in tres_cartas(), c in carta()) {
        prop_assume!(c != a && c != b && c != muestra);
        if gana(&a, &b, &muestra) && gana(&b, &c, &muestra) {
            prop_assert!(gana(&a, &c, &muestra));
        }
    }

    /// Cualquier reparto da manos con envido entre 0 y 33, y tres cartas del mismo palo son
    /// siempre flor.
    #[test]
    fn prop_envido_en_rango(semilla in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(semilla);
        let reparto = Baraja::baraja_truco().repartir_ronda(&mut rng).unwrap();
        for mano in &reparto.manos {
            prop_assert!(!mano.contains(&reparto.muestra));
            let envido = puntos_envido(mano, &reparto.muestra).unwrap();
            prop_assert!(envido <= ENVIDO_MAXIMO);
            if mano.iter().all(|c| c.palo == mano[0].palo) {
                prop_assert!(tiene_flor(mano, &reparto.muestra).unwrap());
            }
        }
    }

    /// Recorre partidas completas eligiendo siempre una acción legal al azar: todas las
    /// acciones enumeradas se aceptan, el rival del que decide no puede actuar, los tantos
    /// nunca bajan y la partida termina.
    #[test]
    fn prop_acciones_legales_aceptadas(semilla in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(semilla);
        let mut partida = Partida::new_random(15, &mut rng);
        let mut terminada = false;
        for _ in 0..5000 {
            let tantos = partida.tantos();
            let version = partida.version();
            partida = match partida.fase() {
                Fase::Inicial | Fase::FinRonda => partida.nueva_ronda(&mut rng).unwrap(),
                Fase::MostrandoBaza { .. } | Fase::MostrandoEnvido { .. } => {
                    partida.avanzar().unwrap()
                }
                Fase::Turno(_) => {
                    let jugador = partida.jugador_que_decide().unwrap();
                    let acciones = partida.acciones_legales(jugador);
                    prop_assert!(!acciones.is_empty());
                    prop_assert!(partida.acciones_legales(1 - jugador).is_empty());
                    for accion in &acciones {
                        prop_assert!(partida.actuar(jugador, *accion).is_ok());
                    }
                    let accion = acciones[rng.gen_range(0..acciones.len())];
                    partida.aplicar_decision(version, jugador, accion).unwrap()
                }
                Fase::FinPartida { ganador } => {
                    prop_assert!(partida.tantos()[ganador] >= 15);
                    terminada = true;
                    break;
                }
            };
            prop_assert_eq!(partida.version(), version + 1);
            prop_assert!(partida.tantos()[0] >= tantos[0]);
            prop_assert!(partida.tantos()[1] >= tantos[1]);
        }
        prop_assert!(terminada);
    }
}
