//! Jerarquía de las cartas en el truco uruguayo con muestra.
//!
//! De mayor a menor fuerza hay tres clases de cartas: las piezas (cartas del palo de la muestra
//! con número 2, 4, 5, 10 u 11, más el rey de ese palo cuando la muestra es una pieza), las matas
//! (1 de espada, 1 de basto, 7 de espada y 7 de oro) y el resto de cartas comunes.

use std::cmp::Ordering;

use super::{Carta, Numero, Palo};

/// Números que convierten en pieza a una carta del palo de la muestra.
pub const NUMEROS_PIEZA: [Numero; 5] = [
    Numero::Dos,
    Numero::Cuatro,
    Numero::Cinco,
    Numero::Sota,
    Numero::Caballo,
];

/// Matas ordenadas de mayor a menor.
pub const MATAS: [Carta; 4] = [
    Carta::new(Numero::As, Palo::Espada),
    Carta::new(Numero::As, Palo::Basto),
    Carta::new(Numero::Siete, Palo::Espada),
    Carta::new(Numero::Siete, Palo::Oro),
];

/// Fuerza de una carta en una baza. El orden de las variantes es el de las clases: cualquier
/// pieza gana a cualquier mata y cualquier mata gana a cualquier carta común.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fuerza {
    /// Valor en la tabla de cartas comunes y desempate por palo.
    Comun(u8, u8),
    Mata(u8),
    Pieza(u8),
}

/// Devuelve el número con el que compite una pieza, o None si la carta no es pieza. El rey del
/// palo de la muestra ocupa el lugar de la muestra cuando ésta es una pieza.
pub fn numero_pieza(carta: &Carta, muestra: &Carta) -> Option<Numero> {
    if carta.palo != muestra.palo {
        return None;
    }
    if NUMEROS_PIEZA.contains(&carta.numero) {
        Some(carta.numero)
    } else if carta.numero == Numero::Rey && NUMEROS_PIEZA.contains(&muestra.numero) {
        Some(muestra.numero)
    } else {
        None
    }
}

pub fn es_pieza(carta: &Carta, muestra: &Carta) -> bool {
    numero_pieza(carta, muestra).is_some()
}

pub fn es_mata(carta: &Carta) -> bool {
    MATAS.contains(carta)
}

fn valor_pieza(numero: Numero) -> u8 {
    match numero {
        Numero::Dos => 5,
        Numero::Cuatro => 4,
        Numero::Cinco => 3,
        Numero::Sota => 2,
        _ => 1,
    }
}

fn valor_comun(numero: Numero) -> u8 {
    match numero {
        Numero::Tres => 13,
        Numero::Dos => 12,
        Numero::As => 11,
        Numero::Rey => 10,
        Numero::Caballo => 9,
        Numero::Sota => 8,
        Numero::Siete => 7,
        Numero::Seis => 6,
        Numero::Cinco => 5,
        Numero::Cuatro => 4,
    }
}

// Sólo desempata cartas comunes del mismo número.
fn desempate_palo(palo: Palo) -> u8 {
    match palo {
        Palo::Espada => 3,
        Palo::Basto => 2,
        Palo::Oro => 1,
        Palo::Copa => 0,
    }
}

pub fn fuerza(carta: &Carta, muestra: &Carta) -> Fuerza {
    if let Some(numero) = numero_pieza(carta, muestra) {
        return Fuerza::Pieza(valor_pieza(numero));
    }
    if let Some(posicion) = MATAS.iter().position(|m| m == carta) {
        return Fuerza::Mata((MATAS.len() - posicion) as u8);
    }
    Fuerza::Comun(valor_comun(carta.numero), desempate_palo(carta.palo))
}

pub fn compara(a: &Carta, b: &Carta, muestra: &Carta) -> Ordering {
    fuerza(a, muestra).cmp(&fuerza(b, muestra))
}

/// Devuelve true si la carta `a` gana a la carta `b` con la muestra dada. Para dos cartas
/// distintas (y distintas de la muestra) siempre gana exactamente una de las dos.
pub fn gana(a: &Carta, b: &Carta, muestra: &Carta) -> bool {
    compara(a, b, muestra) == Ordering::Greater
}
