//! Cálculo de los puntos de envido y detección de flor.

use itertools::Itertools;

use super::jerarquia::numero_pieza;
use super::{Carta, Numero, TrucoError};

/// Máximo de puntos de envido que puede sumar una mano.
pub const ENVIDO_MAXIMO: u8 = 33;

/// Puntos que suma una carta sin tener en cuenta la muestra. Las figuras valen cero.
fn valor_envido(carta: &Carta) -> u8 {
    match carta.numero {
        Numero::Sota | Numero::Caballo | Numero::Rey => 0,
        n => n.valor(),
    }
}

fn valor_pieza_envido(numero: Numero) -> u8 {
    match numero {
        Numero::Dos => 30,
        Numero::Cuatro => 29,
        Numero::Cinco => 28,
        Numero::Sota | Numero::Caballo => 27,
        _ => 0,
    }
}

fn comprobar_tamano(mano: &[Carta]) -> Result<(), TrucoError> {
    if mano.len() != 3 {
        return Err(TrucoError::TamanoManoInvalido(mano.len()));
    }
    Ok(())
}

/// Devuelve los puntos de envido de una mano de tres cartas.
///
/// Con una única pieza se suma su valor especial a la mejor de las otras dos cartas. Si no, dos o
/// tres cartas del mismo palo suman su valor más 20 y, sin cartas del mismo palo, cuenta la carta
/// más alta. El resultado nunca supera [`ENVIDO_MAXIMO`].
pub fn puntos_envido(mano: &[Carta], muestra: &Carta) -> Result<u8, TrucoError> {
    comprobar_tamano(mano)?;

    let piezas: Vec<(usize, Numero)> = mano
        .iter()
        .enumerate()
        .filter_map(|(i, c)| numero_pieza(c, muestra).map(|n| (i, n)))
        .collect();

    let puntos = if let [(idx, numero)] = piezas[..] {
        let mejor_resto = mano
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, c)| valor_envido(c))
            .max()
            .unwrap_or(0);
        valor_pieza_envido(numero) + mejor_resto
    } else {
        let por_palo = mano.iter().into_group_map_by(|c| c.palo);
        match por_palo.values().find(|grupo| grupo.len() >= 2) {
            Some(grupo) => grupo.iter().map(|c| valor_envido(c)).sum::<u8>() + 20,
            None => mano.iter().map(valor_envido).max().unwrap_or(0),
        }
    };

    Ok(puntos.min(ENVIDO_MAXIMO))
}

/// Indica si una mano tiene flor. Una mano vacía no tiene flor; cualquier otro tamaño distinto
/// de tres cartas es un error.
pub fn tiene_flor(mano: &[Carta], muestra: &Carta) -> Result<bool, TrucoError> {
    if mano.is_empty() {
        return Ok(false);
    }
    comprobar_tamano(mano)?;

    if mano.iter().map(|c| c.palo).all_equal() {
        return Ok(true);
    }

    let (piezas, resto): (Vec<&Carta>, Vec<&Carta>) = mano
        .iter()
        .partition(|c| numero_pieza(c, muestra).is_some());
    Ok(match piezas.len() {
        0 => false,
        1 => resto.iter().map(|c| c.palo).all_equal(),
        _ => true,
    })
}
