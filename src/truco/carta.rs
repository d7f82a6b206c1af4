use serde::{Deserialize, Serialize};

use super::truco_error::TrucoError;

/// Palos de la baraja española.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palo {
    Oro,
    Basto,
    Espada,
    Copa,
}

impl Palo {
    pub const TODOS: [Palo; 4] = [Palo::Oro, Palo::Copa, Palo::Espada, Palo::Basto];

    pub fn nombre(&self) -> &'static str {
        match self {
            Palo::Oro => "oro",
            Palo::Basto => "basto",
            Palo::Espada => "espada",
            Palo::Copa => "copa",
        }
    }
}

impl From<&Palo> for char {
    fn from(other: &Palo) -> char {
        match other {
            Palo::Oro => 'o',
            Palo::Basto => 'b',
            Palo::Espada => 'e',
            Palo::Copa => 'c',
        }
    }
}

impl TryFrom<char> for Palo {
    type Error = TrucoError;

    fn try_from(other: char) -> Result<Self, Self::Error> {
        match other.to_ascii_lowercase() {
            'o' => Ok(Palo::Oro),
            'b' => Ok(Palo::Basto),
            'e' => Ok(Palo::Espada),
            'c' => Ok(Palo::Copa),
            _ => Err(TrucoError::CaracterNoValido(other)),
        }
    }
}

/// Números de la baraja española de 40 cartas (sin ochos ni nueves).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Numero {
    As = 1,
    Dos = 2,
    Tres = 3,
    Cuatro = 4,
    Cinco = 5,
    Seis = 6,
    Siete = 7,
    Sota = 10,
    Caballo = 11,
    Rey = 12,
}

impl Numero {
    pub const TODOS: [Numero; 10] = [
        Numero::As,
        Numero::Dos,
        Numero::Tres,
        Numero::Cuatro,
        Numero::Cinco,
        Numero::Seis,
        Numero::Siete,
        Numero::Sota,
        Numero::Caballo,
        Numero::Rey,
    ];

    /// Valor facial de la carta.
    pub fn valor(&self) -> u8 {
        *self as u8
    }
}

impl From<Numero> for u8 {
    fn from(other: Numero) -> u8 {
        other.valor()
    }
}

impl TryFrom<u8> for Numero {
    type Error = TrucoError;

    fn try_from(other: u8) -> Result<Self, Self::Error> {
        Numero::TODOS
            .into_iter()
            .find(|n| n.valor() == other)
            .ok_or_else(|| TrucoError::CartaNoValida(other.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Carta {
    pub numero: Numero,
    pub palo: Palo,
}

impl Carta {
    pub const fn new(numero: Numero, palo: Palo) -> Self {
        Self { numero, palo }
    }

    /// Nombre completo de la carta, por ejemplo "1 de espada".
    pub fn nombre(&self) -> String {
        format!("{} de {}", self.numero.valor(), self.palo.nombre())
    }
}

impl std::fmt::Display for Carta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.numero.valor(), char::from(&self.palo))
    }
}

/// Admite el formato compacto usado al mostrar cartas: número seguido de la inicial del palo
/// ("1e", "12o", "7b").
impl TryFrom<&str> for Carta {
    type Error = TrucoError;

    fn try_from(other: &str) -> Result<Self, Self::Error> {
        let s = other.trim();
        let inicial = s
            .chars()
            .last()
            .ok_or_else(|| TrucoError::CartaNoValida(other.to_owned()))?;
        let palo = Palo::try_from(inicial)?;
        let numero: u8 = s[..s.len() - inicial.len_utf8()]
            .parse()
            .map_err(|_| TrucoError::CartaNoValida(other.to_owned()))?;
        Ok(Carta::new(Numero::try_from(numero)?, palo))
    }
}

/// Convierte una lista de cartas separadas por espacios ("1e 5e 12e").
pub fn cartas(s: &str) -> Result<Vec<Carta>, TrucoError> {
    s.split_whitespace().map(Carta::try_from).collect()
}
