use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Денежная сумма в центах.
///
/// API кинотеатров отдаёт цену числом (`12.5`), клиенту мы отдаём строку
/// с двумя знаками (`"12.50"`), чтобы не тащить в браузер float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Переводит сумму в основных единицах (долларах) в центы с округлением.
    pub fn from_major(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn times(self, count: usize) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Money(self.0.saturating_mul(count))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMoney {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawMoney::deserialize(deserializer)? {
            RawMoney::Number(amount) => Ok(Money::from_major(amount)),
            RawMoney::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Money::from_major)
                .map_err(|_| serde::de::Error::custom(format!("invalid amount '{text}'"))),
        }
    }
}
