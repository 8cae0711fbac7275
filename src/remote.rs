use serde::Serialize;

/// Состояние удалённого вызова вместо разрозненных флагов loading/error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Remote<T> {
    Pending,
    Success(T),
    Failure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_status_tag() {
        assert_eq!(serde_json::to_value(Remote::<bool>::Pending).unwrap(), json!({"status": "pending"}));
        assert_eq!(
            serde_json::to_value(Remote::Success(true)).unwrap(),
            json!({"status": "success", "value": true})
        );
        assert_eq!(
            serde_json::to_value(Remote::<bool>::Failure("Seat taken".into())).unwrap(),
            json!({"status": "failure", "value": "Seat taken"})
        );
    }
}
