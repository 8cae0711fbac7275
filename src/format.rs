use chrono::NaiveDateTime;

const START_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Длительность сеанса: "2h 5m", "2h" или "45m".
pub fn format_duration(minutes: i32) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (h, m) if h >= 1 && m >= 1 => format!("{h}h {m}m"),
        (h, _) if h >= 1 => format!("{h}h"),
        (_, m) => format!("{m}m"),
    }
}

/// "2024-05-06 - 18:30"
pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d - %H:%M").to_string()
}

pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Форматирует строку времени от сервера; нераспознанное отдаём как есть.
pub fn format_start_time(raw: &str) -> String {
    parse_start_time(raw)
        .map(|value| format_date_time(&value))
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_labels() {
        assert_eq!(format_duration(125), "2h 5m");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(0), "0m");
    }

    #[test]
    fn start_time_variants() {
        assert_eq!(format_start_time("2024-05-06T18:30:00"), "2024-05-06 - 18:30");
        assert_eq!(format_start_time("2024-05-06T18:30"), "2024-05-06 - 18:30");
        assert_eq!(format_start_time("2024-05-06T09:05:00.250000"), "2024-05-06 - 09:05");
        assert_eq!(format_start_time("tomorrow"), "tomorrow");
    }
}
