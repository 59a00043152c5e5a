/// Win rate in whole percent over settled predictions.
/// Zero when nothing has settled yet.
pub fn win_rate(won: u32, lost: u32) -> u32 {
    let completed = u64::from(won) + u64::from(lost);
    if completed == 0 {
        return 0;
    }
    ((won as f64 / completed as f64) * 100.0).round() as u32
}

/// Badge text for a team: first letter of each word, at most three, upper-cased.
pub fn team_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(3)
        .collect::<String>()
        .to_uppercase()
}

/// A bin id counts as configured once the placeholder has been replaced by a real id.
pub fn is_bin_configured(bin_id: &str) -> bool {
    !bin_id.is_empty() && !bin_id.contains("YOUR_BIN_ID") && bin_id.len() > 10
}

/// Validate team name format
pub fn validate_team_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= 100
}

/// Decimal odds must be a finite number above zero
pub fn validate_odds(odds: f64) -> bool {
    odds.is_finite() && odds > 0.0
}

/// Validate a "YYYY-MM-DD" match date
pub fn validate_match_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Validate a "HH:MM" or "HH:MM:SS" kick-off time
pub fn validate_match_time(time: &str) -> bool {
    chrono::NaiveTime::parse_from_str(time, "%H:%M:%S").is_ok()
        || chrono::NaiveTime::parse_from_str(time, "%H:%M").is_ok()
}

/// "Oct 19 • 08:00 PM" for the card header, raw text when the wall clock does not parse.
pub fn format_kickoff(date: &str, time: &str) -> String {
    let parsed_date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d");
    let parsed_time = chrono::NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| chrono::NaiveTime::parse_from_str(time, "%H:%M"));

    match (parsed_date, parsed_time) {
        (Ok(d), Ok(t)) => format!("{} • {}", d.format("%b %-d"), t.format("%I:%M %p")),
        _ => format!("{} {}", date, time).trim().to_string(),
    }
}
