use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::cv_parser::models::WorkExperience;

const NUMERIC_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const MONTH_YEAR_FORMATS: [&str; 2] = ["%d %B %Y", "%d %b %Y"];
const ONGOING_MARKERS: [&str; 3] = ["present", "current", "now"];

/// Trims, drops empties, and removes case-insensitive duplicates keeping the
/// first spelling.
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter_map(|s| {
            let skill = s.as_ref().trim();
            (!skill.is_empty() && seen.insert(skill.to_lowercase())).then(|| skill.to_string())
        })
        .collect()
}

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY`, `DD-MM-YYYY`,
/// `Month YYYY`, `Mon YYYY` and `YYYY`. Partial dates resolve to the first day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = NUMERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }

    let with_day = format!("1 {s}");
    if let Some(date) = MONTH_YEAR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_day, fmt).ok())
    {
        return Some(date);
    }

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }

    None
}

/// Total months across roles, in years, one decimal. Current roles and
/// "Present"-style end dates run to `today`; roles with an unreadable start
/// or end are skipped.
pub fn calculate_experience_years(experience: &[WorkExperience], today: NaiveDate) -> f64 {
    let total_months: i64 = experience
        .iter()
        .filter_map(|role| {
            let start = parse_date(role.start_date.as_deref()?)?;
            let end = match role.end_date.as_deref().map(str::trim) {
                _ if role.is_current => today,
                None | Some("") => today,
                Some(raw) if is_ongoing(raw) => today,
                Some(raw) => parse_date(raw)?,
            };
            Some(months_between(start, end).max(0))
        })
        .sum();

    (total_months as f64 / 12.0 * 10.0).round() / 10.0
}

fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    i64::from(end.year() - start.year()) * 12 + i64::from(end.month()) - i64::from(start.month())
}

fn is_ongoing(raw: &str) -> bool {
    ONGOING_MARKERS
        .iter()
        .any(|m| raw.eq_ignore_ascii_case(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn role(start: Option<&str>, end: Option<&str>, current: bool) -> WorkExperience {
        WorkExperience {
            company: "Acme".into(),
            role: "Engineer".into(),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            is_current: current,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_skills_keeps_first_spelling() {
        let skills = normalize_skills([" Python ", "python", "", "SQL", "PYTHON", "  "]);
        assert_eq!(skills, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-03-15"), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("2021/03/15"), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("15/03/2021"), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("15-03-2021"), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("March 2021"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_date("Mar 2021"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_date("2021"), Some(ymd(2021, 1, 1)));
        assert_eq!(parse_date("Present"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_numeric_dates_in_both_orders() {
        assert_eq!(parse_date("2021/04/03"), Some(ymd(2021, 4, 3)));
        assert_eq!(parse_date("03/04/2021"), Some(ymd(2021, 4, 3)));
        assert_eq!(parse_date("31/12/2021"), Some(ymd(2021, 12, 31)));
        assert_eq!(parse_date("12/31/2021"), None);
    }

    #[test]
    fn test_experience_years_sums_roles() {
        let today = ymd(2024, 6, 1);
        let roles = vec![
            role(Some("2018-01-01"), Some("2020-01-01"), false), // 24
            role(Some("Jan 2020"), Some("Present"), false),      // 53
            role(Some("2023"), None, true),                      // 17
            role(None, Some("2019"), false),                     // skipped
        ];
        // 94 months
        assert_eq!(calculate_experience_years(&roles, today), 7.8);
    }

    #[test]
    fn test_experience_years_ignores_inverted_ranges() {
        let today = ymd(2024, 6, 1);
        let roles = vec![role(Some("2022-01-01"), Some("2020-01-01"), false)];
        assert_eq!(calculate_experience_years(&roles, today), 0.0);
    }
}
