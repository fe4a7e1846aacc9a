use chrono::{Datelike, NaiveDate, Weekday};

pub fn french_weekday(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "lundi",
        Weekday::Tue => "mardi",
        Weekday::Wed => "mercredi",
        Weekday::Thu => "jeudi",
        Weekday::Fri => "vendredi",
        Weekday::Sat => "samedi",
        Weekday::Sun => "dimanche",
    }
}

/// The three historical observation dates: J-7, J-14 and J-365.
pub fn history_dates(target: NaiveDate) -> [NaiveDate; 3] {
    [
        target - chrono::Duration::days(7),
        target - chrono::Duration::days(14),
        target - chrono::Duration::days(365),
    ]
}
