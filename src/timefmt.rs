use chrono::Datelike;

/// Distinguished failure values for the time/date codecs. Callers check the
/// result before committing anything, so a malformed entry never leaves a
/// half-normalized value behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("not a 4-digit military time: {0}")]
    Military(String),
    #[error("not an HH:MM AM/PM time: {0}")]
    Standard(String),
    #[error("not a start-end time range: {0}")]
    Range(String),
    #[error("unrecognized time entry: {0}")]
    Entry(String),
    #[error("unrecognized date entry: {0}")]
    Date(String),
}

impl TimeError {
    /// Stable error-kind tag for the IPC envelope. Message wording is the
    /// host UI's problem.
    pub fn code(&self) -> &'static str {
        match self {
            TimeError::Military(_) => "invalid_military_time",
            TimeError::Standard(_) => "invalid_standard_time",
            TimeError::Range(_) => "invalid_time_range",
            TimeError::Entry(_) => "invalid_time",
            TimeError::Date(_) => "invalid_date",
        }
    }
}

/// Which bare hours read as morning when an entry carries no AM/PM marker.
/// The default window suits school hours: 6 through 11 is morning, anything
/// else is afternoon. Deployments can widen or shift it over IPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeridiemPolicy {
    pub am_start: u32,
    pub am_end: u32,
}

impl Default for MeridiemPolicy {
    fn default() -> Self {
        Self {
            am_start: 6,
            am_end: 11,
        }
    }
}

impl MeridiemPolicy {
    fn assume_am(&self, hour: u32) -> bool {
        hour >= self.am_start && hour <= self.am_end
    }
}

/// Years a resolved date may land in. The backend stores school records,
/// not genealogy; anything outside this window is a typo.
const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2099;

/// "1345" -> "01:45PM". Input must be exactly 4 digits in [0000, 2359].
pub fn to_standard(military: &str) -> Result<String, TimeError> {
    if military.len() != 4 || !military.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::Military(military.to_string()));
    }
    let raw: u32 = military
        .parse()
        .map_err(|_| TimeError::Military(military.to_string()))?;
    if raw > 2359 {
        return Err(TimeError::Military(military.to_string()));
    }

    let suffix = if raw >= 1200 { "PM" } else { "AM" };
    let mut v = if raw >= 1200 { raw - 1200 } else { raw };
    // The 12 o'clock hour is stored as 00xx on the wire; displayed as 12:xx.
    if v < 100 {
        v += 1200;
    }
    Ok(format!("{:02}:{:02}{}", v / 100, v % 100, suffix))
}

/// "01:45PM" -> "1345". Input must be the fixed 7-character display shape.
pub fn to_military(standard: &str) -> Result<String, TimeError> {
    let bad = || TimeError::Standard(standard.to_string());

    let b = standard.as_bytes();
    if b.len() != 7 || b[2] != b':' {
        return Err(bad());
    }
    let digits = |s: &str| s.bytes().all(|c| c.is_ascii_digit());
    let (hh, mm, suffix) = (&standard[0..2], &standard[3..5], &standard[5..7]);
    if !digits(hh) || !digits(mm) {
        return Err(bad());
    }
    let hour: u32 = hh.parse().map_err(|_| bad())?;
    let minute: u32 = mm.parse().map_err(|_| bad())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(bad());
    }
    let pm = match suffix {
        "AM" => false,
        "PM" => true,
        _ => return Err(bad()),
    };

    // 12 is the wire's 0 hour; PM then pushes the afternoon forward by 12.
    let mut h = if hour == 12 { 0 } else { hour };
    if pm {
        h += 12;
    }
    Ok(format!("{:02}{:02}", h, minute))
}

/// Two military values -> a "-"-joined display range.
pub fn to_standard_range(start: &str, end: &str) -> Result<String, TimeError> {
    Ok(format!("{}-{}", to_standard(start)?, to_standard(end)?))
}

/// A "-"-joined display range -> the (start, end) military pair.
pub fn to_military_range(range: &str) -> Result<(String, String), TimeError> {
    let Some((start, end)) = range.split_once('-') else {
        return Err(TimeError::Range(range.to_string()));
    };
    Ok((to_military(start)?, to_military(end)?))
}

/// Freeform time entry -> canonical Standard form.
///
/// Accepts what admin staff actually type: "9", "1:30", "9:35am", "2 PM",
/// "11:15 a". Case and spaces are ignored. Without a colon the whole entry
/// is the hour; without an AM/PM marker the policy window decides.
pub fn parse_entry(input: &str, policy: MeridiemPolicy) -> Result<String, TimeError> {
    let bad = || TimeError::Entry(input.to_string());

    let mut t: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let mut explicit_pm: Option<bool> = None;
    if t.ends_with("AM") || t.ends_with("PM") {
        explicit_pm = Some(t.ends_with("PM"));
        t.truncate(t.len() - 2);
    } else if t.ends_with('A') || t.ends_with('P') {
        explicit_pm = Some(t.ends_with('P'));
        t.truncate(t.len() - 1);
    }

    let (hour_part, minute_part) = match t.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (t.as_str(), None),
    };
    if hour_part.is_empty() || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let hour: u32 = hour_part.parse().map_err(|_| bad())?;
    if hour > 12 {
        return Err(bad());
    }

    let minute: u32 = match minute_part {
        None => 0,
        Some(m) => {
            if m.len() != 2 || !m.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            let m: u32 = m.parse().map_err(|_| bad())?;
            if m > 59 {
                return Err(bad());
            }
            m
        }
    };

    let pm = match explicit_pm {
        Some(pm) => pm,
        None => !policy.assume_am(hour),
    };
    // Standard hours run 01-12; a bare 0 is the 12 o'clock hour.
    let hour = if hour == 0 { 12 } else { hour };
    Ok(format!(
        "{:02}:{:02}{}",
        hour,
        minute,
        if pm { "PM" } else { "AM" }
    ))
}

/// Freeform date entry -> "MM/DD/YYYY", pivoting 2-digit years on the
/// current year rather than a frozen cutoff.
pub fn parse_date(input: &str) -> Result<String, TimeError> {
    parse_date_with_pivot(input, chrono::Local::now().year().rem_euclid(100))
}

/// Pivot-explicit variant so tests stay deterministic. A 2-digit year
/// strictly above the pivot lands in the 1900s, otherwise the 2000s.
pub fn parse_date_with_pivot(input: &str, pivot: i32) -> Result<String, TimeError> {
    let bad = || TimeError::Date(input.to_string());

    let parts: Vec<&str> = input.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return Err(bad());
    }
    let month: u32 = parts[0].trim().parse().map_err(|_| bad())?;
    let day: u32 = parts[1].trim().parse().map_err(|_| bad())?;
    let mut year: i32 = parts[2].trim().parse().map_err(|_| bad())?;

    if !(1..=12).contains(&month) {
        return Err(bad());
    }
    // Day is range-checked only; month length is the backend's concern.
    if !(1..=32).contains(&day) {
        return Err(bad());
    }
    if (0..100).contains(&year) {
        year += if year > pivot { 1900 } else { 2000 };
    }
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(bad());
    }

    Ok(format!("{:02}/{:02}/{:04}", month, day, year))
}

/// Fixed weekday code, or None for anything that isn't a weekday name.
pub fn day_abbrev(day: &str) -> Option<&'static str> {
    let code = match day.to_ascii_lowercase().as_str() {
        "monday" => "M",
        "tuesday" => "T",
        "wednesday" => "W",
        "thursday" => "H",
        "friday" => "F",
        "saturday" => "Sa",
        "sunday" => "Su",
        _ => return None,
    };
    Some(code)
}

/// Concatenated weekday codes in input order. Unknown names are skipped;
/// a day set the backend garbled still yields a usable (if short) prefix.
pub fn encode_days<S: AsRef<str>>(days: &[S]) -> String {
    days.iter()
        .filter_map(|d| day_abbrev(d.as_ref()))
        .collect()
}
