//! Partial date decomposition.
//!
//! Dates are stored as ISO 8601-style strings that may stop at any precision:
//! `"1975"`, `"1975-06"`, `"1975-06-21"`. A leading `-` marks a year BC.

/// A date whose components may each be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialDate {
  pub year:  Option<i32>,
  pub month: Option<i32>,
  pub day:   Option<i32>,
}

impl PartialDate {
  pub fn parse(date: Option<&str>) -> Self {
    let Some(date) = date.map(str::trim).filter(|d| !d.is_empty()) else {
      return Self::default();
    };

    let (negative, rest) = match date.as_bytes()[0] {
      b'-' => (true, &date[1..]),
      b'+' => (false, &date[1..]),
      _ => (false, date),
    };

    let mut parts = rest.split('-');
    let year = parts
      .next()
      .and_then(component)
      .map(|y| if negative { -y } else { y });
    // Zero is never a valid month or day.
    let month = parts.next().and_then(component).filter(|m| *m > 0);
    let day = parts.next().and_then(component).filter(|d| *d > 0);

    Self { year, month, day }
  }

  pub fn into_array(self) -> [Option<i32>; 3] { [self.year, self.month, self.day] }
}

fn component(part: &str) -> Option<i32> {
  if part.is_empty() {
    return None;
  }
  part.parse().ok()
}

/// Decompose a date string into `[year, month, day]`.
pub fn parse_date(date: Option<&str>) -> [Option<i32>; 3] {
  PartialDate::parse(date).into_array()
}
