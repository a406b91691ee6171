use chrono::{DateTime, SubsecRound, Utc};

use crate::util::parser::RawEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New(DateTime<Utc>),
    Stale,
    Unclassifiable,
}

/// Sorts an entry against the last scan time.
///
/// An entry published exactly at `threshold` was already delivered by that scan.
pub fn classify(entry: &RawEntry, threshold: DateTime<Utc>) -> Classification {
    let Some(published) = entry.published.or(entry.updated) else {
        return Classification::Unclassifiable;
    };

    let published = published.trunc_subsecs(0);
    if published <= threshold {
        Classification::Stale
    } else {
        Classification::New(published)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn threshold() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn published(at: DateTime<Utc>) -> RawEntry {
        RawEntry {
            published: Some(at),
            ..RawEntry::default()
        }
    }

    #[test]
    fn entry_at_threshold_is_stale() {
        assert_eq!(classify(&published(threshold()), threshold()), Classification::Stale);
    }

    #[test]
    fn entry_one_second_later_is_new() {
        let at = threshold() + Duration::seconds(1);
        assert_eq!(classify(&published(at), threshold()), Classification::New(at));
    }

    #[test]
    fn subsecond_difference_is_stale() {
        let at = threshold() + Duration::milliseconds(400);
        assert_eq!(classify(&published(at), threshold()), Classification::Stale);
    }

    #[test]
    fn falls_back_to_updated() {
        let at = threshold() + Duration::hours(1);
        let entry = RawEntry {
            updated: Some(at),
            ..RawEntry::default()
        };
        assert_eq!(classify(&entry, threshold()), Classification::New(at));
    }

    #[test]
    fn published_wins_over_updated() {
        let entry = RawEntry {
            published: Some(threshold() - Duration::days(1)),
            updated: Some(threshold() + Duration::days(1)),
            ..RawEntry::default()
        };
        assert_eq!(classify(&entry, threshold()), Classification::Stale);
    }

    #[test]
    fn entry_without_dates_is_unclassifiable() {
        assert_eq!(
            classify(&RawEntry::default(), threshold()),
            Classification::Unclassifiable
        );
    }
}
