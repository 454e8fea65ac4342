//! Timesheet grouping and volume aggregation.
//!
//! Every grouping here keeps keys in the order they first appear in the
//! input. Volumes are summed as exact decimals.

use crate::error::{Result, TimegroupError};
use crate::models::{DayGroup, GroupResult, MismatchField, RepresentativeMismatch, TimesheetLine};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Partition items by key, keeping first-seen key order.
///
/// Items within a bucket keep their input order.
pub fn group_first_seen<'a, T, K, I, F>(items: I, key_fn: F) -> Vec<(K, Vec<&'a T>)>
where
    T: 'a,
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut grouped: Vec<(K, Vec<&'a T>)> = Vec::new();

    for item in items {
        let key = key_fn(item);
        match positions.get(&key) {
            Some(&pos) => grouped[pos].1.push(item),
            None => {
                positions.insert(key.clone(), grouped.len());
                grouped.push((key, vec![item]));
            }
        }
    }

    grouped
}

/// Group lines by rate code and total the volume of each group.
pub fn group_by_rate_code(lines: &[TimesheetLine]) -> Vec<GroupResult> {
    let groups = summarise_rate_codes(lines);
    debug!("Grouped {} lines into {} rate codes", lines.len(), groups.len());
    groups
}

/// Group lines by day, then by rate code within each day.
pub fn group_by_day_then_rate_code(lines: &[TimesheetLine]) -> Vec<DayGroup> {
    let days: Vec<DayGroup> = group_by_day(lines)
        .into_iter()
        .map(|(day, day_lines)| DayGroup {
            day,
            lines: summarise_rate_codes(day_lines),
        })
        .collect();

    debug!(
        "Grouped {} lines into {} days and {} rows",
        lines.len(),
        days.len(),
        row_count(&days)
    );
    days
}

/// Group lines by day without aggregating.
pub fn group_by_day(lines: &[TimesheetLine]) -> Vec<(NaiveDate, Vec<&TimesheetLine>)> {
    group_first_seen(lines, |line| line.day)
}

fn summarise_rate_codes<'a, I>(lines: I) -> Vec<GroupResult>
where
    I: IntoIterator<Item = &'a TimesheetLine>,
{
    group_first_seen(lines, |line| line.rate_code.as_str())
        .into_iter()
        .filter_map(|(rate_code, members)| {
            // First line wins for the representative values.
            let first = members.first()?;
            Some(GroupResult {
                rate_code: rate_code.to_string(),
                total_volume: members.iter().map(|line| line.volume).sum(),
                rate_description: first.rate_description.clone(),
                rate: first.rate,
            })
        })
        .collect()
}

/// Exact sum of volume across all input lines.
pub fn total_volume(lines: &[TimesheetLine]) -> Decimal {
    lines.iter().map(|line| line.volume).sum()
}

/// Exact sum of volume across all groups.
pub fn total_grouped_volume(groups: &[GroupResult]) -> Decimal {
    groups.iter().map(|group| group.total_volume).sum()
}

/// Number of (day, rate code) rows in a nested grouping.
pub fn row_count(days: &[DayGroup]) -> usize {
    days.iter().map(|day| day.lines.len()).sum()
}

/// Find lines whose description or rate differs from the first line seen
/// for the same rate code.
///
/// Grouping never fails on these; callers decide whether to warn or reject.
pub fn find_representative_mismatches(lines: &[TimesheetLine]) -> Vec<RepresentativeMismatch> {
    let mut representatives: HashMap<&str, &TimesheetLine> = HashMap::new();
    let mut mismatches = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let first = *representatives
            .entry(line.rate_code.as_str())
            .or_insert(line);

        if first.rate_description != line.rate_description {
            mismatches.push(RepresentativeMismatch {
                rate_code: line.rate_code.clone(),
                line_index: index,
                field: MismatchField::RateDescription,
                expected: first.rate_description.clone(),
                found: line.rate_description.clone(),
            });
        }

        if first.rate != line.rate {
            mismatches.push(RepresentativeMismatch {
                rate_code: line.rate_code.clone(),
                line_index: index,
                field: MismatchField::Rate,
                expected: first.rate.to_string(),
                found: line.rate.to_string(),
            });
        }
    }

    mismatches
}

/// Reject input where lines sharing a rate code disagree on description or rate.
pub fn ensure_consistent(lines: &[TimesheetLine]) -> Result<()> {
    let mismatches = find_representative_mismatches(lines);
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(TimegroupError::InconsistentGroups(mismatches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_lines;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn create_test_line(
        day: u32,
        code: &str,
        description: &str,
        rate: &str,
        volume: &str,
    ) -> TimesheetLine {
        TimesheetLine::new(date(day), code, description, dec(rate), dec(volume))
    }

    #[test]
    fn test_group_by_rate_code_sample() {
        let groups = group_by_rate_code(&sample_lines());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rate_code, "ST");
        assert_eq!(groups[0].total_volume, dec("50.5"));
        assert_eq!(groups[0].rate_description, "Standard Rate");
        assert_eq!(groups[0].rate, dec("21.00"));
        assert_eq!(groups[1].rate_code, "OV");
        assert_eq!(groups[1].total_volume, dec("30.99"));
        assert_eq!(groups[1].rate, dec("31.00"));
    }

    #[test]
    fn test_group_by_day_then_rate_code_sample() {
        let days = group_by_day_then_rate_code(&sample_lines());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, date(1));
        assert_eq!(days[0].lines.len(), 1);
        assert_eq!(days[0].lines[0].rate_code, "ST");
        assert_eq!(days[0].lines[0].total_volume, dec("30.3"));

        assert_eq!(days[1].day, date(2));
        assert_eq!(days[1].lines.len(), 2);
        assert_eq!(days[1].lines[0].rate_code, "ST");
        assert_eq!(days[1].lines[0].total_volume, dec("20.2"));
        assert_eq!(days[1].lines[1].rate_code, "OV");
        assert_eq!(days[1].lines[1].total_volume, dec("30.99"));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_rate_code(&[]).is_empty());
        assert!(group_by_day_then_rate_code(&[]).is_empty());
        assert!(find_representative_mismatches(&[]).is_empty());
        assert_eq!(total_volume(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_first_seen_order() {
        let lines = vec![
            create_test_line(3, "OV", "Overtime", "31", "1"),
            create_test_line(1, "ST", "Standard", "21", "2"),
            create_test_line(2, "DT", "Double", "42", "3"),
            create_test_line(1, "OV", "Overtime", "31", "4"),
            create_test_line(3, "ST", "Standard", "21", "5"),
        ];

        let codes: Vec<_> = group_by_rate_code(&lines)
            .into_iter()
            .map(|g| g.rate_code)
            .collect();
        assert_eq!(codes, vec!["OV", "ST", "DT"]);

        let days = group_by_day_then_rate_code(&lines);
        let day_order: Vec<_> = days.iter().map(|d| d.day).collect();
        assert_eq!(day_order, vec![date(3), date(1), date(2)]);

        let day_three: Vec<_> = days[0].lines.iter().map(|g| g.rate_code.as_str()).collect();
        assert_eq!(day_three, vec!["OV", "ST"]);
    }

    #[test]
    fn test_volume_conservation() {
        let lines = vec![
            create_test_line(1, "ST", "Standard", "21", "0.1"),
            create_test_line(1, "ST", "Standard", "21", "0.2"),
            create_test_line(2, "OV", "Overtime", "31", "0.3"),
            create_test_line(2, "ST", "Standard", "21", "1234567.891"),
            create_test_line(3, "OV", "Overtime", "31", "-0.6"),
        ];

        let expected = total_volume(&lines);
        assert_eq!(expected, dec("1234567.891"));
        assert_eq!(total_grouped_volume(&group_by_rate_code(&lines)), expected);

        let nested: Decimal = group_by_day_then_rate_code(&lines)
            .iter()
            .map(|day| day.total_volume())
            .sum();
        assert_eq!(nested, expected);
    }

    #[test]
    fn test_exact_decimal_sum() {
        // 0.1 + 0.2 drifts in binary floating point.
        let lines = vec![
            create_test_line(1, "ST", "Standard", "21", "0.1"),
            create_test_line(1, "ST", "Standard", "21", "0.2"),
        ];

        let groups = group_by_rate_code(&lines);
        assert_eq!(groups[0].total_volume, dec("0.3"));
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let lines = sample_lines();

        let by_day = group_by_day(&lines);
        let members: usize = by_day.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(members, lines.len());

        let by_code = group_first_seen(&lines, |line| line.rate_code.as_str());
        let members: usize = by_code.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(members, lines.len());
        for (code, bucket) in &by_code {
            assert!(bucket.iter().all(|line| line.rate_code == *code));
        }
    }

    #[test]
    fn test_each_line_lands_in_one_day_rate_code_cell() {
        let lines = vec![
            create_test_line(2, "ST", "Standard", "21", "1.5"),
            create_test_line(1, "OV", "Overtime", "31", "2"),
            create_test_line(2, "OV", "Overtime", "31", "0.25"),
            create_test_line(1, "OV", "Overtime", "31", "3"),
            create_test_line(2, "ST", "Standard", "21", "4.75"),
            create_test_line(3, "DT", "Double", "42", "8"),
        ];

        let pairs = group_first_seen(&lines, |line| (line.day, line.rate_code.as_str()));
        let days = group_by_day_then_rate_code(&lines);
        assert_eq!(row_count(&days), pairs.len());
        assert_eq!(row_count(&days), 4);

        for day in &days {
            for cell in &day.lines {
                let expected: Decimal = lines
                    .iter()
                    .filter(|line| line.day == day.day && line.rate_code == cell.rate_code)
                    .map(|line| line.volume)
                    .sum();
                assert_eq!(cell.total_volume, expected);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let lines = sample_lines();
        assert_eq!(group_by_rate_code(&lines), group_by_rate_code(&lines));
        assert_eq!(
            group_by_day_then_rate_code(&lines),
            group_by_day_then_rate_code(&lines)
        );
    }

    #[test]
    fn test_first_line_is_representative() {
        let lines = vec![
            create_test_line(1, "ST", "Standard Rate", "21.00", "1"),
            create_test_line(1, "ST", "Standard (old)", "20.00", "2"),
        ];

        let groups = group_by_rate_code(&lines);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rate_description, "Standard Rate");
        assert_eq!(groups[0].rate, dec("21.00"));
        assert_eq!(groups[0].total_volume, dec("3"));
    }

    #[test]
    fn test_rate_code_match_is_exact() {
        let lines = vec![
            create_test_line(1, "ST", "Standard", "21", "1"),
            create_test_line(1, "st", "Standard", "21", "1"),
            create_test_line(1, "ST ", "Standard", "21", "1"),
        ];

        assert_eq!(group_by_rate_code(&lines).len(), 3);
    }

    #[test]
    fn test_row_count() {
        let days = group_by_day_then_rate_code(&sample_lines());
        assert_eq!(row_count(&days), 3);
    }

    #[test]
    fn test_find_representative_mismatches() {
        assert!(find_representative_mismatches(&sample_lines()).is_empty());

        let lines = vec![
            create_test_line(1, "ST", "Standard Rate", "21.00", "1"),
            create_test_line(1, "OV", "Overtime Rate", "31.00", "1"),
            create_test_line(2, "ST", "Standard Rate", "21.0", "1"),
            create_test_line(2, "ST", "Standard (old)", "20.00", "1"),
        ];

        let mismatches = find_representative_mismatches(&lines);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].line_index, 3);
        assert_eq!(mismatches[0].field, MismatchField::RateDescription);
        assert_eq!(mismatches[0].found, "Standard (old)");
        assert_eq!(mismatches[1].field, MismatchField::Rate);
        assert_eq!(mismatches[1].expected, "21.00");
        assert_eq!(mismatches[1].found, "20.00");
    }

    #[test]
    fn test_ensure_consistent() {
        assert!(ensure_consistent(&sample_lines()).is_ok());

        let lines = vec![
            create_test_line(1, "ST", "Standard Rate", "21.00", "1"),
            create_test_line(2, "ST", "Standard Rate", "22.00", "1"),
        ];

        match ensure_consistent(&lines) {
            Err(TimegroupError::InconsistentGroups(mismatches)) => {
                assert_eq!(mismatches.len(), 1);
                assert_eq!(mismatches[0].line_index, 1);
            }
            other => panic!("expected inconsistent groups, got {:?}", other),
        }
    }
}
