//! Joins and derived columns over extracted tables.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use vald_core::entities::columns;
use vald_core::{Cell, Row, Table};

/// Profile fields carried onto test rows by [`join_tests_with_profiles`].
pub const PROFILE_JOIN_COLUMNS: [&str; 4] = [
    columns::GIVEN_NAME,
    columns::FAMILY_NAME,
    columns::DATE_OF_BIRTH,
    columns::GROUP_NAME,
];

/// Fields a profile needs to appear in the person-oriented view.
pub const COMPLETE_PROFILE_COLUMNS: [&str; 3] = [
    columns::GIVEN_NAME,
    columns::FAMILY_NAME,
    columns::DATE_OF_BIRTH,
];

/// Column added by [`person_view`].
pub const AGE_COLUMN: &str = "age";

const FORCE_LIKE: [&str; 3] = ["force", "impulse", "torque"];

/// A left/right column pair and the imbalance column derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImbalancePair {
    pub left: String,
    pub right: String,
    pub output: String,
}

/// Attach each group's category name as `category_name`, matching
/// `categoryId` against category `id`. Unmatched groups get null.
#[must_use]
pub fn join_groups_with_categories(groups: &Table, categories: &Table) -> Table {
    let names: HashMap<String, Cell> = categories
        .rows()
        .filter_map(|row| {
            let id = row.text(columns::ID)?;
            let name = row.get(columns::NAME).cloned().unwrap_or_default();
            Some((id, name))
        })
        .collect();

    let mut joined = groups.clone();
    joined.derive_column(columns::JOINED_CATEGORY_NAME, |row| {
        row.text(columns::CATEGORY_ID)
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_default()
    });
    joined
}

/// Keep only groups whose `categoryId` is in `category_ids`.
#[must_use]
pub fn groups_in_categories(groups: &Table, category_ids: &HashSet<String>) -> Table {
    let mut kept = groups.clone();
    kept.retain(|row| {
        row.text(columns::CATEGORY_ID)
            .is_some_and(|id| category_ids.contains(&id))
    });
    kept
}

/// Left-join test rows with profiles on `profileId`.
///
/// Every test row is kept. Matched rows gain [`PROFILE_JOIN_COLUMNS`] from
/// the profile; unmatched rows hold null there. When a profile appears more
/// than once (one row per group) the first occurrence is used, so test rows
/// are never multiplied.
#[must_use]
pub fn join_tests_with_profiles(tests: &Table, profiles: &Table) -> Table {
    let mut by_id: HashMap<String, Row<'_>> = HashMap::new();
    for row in profiles.rows() {
        if let Some(id) = row.text(columns::PROFILE_ID) {
            by_id.entry(id).or_insert(row);
        }
    }

    let mut joined = tests.clone();
    for column in PROFILE_JOIN_COLUMNS {
        joined.derive_column(column, |row| {
            row.text(columns::PROFILE_ID)
                .and_then(|id| by_id.get(&id))
                .and_then(|profile| profile.get(column).cloned())
                .unwrap_or_default()
        });
    }
    joined
}

/// Whole years between `birth` and `today`: the year difference, minus one
/// if this year's birthday has not happened yet.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

/// `|right - left| / max(left, right) * 100`, or `None` when the larger side
/// is not positive.
#[must_use]
pub fn imbalance(left: f64, right: f64) -> Option<f64> {
    let max = left.max(right);
    if max <= 0.0 || !max.is_finite() {
        return None;
    }
    Some((right - left).abs() * 100.0 / max)
}

/// Round to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Find every `left<X>` / `right<X>` column pair where `X` names a force,
/// impulse, or torque measurement.
///
/// `leftMaxForce` + `rightMaxForce` yields `maxForceImbalance`.
#[must_use]
pub fn imbalance_pairs(columns: &[String]) -> Vec<ImbalancePair> {
    let present: HashSet<&str> = columns.iter().map(String::as_str).collect();
    columns
        .iter()
        .filter_map(|left| {
            let stem = left.strip_prefix("left")?;
            let lower = stem.to_ascii_lowercase();
            if stem.is_empty() || !FORCE_LIKE.iter().any(|k| lower.contains(k)) {
                return None;
            }
            let right = format!("right{stem}");
            if !present.contains(right.as_str()) {
                return None;
            }
            let mut chars = stem.chars();
            let first = chars.next()?.to_ascii_lowercase();
            Some(ImbalancePair {
                left: left.clone(),
                right,
                output: format!("{first}{}Imbalance", chars.as_str()),
            })
        })
        .collect()
}

/// The person-oriented report view of joined test rows.
///
/// Rows whose profile is incomplete are dropped. The rest gain an `age`
/// column (as of `today`) and one imbalance column per left/right
/// force-like pair. Every float is rounded to two decimals.
#[must_use]
pub fn person_view(joined: &Table, today: NaiveDate) -> Table {
    let mut view = joined.clone();
    view.retain(|row| {
        COMPLETE_PROFILE_COLUMNS
            .iter()
            .all(|c| row.text(c).is_some_and(|v| !v.trim().is_empty()))
    });

    view.derive_column(AGE_COLUMN, |row| {
        row.get(columns::DATE_OF_BIRTH)
            .and_then(Cell::as_timestamp)
            .map(|dob: DateTime<Utc>| Cell::Int(i64::from(age_on(dob.date_naive(), today))))
            .unwrap_or_default()
    });

    for pair in imbalance_pairs(view.columns()) {
        view.derive_column(&pair.output, |row| {
            let left = row.get(&pair.left).and_then(Cell::as_f64);
            let right = row.get(&pair.right).and_then(Cell::as_f64);
            match (left, right) {
                (Some(l), Some(r)) => imbalance(l, r).map(Cell::Float).unwrap_or_default(),
                _ => Cell::Null,
            }
        });
    }

    view.map_cells(|cell| match cell {
        Cell::Float(f) if f.is_finite() => Cell::Float(round2(f)),
        other => other,
    });
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(rows: Vec<Vec<(&str, Cell)>>) -> Table {
        let mut table = Table::new();
        for row in rows {
            table.push_pairs(row.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        }
        table
    }

    #[rstest]
    #[case(date(2000, 6, 15), date(2024, 6, 14), 23)]
    #[case(date(2000, 6, 15), date(2024, 6, 15), 24)]
    #[case(date(2000, 6, 15), date(2024, 12, 1), 24)]
    #[case(date(2004, 2, 29), date(2024, 2, 28), 19)]
    #[case(date(2004, 2, 29), date(2024, 3, 1), 20)]
    fn age_uses_last_birthday(#[case] birth: NaiveDate, #[case] today: NaiveDate, #[case] age: i32) {
        assert_eq!(age_on(birth, today), age);
    }

    #[rstest]
    #[case(100.0, 80.0, Some(20.0))]
    #[case(80.0, 100.0, Some(20.0))]
    #[case(50.0, 50.0, Some(0.0))]
    #[case(0.0, 0.0, None)]
    fn imbalance_is_relative_to_larger_side(
        #[case] left: f64,
        #[case] right: f64,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(imbalance(left, right), expected);
    }

    #[test]
    fn pairs_need_both_sides_and_a_force_like_stem() {
        let cols: Vec<String> = [
            "leftMaxForce",
            "rightMaxForce",
            "leftAvgForce",
            "leftImpulse",
            "rightImpulse",
            "leftRepetitions",
            "rightRepetitions",
            "leftTorque",
            "rightTorque",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        let outputs: Vec<String> = imbalance_pairs(&cols).into_iter().map(|p| p.output).collect();
        assert_eq!(
            outputs,
            ["maxForceImbalance", "impulseImbalance", "torqueImbalance"]
        );
    }

    #[test]
    fn groups_gain_category_name() {
        let groups = table(vec![
            vec![("id", "g1".into()), ("categoryId", "c1".into())],
            vec![("id", "g2".into()), ("categoryId", "c9".into())],
        ]);
        let categories = table(vec![vec![("id", "c1".into()), ("name", "CBMM".into())]]);

        let joined = join_groups_with_categories(&groups, &categories);

        assert_eq!(joined.columns(), ["id", "categoryId", "category_name"]);
        assert_eq!(joined.row(0).unwrap().text("category_name").as_deref(), Some("CBMM"));
        assert_eq!(joined.row(1).unwrap().text("category_name"), None);
    }

    #[test]
    fn group_filter_keeps_member_categories_only() {
        let groups = table(vec![
            vec![("id", "g1".into()), ("categoryId", "c1".into())],
            vec![("id", "g2".into()), ("categoryId", "c2".into())],
            vec![("id", "g3".into())],
        ]);
        let ids: HashSet<String> = ["c2".to_string()].into();

        let kept = groups_in_categories(&groups, &ids);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.row(0).unwrap().text("id").as_deref(), Some("g2"));
    }

    #[test]
    fn unmatched_test_keeps_row_with_null_profile_fields() {
        let tests = table(vec![vec![("testId", "t1".into()), ("profileId", "P1".into())]]);
        let profiles = table(vec![vec![
            ("profileId", "P2".into()),
            ("givenName", "Ana".into()),
        ]]);

        let joined = join_tests_with_profiles(&tests, &profiles);
        assert_eq!(joined.len(), 1);
        let row = joined.row(0).unwrap();
        for column in PROFILE_JOIN_COLUMNS {
            assert_eq!(row.get(column), Some(&Cell::Null), "{column}");
        }

        assert!(person_view(&joined, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn duplicate_profiles_do_not_multiply_tests() {
        let tests = table(vec![vec![("testId", "t1".into()), ("profileId", "P1".into())]]);
        let profiles = table(vec![
            vec![("profileId", "P1".into()), ("groupName", "U19".into())],
            vec![("profileId", "P1".into()), ("groupName", "First team".into())],
        ]);

        let joined = join_tests_with_profiles(&tests, &profiles);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.row(0).unwrap().text("groupName").as_deref(), Some("U19"));
    }

    #[test]
    fn person_view_adds_age_imbalance_and_rounds() {
        let joined = table(vec![
            vec![
                ("profileId", "P1".into()),
                ("givenName", "Ana".into()),
                ("familyName", "Diaz".into()),
                ("dateOfBirth", "2006-09-10T00:00:00Z".into()),
                ("leftMaxForce", Cell::Float(300.0)),
                ("rightMaxForce", Cell::Float(330.456)),
            ],
            vec![
                ("profileId", "P2".into()),
                ("givenName", "Bea".into()),
                ("familyName", Cell::Null),
                ("dateOfBirth", "2007-01-01".into()),
            ],
        ]);

        let view = person_view(&joined, date(2024, 9, 9));

        assert_eq!(view.len(), 1);
        let row = view.row(0).unwrap();
        assert_eq!(row.get(AGE_COLUMN), Some(&Cell::Int(17)));
        assert_eq!(row.get("rightMaxForce"), Some(&Cell::Float(330.46)));
        assert_eq!(row.get("maxForceImbalance"), Some(&Cell::Float(9.22)));
    }
}
