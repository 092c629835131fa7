//! Eager sorting through `SortComposer` and `RecordSliceExt`.

mod common;

use common::{ids, staff, Employee};
use sift::{
    AccessorCache, MemoryProvider, Query, RecordSliceExt, SiftError, SortComposer,
    SortCondition, SortDirection,
};

// ============================================================================
// Single key
// ============================================================================

#[test]
fn order_by_name_ascending_and_descending() {
    let source = vec![Employee::new(2, "Bob", "Rome"), Employee::new(1, "Alice", "Oslo")];

    let asc = source.order_by("Name", SortDirection::Asc).unwrap();
    assert_eq!(ids(asc), [1, 2]);

    let desc = source.order_by("Name", SortDirection::Desc).unwrap();
    assert_eq!(ids(desc), [2, 1]);
}

#[test]
fn naming_variants_resolve_to_the_same_member() {
    let source = staff();
    let expected = ids(source.order_by("hired_at", SortDirection::Asc).unwrap());

    for path in ["HiredAt", "hiredAt", "hired-at", "hired_at"] {
        let sorted = source.order_by(path, SortDirection::Asc).unwrap();
        assert_eq!(ids(sorted), expected, "path {path:?}");
    }
}

#[test]
fn order_by_enum_float_and_bool() {
    let source = staff();

    let by_level = source.order_by("Level", SortDirection::Asc).unwrap();
    assert_eq!(ids(by_level), [3, 1, 2, 5, 8]);

    let by_salary = source.order_by("Salary", SortDirection::Desc).unwrap();
    assert_eq!(ids(by_salary), [8, 5, 3, 2, 1]);

    let by_remote = source.order_by("Remote", SortDirection::Asc).unwrap();
    assert_eq!(ids(by_remote), [5, 1, 3, 2, 8]);
}

/// Every third salary is NaN; ids are spread so salaries arrive unordered.
fn staff_with_nan_salaries(n: u32) -> Vec<Employee> {
    (0..n)
        .map(|i| {
            let mut employee = Employee::new((i * 7) % n, "Dana", "Oslo");
            if i % 3 == 0 {
                employee.salary = f64::NAN;
            }
            employee
        })
        .collect()
}

/// Asserts the numbers come first in ascending order, then every NaN.
fn assert_numbers_then_nan(salaries: &[f64], numbers: usize) {
    let (present, nan) = salaries.split_at(numbers);
    assert!(present.windows(2).all(|pair| pair[0] <= pair[1]), "{present:?}");
    assert!(nan.iter().all(|salary| salary.is_nan()));
}

#[test]
fn nan_sorts_after_every_number() {
    for n in [10, 25, 50, 500, 2000] {
        let source = staff_with_nan_salaries(n);
        let numbers = source.iter().filter(|e| !e.salary.is_nan()).count();

        let asc = source.order_by("Salary", SortDirection::Asc).unwrap();
        let salaries: Vec<f64> = asc.iter().map(|e| e.salary).collect();
        assert_numbers_then_nan(&salaries, numbers);

        let desc = source.order_by("Salary", SortDirection::Desc).unwrap();
        let mut salaries: Vec<f64> = desc.iter().map(|e| e.salary).collect();
        salaries.reverse();
        assert_numbers_then_nan(&salaries, numbers);
    }
}

#[test]
fn nan_ties_fall_through_to_secondary_key() {
    let source = staff_with_nan_salaries(25);
    let sorted = source
        .order_by("Salary", SortDirection::Asc)
        .unwrap()
        .then_by("Id", SortDirection::Asc)
        .unwrap();

    let nan_ids: Vec<u32> = sorted
        .iter()
        .filter(|e| e.salary.is_nan())
        .map(|e| e.id)
        .collect();
    assert_eq!(nan_ids.len(), 9);
    assert!(nan_ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn nan_sorts_after_every_number_in_memory_provider() {
    let source = staff_with_nan_salaries(50);
    let numbers = source.iter().filter(|e| !e.salary.is_nan()).count();
    let provider = MemoryProvider::new(source);

    let rows = Query::new(&provider)
        .order_by("Salary", SortDirection::Asc)
        .unwrap()
        .execute()
        .unwrap();
    let salaries: Vec<f64> = rows.iter().map(|e| e.salary).collect();
    assert_numbers_then_nan(&salaries, numbers);
}

#[test]
fn order_by_nested_path() {
    let source = staff();
    let sorted = source
        .order_by("Office.Floor", SortDirection::Desc)
        .unwrap();
    assert_eq!(ids(sorted), [8, 5, 3, 2, 1]);
}

#[test]
fn absent_nested_records_sort_last() {
    let source = staff();
    let sorted = source
        .order_by("PreviousOffice.City", SortDirection::Asc)
        .unwrap();
    assert_eq!(ids(sorted), [1, 2, 5, 8, 3]);
}

// ============================================================================
// Multiple keys
// ============================================================================

#[test]
fn priority_orders_keys() {
    let source = staff();
    let sorted = source
        .order_by_multiple(&[
            SortCondition::asc("Name").with_priority(0),
            SortCondition::desc("Id").with_priority(1),
        ])
        .unwrap();
    let result = ids(sorted);
    assert_eq!(&result[..2], [8, 3]);
    assert_eq!(result, [8, 3, 2, 5, 1]);
}

#[test]
fn order_by_multiple_matches_manual_chain() {
    let source = staff();
    let conditions = [
        SortCondition::desc("Remote").with_priority(5),
        SortCondition::asc("Office.City").with_priority(-1),
        SortCondition::asc("Name").with_priority(5),
    ];

    let multiple = source.order_by_multiple(&conditions).unwrap();
    let chained = source
        .order_by_condition(&conditions[1])
        .unwrap()
        .then_by_condition(&conditions[0])
        .unwrap()
        .then_by_condition(&conditions[2])
        .unwrap();

    assert_eq!(ids(multiple), ids(chained));
}

#[test]
fn composer_with_private_cache() {
    let cache = AccessorCache::new();
    let sort = SortComposer::new(&cache);
    let source = staff();

    let sorted = sort.order_by(&source, "Office.City", SortDirection::Asc).unwrap();
    let sorted = sort.then_by(sorted, "Id", SortDirection::Desc).unwrap();

    assert_eq!(ids(sorted), [5, 3, 2, 1, 8]);
    assert_eq!(cache.len(), 2);
}

#[test]
fn sorting_a_filtered_view() {
    let cache = AccessorCache::new();
    let sort = SortComposer::new(&cache);
    let source = staff();

    let alices = source.where_eq("Name", "Alice").unwrap();
    let sorted = sort
        .order_by(alices, "Id", SortDirection::Desc)
        .unwrap();
    assert_eq!(ids(sorted), [8, 3, 2]);
}

#[test]
fn paging_sorted_results() {
    let source = staff();
    let sorted = source.order_by("Id", SortDirection::Asc).unwrap();

    assert_eq!(ids(sorted.page(1, 3)), [1, 2, 3]);
    assert_eq!(ids(sorted.page(2, 3)), [5, 8]);
    assert_eq!(sorted.len(), 5);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_root_field() {
    let err = staff()
        .order_by("Missing.Field", SortDirection::Asc)
        .map(|_| ())
        .unwrap_err();
    assert_eq!(
        err,
        SiftError::FieldNotFound {
            type_name: "Employee".to_string(),
            segment: "Missing".to_string(),
        }
    );
}

#[test]
fn missing_nested_field_names_nested_type() {
    let err = staff()
        .order_by("Office.Street", SortDirection::Asc)
        .map(|_| ())
        .unwrap_err();
    assert_eq!(
        err,
        SiftError::FieldNotFound {
            type_name: "Office".to_string(),
            segment: "Street".to_string(),
        }
    );
}

#[test]
fn lists_and_records_are_not_sortable() {
    let source = staff();
    assert!(matches!(
        source.order_by("Skills", SortDirection::Asc).map(|_| ()),
        Err(SiftError::NotComparable { .. })
    ));
    assert_eq!(
        source.order_by("Office", SortDirection::Asc).map(|_| ()),
        Err(SiftError::NotComparable {
            type_name: "Office".to_string()
        })
    );
}

#[test]
fn empty_conditions_are_rejected() {
    let err = staff().order_by_multiple(&[]).map(|_| ()).unwrap_err();
    assert_eq!(err, SiftError::EmptySortConditions);
}

#[test]
fn then_by_failure_reports_error() {
    let source = staff();
    let err = source
        .order_by("Name", SortDirection::Asc)
        .unwrap()
        .then_by("Nope", SortDirection::Asc)
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, SiftError::FieldNotFound { .. }));
}

#[test]
fn invalid_paths_are_rejected() {
    let source = staff();
    for path in ["", "Office..City", ".Name", "Name."] {
        let result = source.order_by(path, SortDirection::Asc).map(|_| ());
        assert!(
            matches!(result, Err(SiftError::InvalidPathExpression { .. })),
            "{path:?}"
        );
    }
}
