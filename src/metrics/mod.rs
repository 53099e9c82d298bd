//! Raw measurement extraction
//!
//! Combines a unit's structural facts with its walk result. Pure: no
//! traversal of its own, absent facts count as zero.

use crate::graph::traits::UnitFacts;
use crate::graph::walker::WalkResult;
use crate::models::{CategoryCount, ElementCategory, RawMeasurements};

/// Raw measurements of one unit
pub fn extract(facts: Option<&UnitFacts>, walk: &WalkResult) -> RawMeasurements {
    let mut measurements = RawMeasurements {
        direct_dependencies: walk.direct_count,
        transitive_dependencies: walk.dependencies.len() as u32,
        max_dependency_depth: walk.max_depth_reached,
        cycle_count: walk.cycles.len() as u32,
        ..Default::default()
    };

    let Some(facts) = facts else {
        return measurements;
    };

    measurements.total_elements = facts.element_total();

    // First grouping wins on ties
    let mut largest: Option<(&str, u32)> = None;
    for grouping in &facts.groupings {
        let replaces = match largest {
            Some((_, count)) => grouping.elements > count,
            None => true,
        };
        if replaces {
            largest = Some((&grouping.name, grouping.elements));
        }
    }
    if let Some((name, count)) = largest {
        measurements.largest_grouping = Some(name.to_string());
        measurements.largest_grouping_elements = count;
    }

    measurements.hot_path_elements = facts.hot_path_elements;
    measurements.hot_path_entries = facts.hot_path_entries;
    measurements.heavy_hot_path_calls = facts.heavy_hot_path_calls.clone();
    measurements.math_elements = facts
        .categories
        .get(&ElementCategory::Math)
        .copied()
        .unwrap_or(0);

    measurements
}

/// Element counts per category, in category order, zero rows omitted.
///
/// Percentages are relative to the unit's element total, or to the sum of
/// the category counts when the total is unknown.
pub fn category_breakdown(facts: Option<&UnitFacts>) -> Vec<CategoryCount> {
    let Some(facts) = facts else {
        return Vec::new();
    };

    let category_sum: u32 = facts.categories.values().sum();
    let total = match facts.element_total() {
        0 => category_sum,
        n => n,
    };

    ElementCategory::ALL
        .iter()
        .filter_map(|category| {
            let count = facts.categories.get(category).copied().unwrap_or(0);
            if count == 0 {
                return None;
            }
            let percentage = if total > 0 {
                f64::from(count) / f64::from(total) * 100.0
            } else {
                0.0
            };
            Some(CategoryCount {
                category: *category,
                count,
                percentage,
            })
        })
        .collect()
}
