use serde::Serialize;
use std::collections::HashMap;
use time::{Date, Duration};

use crate::plans::repo_types::DailyPlan;

/// How a day's logged calories compare to the user's target. A day with no
/// logged intake is reported as such rather than as a met goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayStatus {
    NoData,
    OnTarget,
    Over { by: i32 },
    Under { by: i32 },
}

pub fn classify(calories: i32, target: i32) -> DayStatus {
    if calories == 0 {
        return DayStatus::NoData;
    }
    let diff = calories - target;
    if diff.abs() < 100 {
        DayStatus::OnTarget
    } else if diff > 0 {
        DayStatus::Over { by: diff }
    } else {
        DayStatus::Under { by: -diff }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayProgress {
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub calories: i32,
    pub protein: i32,
    pub status: DayStatus,
}

/// The trailing 7 calendar dates ending at (and including) `today`.
pub fn window_dates(today: Date) -> Vec<Date> {
    (0..7)
        .rev()
        .map(|days_back| today - Duration::days(days_back))
        .collect()
}

/// Project the plans onto the window: per-date calorie and protein totals
/// (zero for dates without a plan) plus the target classification.
pub fn weekly_progress(
    window: &[Date],
    plans: &[DailyPlan],
    calorie_target: i32,
) -> Vec<DayProgress> {
    let by_date: HashMap<Date, &DailyPlan> = plans.iter().map(|plan| (plan.date, plan)).collect();
    window
        .iter()
        .map(|&date| {
            let (calories, protein) = by_date
                .get(&date)
                .map(|plan| (plan.total_calories(), plan.total_protein()))
                .unwrap_or((0, 0));
            DayProgress {
                date,
                calories,
                protein,
                status: classify(calories, calorie_target),
            }
        })
        .collect()
}

/// Mean daily protein over the window. Zero days count: an unlogged day
/// drags the average down on purpose, since it reflects real adherence.
pub fn average_protein(days: &[DayProgress]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let total: i32 = days.iter().map(|day| day.protein).sum();
    f64::from(total) / days.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo_types::{Meal, MealId, MealType};
    use time::macros::date;

    fn meal(meal_type: MealType, calories: i32, protein: i32) -> Meal {
        Meal {
            id: MealId::Seed("mock-1".into()),
            meal_name: "Test".into(),
            meal_type,
            calories,
            protein,
            diet_tag: "Vegetarian".into(),
            image_url: String::new(),
        }
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(0, 2000), DayStatus::NoData);
        assert_eq!(classify(1999, 2000), DayStatus::OnTarget);
        assert_eq!(classify(2099, 2000), DayStatus::OnTarget);
        assert_eq!(classify(2100, 2000), DayStatus::Over { by: 100 });
        assert_eq!(classify(1900, 2000), DayStatus::Under { by: 100 });
        assert_eq!(classify(1901, 2000), DayStatus::OnTarget);
    }

    #[test]
    fn window_is_seven_trailing_dates_inclusive() {
        let window = window_dates(date!(2024 - 01 - 07));
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], date!(2024 - 01 - 01));
        assert_eq!(window[6], date!(2024 - 01 - 07));
    }

    #[test]
    fn single_day_example_scenario() {
        // Breakfast 450/30 + lunch 600/40, dinner empty, target 2259.
        let day = date!(2024 - 01 - 01);
        let mut plan = DailyPlan::empty(day);
        plan.breakfast = Some(meal(MealType::Breakfast, 450, 30));
        plan.lunch = Some(meal(MealType::Lunch, 600, 40));
        plan.water_intake = 1.5;

        let report = weekly_progress(&[day], &[plan], 2259);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].calories, 1050);
        assert_eq!(report[0].protein, 70);
        assert_eq!(report[0].status, DayStatus::Under { by: 1209 });
    }

    #[test]
    fn absent_plans_report_zero_and_no_data() {
        let window = window_dates(date!(2024 - 01 - 07));
        let report = weekly_progress(&window, &[], 2000);
        assert!(report
            .iter()
            .all(|day| day.calories == 0 && day.status == DayStatus::NoData));
    }

    #[test]
    fn average_protein_includes_zero_days() {
        let day = date!(2024 - 01 - 07);
        let mut plan = DailyPlan::empty(day);
        plan.dinner = Some(meal(MealType::Dinner, 480, 70));

        let window = window_dates(day);
        let report = weekly_progress(&window, &[plan], 2000);
        assert_eq!(average_protein(&report), 10.0);
    }

    #[test]
    fn status_serializes_with_a_tag() {
        let json = serde_json::to_string(&DayStatus::Over { by: 150 }).unwrap();
        assert_eq!(json, "{\"status\":\"over\",\"by\":150}");
        let json = serde_json::to_string(&DayStatus::NoData).unwrap();
        assert_eq!(json, "{\"status\":\"no_data\"}");
    }
}
