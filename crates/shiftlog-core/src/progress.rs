use serde::{Deserialize, Serialize};

use crate::goal::Goal;
use crate::stats::MonthlyAggregate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    MonthlySales,
    AvgHourlyWage,
    Sessions,
    ConversionRate,
}

/// Progress against one tracked target. `percent` is the true ratio and
/// may exceed 100; clamping for bar displays is a rendering concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricProgress {
    pub metric: GoalMetric,
    pub actual: f64,
    pub target: f64,
    pub percent: f64,
    pub exceeded: bool,
}

/// Result of joining a month's goal with that month's aggregate. The
/// three degenerate states are deliberately distinct: each calls for a
/// different presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "metrics", rename_all = "snake_case")]
pub enum GoalProgress {
    /// No goal was set for the month.
    NoGoal,
    /// A goal exists but the month has no records yet.
    NoRecords,
    /// A goal exists but every target is 0 / untracked.
    NoTargets,
    Evaluated(Vec<MetricProgress>),
}

fn metric(kind: GoalMetric, actual: f64, target: f64) -> MetricProgress {
    let percent = (actual / target) * 100.0;
    MetricProgress {
        metric: kind,
        actual,
        target,
        percent,
        exceeded: percent >= 100.0,
    }
}

/// Evaluates each tracked metric (target > 0) against the month's
/// actuals. Untracked metrics are omitted entirely, not reported as 0%.
pub fn evaluate_goal_progress(
    goal: Option<&Goal>,
    aggregate: Option<&MonthlyAggregate>,
) -> GoalProgress {
    let Some(goal) = goal else {
        return GoalProgress::NoGoal;
    };
    let Some(aggregate) = aggregate else {
        return GoalProgress::NoRecords;
    };

    let mut metrics = Vec::new();
    if goal.monthly_sales > 0 {
        metrics.push(metric(
            GoalMetric::MonthlySales,
            aggregate.total_sales as f64,
            goal.monthly_sales as f64,
        ));
    }
    if goal.hourly_wage > 0 {
        metrics.push(metric(
            GoalMetric::AvgHourlyWage,
            aggregate.avg_hourly_wage as f64,
            goal.hourly_wage as f64,
        ));
    }
    if goal.sessions > 0 {
        metrics.push(metric(
            GoalMetric::Sessions,
            aggregate.session_count as f64,
            goal.sessions as f64,
        ));
    }
    if goal.conversion_rate > 0.0 {
        metrics.push(metric(
            GoalMetric::ConversionRate,
            aggregate.avg_conversion_rate,
            goal.conversion_rate,
        ));
    }

    if metrics.is_empty() {
        GoalProgress::NoTargets
    } else {
        GoalProgress::Evaluated(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{derive_record, tests::sample_input};
    use crate::stats::compute_monthly_aggregate;

    fn march_aggregate(sales: &[u64]) -> MonthlyAggregate {
        let records: Vec<_> = sales
            .iter()
            .map(|&total_sales| {
                let mut input = sample_input("2024-03-05", "18:00", "23:00");
                input.total_sales = total_sales;
                derive_record(input)
            })
            .collect();
        let refs: Vec<_> = records.iter().collect();
        compute_monthly_aggregate(&refs).expect("records exist")
    }

    #[test]
    fn exceeding_the_sales_target_reports_over_100_percent() {
        let goal = Goal {
            month: "2024-03".into(),
            monthly_sales: 25_000,
            ..Goal::default()
        };
        let aggregate = march_aggregate(&[10_000, 20_000]);

        let progress = evaluate_goal_progress(Some(&goal), Some(&aggregate));
        let GoalProgress::Evaluated(metrics) = progress else {
            panic!("expected evaluated progress");
        };
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].metric, GoalMetric::MonthlySales);
        assert_eq!(metrics[0].percent, 120.0);
        assert!(metrics[0].exceeded);
    }

    #[test]
    fn untracked_metrics_are_omitted_even_with_actuals() {
        let goal = Goal {
            month: "2024-03".into(),
            sessions: 10,
            ..Goal::default()
        };
        let aggregate = march_aggregate(&[30_000]);
        assert!(aggregate.total_sales > 0);

        let GoalProgress::Evaluated(metrics) =
            evaluate_goal_progress(Some(&goal), Some(&aggregate))
        else {
            panic!("expected evaluated progress");
        };
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].metric, GoalMetric::Sessions);
        assert_eq!(metrics[0].percent, 10.0);
        assert!(!metrics[0].exceeded);
    }

    #[test]
    fn degenerate_states_stay_distinct() {
        let aggregate = march_aggregate(&[10_000]);
        assert_eq!(
            evaluate_goal_progress(None, Some(&aggregate)),
            GoalProgress::NoGoal
        );

        let goal = Goal {
            month: "2024-03".into(),
            monthly_sales: 25_000,
            ..Goal::default()
        };
        assert_eq!(
            evaluate_goal_progress(Some(&goal), None),
            GoalProgress::NoRecords
        );

        let untracked = Goal {
            month: "2024-03".into(),
            ..Goal::default()
        };
        assert_eq!(
            evaluate_goal_progress(Some(&untracked), Some(&aggregate)),
            GoalProgress::NoTargets
        );
        // An empty month takes precedence over missing targets.
        assert_eq!(
            evaluate_goal_progress(Some(&untracked), None),
            GoalProgress::NoRecords
        );
    }

    #[test]
    fn all_four_metrics_evaluate_when_tracked() {
        let goal = Goal {
            month: "2024-03".into(),
            monthly_sales: 30_000,
            hourly_wage: 4_000,
            sessions: 2,
            conversion_rate: 0.5,
        };
        let aggregate = march_aggregate(&[10_000, 20_000]);

        let GoalProgress::Evaluated(metrics) =
            evaluate_goal_progress(Some(&goal), Some(&aggregate))
        else {
            panic!("expected evaluated progress");
        };
        assert_eq!(metrics.len(), 4);
        let sessions = metrics
            .iter()
            .find(|m| m.metric == GoalMetric::Sessions)
            .unwrap();
        assert_eq!(sessions.percent, 100.0);
        assert!(sessions.exceeded);
    }
}
