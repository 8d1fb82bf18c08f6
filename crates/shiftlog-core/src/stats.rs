use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::ShiftRecord;
use crate::time::Weekday;

/// Month revenue split by source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesBreakdown {
    pub entrance_fee: u64,
    pub tips: u64,
    pub special_reward: u64,
}

/// Average customer counts across the month's shifts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerFunnel {
    pub avg_total: f64,
    pub avg_coin_users: f64,
    pub avg_paid_users: f64,
}

/// One point of the chronological daily sales series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub day: u32,
    pub total_sales: u64,
}

/// Monthly statistics over one month's records. Never stored;
/// recomputed on demand. An empty month is represented by the absence
/// of this value, not by a zeroed one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub total_sales: u64,
    pub avg_hourly_wage: u64,
    pub session_count: usize,
    pub avg_customers: u64,
    pub avg_conversion_rate: f64,
    /// Average hourly wage per weekday, Sunday first. A weekday with no
    /// records reports 0.0; this is the one place zero stands in for
    /// "no data".
    pub weekday_hourly_wage: [f64; 7],
    pub sales_breakdown: SalesBreakdown,
    pub customer_funnel: CustomerFunnel,
    pub daily_series: Vec<DailySales>,
}

fn rounded_mean(sum: u64, count: usize) -> u64 {
    (sum as f64 / count as f64).round() as u64
}

/// Aggregates records already filtered to one month. Returns `None` for
/// an empty input so "no records this month" stays distinguishable from
/// "0 earned this month".
pub fn compute_monthly_aggregate(records: &[&ShiftRecord]) -> Option<MonthlyAggregate> {
    if records.is_empty() {
        return None;
    }
    let count = records.len();

    let total_sales: u64 = records.iter().map(|r| r.total_sales).sum();
    let wage_sum: u64 = records.iter().map(|r| r.hourly_wage).sum();
    let customer_sum: u64 = records.iter().map(|r| r.total_customers as u64).sum();
    let conversion_sum: f64 = records.iter().map(|r| r.paid_conversion_rate).sum();

    let mut weekday_hourly_wage = [0.0; 7];
    for weekday in Weekday::ALL {
        let wages: Vec<u64> = records
            .iter()
            .filter(|r| r.weekday == weekday)
            .map(|r| r.hourly_wage)
            .collect();
        if !wages.is_empty() {
            let sum: u64 = wages.iter().sum();
            weekday_hourly_wage[weekday.index()] = sum as f64 / wages.len() as f64;
        }
    }

    let sales_breakdown = SalesBreakdown {
        entrance_fee: records.iter().map(|r| r.entrance_fee).sum(),
        tips: records.iter().map(|r| r.tips).sum(),
        special_reward: records.iter().map(|r| r.special_reward).sum(),
    };

    let coin_sum: u64 = records.iter().map(|r| r.coin_users as u64).sum();
    let paid_sum: u64 = records.iter().map(|r| r.paid_users as u64).sum();
    let customer_funnel = CustomerFunnel {
        avg_total: customer_sum as f64 / count as f64,
        avg_coin_users: coin_sum as f64 / count as f64,
        avg_paid_users: paid_sum as f64 / count as f64,
    };

    // Stable sort keeps same-date records in submission order.
    let mut by_date: Vec<&ShiftRecord> = records.to_vec();
    by_date.sort_by_key(|r| r.date);
    let daily_series = by_date
        .iter()
        .map(|r| DailySales {
            day: r.date.day(),
            total_sales: r.total_sales,
        })
        .collect();

    Some(MonthlyAggregate {
        total_sales,
        avg_hourly_wage: rounded_mean(wage_sum, count),
        session_count: count,
        avg_customers: rounded_mean(customer_sum, count),
        avg_conversion_rate: conversion_sum / count as f64,
        weekday_hourly_wage,
        sales_breakdown,
        customer_funnel,
        daily_series,
    })
}

/// All-time totals across the whole record set, independent of month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub record_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub total_sales: u64,
    pub avg_hourly_wage: u64,
}

pub fn compute_lifetime_stats(records: &[ShiftRecord]) -> Option<LifetimeStats> {
    let first = records.iter().map(|r| r.date).min()?;
    let last = records.iter().map(|r| r.date).max()?;
    let wage_sum: u64 = records.iter().map(|r| r.hourly_wage).sum();

    Some(LifetimeStats {
        record_count: records.len(),
        first_date: first,
        last_date: last,
        total_sales: records.iter().map(|r| r.total_sales).sum(),
        avg_hourly_wage: rounded_mean(wage_sum, records.len()),
    })
}
