use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time::{self, TimeCategory, Weekday};

/// Raw per-shift form input. Rating fields are stored as given; values
/// outside the nominal 1-5 range pass through unclamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShiftInput {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub device: String,
    pub health: u8,
    pub motivation: u8,
    pub total_customers: u32,
    pub coin_users: u32,
    pub regular_customers: u32,
    pub paid_users: u32,
    pub high_spenders: u32,
    pub total_sales: u64,
    pub entrance_fee: u64,
    pub tips: u64,
    pub special_reward: u64,
    pub talk_theme: String,
    pub sales_approach: String,
    pub tension: String,
    pub success_memo: String,
    pub failure_memo: String,
    pub has_event: bool,
    pub payday: String,
}

/// A fully derived shift record. Derived fields are a pure function of
/// the raw fields and are computed exactly once, at creation. Records
/// are never mutated in place; the only replacement path is bulk import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub device: String,
    pub health: u8,
    pub motivation: u8,
    pub total_customers: u32,
    pub coin_users: u32,
    pub regular_customers: u32,
    pub paid_users: u32,
    pub high_spenders: u32,
    pub total_sales: u64,
    pub entrance_fee: u64,
    pub tips: u64,
    pub special_reward: u64,
    pub talk_theme: String,
    pub sales_approach: String,
    pub tension: String,
    pub success_memo: String,
    pub failure_memo: String,
    pub has_event: bool,
    pub payday: String,

    pub working_hours: f64,
    pub hourly_wage: u64,
    pub paid_conversion_rate: f64,
    pub coin_user_rate: f64,
    pub regular_rate: f64,
    pub high_spender_rate: f64,
    pub tip_rate: f64,
    pub weekday: Weekday,
    pub time_category: TimeCategory,
}

fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Derives every computed field for one shift. Total: zero denominators
/// (no customers, no sales, zero-length shift) yield exactly 0 for the
/// corresponding derived field, never NaN.
pub fn derive_record(input: ShiftInput) -> ShiftRecord {
    let working_hours = time::shift_duration_hours(input.start_time, input.end_time);
    let hourly_wage = if working_hours > 0.0 {
        (input.total_sales as f64 / working_hours).round() as u64
    } else {
        0
    };

    let customers = input.total_customers as u64;
    let paid_conversion_rate = rate(input.paid_users as u64, customers);
    let coin_user_rate = rate(input.coin_users as u64, customers);
    let regular_rate = rate(input.regular_customers as u64, customers);
    let high_spender_rate = rate(input.high_spenders as u64, customers);
    let tip_rate = rate(input.tips, input.total_sales);

    let weekday = Weekday::of(input.date);
    let time_category = TimeCategory::of(input.start_time);

    ShiftRecord {
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
        device: input.device,
        health: input.health,
        motivation: input.motivation,
        total_customers: input.total_customers,
        coin_users: input.coin_users,
        regular_customers: input.regular_customers,
        paid_users: input.paid_users,
        high_spenders: input.high_spenders,
        total_sales: input.total_sales,
        entrance_fee: input.entrance_fee,
        tips: input.tips,
        special_reward: input.special_reward,
        talk_theme: input.talk_theme,
        sales_approach: input.sales_approach,
        tension: input.tension,
        success_memo: input.success_memo,
        failure_memo: input.failure_memo,
        has_event: input.has_event,
        payday: input.payday,
        working_hours,
        hourly_wage,
        paid_conversion_rate,
        coin_user_rate,
        regular_rate,
        high_spender_rate,
        tip_rate,
        weekday,
        time_category,
    }
}
