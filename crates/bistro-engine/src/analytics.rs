//! Dashboard payload for the manager analytics screen.
//!
//! Only `recommendedAllocation` is computed from live floor state. The rest
//! is canned demo analytics until a reporting backend exists.

use bistro_core::{Money, Recommendation, TablePerformance};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyCount {
    pub day: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyAmount {
    pub day: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyEngagement {
    pub day: String,
    pub conversion: u32,
    pub abandonment: u32,
    pub avg_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WeatherMetric {
    pub condition: String,
    pub customers: u32,
    pub revenue: Money,
    pub ticket: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardMetrics {
    pub total_sessions: u32,
    pub weekly_sessions: Vec<DailyCount>,
    pub abandoned_carts_rate: f64,
    pub conversion_rate: f64,
    pub average_stay_minutes: u32,
    pub second_round_rate: u32,
    pub occupancy_rate: u32,
    pub sales_by_weather: Vec<WeatherMetric>,
    pub weekly_sales: Vec<DailyAmount>,
    pub daily_engagement: Vec<DailyEngagement>,
    pub popular_products: Vec<ProductCount>,
    pub dead_products: Vec<ProductCount>,
    pub table_performance: Vec<TablePerformance>,
    pub recommended_allocation: Vec<Recommendation>,
}

const WEEK: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

impl DashboardMetrics {
    /// Canned analytics around the live allocation and configured history.
    pub fn assemble(
        table_performance: Vec<TablePerformance>,
        recommended_allocation: Vec<Recommendation>,
    ) -> Self {
        DashboardMetrics {
            total_sessions: 1248,
            weekly_sessions: per_day([120, 155, 140, 195, 240, 290, 180], |day, count| {
                DailyCount { day, count }
            }),
            abandoned_carts_rate: 12.5,
            conversion_rate: 87.5,
            average_stay_minutes: 48,
            second_round_rate: 34,
            occupancy_rate: 78,
            sales_by_weather: vec![
                weather("Soleado", 145, 985_000, 6793),
                weather("Nublado", 98, 620_000, 6326),
                weather("Lluvia", 65, 510_000, 7846),
                weather("Frío", 82, 590_000, 7195),
            ],
            weekly_sales: per_day(
                [120_000, 145_000, 132_000, 190_000, 280_000, 350_000, 210_000],
                |day, amount| DailyAmount {
                    day,
                    amount: Money::from_units(amount),
                },
            ),
            daily_engagement: per_day(
                [(78, 45), (82, 42), (80, 48), (88, 55), (92, 65), (85, 70), (89, 60)],
                |day, (conversion, avg_time)| DailyEngagement {
                    day,
                    conversion,
                    abandonment: 100 - conversion,
                    avg_time,
                },
            ),
            popular_products: products(&[
                ("BistrOS Burger", 420),
                ("Cerveza IPA", 380),
                ("Papas Rústicas", 215),
                ("Limonada", 180),
                ("Tiramisú", 95),
            ]),
            dead_products: products(&[("Wrap Veggie", 12), ("Agua s/gas", 8), ("Ensalada", 3)]),
            table_performance,
            recommended_allocation,
        }
    }
}

fn per_day<V, T>(values: [V; 7], build: impl Fn(String, V) -> T) -> Vec<T> {
    WEEK.iter()
        .zip(values)
        .map(|(day, value)| build(day.to_string(), value))
        .collect()
}

fn weather(condition: &str, customers: u32, revenue: i64, ticket: i64) -> WeatherMetric {
    WeatherMetric {
        condition: condition.to_string(),
        customers,
        revenue: Money::from_units(revenue),
        ticket: Money::from_units(ticket),
    }
}

fn products(list: &[(&str, u32)]) -> Vec<ProductCount> {
    list.iter()
        .map(|(name, count)| ProductCount {
            name: name.to_string(),
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_block_shape() {
        let metrics = DashboardMetrics::assemble(Vec::new(), Vec::new());
        assert_eq!(metrics.weekly_sessions.len(), 7);
        assert_eq!(metrics.weekly_sessions[5].day, "Sáb");
        assert_eq!(metrics.weekly_sessions[5].count, 290);
        assert_eq!(metrics.daily_engagement[4].abandonment, 8);

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["totalSessions"], 1248);
        assert_eq!(json["weeklySales"][0]["amount"], 120000);
        assert_eq!(json["dailyEngagement"][0]["avgTime"], 45);
        assert!(json["recommendedAllocation"].as_array().unwrap().is_empty());
    }
}
