//! Aggregate statistics over orders.

use serde::{Deserialize, Serialize};

use crate::model::round2;

/// Totals across every matching order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub total_tax: f64,
    pub total_tips: f64,
    pub unique_users: u64,
    pub unique_restaurants: u64,
}

impl OrderStats {
    /// Round monetary fields to cents.
    pub fn rounded(self) -> Self {
        Self {
            total_revenue: round2(self.total_revenue),
            average_order_value: round2(self.average_order_value),
            total_tax: round2(self.total_tax),
            total_tips: round2(self.total_tips),
            ..self
        }
    }
}

/// Per-restaurant rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantStats {
    pub restaurant_name: String,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub total_tax: f64,
    pub total_tips: f64,
}

impl RestaurantStats {
    pub fn rounded(self) -> Self {
        Self {
            total_revenue: round2(self.total_revenue),
            average_order_value: round2(self.average_order_value),
            total_tax: round2(self.total_tax),
            total_tips: round2(self.total_tips),
            ..self
        }
    }
}

/// Per-bucket rollup; `date` is the bucket key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateStats {
    pub date: String,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

impl DateStats {
    pub fn rounded(self) -> Self {
        Self {
            total_revenue: round2(self.total_revenue),
            average_order_value: round2(self.average_order_value),
            ..self
        }
    }
}

/// Running totals used to build the rollups in memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct Accumulator {
    pub orders: u64,
    pub revenue: f64,
    pub tax: f64,
    pub tips: f64,
}

impl Accumulator {
    pub fn add(&mut self, total: f64, tax: f64, tip: f64) {
        self.orders += 1;
        self.revenue += total;
        self.tax += tax;
        self.tips += tip;
    }

    pub fn average(&self) -> f64 {
        if self.orders == 0 {
            0.0
        } else {
            self.revenue / self.orders as f64
        }
    }
}
