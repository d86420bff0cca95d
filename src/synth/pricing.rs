//! Menu selection and price synthesis.
//!
//! Item names and unit prices come from the catalog; quantities, tax, tip
//! and the optional service fee are generated.

use std::ops::RangeInclusive;

use rand::seq::index;
use rand::Rng;

use crate::model::{
    round2, AdjustmentType, CatalogEntry, RawAdjustment, RawPrice, RawProduct, RawProductPrice,
    DEFAULT_CURRENCY, DEFAULT_STATUS,
};

pub const ITEM_COUNT: RangeInclusive<usize> = 2..=5;
pub const QUANTITY: RangeInclusive<u32> = 1..=3;
pub const TAX_RATE: RangeInclusive<f64> = 0.06..=0.08;
pub const TIP_RATE: RangeInclusive<f64> = 0.10..=0.20;
pub const SERVICE_FEE_RATE: RangeInclusive<f64> = 0.03..=0.05;
pub const SERVICE_FEE_PROBABILITY: f64 = 0.3;

/// Orderable `(name, unit price)` pairs from a restaurant's menus.
pub fn eligible_items(entry: &CatalogEntry) -> Vec<(&str, f64)> {
    entry.menu_items().filter_map(|item| item.priced()).collect()
}

/// Pick random menu items and quantities.
///
/// Returns an empty list when the restaurant has nothing orderable; the
/// caller is expected to try another restaurant.
pub fn select_menu_items<R: Rng + ?Sized>(entry: &CatalogEntry, rng: &mut R) -> Vec<RawProduct> {
    let items = eligible_items(entry);
    if items.is_empty() {
        return Vec::new();
    }

    let wanted = rng.random_range(ITEM_COUNT);
    let amount = wanted.min(items.len());

    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| {
            let (name, unit_price) = items[i];
            let quantity = rng.random_range(QUANTITY);
            RawProduct {
                name: name.to_string(),
                quantity,
                price: RawProductPrice {
                    unit_price,
                    total: round2(unit_price * quantity as f64),
                },
                order_status: Some(DEFAULT_STATUS.to_string()),
            }
        })
        .collect()
}

/// Compute subtotal, adjustments and total for a set of products.
///
/// The total is the subtotal plus every adjustment, rounded to cents.
pub fn calculate_pricing<R: Rng + ?Sized>(products: &[RawProduct], rng: &mut R) -> RawPrice {
    let sub_total = round2(products.iter().map(|p| p.price.total).sum());

    let tax = round2(sub_total * rng.random_range(TAX_RATE));
    let tip = round2(sub_total * rng.random_range(TIP_RATE));

    let mut adjustments = vec![
        RawAdjustment::new(AdjustmentType::Tax, "Estimated Tax", tax),
        RawAdjustment::new(AdjustmentType::Tip, "Dasher Tip", tip),
    ];

    if rng.random_bool(SERVICE_FEE_PROBABILITY) {
        let fee = round2(sub_total * rng.random_range(SERVICE_FEE_RATE));
        adjustments.insert(0, RawAdjustment::new(AdjustmentType::Fee, "Service Fee", fee));
    }

    let total = round2(sub_total + adjustments.iter().map(|a| a.amount).sum::<f64>());

    RawPrice {
        sub_total,
        adjustments,
        total,
        currency: Some(DEFAULT_CURRENCY.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MenuItem, PricedItem};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn priced(name: &str, price: f64) -> MenuItem {
        MenuItem::Priced(PricedItem {
            name: Some(name.to_string()),
            unit_price: Some(price),
        })
    }

    fn restaurant(items: Vec<MenuItem>) -> CatalogEntry {
        let mut menus = BTreeMap::new();
        menus.insert("Dinner".to_string(), Some(items));
        CatalogEntry {
            restaurant: "Test Kitchen".to_string(),
            address: "1 Nassau St, Princeton, NJ 08540".to_string(),
            coordinates: None,
            menus: Some(menus),
        }
    }

    fn full_menu() -> CatalogEntry {
        restaurant(vec![
            priced("Seasoned Fries", 5.51),
            priced("Falafel Sandwich", 7.76),
            priced("Chicken Kebob Plate", 16.78),
            priced("Hummus", 6.25),
            priced("Baklava", 3.99),
            priced("Mint Tea", 2.50),
            MenuItem::Text("Daily Special".to_string()),
        ])
    }

    #[test]
    fn test_no_menus_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let entry = CatalogEntry {
            restaurant: "Empty".to_string(),
            ..Default::default()
        };
        assert!(select_menu_items(&entry, &mut rng).is_empty());
    }

    #[test]
    fn test_text_only_menu_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let entry = restaurant(vec![
            MenuItem::Text("Pizza".to_string()),
            MenuItem::Priced(PricedItem {
                name: Some("No Price".to_string()),
                unit_price: None,
            }),
        ]);
        assert!(select_menu_items(&entry, &mut rng).is_empty());
    }

    #[test]
    fn test_selection_bounds_and_line_totals() {
        let mut rng = StdRng::seed_from_u64(42);
        let entry = full_menu();

        for _ in 0..200 {
            let products = select_menu_items(&entry, &mut rng);
            assert!(ITEM_COUNT.contains(&products.len()));

            let mut names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), products.len(), "items must not repeat");

            for product in &products {
                assert!(QUANTITY.contains(&product.quantity));
                assert_eq!(
                    product.price.total,
                    round2(product.price.unit_price * product.quantity as f64)
                );
                assert_ne!(product.name, "Daily Special");
            }
        }
    }

    #[test]
    fn test_selection_capped_by_menu_size() {
        let mut rng = StdRng::seed_from_u64(5);
        let entry = restaurant(vec![priced("Only Dish", 9.0)]);
        for _ in 0..20 {
            assert_eq!(select_menu_items(&entry, &mut rng).len(), 1);
        }
    }

    #[test]
    fn test_pricing_rates_and_total() {
        let mut rng = StdRng::seed_from_u64(99);
        let entry = full_menu();
        let mut saw_fee = false;
        let mut saw_no_fee = false;

        for _ in 0..300 {
            let products = select_menu_items(&entry, &mut rng);
            let price = calculate_pricing(&products, &mut rng);
            let sub = price.sub_total;

            let expected_sub = round2(products.iter().map(|p| p.price.total).sum());
            assert_eq!(sub, expected_sub);

            let tax = price.sum_of(&AdjustmentType::Tax);
            let tip = price.sum_of(&AdjustmentType::Tip);
            assert!(tax >= round2(sub * 0.06) - 0.01 && tax <= round2(sub * 0.08) + 0.01);
            assert!(tip >= round2(sub * 0.10) - 0.01 && tip <= round2(sub * 0.20) + 0.01);

            match price.adjustments.len() {
                3 => {
                    saw_fee = true;
                    assert_eq!(price.adjustments[0].adjustment_type(), AdjustmentType::Fee);
                    let fee = price.adjustments[0].amount;
                    assert!(fee >= round2(sub * 0.03) - 0.01 && fee <= round2(sub * 0.05) + 0.01);
                }
                2 => saw_no_fee = true,
                n => panic!("unexpected adjustment count {n}"),
            }

            let adjustments: f64 = price.adjustments.iter().map(|a| a.amount).sum();
            assert!((price.total - (sub + adjustments)).abs() < 0.01);
            assert_eq!(price.total, round2(sub + adjustments));
            assert_eq!(price.currency.as_deref(), Some("USD"));
        }

        assert!(saw_fee && saw_no_fee);
    }
}
