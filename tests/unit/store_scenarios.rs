use std::sync::Arc;
use std::thread;
use storepipe_rs::PipelineError;
use storepipe_rs::store::{NOTICE_INSUFFICIENT_FUNDS, StoreApi};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Concurrent shoppers ---

    #[test]
    fn test_concurrent_shoppers_reserve_and_buy_out() {
        let api = Arc::new(StoreApi::new(100_000.0));
        api.add_product("laptop", 50, 1000.0).unwrap();
        for i in 0..5 {
            api.create_customer(&format!("customer-{i}"), 10_000.0)
                .unwrap();
        }
        api.drain();

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    let login = format!("customer-{i}");
                    let quantity = fastrand::u32(1..=5);
                    assert!(api.reserve(&login, "laptop", quantity).unwrap());
                    assert!(api.purchase_reserved(&login).unwrap());
                    quantity
                })
            })
            .collect();
        let sold: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(api.available_quantity("laptop").unwrap(), 50 - sold);
        let takings = f64::from(sold) * 1000.0;
        assert_eq!(api.store_balance().unwrap(), 100_000.0 + takings);
        for i in 0..5 {
            let customer = api.customer(&format!("customer-{i}")).unwrap().unwrap();
            assert_eq!(customer.balance + customer.spent_amount, 10_000.0);
            assert!(customer.reserved.is_empty());
        }
        api.shutdown();
    }

    // --- Funds exhaustion ---

    #[test]
    fn test_shopper_buys_until_funds_run_out() {
        let api = StoreApi::new(0.0);
        api.add_product("snack", 100, 3.0).unwrap();
        api.create_customer("buyer", 10.0).unwrap();

        let mut successes = 0u32;
        loop {
            let spent = api.purchase("buyer", "snack", 1).unwrap();
            if spent == 0.0 {
                break;
            }
            assert_eq!(spent, 3.0);
            successes += 1;
        }

        assert_eq!(successes, 3);
        let buyer = api.customer("buyer").unwrap().unwrap();
        assert_eq!(buyer.balance, 1.0);
        assert_eq!(buyer.spent_amount, 9.0);
        assert_eq!(
            buyer.last_message().unwrap().text,
            NOTICE_INSUFFICIENT_FUNDS
        );
        assert_eq!(api.available_quantity("snack").unwrap(), 97);
        assert_eq!(api.store_balance().unwrap(), 9.0);
        api.shutdown();
    }

    // --- Concurrent restocking ---

    #[test]
    fn test_concurrent_supply_additions_all_land() {
        let api = Arc::new(StoreApi::new(0.0));
        api.add_product("widget", 100, 2.0).unwrap();
        api.drain();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    let quantity = fastrand::u32(1..=20);
                    api.add_supply("widget", quantity).unwrap();
                    quantity
                })
            })
            .collect();
        let added: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        api.drain();
        assert_eq!(api.available_quantity("widget").unwrap(), 100 + added);
        api.shutdown();
    }

    // --- Invariants under load ---

    #[test]
    fn test_money_and_stock_are_conserved_across_a_mixed_workload() {
        let api = Arc::new(StoreApi::new(1000.0));
        api.add_product("book", 200, 10.0).unwrap();
        api.add_product("pen", 200, 1.0).unwrap();
        for i in 0..4 {
            api.create_customer(&format!("reader-{i}"), 250.0).unwrap();
        }
        api.drain();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    let login = format!("reader-{i}");
                    let mut books_bought = 0u32;
                    let mut pen_reserves = 0u32;
                    for _ in 0..20 {
                        match fastrand::u32(0..3) {
                            0 => {
                                if api.purchase(&login, "book", 1).unwrap() > 0.0 {
                                    books_bought += 1;
                                }
                            }
                            1 => {
                                if api.reserve(&login, "pen", 2).unwrap() {
                                    pen_reserves += 1;
                                }
                            }
                            _ => {
                                api.purchase_reserved(&login).unwrap();
                            }
                        }
                    }
                    (books_bought, pen_reserves)
                })
            })
            .collect();
        let mut books_bought = 0u32;
        let mut pen_reserves = 0u32;
        for handle in handles {
            let (books, pens) = handle.join().unwrap();
            books_bought += books;
            pen_reserves += pens;
        }

        let snapshot = api.snapshot().unwrap();

        // Treasury grew by exactly what the customers spent.
        let total_spent: f64 = snapshot.customers().iter().map(|c| c.spent_amount).sum();
        assert_eq!(snapshot.balance(), 1000.0 + total_spent);
        let held_by_customers: f64 = snapshot.customers().iter().map(|c| c.balance).sum();
        assert_eq!(snapshot.balance() + held_by_customers, 1000.0 + 4.0 * 250.0);

        // Stock left = initial minus everything bought or set aside.
        assert_eq!(snapshot.available_quantity("book"), 200 - books_bought);
        assert_eq!(snapshot.available_quantity("pen"), 200 - 2 * pen_reserves);
        api.shutdown();
    }

    #[test]
    fn test_stock_is_never_oversold_under_contention() {
        let api = Arc::new(StoreApi::new(0.0));
        api.add_product("ticket", 30, 1.0).unwrap();
        for i in 0..8 {
            api.create_customer(&format!("fan-{i}"), 100.0).unwrap();
        }
        api.drain();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    let login = format!("fan-{i}");
                    let mut bought = 0u32;
                    for _ in 0..10 {
                        if api.purchase(&login, "ticket", 1).unwrap() > 0.0 {
                            bought += 1;
                        }
                    }
                    bought
                })
            })
            .collect();
        let sold: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // 80 attempts against 30 tickets, funds never the constraint:
        // exactly the stock sells, no more.
        assert_eq!(sold, 30);
        assert_eq!(api.available_quantity("ticket").unwrap(), 0);
        assert_eq!(api.store_balance().unwrap(), 30.0);
        api.shutdown();
    }

    // --- Lifecycle ---

    #[test]
    fn test_api_rejects_work_after_shutdown() {
        let api = StoreApi::new(0.0);
        api.shutdown();

        assert_eq!(
            api.create_customer("late", 1.0),
            Err(PipelineError::Shutdown)
        );
        assert_eq!(
            api.purchase("late", "anything", 1),
            Err(PipelineError::Shutdown)
        );
        assert_eq!(api.pending_count(), 0);
    }
}
