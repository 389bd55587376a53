//! End-to-end scenarios: order book wired to a shared portfolio
//!
//! Each test builds the host wiring by hand: participants in one ledger,
//! one book per symbol, observers collecting trades and rejections.

use matching_engine::OrderBook;
use portfolio::Portfolio;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use types::ids::{ParticipantId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

fn aapl() -> Symbol {
    Symbol::new("AAPL")
}

fn participant(name: &str) -> ParticipantId {
    ParticipantId::new(name)
}

fn ledger(cash_by_name: &[(&str, u64)]) -> Arc<Portfolio> {
    let initial = cash_by_name
        .iter()
        .map(|(name, cash)| (participant(name), Decimal::from(*cash)))
        .collect::<HashMap<_, _>>();
    Arc::new(Portfolio::new(initial))
}

fn wired_book(portfolio: &Arc<Portfolio>) -> (Arc<OrderBook>, Arc<Mutex<Vec<Trade>>>, Arc<Mutex<Vec<String>>>) {
    let book = Arc::new(OrderBook::new(aapl()));
    book.set_portfolio(Arc::clone(portfolio));

    let trades = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&trades);
    book.set_trade_callback(move |trade: &Trade| {
        sink.lock().unwrap().push(trade.clone());
    });

    let rejections = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rejections);
    book.set_rejection_callback(move |_order: &Order, reason: &str| {
        sink.lock().unwrap().push(reason.to_string());
    });

    (book, trades, rejections)
}

fn limit(name: &str, side: Side, qty: u32, price: u64) -> Order {
    Order::limit(
        participant(name),
        aapl(),
        side,
        Quantity::new(qty),
        Price::from_u64(price),
    )
}

fn market(name: &str, side: Side, qty: u32) -> Order {
    Order::market(participant(name), aapl(), side, Quantity::new(qty))
}

/// A crossing limit buy trades at the resting ask, improving the taker price
#[test]
fn limit_cross_with_taker_improvement() {
    let portfolio = ledger(&[("A", 10_000), ("B", 10_000)]);
    portfolio
        .set_initial_position(&participant("B"), aapl(), 10, Decimal::ZERO)
        .unwrap();
    let (book, trades, _) = wired_book(&portfolio);

    assert!(book.add_order(limit("B", Side::SELL, 10, 150)).unwrap());
    assert!(book.add_order(limit("A", Side::BUY, 10, 155)).unwrap());

    let trades = trades.lock().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, Quantity::new(10));
    assert_eq!(trades[0].price, Price::from_u64(150));

    assert_eq!(portfolio.get_cash(&participant("A")).unwrap(), Decimal::from(8_500));
    assert_eq!(portfolio.get_position(&participant("A"), &aapl()).unwrap(), 10);
    assert_eq!(portfolio.get_cash(&participant("B")).unwrap(), Decimal::from(11_500));
    assert_eq!(portfolio.get_position(&participant("B"), &aapl()).unwrap(), 0);

    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
}

/// A market buy larger than the best level walks up the ask ladder
#[test]
fn market_buy_partial_across_levels() {
    let portfolio = ledger(&[("S1", 0), ("S2", 0), ("B", 2_000)]);
    portfolio
        .set_initial_position(&participant("S1"), aapl(), 5, Decimal::ZERO)
        .unwrap();
    portfolio
        .set_initial_position(&participant("S2"), aapl(), 5, Decimal::ZERO)
        .unwrap();
    let (book, trades, _) = wired_book(&portfolio);

    assert!(book.add_order(limit("S1", Side::SELL, 5, 100)).unwrap());
    assert!(book.add_order(limit("S2", Side::SELL, 5, 101)).unwrap());
    assert!(book.add_order(market("B", Side::BUY, 8)).unwrap());

    let trades = trades.lock().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].quantity, Quantity::new(5));
    assert_eq!(trades[0].price, Price::from_u64(100));
    assert_eq!(trades[1].quantity, Quantity::new(3));
    assert_eq!(trades[1].price, Price::from_u64(101));

    // 2 000 − 500 − 303 = 1 197
    assert_eq!(portfolio.get_cash(&participant("B")).unwrap(), Decimal::from(1_197));
    assert_eq!(portfolio.get_position(&participant("B"), &aapl()).unwrap(), 8);

    // 2 @ 101 still resting
    assert_eq!(book.best_ask(), Some(Price::from_u64(101)));
    assert_eq!(book.book_depth(1).asks, vec![(Price::from_u64(101), 2)]);
}

/// Rejection on insufficient cash leaves book and ledger unchanged
#[test]
fn rejection_insufficient_cash() {
    let portfolio = ledger(&[("A", 100)]);
    let (book, trades, rejections) = wired_book(&portfolio);

    let accepted = book.add_order(limit("A", Side::BUY, 10, 50)).unwrap();
    assert!(!accepted);

    let rejections = rejections.lock().unwrap();
    assert_eq!(rejections.len(), 1);
    assert!(rejections[0].contains("insufficient funds"));

    assert!(trades.lock().unwrap().is_empty());
    assert_eq!(book.best_bid(), None);
    assert_eq!(portfolio.get_cash(&participant("A")).unwrap(), Decimal::from(100));
}

/// Cancel succeeds once, then misses
#[test]
fn cancel_roundtrip() {
    let portfolio = ledger(&[("A", 10_000)]);
    let (book, _, _) = wired_book(&portfolio);

    let order = limit("A", Side::BUY, 10, 90);
    let id = order.id;
    assert!(book.add_order(order).unwrap());

    assert!(book.cancel_order(&id));
    assert_eq!(book.best_bid(), None);
    assert!(!book.cancel_order(&id));
}

/// Sellers at one price fill in arrival order
#[test]
fn fifo_at_price_level() {
    let portfolio = ledger(&[("S1", 0), ("S2", 0), ("S3", 0), ("B", 10_000)]);
    for seller in ["S1", "S2", "S3"] {
        portfolio
            .set_initial_position(&participant(seller), aapl(), 5, Decimal::ZERO)
            .unwrap();
    }
    let (book, trades, _) = wired_book(&portfolio);

    assert!(book.add_order(limit("S1", Side::SELL, 5, 100)).unwrap());
    assert!(book.add_order(limit("S2", Side::SELL, 5, 100)).unwrap());
    assert!(book.add_order(limit("S3", Side::SELL, 5, 100)).unwrap());
    assert!(book.add_order(market("B", Side::BUY, 7)).unwrap());

    let trades = trades.lock().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].seller_id, participant("S1"));
    assert_eq!(trades[0].quantity, Quantity::new(5));
    assert_eq!(trades[1].seller_id, participant("S2"));
    assert_eq!(trades[1].quantity, Quantity::new(2));

    assert_eq!(portfolio.get_position(&participant("S1"), &aapl()).unwrap(), 0);
    assert_eq!(portfolio.get_position(&participant("S2"), &aapl()).unwrap(), 3);
    assert_eq!(portfolio.get_position(&participant("S3"), &aapl()).unwrap(), 5);

    assert_eq!(book.best_ask(), Some(Price::from_u64(100)));
    assert_eq!(book.book_depth(1).asks, vec![(Price::from_u64(100), 8)]);
}

/// Market BUY with empty asks validates against the reference price
#[test]
fn market_buy_validated_against_reference_price() {
    let portfolio = ledger(&[("B", 100)]);
    let (book, _, rejections) = wired_book(&portfolio);

    // no asks, no reference price: cannot even price the check
    assert!(!book.add_order(market("B", Side::BUY, 10)).unwrap());
    assert!(rejections.lock().unwrap()[0].contains("reference price"));

    // reference price 50: 10 × 50 = 500 > 100 cash
    book.update_market_price(Price::from_u64(50));
    assert!(!book.add_order(market("B", Side::BUY, 10)).unwrap());
    assert!(rejections.lock().unwrap()[1].contains("insufficient funds"));

    // affordable, passes validation, then rejects on the empty book
    assert!(!book.add_order(market("B", Side::BUY, 2)).unwrap());
    assert_eq!(rejections.lock().unwrap()[2], "no liquidity available");
}

/// Selling without inventory is rejected before the book is touched
#[test]
fn rejection_insufficient_position() {
    let portfolio = ledger(&[("A", 10_000)]);
    let (book, _, rejections) = wired_book(&portfolio);

    assert!(!book.add_order(limit("A", Side::SELL, 5, 100)).unwrap());
    assert!(rejections.lock().unwrap()[0].contains("insufficient position"));
    assert_eq!(book.best_ask(), None);
}

/// Cash moved by trades always nets to zero across the ledger
#[test]
fn settlement_conserves_cash_and_float() {
    let portfolio = ledger(&[("A", 50_000), ("B", 50_000), ("C", 50_000)]);
    portfolio
        .set_initial_position(&participant("A"), aapl(), 100, Decimal::ZERO)
        .unwrap();
    let (book, trades, _) = wired_book(&portfolio);

    assert!(book.add_order(limit("A", Side::SELL, 40, 101)).unwrap());
    assert!(book.add_order(limit("A", Side::SELL, 60, 102)).unwrap());
    assert!(book.add_order(limit("B", Side::BUY, 55, 102)).unwrap());
    assert!(book.add_order(market("C", Side::BUY, 20)).unwrap());

    let emitted: Decimal = trades.lock().unwrap().iter().map(|t| t.notional()).sum();

    let total_cash: Decimal = ["A", "B", "C"]
        .iter()
        .map(|name| portfolio.get_cash(&participant(name)).unwrap())
        .sum();
    assert_eq!(total_cash, Decimal::from(150_000));

    let total_shares: i64 = ["A", "B", "C"]
        .iter()
        .map(|name| portfolio.get_position(&participant(name), &aapl()).unwrap())
        .sum();
    assert_eq!(total_shares, 100);

    // buyers paid exactly what sellers received
    let a_proceeds = portfolio.get_cash(&participant("A")).unwrap() - Decimal::from(50_000);
    assert_eq!(a_proceeds, emitted);
}

/// A strategy reacting to a trade may submit the next order from the callback
#[test]
fn trade_callback_can_place_followup_order() {
    let portfolio = ledger(&[("A", 10_000), ("B", 10_000)]);
    portfolio
        .set_initial_position(&participant("A"), aapl(), 20, Decimal::ZERO)
        .unwrap();

    let book = Arc::new(OrderBook::new(aapl()));
    book.set_portfolio(Arc::clone(&portfolio));

    let reentrant = Arc::clone(&book);
    book.set_trade_callback(move |trade: &Trade| {
        // replenish the ask once the first fill prints
        if trade.price == Price::from_u64(100) {
            let _ = reentrant.add_order(limit("A", Side::SELL, 5, 101));
        }
    });

    assert!(book.add_order(limit("A", Side::SELL, 5, 100)).unwrap());
    assert!(book.add_order(limit("B", Side::BUY, 5, 100)).unwrap());

    assert_eq!(book.best_ask(), Some(Price::from_u64(101)));
}

/// Multiple books share one ledger without interfering
#[test]
fn two_books_share_one_portfolio() {
    let portfolio = ledger(&[("A", 10_000), ("B", 10_000)]);
    let msft = Symbol::new("MSFT");
    portfolio
        .set_initial_position(&participant("A"), aapl(), 10, Decimal::ZERO)
        .unwrap();
    portfolio
        .set_initial_position(&participant("A"), msft.clone(), 10, Decimal::ZERO)
        .unwrap();

    let (aapl_book, _, _) = wired_book(&portfolio);
    let msft_book = OrderBook::new(msft.clone());
    msft_book.set_portfolio(Arc::clone(&portfolio));

    assert!(aapl_book.add_order(limit("A", Side::SELL, 10, 100)).unwrap());
    assert!(aapl_book.add_order(limit("B", Side::BUY, 10, 100)).unwrap());

    let msft_sell = Order::limit(
        participant("A"),
        msft.clone(),
        Side::SELL,
        Quantity::new(10),
        Price::from_u64(200),
    );
    let msft_buy = Order::limit(
        participant("B"),
        msft.clone(),
        Side::BUY,
        Quantity::new(10),
        Price::from_u64(200),
    );
    assert!(msft_book.add_order(msft_sell).unwrap());
    assert!(msft_book.add_order(msft_buy).unwrap());

    // A sold both positions: 10 000 + 1 000 + 2 000
    assert_eq!(portfolio.get_cash(&participant("A")).unwrap(), Decimal::from(13_000));
    assert_eq!(portfolio.get_cash(&participant("B")).unwrap(), Decimal::from(7_000));
    assert_eq!(portfolio.get_position(&participant("B"), &aapl()).unwrap(), 10);
    assert_eq!(portfolio.get_position(&participant("B"), &msft).unwrap(), 10);
}
