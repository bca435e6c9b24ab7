//! End-to-end scenarios for a three-state bank account.
//!
//! States: `open`, `held`, `closed`. Starting state: `open`.

use statewise::core::Receiver;
use statewise::{Compiled, Description, DispatchError, HandlerError, Machine};
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq)]
struct Account {
    balance: u64,
}

fn deposit(account: &mut Account, amount: u64) -> Result<u64, HandlerError> {
    account.balance += amount;
    Ok(account.balance)
}

fn withdraw(account: &mut Account, amount: u64) -> Result<u64, HandlerError> {
    if amount > account.balance {
        return Err(format!("insufficient funds: {} < {}", account.balance, amount).into());
    }
    account.balance -= amount;
    Ok(account.balance)
}

fn balance(account: &mut Account, _: u64) -> Result<u64, HandlerError> {
    Ok(account.balance)
}

fn account() -> Compiled<Account, u64, u64> {
    Description::new(Account::default())
        .starting("open")
        .state("open", |s| {
            s.on("deposit", deposit)
                .on("withdraw", withdraw)
                .to("held")
                .on("place_hold", balance)
                .to("closed")
                .on("close", balance)
        })
        .state("held", |s| {
            s.on("deposit", deposit)
                .to("open")
                .on("remove_hold", balance)
                .to("closed")
                .on("close", balance)
        })
        .state("closed", |s| s.to("open").on("reopen", balance))
        .compile()
        .unwrap()
}

#[test]
fn deposit_keeps_account_open() {
    let mut account = account().spawn();

    assert_eq!(account.dispatch("deposit", 100).unwrap(), 100);
    assert_eq!(account.data().balance, 100);
    assert_eq!(account.state(), "open");
}

#[test]
fn place_hold_moves_to_held() {
    let mut account = account().spawn();
    account.dispatch("deposit", 100).unwrap();

    account.trigger("place_hold").unwrap();

    assert_eq!(account.state(), "held");
    assert_eq!(account.data().balance, 100);
}

#[test]
fn withdraw_is_rejected_while_held() {
    let mut account = account().spawn();
    account.dispatch("deposit", 100).unwrap();
    account.trigger("place_hold").unwrap();

    let err = account.dispatch("withdraw", 50).unwrap_err();

    match err {
        DispatchError::InvalidEvent { event, state } => {
            assert_eq!(event, "withdraw");
            assert_eq!(state, "held");
        }
        other => panic!("expected InvalidEvent, got {other:?}"),
    }
    assert_eq!(account.state(), "held");
    assert_eq!(account.data().balance, 100);
}

#[test]
fn remove_hold_reopens() {
    let mut account = account().spawn();
    account.trigger("place_hold").unwrap();

    account.trigger("remove_hold").unwrap();

    assert_eq!(account.state(), "open");
}

#[test]
fn closed_account_still_describes_every_edge() {
    let mut account = account().spawn();
    account.dispatch("deposit", 100).unwrap();

    account.trigger("close").unwrap();
    assert_eq!(account.state(), "closed");

    let graph = account.describe();
    assert_eq!(graph.starting_state, "open");
    assert_eq!(
        graph.events_between("closed", "open"),
        Some(&["reopen".to_string()][..])
    );
    assert_eq!(
        graph.events_between("open", "open"),
        Some(&["deposit".to_string(), "withdraw".to_string()][..])
    );
    assert!(graph.terminal_states().is_empty());
}

#[test]
fn undeclared_destination_fails_compilation() {
    let result = Description::<Account, u64, u64>::new(Account::default())
        .starting("open")
        .state("open", |s| s.to("frozen").on("freeze", balance))
        .compile();

    let err = result.err().unwrap();
    assert!(err.is_undeclared_destination());
    assert!(err.to_string().contains("frozen"));
}

#[test]
fn failed_withdrawal_leaves_account_untouched() {
    let mut account = account().spawn();
    account.dispatch("deposit", 30).unwrap();

    let err = account.dispatch("withdraw", 50).unwrap_err();

    assert!(err.to_string().contains("insufficient funds"));
    assert_eq!(account.data().balance, 30);
    assert_eq!(account.state(), "open");
    assert_eq!(account.history().transitions().len(), 1);
}

#[test]
fn instances_do_not_share_properties() {
    let compiled = account();
    let mut first = compiled.spawn();
    let second = compiled.spawn();

    first.dispatch("deposit", 10).unwrap();

    assert_eq!(first.data().balance, 10);
    assert_eq!(second.data().balance, 0);
    assert_eq!(compiled.properties().balance, 0);
}

#[test]
fn factory_accepts_any_declared_starting_state() {
    let (table, _, properties) = account().into_parts();

    let mut closed = Machine::new(Arc::clone(&table), "closed", properties.clone()).unwrap();
    assert_eq!(closed.available_events(), vec!["reopen"]);
    closed.trigger("reopen").unwrap();
    assert_eq!(closed.state(), "open");

    assert!(Machine::new(table, "frozen", properties).is_err());
}

#[test]
fn history_tracks_the_path() {
    let mut account = account().spawn();
    account.dispatch("deposit", 5).unwrap();
    account.trigger("place_hold").unwrap();
    account.trigger("close").unwrap();
    account.trigger("reopen").unwrap();

    assert_eq!(
        account.history().get_path(),
        vec!["open", "open", "held", "closed", "open"]
    );
    assert_eq!(account.history().count("deposit"), 1);
}

#[test]
fn table_is_shared_across_threads() {
    let compiled = account();
    let table = Arc::clone(compiled.table());

    std::thread::scope(|scope| {
        for amount in 1..=4u64 {
            let table = Arc::clone(&table);
            scope.spawn(move || {
                let mut account = Machine::new(table, "open", Account::default()).unwrap();
                account.dispatch("deposit", amount).unwrap();
                assert_eq!(account.data().balance, amount);
            });
        }
    });
}

#[test]
fn compiled_handlers_run_against_a_bare_receiver() {
    let compiled = account();
    let table = compiled.table();

    let mut receiver = Receiver::new("open", Account { balance: 20 });
    let deposit = table.handler("open", "deposit").unwrap();
    assert_eq!(deposit.call(&mut receiver, 5).unwrap(), 25);
    assert_eq!(receiver.state(), "open");

    let hold = table.handler("open", "place_hold").unwrap();
    assert_eq!(hold.destination(), Some("held"));
    hold.call(&mut receiver, 0).unwrap();
    assert_eq!(receiver.state(), "held");
    assert_eq!(receiver.data().balance, 25);
}
