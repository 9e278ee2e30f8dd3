use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

// The in-memory backend is auto-seeded with the stock catalog and the
// user123 demo account on every invocation.

#[test]
fn subscribe_succeeds_for_demo_account() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["subscribe", "user123", "FPV_BTG_PACTUAL"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Successfully subscribed to fund FPV_BTG_PACTUAL",
        ))
        .stdout(predicate::str::contains("Amount debited: 75000"));
}

#[test]
fn subscribe_unknown_account_fails_with_structured_error() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["subscribe", "ghost", "FPV_BTG_PACTUAL"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ACCOUNT_NOT_FOUND"))
        .stderr(predicate::str::contains("404"));
}

#[test]
fn unsubscribe_without_subscription_fails() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["unsubscribe", "user123", "FIC_MANDATO"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("NOT_SUBSCRIBED"));
}

#[test]
fn set_preference_switches_the_channel() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["set-preference", "user123", "sms"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Notification preference for user123 set to sms",
        ));
}

#[test]
fn set_preference_rejects_an_unknown_channel() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["set-preference", "user123", "pigeon"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'pigeon'"));
}

#[test]
fn funds_lists_the_stock_catalog() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.arg("funds");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("FPV_BTG_PACTUAL"))
        .stdout(predicate::str::contains("FIC_ACCIONES"))
        .stdout(predicate::str::contains("250000"));
}

#[test]
fn ledger_of_fresh_account_is_empty() {
    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.args(["ledger", "user123"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 entries"));
}

#[test]
fn seed_accepts_a_catalog_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fund_id,name,category,minimum_subscription").unwrap();
    writeln!(file, "FPV_CUSTOM,Custom Fund,FPV,30000").unwrap();

    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.arg("seed")
        .arg("--funds")
        .arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Provisioned 1 funds"));
}

#[test]
fn seed_rejects_a_malformed_catalog_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fund_id,name,category,minimum_subscription").unwrap();
    writeln!(file, "FPV_BAD,Bad Fund,FPV,0").unwrap();

    let mut cmd = Command::new(cargo_bin!("fundsub"));
    cmd.arg("seed").arg("--funds").arg(file.path());

    cmd.assert().failure();
}
