//! End-to-end simulation runs through `holdem_cli::run`.

use holdem_cli::exit_code;
use holdem_cli::logging::LogCapture;
use holdem_engine::logger::HandRecord;
use tracing_subscriber::layer::SubscriberExt;

fn run(args: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = holdem_cli::run(args.iter().copied(), &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn read_records(path: &std::path::Path) -> Vec<HandRecord> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn history_has_one_record_per_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hands.jsonl");
    let path_str = path.to_str().unwrap();

    let (code, out, err) = run(&[
        "holdem",
        "sim",
        "--hands",
        "25",
        "--seed",
        "42",
        "--personalities",
        "conservative,aggressive,deceptive,mathematician",
        "--output",
        path_str,
    ]);
    assert_eq!(code, exit_code::SUCCESS, "stderr={err}");

    let played: usize = out
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("Simulated: "))
        .and_then(|l| l.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap();
    let records = read_records(&path);
    assert_eq!(records.len(), played);
    assert!(played > 0);

    for (i, rec) in records.iter().enumerate() {
        assert!(rec.hand_id.ends_with(&format!("-{:06}", i + 1)), "{}", rec.hand_id);
        assert_eq!(rec.seed, Some(42));
        assert!(rec.ts.is_some());
        assert!(!rec.winners.is_empty());
        // Showdowns carry a full board and a rank; folds end early without one.
        match &rec.showdown {
            Some(entries) => {
                assert_eq!(rec.board.len(), 5);
                assert!(rec.hand_rank.is_some());
                assert!(entries.len() >= 2);
            }
            None => {
                assert_eq!(rec.winners.len(), 1);
                assert!(rec.hand_rank.is_none());
            }
        }
    }
    assert!(out.contains(&format!("History: {}", path_str)));
}

#[test]
fn payouts_match_chips_put_in() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");

    let (code, _, err) = run(&[
        "holdem",
        "sim",
        "--hands",
        "40",
        "--seed",
        "7",
        "--personalities",
        "aggressive,aggressive,mathematician",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert_eq!(code, exit_code::SUCCESS, "stderr={err}");

    for rec in read_records(&path) {
        let paid: u64 = rec.payouts.iter().map(|p| u64::from(p.amount)).sum();
        let put_in: u64 = rec.actions.iter().map(|a| u64::from(a.action.chips())).sum();
        // Blinds are posted outside the action log.
        assert!(paid >= put_in, "{}: paid {} < actions {}", rec.hand_id, paid, put_in);
    }
}

#[test]
fn retain_policy_conserves_chips() {
    let (code, out, err) = run(&[
        "holdem",
        "sim",
        "--hands",
        "60",
        "--seed",
        "99",
        "--starting-stack",
        "300",
        "--big-blind",
        "20",
        "--small-blind",
        "10",
        "--personalities",
        "aggressive,deceptive,aggressive,mathematician,conservative",
        "--unclaimed-pot",
        "retain",
    ]);
    assert_eq!(code, exit_code::SUCCESS, "stderr={err}");
    assert!(out.contains("Chip conservation: ok (1500 chips)"), "{out}");
}

#[test]
fn short_stacks_end_the_session_early() {
    let (code, out, err) = run(&[
        "holdem",
        "sim",
        "--hands",
        "5000",
        "--seed",
        "5",
        "--starting-stack",
        "40",
        "--big-blind",
        "20",
        "--small-blind",
        "10",
        "--personalities",
        "aggressive,aggressive",
    ]);
    assert_eq!(code, exit_code::SUCCESS);
    assert!(err.contains("WARNING: table ended after"), "{err}");
    assert!(out.contains("Chip conservation: ok (80 chips)"), "{out}");
}

#[test]
fn engine_logs_hand_lifecycle() {
    let capture = LogCapture::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    let code = tracing::subscriber::with_default(subscriber, || {
        run(&["holdem", "sim", "--hands", "3", "--seed", "12"]).0
    });
    assert_eq!(code, exit_code::SUCCESS);

    let engine = capture.messages("holdem_engine");
    let started = engine.iter().filter(|m| *m == "hand started").count();
    let complete = engine.iter().filter(|m| *m == "hand complete").count();
    assert_eq!(started, 3);
    assert_eq!(complete, 3);
}
