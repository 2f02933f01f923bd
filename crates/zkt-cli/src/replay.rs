//! # Replay Subcommand
//!
//! Applies a transaction log to a fresh core with the mock verifier, in
//! order. A rejected transaction is reported and skipped; it never stops
//! the replay. The same log always produces the same events and state.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use zkt_core::ThreadsError;
use zkt_protocol::{EventRecord, ProtocolConfig, ZkThreads};
use zkt_zkp::MockProofSystem;

use crate::load_config;
use crate::tx::{read_log, Transaction};

/// Arguments for `zkt replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Transaction log (JSON array).
    pub log: PathBuf,

    /// Protocol config (YAML). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the final state snapshot here.
    #[arg(long)]
    pub state_out: Option<PathBuf>,
}

/// A transaction the core refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the log.
    pub index: usize,
    pub error: ThreadsError,
}

/// One line of replay output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OutputLine<'a> {
    Event(&'a EventRecord),
    Rejected {
        index: usize,
        rejected: &'static str,
        error: String,
    },
}

impl Rejection {
    pub fn to_line(&self) -> OutputLine<'_> {
        OutputLine::Rejected {
            index: self.index,
            rejected: self.error.code(),
            error: self.error.to_string(),
        }
    }
}

/// Outcome of applying one transaction.
pub enum Step {
    Accepted(Vec<EventRecord>),
    Rejected(Rejection),
}

/// Apply `tx` and drain whatever it emitted.
pub fn step(core: &mut ZkThreads<MockProofSystem>, index: usize, tx: &Transaction) -> Step {
    match tx.apply(core) {
        Ok(()) => Step::Accepted(core.drain_events()),
        Err(error) => Step::Rejected(Rejection { index, error }),
    }
}

/// Replay result.
pub struct ReplayReport {
    pub core: ZkThreads<MockProofSystem>,
    /// One outcome per transaction, in log order.
    pub outcomes: Vec<Step>,
}

impl ReplayReport {
    /// Every event emitted, in order.
    pub fn events(&self) -> impl Iterator<Item = &EventRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                Step::Accepted(events) => Some(events),
                Step::Rejected(_) => None,
            })
            .flatten()
    }

    pub fn rejections(&self) -> impl Iterator<Item = &Rejection> {
        self.outcomes.iter().filter_map(|o| match o {
            Step::Rejected(r) => Some(r),
            Step::Accepted(_) => None,
        })
    }
}

/// Apply `log` to a fresh core.
pub fn replay(config: ProtocolConfig, log: &[Transaction]) -> Result<ReplayReport> {
    let mut core = ZkThreads::new(config, MockProofSystem).context("invalid protocol config")?;
    let outcomes = log
        .iter()
        .enumerate()
        .map(|(index, tx)| step(&mut core, index, tx))
        .collect();
    Ok(ReplayReport { core, outcomes })
}

/// Print one output line as JSON.
pub fn emit_line(out: &mut impl Write, line: &OutputLine<'_>) -> Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    writeln!(out)?;
    Ok(())
}

/// Print every event and rejection in log order.
pub fn emit_outcomes(out: &mut impl Write, outcomes: &[Step]) -> Result<()> {
    for outcome in outcomes {
        match outcome {
            Step::Accepted(events) => {
                for record in events {
                    emit_line(out, &OutputLine::Event(record))?;
                }
            }
            Step::Rejected(r) => emit_line(out, &r.to_line())?,
        }
    }
    Ok(())
}

/// Write a snapshot of `core` to `path`.
pub fn write_state(core: &ZkThreads<MockProofSystem>, path: &Path) -> Result<()> {
    let json = core.snapshot().to_json()?;
    std::fs::write(path, json).with_context(|| format!("failed to write state {}", path.display()))
}

/// Execute `zkt replay`.
pub fn run_replay(args: &ReplayArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    replay_into(args, &mut stdout.lock())
}

/// Execute `zkt replay`, printing output lines to `out`.
pub fn replay_into(args: &ReplayArgs, out: &mut impl Write) -> Result<u8> {
    let config = load_config(args.config.as_deref())?;
    let log = read_log(&args.log)?;
    tracing::info!(transactions = log.len(), log = %args.log.display(), "replaying");

    let report = replay(config, &log)?;
    emit_outcomes(out, &report.outcomes)?;

    let rejected = report.rejections().count();
    tracing::info!(
        accepted = log.len() - rejected,
        rejected,
        sequence = report.core.sequence(),
        "replay finished"
    );
    if let Some(path) = &args.state_out {
        write_state(&report.core, path)?;
        tracing::info!(state = %path.display(), "state written");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkt_core::{AccountId, ThreadId};

    use crate::tx::{write_log, Action};

    fn config() -> ProtocolConfig {
        let mut config = ProtocolConfig::new("0xowner");
        config.initial_fee = 1;
        config
    }

    fn log() -> Vec<Transaction> {
        vec![
            Transaction::new("a", Action::CreateThread { thread_id: ThreadId(1), paid: 1 }),
            Transaction::new("a", Action::CreateThread { thread_id: ThreadId(1), paid: 1 }),
            Transaction::new("a", Action::StartThread { thread_id: ThreadId(1) }),
            Transaction::new("mallory", Action::WithdrawFunds),
            Transaction::new("0xowner", Action::WithdrawFunds),
        ]
    }

    #[test]
    fn test_replay_continues_past_rejections() {
        let report = replay(config(), &log()).unwrap();
        let codes: Vec<_> = report
            .rejections()
            .map(|r| (r.index, r.error.code()))
            .collect();
        assert_eq!(codes, [(1, "duplicate_thread"), (3, "unauthorized")]);
        assert_eq!(report.events().count(), 3);
        assert_eq!(report.core.available_funds(), 0);
        assert_eq!(report.core.owner(), &AccountId::new("0xowner"));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let a = replay(config(), &log()).unwrap();
        let b = replay(config(), &log()).unwrap();
        assert!(a.events().eq(b.events()));
        assert_eq!(a.core.snapshot(), b.core.snapshot());
    }

    #[test]
    fn test_output_lines() {
        let report = replay(config(), &log()).unwrap();
        let mut buf = Vec::new();
        emit_outcomes(&mut buf, &report.outcomes).unwrap();
        let lines = parse_lines(&buf);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["event"], "NewThread");
        assert_eq!(lines[1]["rejected"], "duplicate_thread");
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(lines[2]["event"], "ThreadStatusChanged");
    }

    fn parse_lines(buf: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_replay_command_reports_rejections_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.json");
        let config_path = dir.path().join("zkt.yaml");
        let state_path = dir.path().join("state.json");
        write_log(&log_path, &log()).unwrap();
        std::fs::write(&config_path, "owner: \"0xowner\"\ninitial_fee: 1\n").unwrap();

        let args = ReplayArgs {
            log: log_path,
            config: Some(config_path),
            state_out: Some(state_path.clone()),
        };
        let mut buf = Vec::new();
        assert_eq!(replay_into(&args, &mut buf).unwrap(), 0);

        let lines = parse_lines(&buf);
        let rejected: Vec<_> = lines
            .iter()
            .filter(|l| l.get("rejected").is_some())
            .map(|l| (l["index"].as_u64().unwrap(), l["rejected"].as_str().unwrap()))
            .collect();
        assert_eq!(rejected, [(1, "duplicate_thread"), (3, "unauthorized")]);
        assert_eq!(lines.last().unwrap()["event"], "FundsWithdrawn");

        let json = std::fs::read_to_string(&state_path).unwrap();
        let snapshot = zkt_protocol::StateSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.balance, 0);
        assert_eq!(snapshot.sequence, 3);
    }

    #[test]
    fn test_replay_command_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReplayArgs {
            log: dir.path().join("absent.json"),
            config: None,
            state_out: None,
        };
        assert!(replay_into(&args, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_state_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let report = replay(config(), &log()).unwrap();
        write_state(&report.core, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        let snapshot = zkt_protocol::StateSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, report.core.snapshot());
    }
}
