//! # Demo Subcommand
//!
//! Runs the reference discussion with three mock identities: create and
//! start a thread, enroll alice, bob and charlie, alice posts, bob and
//! charlie like, bob tries to like again, the thread is paused and ended,
//! a restart is refused, and the owner withdraws the fees.
//!
//! Every step goes through a `Transaction`, so `--write-log` produces a log
//! that `zkt replay` reproduces exactly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use zkt_core::{CommentId, Scope, Signal, ThreadId};
use zkt_protocol::{ProtocolConfig, ZkThreads};
use zkt_zkp::{MockIdentity, MockProofSystem, ProofBundle};

use crate::load_config;
use crate::replay::{emit_outcomes, step, Step};
use crate::tx::{write_log, Action, Transaction};

/// Arguments for `zkt demo`.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Protocol config (YAML). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the generated transaction log here.
    #[arg(long)]
    pub write_log: Option<PathBuf>,
}

const THREAD: ThreadId = ThreadId(1);
const COMMENT: CommentId = CommentId(1);
const CREATOR: &str = "0xalice";
const RELAYER: &str = "relayer";

/// Transactions submitted so far and what each produced.
pub struct Script {
    pub core: ZkThreads<MockProofSystem>,
    pub log: Vec<Transaction>,
    pub outcomes: Vec<Step>,
}

impl Script {
    fn new(config: ProtocolConfig) -> Result<Self> {
        Ok(Self {
            core: ZkThreads::new(config, MockProofSystem).context("invalid protocol config")?,
            log: Vec::new(),
            outcomes: Vec::new(),
        })
    }

    fn submit(&mut self, caller: &str, action: Action) {
        let tx = Transaction::new(caller, action);
        let outcome = step(&mut self.core, self.log.len(), &tx);
        self.log.push(tx);
        self.outcomes.push(outcome);
    }

    fn prove(&self, identity: &MockIdentity, scope: Scope, signal: Signal) -> Result<ProofBundle> {
        let members = self.core.list_commitments(scope.thread_id())?;
        MockProofSystem
            .prove(
                self.core.hasher(),
                self.core.tree_depth(),
                identity,
                members,
                &scope,
                &signal,
            )
            .context("failed to build mock proof")
    }

    fn like(&mut self, identity: &MockIdentity, signal: Signal) -> Result<()> {
        let proof = self.prove(identity, Scope::comment(THREAD, COMMENT), signal)?;
        self.submit(
            RELAYER,
            Action::LikeComment {
                thread_id: THREAD,
                comment_id: COMMENT,
                signal,
                proof,
            },
        );
        Ok(())
    }
}

/// Run the reference discussion against a fresh core.
pub fn run_scenario(config: ProtocolConfig) -> Result<Script> {
    let owner = config.owner.as_str().to_string();
    let fee = config.initial_fee;
    let mut s = Script::new(config)?;

    let post = Signal::from_label("post")?;
    let vote = Signal::from_label("vote")?;
    let [alice, bob, charlie] =
        ["alice", "bob", "charlie"].map(|seed| MockIdentity::from_seed(s.core.hasher(), seed));

    s.submit(CREATOR, Action::CreateThread { thread_id: THREAD, paid: fee });
    s.submit(CREATOR, Action::StartThread { thread_id: THREAD });
    for identity in [&alice, &bob, &charlie] {
        let identity_commitment = identity.commitment(s.core.hasher());
        s.submit(
            RELAYER,
            Action::Join {
                thread_id: THREAD,
                identity_commitment,
            },
        );
    }

    let proof = s.prove(&alice, Scope::comment(THREAD, COMMENT), post)?;
    s.submit(
        RELAYER,
        Action::PostComment {
            thread_id: THREAD,
            comment_id: COMMENT,
            signal: post,
            proof,
        },
    );
    s.like(&bob, vote)?;
    s.like(&charlie, vote)?;
    s.like(&bob, vote)?;

    s.submit(CREATOR, Action::PauseThread { thread_id: THREAD });
    s.submit(CREATOR, Action::EndThread { thread_id: THREAD });
    s.submit(CREATOR, Action::StartThread { thread_id: THREAD });
    s.submit(&owner, Action::WithdrawFunds);
    Ok(s)
}

/// Execute `zkt demo`.
pub fn run_demo(args: &DemoArgs) -> Result<u8> {
    let config = load_config(args.config.as_deref())?;
    let script = run_scenario(config)?;

    let stdout = std::io::stdout();
    emit_outcomes(&mut stdout.lock(), &script.outcomes)?;

    if let Some(path) = &args.write_log {
        write_log(path, &script.log)?;
        tracing::info!(log = %path.display(), transactions = script.log.len(), "transaction log written");
    }
    Ok(0)
}
