//! # Inspect Subcommand
//!
//! Prints a human-readable summary of a state snapshot written by
//! `zkt replay --state-out`.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use zkt_protocol::StateSnapshot;

/// Arguments for `zkt inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Snapshot file (JSON).
    pub state: PathBuf,
}

/// Render `snapshot` as indented text, one thread per block.
pub fn summarize(snapshot: &StateSnapshot) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "owner:      {}", snapshot.owner);
    let _ = writeln!(out, "fee:        {}", snapshot.fee);
    let _ = writeln!(out, "balance:    {}", snapshot.balance);
    let _ = writeln!(out, "sequence:   {}", snapshot.sequence);
    let _ = writeln!(out, "tree depth: {}", snapshot.tree_depth);
    let _ = writeln!(out, "nullifiers: {}", snapshot.nullifiers.len());
    let _ = writeln!(out, "threads:    {}", snapshot.threads.len());

    for thread in &snapshot.threads {
        let _ = writeln!(
            out,
            "\n{} [{}] creator={} members={} roots={} comments={}",
            thread.thread_id,
            thread.lifecycle.status,
            thread.creator,
            thread.commitments.len(),
            thread.valid_roots.len(),
            thread.comments.len(),
        );
        for comment in &thread.comments {
            let signal = comment.signal.label().unwrap_or_else(|| comment.signal.to_hex());
            let _ = writeln!(
                out,
                "  {} signal={} likes={} replies={}",
                comment.comment_id,
                signal,
                comment.likes,
                comment.replies.len(),
            );
            for reply in &comment.replies {
                let signal = reply.signal.label().unwrap_or_else(|| reply.signal.to_hex());
                let _ = writeln!(
                    out,
                    "    {} signal={} likes={}",
                    reply.reply_id, signal, reply.likes
                );
            }
        }
    }
    out
}

/// Execute `zkt inspect`.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let json = std::fs::read_to_string(&args.state)
        .with_context(|| format!("failed to read state {}", args.state.display()))?;
    let snapshot = StateSnapshot::from_json(&json)
        .with_context(|| format!("unreadable state {}", args.state.display()))?;
    print!("{}", summarize(&snapshot));
    Ok(0)
}
