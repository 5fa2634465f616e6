//! Rendering of orchestrator events
//!
//! Sync progress is printed line by line so it interleaves cleanly with
//! abandon prompts. Merge progress drives a spinner for the long waits and
//! prints a line for every finished revision.

use crate::cli::style::{Stylize, arrow, bullet, check, up_arrow};
use anstream::println;
use indicatif::ProgressBar;
use jj_stack::events::{EventBus, Subscription};
use jj_stack::merge::{MergeEvent, MergeReasons, MergeState};
use jj_stack::sync::{SyncEvent, SyncStatus};
use jj_stack::types::{Revision, StatusState};

/// How a revision is named in output: its bookmark, else its short change id
fn label(revision: &Revision) -> String {
    revision
        .bookmark
        .clone()
        .unwrap_or_else(|| revision.short_change_id.clone())
}

fn pr_label(pr_number: Option<u64>) -> String {
    pr_number.map_or_else(String::new, |n| format!("#{n}"))
}

/// Print sync progress for as long as the returned subscription lives
pub fn attach_sync(events: &EventBus<SyncEvent>) -> Subscription {
    events.subscribe_all(|event| {
        if let Some(line) = sync_line(event) {
            println!("{line}");
        }
    })
}

/// Like [`attach_sync`], printing above a running spinner
pub fn attach_sync_above(events: &EventBus<SyncEvent>, bar: &ProgressBar) -> Subscription {
    let bar = bar.clone();
    events.subscribe_all(move |event| {
        if let Some(line) = sync_line(event) {
            bar.println(line);
        }
    })
}

fn sync_line(event: &SyncEvent) -> Option<String> {
    let line = match event {
        SyncEvent::Init(revisions) => format!(
            "{} {} revision(s)",
            "Syncing".emphasis(),
            revisions.len().accent()
        ),
        SyncEvent::Update {
            revision,
            status,
            pr_number,
        } => {
            let name = label(revision);
            let pr = pr_label(*pr_number);
            match status {
                SyncStatus::Pending => return None,
                SyncStatus::Syncing => format!("  {} Pushing {}", up_arrow(), name.accent()),
                SyncStatus::Created => {
                    format!("  {} Created PR {} for {}", check(), pr.accent(), name.accent())
                }
                SyncStatus::Updated => {
                    format!("  {} PR {} for {} is current", check(), pr.accent(), name.accent())
                }
                SyncStatus::Deleted => format!(
                    "  {} PR {} is closed, removed {}",
                    bullet(),
                    pr.accent(),
                    name.muted()
                ),
                SyncStatus::Skipped => format!(
                    "  {} {} {}",
                    "-".muted(),
                    name.muted(),
                    revision.display_description().muted()
                ),
            }
        }
    };
    Some(line)
}

/// What is holding a PR back, in words
pub fn describe_blockers(reasons: &MergeReasons) -> String {
    let mut blockers = Vec::new();
    if !reasons.mergeable {
        blockers.push("has conflicts".to_string());
    }
    if !reasons.approved {
        blockers.push("awaiting approval".to_string());
    }
    match reasons.status_checks {
        None | Some(StatusState::Success) => {}
        Some(state) => blockers.push(format!("checks {state}")),
    }
    blockers.join(", ")
}

/// Drive `bar` from merge events for as long as the returned subscription lives
pub fn attach_merge(events: &EventBus<MergeEvent>, bar: &ProgressBar) -> Subscription {
    let bar = bar.clone();
    events.subscribe_all(move |event| render_merge_event(&bar, event))
}

fn render_merge_event(bar: &ProgressBar, event: &MergeEvent) {
    match event {
        MergeEvent::Init(snapshots) => {
            bar.println(format!(
                "{} {} revision(s)",
                "Merging".emphasis(),
                snapshots.len().accent()
            ));
            for snapshot in snapshots.iter().rev() {
                bar.println(format!(
                    "  {} {} {} {}",
                    bullet(),
                    snapshot.revision.short_change_id.muted(),
                    pr_label(snapshot.pr_number).accent(),
                    snapshot.revision.display_description()
                ));
            }
        }
        MergeEvent::Update {
            revision,
            pr_number,
            state,
        } => {
            let name = label(revision);
            let pr = pr_label(*pr_number);
            match state {
                MergeState::Init => {}
                MergeState::Processing => bar.set_message(format!("Processing {name}")),
                MergeState::Syncing => bar.set_message(format!("Refreshing {pr} ({name})")),
                MergeState::WaitingForMergeability { reasons } => {
                    if reasons.can_merge() {
                        bar.set_message(format!("{pr} is mergeable"));
                    } else {
                        bar.set_message(format!(
                            "Waiting for {pr}: {}",
                            describe_blockers(reasons)
                        ));
                    }
                }
                MergeState::Merging => bar.set_message(format!("Merging {pr}")),
                MergeState::Merged => {
                    bar.println(format!("  {} Merged {} ({})", check(), pr.accent(), name));
                }
                MergeState::Skipped => {
                    bar.println(format!(
                        "  {} Skipped {} (no bookmark)",
                        "-".muted(),
                        name.muted()
                    ));
                }
            }
        }
        MergeEvent::OutdatedRevisions { revisions, confirmed } => {
            if *confirmed {
                bar.println(format!("  {} Continuing with outdated revisions", arrow()));
            } else {
                bar.println(format!(
                    "{}",
                    "These revisions differ from their remote bookmarks:"
                        .warn()
                        .for_stdout()
                ));
                for revision in revisions {
                    bar.println(format!(
                        "  {} {} {}",
                        up_arrow(),
                        label(revision).accent(),
                        revision.display_description()
                    ));
                }
            }
        }
    }
}
