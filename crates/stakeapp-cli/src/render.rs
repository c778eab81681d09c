//! Plain-text rendering of client state for the terminal.

use stakeapp_core::{ClientState, NetworkConfig, OperationPhase, OperationUpdate, PendingTransaction};

/// Multi-line summary of the session and its balances.
pub fn format_state(state: &ClientState, network: &NetworkConfig) -> String {
    let Some(session) = state.session else {
        return "Not connected".to_string();
    };

    let snapshot = &state.snapshot;
    let mut lines = vec![
        format!("Account:          {}", session.address),
        format!("Network:          {}", network),
        format!("Token balance:    {}", snapshot.token_balance),
        format!("Staked:           {}", snapshot.staked_amount),
        format!("Projected reward: {}", snapshot.projected_reward),
        format!("Total invested:   {}", snapshot.total_invested),
    ];
    if let Some(tx) = &state.last_transaction {
        lines.push(format!("Last transaction: {}", format_transaction(tx, network)));
    }
    lines.join("\n")
}

/// One-line description of a transaction, with an explorer link when the network has one.
pub fn format_transaction(tx: &PendingTransaction, network: &NetworkConfig) -> String {
    let base = format!("{} {} ({})", tx.kind, tx.hash, tx.status.label());
    match network.explorer_tx_url(&tx.hash) {
        Some(url) => format!("{} {}", base, url),
        None => base,
    }
}

/// Progress line for a phase change.
pub fn format_update(update: &OperationUpdate) -> String {
    match &update.phase {
        OperationPhase::Submitted(hash) | OperationPhase::Confirmed(hash) => {
            format!("[{}] {}: {}", update.kind, update.phase.label(), hash)
        }
        OperationPhase::Failed(reason) => {
            format!("[{}] {}: {}", update.kind, update.phase.label(), reason)
        }
        phase => format!("[{}] {}...", update.kind, phase.label()),
    }
}
