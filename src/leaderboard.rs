use serde::Serialize;

use crate::account::Account;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub address: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "avatarId")]
    pub avatar_id: u8,
    pub experience: u64,
    pub credits: u64,
    pub score: u64,
    #[serde(rename = "stepsCompleted")]
    pub steps_completed: u32,
}

/// Ranks by `experience + credits`. The sort is stable, so equal scores keep
/// creation order. `limit` is clamped to `[1, accounts.len()]`.
pub fn build_leaderboard(accounts: &[Account], limit: Option<usize>) -> Vec<LeaderboardEntry> {
    if accounts.is_empty() {
        return Vec::new();
    }
    let normalized_limit = limit
        .unwrap_or(accounts.len())
        .clamp(1, accounts.len());

    let mut ranked: Vec<&Account> = accounts.iter().collect();
    ranked.sort_by(|a, b| b.score().cmp(&a.score()));

    ranked
        .into_iter()
        .take(normalized_limit)
        .enumerate()
        .map(|(idx, account)| LeaderboardEntry {
            position: idx + 1,
            address: account.address().to_string(),
            display_name: account.display_name().to_string(),
            avatar_id: account.avatar_id(),
            experience: account.experience(),
            credits: account.credits(),
            score: account.score(),
            steps_completed: account.steps_completed(),
        })
        .collect()
}
