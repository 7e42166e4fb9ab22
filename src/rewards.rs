use serde::Deserialize;

/// One entry of a block's reward list as returned by the RPC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub pubkey: String,
    pub lamports: i64,
    pub post_balance: u64,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default)]
    pub commission: Option<u8>,
}

impl Reward {
    pub fn percent_change(&self) -> f64 {
        percent_change(self.lamports, self.post_balance)
    }
}

/// `abs(lamports) / (post_balance - lamports) * 100`, computed in `f64`.
///
/// Not defined when `post_balance == lamports` (division by zero yields inf or
/// NaN) and not meaningful when the pre-reward balance comes out negative.
pub fn percent_change(lamports: i64, post_balance: u64) -> f64 {
    let pre_balance = post_balance as f64 - lamports as f64;
    (lamports as f64).abs() / pre_balance * 100.0
}
