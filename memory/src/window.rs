//! Size-budgeted conversation window.
//!
//! Keeps the newest turns whose cumulative size fits the budget. Scanning goes from newest to
//! oldest and stops at the first turn that would push the total over the budget; older turns are
//! dropped even if a smaller one further back would still fit.

use crate::types::Turn;

/// Returns the longest suffix of `turns` whose total size is `<= budget`, in chronological order.
///
/// If the newest turn alone exceeds the budget the result is empty.
pub fn trim_window(turns: &[Turn], budget: usize) -> Vec<Turn> {
    let mut total = 0usize;
    let mut start = turns.len();

    for (i, turn) in turns.iter().enumerate().rev() {
        match total.checked_add(turn.size()) {
            Some(next) if next <= budget => {
                total = next;
                start = i;
            }
            _ => break,
        }
    }

    turns[start..].to_vec()
}

/// Sum of turn sizes.
pub fn total_size(turns: &[Turn]) -> usize {
    turns.iter().map(Turn::size).sum()
}
