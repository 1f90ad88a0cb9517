/// Decides whether a sponsor interstitial has to run before the next spin.
///
/// `spin_count` is the number of spins already completed, read before the
/// counter is bumped for the spin being requested. The first spin is always
/// gated, the second never is, and after that every third count starting at
/// 4 is gated (4, 7, 10, ...).
pub fn should_show_ad(spin_count: u64) -> bool {
    match spin_count {
        0 => true,
        1 => false,
        n => (n - 1) % 3 == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_spin_is_gated_and_second_is_not() {
        assert!(should_show_ad(0));
        assert!(!should_show_ad(1));
    }

    #[test]
    fn schedule_recurs_every_three_counts() {
        let schedule: Vec<bool> = (0..10).map(should_show_ad).collect();
        assert_eq!(
            schedule,
            vec![true, false, false, false, true, false, false, true, false, false]
        );
    }

    #[test]
    fn large_counts_follow_the_same_rule() {
        assert!(should_show_ad(3001));
        assert!(!should_show_ad(3002));
        assert!(!should_show_ad(u64::MAX));
    }
}
