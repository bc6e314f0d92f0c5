use serde::Serialize;

/// XP thresholds for badge levels, strictly increasing
pub const BADGE_LEVEL_MILESTONES: [u64; 4] = [120, 320, 620, 1020];

/// Snapshot of where an XP total sits on the milestone table
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub xp: u64,
    pub level: usize,
    pub unlocked: bool,
    pub max_level: usize,
    pub next_milestone: Option<u64>,
    pub progress_percent: f64,
}

impl BadgeProgress {
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }
}

/// Clamp a raw numeric XP value into the valid domain.
///
/// Non-finite and negative values become 0, fractional values are floored.
pub fn sanitize_xp(raw: f64) -> u64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    if raw >= u64::MAX as f64 {
        return u64::MAX;
    }
    raw.floor() as u64
}

/// Progress for `xp` against the built-in badge milestones
pub fn compute_progress(xp: u64) -> BadgeProgress {
    compute_progress_with(xp, &BADGE_LEVEL_MILESTONES)
}

/// Progress for `xp` against an explicit milestone table.
///
/// A threshold counts as reached when `xp >= threshold`. Once every threshold is
/// met the progress is terminal: no next milestone and 100 percent.
pub fn compute_progress_with(xp: u64, milestones: &[u64]) -> BadgeProgress {
    let max_level = milestones.len();
    let level = milestones.iter().filter(|&&threshold| xp >= threshold).count();
    let unlocked = level > 0;

    if level >= max_level {
        return BadgeProgress {
            xp,
            level,
            unlocked,
            max_level,
            next_milestone: None,
            progress_percent: 100.0,
        };
    }

    let level_start = if level == 0 { 0 } else { milestones[level - 1] };
    let next_milestone = milestones[level];
    let step = next_milestone.saturating_sub(level_start);
    let progress_percent = if step > 0 {
        let gained = xp.saturating_sub(level_start) as f64;
        (gained / step as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    BadgeProgress {
        xp,
        level,
        unlocked,
        max_level,
        next_milestone: Some(next_milestone),
        progress_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds_are_inclusive() {
        assert_eq!(compute_progress(119).level, 0);
        assert!(!compute_progress(119).unlocked);
        assert_eq!(compute_progress(120).level, 1);
        assert!(compute_progress(120).unlocked);
        assert_eq!(compute_progress(319).level, 1);
        assert_eq!(compute_progress(320).level, 2);
        assert_eq!(compute_progress(1020).level, 4);
        assert!(compute_progress(1020).unlocked);
    }

    #[test]
    fn test_terminal_state_at_max_level() {
        let progress = compute_progress(1500);
        assert_eq!(progress.level, 4);
        assert_eq!(progress.max_level, 4);
        assert_eq!(progress.next_milestone, None);
        assert_eq!(progress.progress_percent, 100.0);
        assert!(progress.is_max_level());

        let exact = compute_progress(1020);
        assert_eq!(exact.next_milestone, None);
        assert_eq!(exact.progress_percent, 100.0);
    }

    #[test]
    fn test_progress_interpolates_within_level() {
        let start = compute_progress(0);
        assert_eq!(start.next_milestone, Some(120));
        assert_eq!(start.progress_percent, 0.0);

        assert_eq!(compute_progress(60).progress_percent, 50.0);

        // Level 1 spans 120..320
        let mid = compute_progress(220);
        assert_eq!(mid.level, 1);
        assert_eq!(mid.next_milestone, Some(320));
        assert_eq!(mid.progress_percent, 50.0);

        // Reaching a threshold starts the next level at zero
        assert_eq!(compute_progress(320).progress_percent, 0.0);
    }

    #[test]
    fn test_compute_progress_is_pure() {
        assert_eq!(compute_progress(455), compute_progress(455));
    }

    #[test]
    fn test_sanitize_xp() {
        assert_eq!(sanitize_xp(f64::NAN), 0);
        assert_eq!(sanitize_xp(f64::INFINITY), 0);
        assert_eq!(sanitize_xp(f64::NEG_INFINITY), 0);
        assert_eq!(sanitize_xp(-5.0), 0);
        assert_eq!(sanitize_xp(130.9), 130);
        assert_eq!(sanitize_xp(620.0), 620);
    }

    #[test]
    fn test_custom_milestone_table() {
        let table = [10, 20];
        assert_eq!(compute_progress_with(15, &table).level, 1);
        assert_eq!(compute_progress_with(15, &table).progress_percent, 50.0);
        assert_eq!(compute_progress_with(25, &table).next_milestone, None);

        let empty = compute_progress_with(5, &[]);
        assert_eq!(empty.level, 0);
        assert_eq!(empty.max_level, 0);
        assert!(!empty.unlocked);
        assert_eq!(empty.progress_percent, 100.0);
    }
}
