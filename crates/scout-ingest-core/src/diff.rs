/// Computes the suffix of `snapshot` not yet processed according to
/// `checkpoint`, preserving snapshot order.
///
/// The checkpoint is a position marker by value, not by index: the source
/// only guarantees relative order of untouched elements, not absolute
/// positions. Rules:
///
/// - no checkpoint, an empty snapshot, or a checkpoint value missing from
///   the snapshot returns the full snapshot (conservative re-scan);
/// - a checkpoint equal to the snapshot's last element returns nothing;
/// - otherwise everything strictly after the FIRST occurrence of the
///   checkpoint value is returned.
///
/// When the checkpoint value occurs more than once, cutting at the first
/// occurrence can re-deliver values between the occurrences, but never
/// drops unseen ones.
pub fn unseen_suffix<'a>(snapshot: &'a [String], checkpoint: Option<&str>) -> &'a [String] {
    let Some(checkpoint) = checkpoint else {
        return snapshot;
    };

    if snapshot.last().map(String::as_str) == Some(checkpoint) {
        return &[];
    }

    match snapshot.iter().position(|value| value == checkpoint) {
        Some(index) => &snapshot[index + 1..],
        None => snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn absent_checkpoint_returns_full_snapshot() {
        let snap = snapshot(&["d1", "d2", "d3"]);
        assert_eq!(unseen_suffix(&snap, None), snap.as_slice());
    }

    #[test]
    fn checkpoint_at_last_element_returns_nothing() {
        let snap = snapshot(&["d1", "d2", "d3"]);
        assert!(unseen_suffix(&snap, Some("d3")).is_empty());
    }

    #[test]
    fn checkpoint_in_the_middle_returns_strict_suffix() {
        let snap = snapshot(&["d1", "d2", "d3", "d4"]);
        assert_eq!(unseen_suffix(&snap, Some("d2")), &snap[2..]);
    }

    #[test]
    fn unknown_checkpoint_falls_back_to_full_snapshot() {
        let snap = snapshot(&["d1", "d2", "d3"]);
        assert_eq!(unseen_suffix(&snap, Some("gone")), snap.as_slice());
    }

    #[test]
    fn empty_snapshot_yields_nothing() {
        let snap: Vec<String> = Vec::new();
        assert!(unseen_suffix(&snap, None).is_empty());
        assert!(unseen_suffix(&snap, Some("d1")).is_empty());
    }

    #[test]
    fn duplicate_checkpoint_values_cut_at_first_occurrence() {
        let snap = snapshot(&["a", "b", "a", "c"]);
        // "b" and the second "a" are re-delivered rather than risking a
        // silent drop of anything after the real cut point.
        assert_eq!(unseen_suffix(&snap, Some("a")), &snap[1..]);
    }

    #[test]
    fn single_element_snapshot_matching_checkpoint_is_drained() {
        let snap = snapshot(&["only"]);
        assert!(unseen_suffix(&snap, Some("only")).is_empty());
    }
}
