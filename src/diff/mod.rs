use log::debug;

use crate::manifest::{ManifestRecord, ManifestSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeReason {
    /// Name not present in the baseline.
    Added,
    /// Present in the baseline with different links.
    LinksChanged,
}

#[derive(Clone, Copy, Debug)]
pub struct Change<'a> {
    pub record: &'a ManifestRecord,
    pub reason: ChangeReason,
}

/// Select the incoming entries that are new or whose links changed, in incoming order.
///
/// Descriptions and dependency lists never cause selection, and entries that only
/// exist in the baseline are ignored.
pub fn select_changed<'a>(baseline: &ManifestSet, incoming: &'a ManifestSet) -> Vec<Change<'a>> {
    incoming
        .iter()
        .filter_map(|record| {
            let reason = match baseline.links(&record.name) {
                None => ChangeReason::Added,
                Some(previous) if *previous != record.links => ChangeReason::LinksChanged,
                Some(_) => return None,
            };
            debug!("diff: '{}' selected ({:?})", record.name, reason);
            Some(Change { record, reason })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Link, Links};

    fn record(name: &str, digest: &str, url: &str) -> ManifestRecord {
        ManifestRecord::new(name, Links::single(Link::new(digest, url)))
    }

    fn set(records: Vec<ManifestRecord>) -> ManifestSet {
        ManifestSet::from_records(records).unwrap()
    }

    fn selected_names(baseline: &ManifestSet, incoming: &ManifestSet) -> Vec<String> {
        select_changed(baseline, incoming)
            .into_iter()
            .map(|change| change.record.name.clone())
            .collect()
    }

    #[test]
    fn selects_only_new_entry() {
        let baseline = set(vec![record("ModA", "AA11", "http://x/a.zip")]);
        let incoming = set(vec![
            record("ModA", "AA11", "http://x/a.zip"),
            record("ModB", "BB22", "http://x/b.zip"),
        ]);
        let changes = select_changed(&baseline, &incoming);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].record.name, "ModB");
        assert_eq!(changes[0].reason, ChangeReason::Added);
    }

    #[test]
    fn identical_sets_select_nothing() {
        let baseline = set(vec![
            record("ModA", "AA11", "http://x/a.zip"),
            record("ModB", "BB22", "http://x/b.zip"),
        ]);
        assert!(select_changed(&baseline, &baseline.clone()).is_empty());
    }

    #[test]
    fn changed_digest_or_locator_is_selected() {
        let baseline = set(vec![
            record("ModA", "AA11", "http://x/a.zip"),
            record("ModB", "BB22", "http://x/b.zip"),
        ]);
        let incoming = set(vec![
            record("ModA", "AA12", "http://x/a.zip"),
            record("ModB", "BB22", "http://x/b-v2.zip"),
        ]);
        let changes = select_changed(&baseline, &incoming);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.reason == ChangeReason::LinksChanged));
    }

    #[test]
    fn normalization_differences_are_not_changes() {
        let baseline = set(vec![record("ModA", "aa11", "http://x/a.zip")]);
        let incoming = set(vec![record("ModA", "AA11", "\n   http://x/a.zip  ")]);
        assert!(selected_names(&baseline, &incoming).is_empty());
    }

    #[test]
    fn description_and_dependency_changes_are_ignored() {
        let mut old = record("ModA", "AA11", "http://x/a.zip");
        old.description = Some("old".into());
        old.dependencies = None;
        let mut new = record("ModA", "AA11", "http://x/a.zip");
        new.description = Some("new".into());
        new.dependencies = Some(vec!["Core".into()]);

        assert_ne!(old, new);
        assert!(selected_names(&set(vec![old]), &set(vec![new])).is_empty());
    }

    #[test]
    fn removed_entries_are_never_selected() {
        let baseline = set(vec![
            record("ModA", "AA11", "http://x/a.zip"),
            record("Gone", "DD44", "http://x/gone.zip"),
        ]);
        let incoming = set(vec![record("ModA", "AA11", "http://x/a.zip")]);
        assert!(selected_names(&baseline, &incoming).is_empty());
    }

    #[test]
    fn added_platform_slot_is_a_change() {
        let win = Link::new("AA11", "http://x/a.zip");
        let baseline = set(vec![ManifestRecord::new("ModA", Links::single(win.clone()))]);
        let incoming = set(vec![ManifestRecord::new(
            "ModA",
            Links::new(win, None, Some(Link::new("EE55", "http://x/a-linux.zip"))),
        )]);
        assert_eq!(selected_names(&baseline, &incoming), vec!["ModA"]);
    }

    #[test]
    fn preserves_incoming_order() {
        let baseline = set(vec![record("Keep", "00", "http://x/keep.zip")]);
        let incoming = set(vec![
            record("Zulu", "11", "http://x/z.zip"),
            record("Keep", "00", "http://x/keep.zip"),
            record("Alpha", "22", "http://x/a.zip"),
            record("Mike", "33", "http://x/m.zip"),
        ]);
        assert_eq!(
            selected_names(&baseline, &incoming),
            vec!["Zulu", "Alpha", "Mike"]
        );
    }

    #[test]
    fn selection_matches_set_definition() {
        let baseline = set(vec![
            record("A", "01", "http://x/a"),
            record("B", "02", "http://x/b"),
            record("C", "03", "http://x/c"),
        ]);
        let incoming = set(vec![
            record("A", "01", "http://x/a"),
            record("B", "FF", "http://x/b"),
            record("D", "04", "http://x/d"),
        ]);
        let expected: Vec<&str> = incoming
            .iter()
            .filter(|r| baseline.links(&r.name) != Some(&r.links))
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(selected_names(&baseline, &incoming), expected);
        assert_eq!(expected, vec!["B", "D"]);
    }
}
