//! Reverse index from port config ids and port ids to the patches using them

use std::collections::{BTreeMap, BTreeSet};

use crate::protocol::{AudioPatch, AudioPortConfig};

/// Multimap `id -> patch ids`.
///
/// Keys are port config ids and the ids of the ports owning them. The index
/// is only ever changed through [`register`](Self::register) and
/// [`clean_up`](Self::clean_up), so it always mirrors the patch list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchUsageIndex {
    entries: BTreeMap<i32, BTreeSet<i32>>,
}

impl PatchUsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds entries for every port config of `patch` and its owning port.
    ///
    /// Ids that do not resolve to a config in `configs` are skipped.
    pub fn register(&mut self, patch: &AudioPatch, configs: &[AudioPortConfig]) {
        for port_config_id in patch.port_config_ids() {
            let Some(config) = configs.iter().find(|c| c.id == port_config_id) else {
                continue;
            };
            self.entries.entry(port_config_id).or_default().insert(patch.id);
            if config.port_id != port_config_id {
                self.entries.entry(config.port_id).or_default().insert(patch.id);
            }
        }
    }

    /// Removes every entry pointing at `patch_id`
    pub fn clean_up(&mut self, patch_id: i32) {
        self.entries.retain(|_, patches| {
            patches.remove(&patch_id);
            !patches.is_empty()
        });
    }

    pub fn is_used(&self, id: i32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Lowest patch id using `id`, if any
    pub fn first_patch_for(&self, id: i32) -> Option<i32> {
        self.entries.get(&id).and_then(|patches| patches.iter().next().copied())
    }

    pub fn patches_for(&self, id: i32) -> impl Iterator<Item = i32> + '_ {
        self.entries.get(&id).into_iter().flat_map(|patches| patches.iter().copied())
    }

    /// All keys that currently point at `patch_id`
    pub fn keys_for_patch(&self, patch_id: i32) -> BTreeSet<i32> {
        self.entries
            .iter()
            .filter(|(_, patches)| patches.contains(&patch_id))
            .map(|(&key, _)| key)
            .collect()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index that `patches` would produce if registered from scratch
    pub fn rebuilt_from(patches: &[AudioPatch], configs: &[AudioPortConfig]) -> Self {
        let mut index = Self::new();
        for patch in patches {
            index.register(patch, configs);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: i32, port_id: i32) -> AudioPortConfig {
        AudioPortConfig {
            id,
            port_id,
            ..Default::default()
        }
    }

    fn patch(id: i32, sources: Vec<i32>, sinks: Vec<i32>) -> AudioPatch {
        AudioPatch {
            id,
            ..AudioPatch::new(sources, sinks)
        }
    }

    #[test]
    fn test_register_adds_config_and_port_keys() {
        let configs = vec![config(20, 7), config(21, 1)];
        let mut index = PatchUsageIndex::new();
        index.register(&patch(1, vec![20], vec![21]), &configs);

        assert_eq!(index.keys_for_patch(1), BTreeSet::from([1, 7, 20, 21]));
        assert_eq!(index.first_patch_for(7), Some(1));
        assert!(!index.is_used(99));
    }

    #[test]
    fn test_config_id_equal_to_port_id_is_merged() {
        let configs = vec![config(7, 7), config(21, 1)];
        let mut index = PatchUsageIndex::new();
        index.register(&patch(1, vec![7], vec![21]), &configs);
        assert_eq!(index.keys_for_patch(1), BTreeSet::from([1, 7, 21]));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_clean_up_only_touches_one_patch() {
        let configs = vec![config(20, 7), config(21, 1), config(22, 8)];
        let mut index = PatchUsageIndex::new();
        index.register(&patch(1, vec![20], vec![21]), &configs);
        index.register(&patch(2, vec![22], vec![21]), &configs);

        index.clean_up(1);
        assert!(index.keys_for_patch(1).is_empty());
        assert_eq!(index.keys_for_patch(2), BTreeSet::from([1, 8, 21, 22]));
        assert_eq!(index.patches_for(21).collect::<Vec<_>>(), vec![2]);
        assert!(!index.is_used(20));

        index.clean_up(2);
        assert!(index.is_empty());
    }

    #[test]
    fn test_unknown_config_ids_are_skipped() {
        let configs = vec![config(20, 7)];
        let mut index = PatchUsageIndex::new();
        index.register(&patch(1, vec![20], vec![30]), &configs);
        assert_eq!(index.keys_for_patch(1), BTreeSet::from([7, 20]));
    }
}
