//! Grouping of the reactions linking each compound pair by flow direction
use indexmap::{IndexMap, IndexSet};

use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Direction;
use crate::visualize::flux_edges::FLUX_THRESHOLD;
use crate::visualize::{CompoundPair, FluxMap};

/// Reactions grouped by direction for each compound pair
pub type DirectionMap = IndexMap<CompoundPair, DirectionSets>;

/// Flow direction of a group of reactions relative to its compound pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupDirection {
    /// From the first compound to the second
    Forward,
    /// From the second compound to the first
    Back,
    /// Either way
    Both,
}

/// Reactions of one compound pair split by direction
///
/// A reaction id is in at most one of the three lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectionSets {
    pub forward: Vec<String>,
    pub back: Vec<String>,
    pub bidirectional: Vec<String>,
}

impl DirectionSets {
    pub fn contains(&self, reaction_id: &str) -> bool {
        self.reactions().any(|r| r == reaction_id)
    }

    /// Every reaction of the pair, forward first
    pub fn reactions(&self) -> impl Iterator<Item = &String> {
        self.forward
            .iter()
            .chain(self.back.iter())
            .chain(self.bidirectional.iter())
    }

    /// The non empty groups, in forward, back, both order
    pub fn groups(&self) -> impl Iterator<Item = (GroupDirection, &[String])> {
        [
            (GroupDirection::Forward, self.forward.as_slice()),
            (GroupDirection::Back, self.back.as_slice()),
            (GroupDirection::Both, self.bidirectional.as_slice()),
        ]
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
    }

    fn place(&mut self, reaction_id: &str, direction: GroupDirection) {
        if self.contains(reaction_id) {
            return;
        }
        let group = match direction {
            GroupDirection::Forward => &mut self.forward,
            GroupDirection::Back => &mut self.back,
            GroupDirection::Both => &mut self.bidirectional,
        };
        group.push(reaction_id.to_string());
    }
}

/// Invert the pair to reaction mapping, keeping only reactions in `scope`
///
/// Pairs appear in the order their first reaction lists them.
pub fn group_by_pair(
    pairs: &IndexMap<String, Vec<CompoundPair>>,
    scope: &IndexSet<String>,
) -> IndexMap<CompoundPair, Vec<String>> {
    let mut grouped: IndexMap<CompoundPair, Vec<String>> = IndexMap::new();
    for (reaction, reaction_pairs) in pairs {
        if !scope.contains(reaction) {
            continue;
        }
        for pair in reaction_pairs {
            grouped.entry(pair.clone()).or_default().push(reaction.clone());
        }
    }
    grouped
}

fn classify(direction: Direction, flux: Option<f64>, mirrored: bool) -> GroupDirection {
    let relative = match direction {
        Direction::Forward => GroupDirection::Forward,
        Direction::Reverse => GroupDirection::Back,
        Direction::Both => match flux {
            Some(f) if f.abs() >= FLUX_THRESHOLD && f > 0. => GroupDirection::Forward,
            Some(f) if f.abs() >= FLUX_THRESHOLD => GroupDirection::Back,
            _ => GroupDirection::Both,
        },
    };
    match (relative, mirrored) {
        (GroupDirection::Forward, true) => GroupDirection::Back,
        (GroupDirection::Back, true) => GroupDirection::Forward,
        (other, _) => other,
    }
}

/// Partition the reactions of each compound pair into direction groups
///
/// Reactions listed under the mirrored pair are folded into the first orientation seen,
/// with their roles swapped, and the mirrored pair is not recorded separately.
/// Reversible reactions take the direction of their flux when one is known.
pub fn resolve_directions(
    grouped: &IndexMap<CompoundPair, Vec<String>>,
    model: &Model,
    fluxes: &FluxMap,
) -> DirectionMap {
    let direction_of = |id: &str| {
        model
            .reactions
            .get(id)
            .map(|r| r.direction())
            .unwrap_or(Direction::Both)
    };
    let mut consumed: IndexSet<CompoundPair> = IndexSet::new();
    let mut directions = DirectionMap::new();
    for ((c1, c2), reactions) in grouped {
        let pair = (c1.clone(), c2.clone());
        if consumed.contains(&pair) {
            continue;
        }
        let mirror = (c2.clone(), c1.clone());
        let mut sets = DirectionSets::default();
        for r in reactions {
            sets.place(r, classify(direction_of(r), fluxes.get(r).copied(), false));
        }
        if let Some(mirrored) = grouped.get(&mirror) {
            for r in mirrored {
                sets.place(r, classify(direction_of(r), fluxes.get(r).copied(), true));
            }
        }
        consumed.insert(mirror);
        consumed.insert(pair.clone());
        directions.insert(pair, sets);
    }
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::Compound;
    use crate::metabolic_model::test_models::{metabolite, reaction};

    fn c(name: &str) -> Compound {
        Compound::new(name, Some("c"))
    }

    fn pair_model() -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(metabolite("X", "c", "C2"));
        model.add_metabolite(metabolite("Y", "c", "C2"));
        model.add_reaction(reaction("FWD", &[("X", -1.), ("Y", 1.)], 0., 1000.));
        model.add_reaction(reaction("REV", &[("X", -1.), ("Y", 1.)], -1000., 0.));
        model.add_reaction(reaction("BOTH", &[("X", -1.), ("Y", 1.)], -1000., 1000.));
        model.add_reaction(reaction("MIRROR", &[("Y", -1.), ("X", 1.)], 0., 1000.));
        model.add_reaction(reaction("MIRROR_BOTH", &[("Y", -1.), ("X", 1.)], -1000., 1000.));
        model
    }

    fn grouped() -> IndexMap<CompoundPair, Vec<String>> {
        let mut pairs = IndexMap::new();
        for id in ["BOTH", "FWD", "REV"] {
            pairs.insert(id.to_string(), vec![(c("X"), c("Y"))]);
        }
        for id in ["MIRROR", "MIRROR_BOTH"] {
            pairs.insert(id.to_string(), vec![(c("Y"), c("X"))]);
        }
        let scope = pairs.keys().cloned().collect();
        group_by_pair(&pairs, &scope)
    }

    #[test]
    fn declared_directions() {
        let directions = resolve_directions(&grouped(), &pair_model(), &FluxMap::new());
        assert_eq!(directions.len(), 1);
        let sets = &directions[&(c("X"), c("Y"))];
        assert_eq!(sets.forward, vec!["FWD"]);
        assert_eq!(sets.back, vec!["REV", "MIRROR"]);
        assert_eq!(sets.bidirectional, vec!["BOTH", "MIRROR_BOTH"]);
    }

    #[test]
    fn flux_sign_disambiguates_reversible() {
        let mut fluxes = FluxMap::new();
        fluxes.insert("BOTH".to_string(), -4.0);
        fluxes.insert("MIRROR_BOTH".to_string(), 2.0);
        let directions = resolve_directions(&grouped(), &pair_model(), &fluxes);
        let sets = &directions[&(c("X"), c("Y"))];
        assert_eq!(sets.forward, vec!["FWD"]);
        assert_eq!(sets.back, vec!["BOTH", "REV", "MIRROR", "MIRROR_BOTH"]);
        assert!(sets.bidirectional.is_empty());
    }

    #[test]
    fn groups_partition_the_pair_reactions() {
        let mut fluxes = FluxMap::new();
        fluxes.insert("BOTH".to_string(), 1e-12);
        for fluxes in [FluxMap::new(), fluxes] {
            let grouped = grouped();
            let directions = resolve_directions(&grouped, &pair_model(), &fluxes);
            for ((c1, c2), sets) in &directions {
                let mut attached: IndexSet<&String> = grouped[&(c1.clone(), c2.clone())].iter().collect();
                if let Some(mirrored) = grouped.get(&(c2.clone(), c1.clone())) {
                    attached.extend(mirrored.iter());
                }
                let all: Vec<&String> = sets.reactions().collect();
                let unique: IndexSet<&String> = all.iter().copied().collect();
                assert_eq!(all.len(), unique.len());
                assert_eq!(unique.len(), attached.len());
                assert!(attached.iter().all(|r| unique.contains(r)));
            }
        }
    }

    #[test]
    fn scope_limits_grouping() {
        let mut pairs = IndexMap::new();
        pairs.insert("FWD".to_string(), vec![(c("X"), c("Y"))]);
        pairs.insert("REV".to_string(), vec![(c("X"), c("Y"))]);
        let mut scope = IndexSet::new();
        scope.insert("REV".to_string());
        let grouped = group_by_pair(&pairs, &scope);
        assert_eq!(grouped[&(c("X"), c("Y"))], vec!["REV"]);
    }

    #[test]
    fn non_empty_groups() {
        let sets = DirectionSets {
            back: vec!["R".to_string()],
            ..Default::default()
        };
        let groups: Vec<_> = sets.groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, GroupDirection::Back);
    }
}
