use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, SourcePosition, Spanning},
    validation::{RuleError, ValidatorContext, Visitor},
};

pub fn factory<'a>() -> NoFragmentCycles<'a> {
    NoFragmentCycles {
        current_fragment: None,
        spreads: FnvHashMap::default(),
        fragment_order: Vec::new(),
    }
}

pub struct NoFragmentCycles<'a> {
    current_fragment: Option<&'a str>,
    spreads: FnvHashMap<&'a str, Vec<(&'a str, SourcePosition)>>,
    fragment_order: Vec<&'a str>,
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        let mut detector = CycleDetector {
            visited: FnvHashSet::default(),
            spreads: &self.spreads,
            errors: Vec::new(),
        };

        for frag in &self.fragment_order {
            if !detector.visited.contains(frag) {
                detector.detect_from(frag);
            }
        }

        ctx.append_errors(detector.errors);
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment>,
    ) {
        let fragment_name = fragment.item.name.item.as_str();
        self.current_fragment = Some(fragment_name);
        self.fragment_order.push(fragment_name);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment>,
    ) {
        self.current_fragment = None;
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        if let Some(current_fragment) = self.current_fragment {
            self.spreads
                .entry(current_fragment)
                .or_default()
                .push((&spread.item.name.item, spread.start));
        }
    }
}

struct CycleDetector<'a> {
    visited: FnvHashSet<&'a str>,
    spreads: &'a FnvHashMap<&'a str, Vec<(&'a str, SourcePosition)>>,
    errors: Vec<RuleError>,
}

impl<'a> CycleDetector<'a> {
    fn detect_from(&mut self, from: &'a str) {
        self.visited.insert(from);
        let mut spread_path = Vec::new();
        let mut path_index = FnvHashMap::default();
        self.detect(from, &mut spread_path, &mut path_index);
    }

    fn detect(
        &mut self,
        from: &'a str,
        spread_path: &mut Vec<(&'a str, SourcePosition)>,
        path_index: &mut FnvHashMap<&'a str, usize>,
    ) {
        path_index.insert(from, spread_path.len());

        for &(name, pos) in self.spreads.get(from).map_or(&[][..], Vec::as_slice) {
            match path_index.get(name).copied() {
                None => {
                    spread_path.push((name, pos));
                    if !self.visited.contains(name) {
                        self.visited.insert(name);
                        self.detect(name, spread_path, path_index);
                    }
                    spread_path.pop();
                }
                Some(cycle_index) => {
                    let via: Vec<&str> =
                        spread_path[cycle_index..].iter().map(|&(n, _)| n).collect();
                    self.errors
                        .push(RuleError::new(&error_message(name, &via), &[pos]));
                }
            }
        }

        path_index.remove(from);
    }
}

fn error_message(frag_name: &str, via: &[&str]) -> String {
    if via.is_empty() {
        format!(r#"Cannot spread fragment "{frag_name}" within itself"#)
    } else {
        format!(
            r#"Cannot spread fragment "{frag_name}" within itself via {}"#,
            via.join(", "),
        )
    }
}
