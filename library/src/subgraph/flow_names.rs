//! Flow input names of a subgraph context, derived from its owned children.

use crate::model::graph::Object;

/// Reserved name of the pin that starts every spawner with a free start gate.
pub const PLAY_EVENT_NAME: &str = "Play";
/// Reserved name of the pin that stops every spawner with a free stop gate.
pub const STOP_EVENT_NAME: &str = "Stop";

/// Resolve the ordered flow input names for a set of owned children.
///
/// Direct trigger names come first (distinct, sorted), then the names inherited from
/// nested subgraph contexts (sorted among themselves, not merged). "Play" and "Stop"
/// are prepended when some spawner has a free start or stop gate, or when a nested
/// context exposes them; they never appear further down the list.
pub fn resolve_flow_input_names(children: &[&Object], max_input_flow: usize) -> Vec<String> {
    let mut has_start = false;
    let mut has_stop = false;

    let mut names: Vec<String> = Vec::new();
    for name in children.iter().filter_map(|c| c.trigger_event_name()) {
        if mark_reserved(name, &mut has_start, &mut has_stop) {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names.sort();
    let direct_count = names.len();

    for gates in children.iter().filter_map(|c| c.spawner_gates()) {
        has_start |= !gates.start_linked;
        has_stop |= !gates.stop_linked;
    }

    for nested in children.iter().filter_map(|c| c.nested_flow_names(max_input_flow)) {
        for name in nested {
            if !mark_reserved(name, &mut has_start, &mut has_stop) {
                names.push(name.clone());
            }
        }
    }
    names[direct_count..].sort();

    if has_stop {
        names.insert(0, STOP_EVENT_NAME.to_string());
    }
    if has_start {
        names.insert(0, PLAY_EVENT_NAME.to_string());
    }
    names
}

fn mark_reserved(name: &str, has_start: &mut bool, has_stop: &mut bool) -> bool {
    match name {
        PLAY_EVENT_NAME => *has_start = true,
        STOP_EVENT_NAME => *has_stop = true,
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::{Context, ContextKind, FlowLink};
    use crate::subgraph::SubgraphContext;
    use uuid::Uuid;

    fn event(name: &str) -> Object {
        Object::Context(Context::new(ContextKind::event(name)))
    }

    fn spawner(start_linked: bool, stop_linked: bool) -> Object {
        let mut spawner = Context::new(ContextKind::Spawner);
        if start_linked {
            spawner.input_flow[0].links.push(FlowLink::new(Uuid::new_v4(), 0));
        }
        if stop_linked {
            spawner.input_flow[1].links.push(FlowLink::new(Uuid::new_v4(), 0));
        }
        Object::Context(spawner)
    }

    fn nested(names: &[&str]) -> Object {
        let mut subgraph = SubgraphContext::default();
        subgraph.flow_input_names = names.iter().map(|n| n.to_string()).collect();
        Object::Context(Context::new(ContextKind::Subgraph(subgraph)))
    }

    fn resolve(children: &[Object]) -> Vec<String> {
        let refs: Vec<&Object> = children.iter().collect();
        resolve_flow_input_names(&refs, 5)
    }

    #[test]
    fn test_direct_names_are_sorted() {
        assert_eq!(resolve(&[event("B"), event("A")]), vec!["A", "B"]);
    }

    #[test]
    fn test_direct_names_are_distinct() {
        assert_eq!(resolve(&[event("A"), event("A")]), vec!["A"]);
    }

    #[test]
    fn test_free_start_gate_adds_play() {
        assert_eq!(resolve(&[spawner(false, true), event("X")]), vec!["Play", "X"]);
    }

    #[test]
    fn test_play_precedes_stop() {
        assert_eq!(resolve(&[spawner(false, false)]), vec!["Play", "Stop"]);
    }

    #[test]
    fn test_gates_are_queried_across_spawners() {
        // One free gate on any spawner is enough.
        let children = [spawner(true, false), spawner(false, true)];
        assert_eq!(resolve(&children), vec!["Play", "Stop"]);
        assert!(resolve(&[spawner(true, true)]).is_empty());
    }

    #[test]
    fn test_nested_segment_sorted_after_direct() {
        let children = [event("Z"), nested(&["D", "C"]), event("M")];
        assert_eq!(resolve(&children), vec!["M", "Z", "C", "D"]);
    }

    #[test]
    fn test_nested_reserved_names_become_flags() {
        let children = [nested(&["Stop", "Play", "Go"])];
        assert_eq!(resolve(&children), vec!["Play", "Stop", "Go"]);
    }

    #[test]
    fn test_nested_duplicates_are_kept() {
        let children = [nested(&["Go"]), nested(&["Go"]), event("Go")];
        assert_eq!(resolve(&children), vec!["Go", "Go", "Go"]);
    }

    #[test]
    fn test_nested_names_are_capped_per_child() {
        let children = [nested(&["A", "B", "C", "D", "E", "F"])];
        let refs: Vec<&Object> = children.iter().collect();
        assert_eq!(resolve_flow_input_names(&refs, 2), vec!["A", "B"]);
    }

    #[test]
    fn test_direct_reserved_name_is_not_duplicated() {
        let children = [event("Play"), spawner(false, true)];
        assert_eq!(resolve(&children), vec!["Play"]);
    }

    #[test]
    fn test_no_children() {
        assert!(resolve(&[]).is_empty());
    }
}
