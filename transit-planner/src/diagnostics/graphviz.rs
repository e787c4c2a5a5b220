//! Renders recorded verdicts as a GraphViz diagram.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::graph::{GraphError, GraphNode, GraphTransaction, NodeId, NodeLabel};
use crate::repository::TransportData;

use super::HeuristicsReason;

/// Writes the explored part of the graph, with verdicts attached.
///
/// Invalid verdicts are always drawn; valid ones only when `include_all`
/// is set.
pub struct ReasonsToGraphViz {
    data: Arc<dyn TransportData>,
    include_all: bool,
}

/// What one call to `append_to` has already emitted.
#[derive(Default)]
struct Emitted {
    nodes: HashSet<NodeId>,
    edges: HashSet<(NodeId, NodeId)>,
    verdicts: HashMap<NodeId, Vec<HeuristicsReason>>,
    next_verdict: usize,
}

impl ReasonsToGraphViz {
    pub fn new(data: Arc<dyn TransportData>, include_all: bool) -> Self {
        Self { data, include_all }
    }

    /// Append DOT statements for `reasons` to `buffer`.
    ///
    /// The caller supplies the surrounding `digraph { ... }`.
    pub fn append_to<T: GraphTransaction>(
        &self,
        buffer: &mut String,
        reasons: &[HeuristicsReason],
        txn: &T,
    ) -> Result<(), GraphError> {
        let mut emitted = Emitted::default();
        for reason in reasons {
            if !self.include_all && reason.is_valid() {
                continue;
            }
            let how = reason.how();
            let end = how.end_node();
            self.add_node(buffer, &mut emitted, txn, end)?;

            if let (Some(previous), Some(rel)) = (how.previous_node(), how.relationship()) {
                self.add_node(buffer, &mut emitted, txn, previous)?;
                if emitted.edges.insert((previous, end)) {
                    let kind = txn.relationship(rel)?.kind;
                    let _ = writeln!(buffer, "  \"{previous}\" -> \"{end}\" [label=\"{kind}\"];");
                }
            }

            let seen = emitted.verdicts.entry(end).or_default();
            if seen.iter().any(|existing| existing.equivalent(reason)) {
                continue;
            }
            seen.push(reason.clone());

            let id = format!("verdict{}", emitted.next_verdict);
            emitted.next_verdict += 1;
            let (shape, colour) = if reason.is_valid() {
                ("oval", "darkgreen")
            } else {
                ("octagon", "red")
            };
            let _ = writeln!(
                buffer,
                "  \"{id}\" [label=\"{}\" shape={shape} color={colour}];",
                escape(&reason.text_for_graph())
            );
            let _ = writeln!(buffer, "  \"{end}\" -> \"{id}\";");
        }
        Ok(())
    }

    fn add_node<T: GraphTransaction>(
        &self,
        buffer: &mut String,
        emitted: &mut Emitted,
        txn: &T,
        id: NodeId,
    ) -> Result<(), GraphError> {
        if !emitted.nodes.insert(id) {
            return Ok(());
        }
        let node = txn.node(id)?;
        let (label, shape) = self.describe(&node);
        let _ = writeln!(
            buffer,
            "  \"{id}\" [label=\"{}\" shape={shape}];",
            escape(&label)
        );
        Ok(())
    }

    fn describe(&self, node: &GraphNode) -> (String, &'static str) {
        let props = &node.props;
        let station = || {
            props
                .station
                .as_ref()
                .map_or_else(String::new, |id| self.data.station_name(id))
        };
        let route = || {
            props.route.as_ref().map_or_else(String::new, |id| {
                self.data
                    .route(id)
                    .map_or_else(|| id.to_string(), |route| route.name.clone())
            })
        };

        if node.has_label(NodeLabel::Grouped) {
            let name = props.area.as_ref().map_or_else(String::new, |area| {
                self.data
                    .group(area)
                    .map_or_else(|| area.to_string(), |group| group.name.clone())
            });
            (format!("group {name}"), "folder")
        } else if node.has_label(NodeLabel::Station) {
            (station(), "house")
        } else if node.has_label(NodeLabel::RouteStation) {
            let shape = if node.has_label(NodeLabel::Interchange) {
                "diamond"
            } else {
                "box"
            };
            (format!("{}\n{}", station(), route()), shape)
        } else if node.has_label(NodeLabel::Service) {
            let service = props
                .service
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            (format!("svc {service}"), "cds")
        } else if node.has_label(NodeLabel::Hour) {
            (format!("H{}", props.hour.unwrap_or_default()), "box")
        } else if node.has_label(NodeLabel::Minute) {
            let time = props.time.map_or_else(String::new, |time| time.to_string());
            let trip = props.trip.as_ref().map_or_else(String::new, ToString::to_string);
            (format!("{time}\n{trip}"), "box")
        } else {
            (format!("node {}", node.id), "point")
        }
    }
}

/// Escape text for a quoted DOT label.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
