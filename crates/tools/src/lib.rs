//! # NW Tools
//!
//! Named, independently invocable query tools over a built
//! [`nw_hierarchy::Hierarchy`].
//!
//! Each tool takes a JSON argument object and returns a plain serializable
//! value; lookup failures come back as human-readable strings inside the
//! reply so an agent runtime can surface them verbatim. The conversational
//! framing of results is the caller's job, not this crate's.

mod views;

pub use views::{NodeView, SearchView};

use nw_hierarchy::Hierarchy;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use views::node_views;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("reply serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Catalog entry describing one callable tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Argument keys the tool reads, empty when none.
    pub args: &'static [&'static str],
}

const SPECS: &[ToolSpec] = &[
    ToolSpec {
        name: "get_all_locations",
        description: "Get all location nodes in the water system hierarchy.",
        args: &[],
    },
    ToolSpec {
        name: "get_all_applications",
        description: "Get all application nodes (water_abstraction, water_distribution, effluent_discharge).",
        args: &[],
    },
    ToolSpec {
        name: "get_all_modules",
        description: "Get all module nodes (source_module, storage_module, etc.).",
        args: &[],
    },
    ToolSpec {
        name: "get_all_instrumentations",
        description: "Get all instrumentation nodes with tag, type, value keys and thresholds.",
        args: &[],
    },
    ToolSpec {
        name: "get_all_assets",
        description: "Get all asset nodes with serial and product info.",
        args: &[],
    },
    ToolSpec {
        name: "get_assets_for_instrument",
        description: "Get all assets for one instrumentation, addressed by id or name.",
        args: &["inst_id_or_name"],
    },
    ToolSpec {
        name: "get_applications_for_location",
        description: "Get all applications for one location, addressed by id or name.",
        args: &["location_id_or_name"],
    },
    ToolSpec {
        name: "get_modules_for_application",
        description: "Get all modules for one application, addressed by id or name.",
        args: &["application_id_or_name"],
    },
    ToolSpec {
        name: "get_instruments_for_module",
        description: "Get all instrumentations for one module, addressed by id or name.",
        args: &["module_id_or_name"],
    },
    ToolSpec {
        name: "pprint_hierarchy",
        description: "Pretty-print the entire hierarchy as an indented tree.",
        args: &[],
    },
    ToolSpec {
        name: "pprint_hierarchy_md",
        description: "Pretty-print the entire hierarchy in markdown.",
        args: &[],
    },
    ToolSpec {
        name: "get_summary",
        description: "Hierarchy summary with node counts.",
        args: &[],
    },
    ToolSpec {
        name: "get_md_summary",
        description: "Hierarchy summary with node counts in markdown.",
        args: &[],
    },
    ToolSpec {
        name: "search_hierarchy",
        description: "Search node names for a term, per category.",
        args: &["search_term", "case_sensitive"],
    },
    ToolSpec {
        name: "get_instrumentations_by_value_key",
        description: "Find instrumentations carrying a specific value key.",
        args: &["value_key"],
    },
    ToolSpec {
        name: "get_instrumentations_by_type",
        description: "Find instrumentations of a specific type (case-insensitive).",
        args: &["instrument_type"],
    },
    ToolSpec {
        name: "get_detailed_statistics",
        description: "Detailed statistics: counts, type histograms, threshold coverage.",
        args: &[],
    },
];

/// Tool surface over one immutable hierarchy.
///
/// Tracks which tools ran since the last reset so an agent runtime can
/// report them per invocation; the hierarchy itself is never mutated.
pub struct HierarchyTools {
    hierarchy: Hierarchy,
    called: Vec<String>,
}

impl HierarchyTools {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            called: Vec::new(),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The tool catalog, stable order.
    pub fn specs() -> &'static [ToolSpec] {
        SPECS
    }

    /// Tool names recorded since the last reset, first call first, one
    /// entry per tool.
    pub fn called_tools(&self) -> &[String] {
        &self.called
    }

    pub fn reset_tracking(&mut self) {
        self.called.clear();
    }

    /// Parse a string as an integer id, `None` on anything else.
    pub fn safe_int_parse(value: &str) -> Option<i64> {
        value.trim().parse().ok()
    }

    /// Dispatch a tool by name. Data-level failures (unknown id, missing
    /// argument) are reported inside the returned value; only an unknown
    /// tool name or a serialization failure is an `Err`.
    pub fn invoke(&mut self, name: &str, args: &Value) -> Result<Value> {
        if !SPECS.iter().any(|spec| spec.name == name) {
            return Err(ToolError::UnknownTool(name.to_string()));
        }
        if !self.called.iter().any(|c| c == name) {
            self.called.push(name.to_string());
        }

        let started = Instant::now();
        let reply = self.dispatch(name, args);
        match &reply {
            Ok(_) => log::debug!(
                "tool '{}' executed in {:.3}s",
                name,
                started.elapsed().as_secs_f64()
            ),
            Err(e) => log::warn!(
                "tool '{}' failed after {:.3}s: {}",
                name,
                started.elapsed().as_secs_f64(),
                e
            ),
        }
        reply
    }

    fn dispatch(&self, name: &str, args: &Value) -> Result<Value> {
        let h = &self.hierarchy;
        match name {
            "get_all_locations" => to_value(node_views(h.all_locations())),
            "get_all_applications" => to_value(node_views(h.all_applications())),
            "get_all_modules" => to_value(node_views(h.all_modules())),
            "get_all_instrumentations" => to_value(node_views(h.all_instrumentations())),
            "get_all_assets" => to_value(node_views(h.all_assets())),
            "get_assets_for_instrument" => {
                self.children_for(args, "inst_id_or_name", Role::Instrumentation)
            }
            "get_applications_for_location" => {
                self.children_for(args, "location_id_or_name", Role::Location)
            }
            "get_modules_for_application" => {
                self.children_for(args, "application_id_or_name", Role::Application)
            }
            "get_instruments_for_module" => {
                self.children_for(args, "module_id_or_name", Role::Module)
            }
            "pprint_hierarchy" => Ok(Value::String(h.pprint(true))),
            "pprint_hierarchy_md" => Ok(Value::String(h.pprint_md(true))),
            "get_summary" => Ok(Value::String(h.print_summary())),
            "get_md_summary" => Ok(Value::String(h.print_md_summary())),
            "search_hierarchy" => {
                let Some(term) = str_arg(args, "search_term") else {
                    return Ok(missing_argument("search_term"));
                };
                let case_sensitive = bool_arg(args, "case_sensitive");
                to_value(SearchView::from(h.search(term, case_sensitive)))
            }
            "get_instrumentations_by_value_key" => {
                let Some(key) = str_arg(args, "value_key") else {
                    return Ok(missing_argument("value_key"));
                };
                to_value(node_views(h.get_instrumentations_by_value_key(key)))
            }
            "get_instrumentations_by_type" => {
                let Some(ty) = str_arg(args, "instrument_type") else {
                    return Ok(missing_argument("instrument_type"));
                };
                to_value(node_views(h.get_instrumentations_by_type(ty)))
            }
            "get_detailed_statistics" => to_value(h.detailed_statistics()),
            // Unreachable: invoke checked the catalog already.
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// Shared body of the four id-or-name child lookups: resolve, fetch
    /// children, fold every data failure into a readable message.
    fn children_for(&self, args: &Value, arg_key: &'static str, role: Role) -> Result<Value> {
        let Some(raw) = str_arg(args, arg_key) else {
            return Ok(missing_argument(arg_key));
        };

        let target = match Self::safe_int_parse(raw) {
            Some(id) => self.hierarchy.index_of(id),
            None => self.find_by_name(role, raw),
        };
        let Some(idx) = target else {
            return Ok(Value::String(format!(
                "No {} found with ID or name: {raw}",
                role.as_str()
            )));
        };

        let children = match role {
            Role::Location => self.hierarchy.get_applications(Some(idx)),
            Role::Application => self.hierarchy.get_modules(Some(idx)),
            Role::Module => self.hierarchy.get_instrumentations(Some(idx)),
            Role::Instrumentation => self.hierarchy.get_assets(Some(idx)),
        };
        match children {
            Ok(children) => to_value(node_views(children)),
            Err(e) => Ok(Value::String(format!(
                "Error getting children for {} {raw}: {e}",
                role.as_str()
            ))),
        }
    }

    /// Name lookup within the category list matching the tool's role.
    fn find_by_name(&self, role: Role, name: &str) -> Option<petgraph::graph::NodeIndex> {
        let candidates = match role {
            Role::Location => self.hierarchy.all_locations(),
            Role::Application => self.hierarchy.all_applications(),
            Role::Module => self.hierarchy.all_modules(),
            Role::Instrumentation => self.hierarchy.all_instrumentations(),
        };
        candidates
            .into_iter()
            .find(|n| n.name == name)
            .and_then(|n| self.hierarchy.index_of(n.id))
    }
}

/// Which category a parametrized child-lookup tool addresses.
#[derive(Debug, Clone, Copy)]
enum Role {
    Location,
    Application,
    Module,
    Instrumentation,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Location => "location",
            Role::Application => "application",
            Role::Module => "module",
            Role::Instrumentation => "instrumentation",
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn missing_argument(key: &str) -> Value {
    Value::String(format!("Error: missing required argument '{key}'"))
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn bool_arg(args: &Value, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_hierarchy::{HierarchyBuilder, HierarchyFeed};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_tools() -> HierarchyTools {
        let feed = HierarchyFeed::from_json_str(
            r#"{
                "node_info": {
                    "1": {"name": "Main Location", "type": "location", "parent_id": -1, "instrumentations": []},
                    "2": {"name": "Water Abstraction", "type": "water_abstraction", "parent_id": 1, "instrumentations": [100]},
                    "3": {"name": "Source Module", "type": "source_module", "parent_id": 2, "instrumentations": [101]}
                },
                "instrumentation_info": {
                    "100": {
                        "tag": "Main Flow Meter", "type": "Flow",
                        "value_keys": ["flow_rate", "temperature"],
                        "specifications": "flow_rate",
                        "thresholds": [{"name": "high_flow", "key": "flow_rate", "threshold_type": "upper", "value": 100.0}],
                        "assets": [{"id": 200, "serial": "FM-001", "prod_code": "FLOW-MASTER", "product_name": "FlowMaster Pro"}]
                    },
                    "101": {
                        "tag": "Pressure Sensor", "type": "Pressure",
                        "value_keys": ["pressure"], "specifications": "pressure",
                        "thresholds": [], "assets": []
                    }
                }
            }"#,
        )
        .unwrap();
        HierarchyTools::new(HierarchyBuilder::new().build(&feed).unwrap())
    }

    #[test]
    fn test_catalog_is_complete() {
        let names: Vec<&str> = HierarchyTools::specs().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 17);
        assert!(names.contains(&"get_all_locations"));
        assert!(names.contains(&"get_detailed_statistics"));
    }

    #[test]
    fn test_get_all_locations() {
        let mut tools = sample_tools();
        let reply = tools.invoke("get_all_locations", &json!({})).unwrap();
        let list = reply.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "Main Location");
        assert_eq!(list[0]["type"], "location");
        // Generic nodes do not leak instrument/asset fields.
        assert!(list[0].get("value_keys").is_none());
    }

    #[test]
    fn test_instrument_view_fields() {
        let mut tools = sample_tools();
        let reply = tools.invoke("get_all_instrumentations", &json!({})).unwrap();
        let list = reply.as_array().unwrap();
        assert_eq!(list.len(), 2);

        let flow = list.iter().find(|v| v["id"] == 100).unwrap();
        assert_eq!(flow["tag"], "Main Flow Meter");
        assert_eq!(flow["primary_val_key"], "flow_rate");
        assert_eq!(flow["value_keys"][0], "flow_rate");
        assert_eq!(flow["thresholds"][0]["type"], "upper");
    }

    #[test]
    fn test_assets_for_instrument_by_id_and_name() {
        let mut tools = sample_tools();

        let by_id = tools
            .invoke("get_assets_for_instrument", &json!({"inst_id_or_name": "100"}))
            .unwrap();
        assert_eq!(by_id.as_array().unwrap().len(), 1);
        assert_eq!(by_id[0]["serial"], "FM-001");
        assert_eq!(by_id[0]["prod_name"], "FlowMaster Pro");

        let by_name = tools
            .invoke(
                "get_assets_for_instrument",
                &json!({"inst_id_or_name": "Main Flow Meter"}),
            )
            .unwrap();
        assert_eq!(by_id, by_name);
    }

    #[test]
    fn test_unknown_target_is_message_not_error() {
        let mut tools = sample_tools();
        let reply = tools
            .invoke("get_assets_for_instrument", &json!({"inst_id_or_name": "999"}))
            .unwrap();
        assert_eq!(
            reply,
            Value::String("No instrumentation found with ID or name: 999".into())
        );
    }

    #[test]
    fn test_missing_argument_is_message() {
        let mut tools = sample_tools();
        let reply = tools
            .invoke("get_applications_for_location", &json!({}))
            .unwrap();
        assert_eq!(
            reply,
            Value::String("Error: missing required argument 'location_id_or_name'".into())
        );
    }

    #[test]
    fn test_modules_for_application_by_name() {
        let mut tools = sample_tools();
        let reply = tools
            .invoke(
                "get_modules_for_application",
                &json!({"application_id_or_name": "Water Abstraction"}),
            )
            .unwrap();
        // Structural module plus the attached instrument, as in the raw
        // child list.
        assert_eq!(reply.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_search_hierarchy() {
        let mut tools = sample_tools();
        let reply = tools
            .invoke(
                "search_hierarchy",
                &json!({"search_term": "main", "case_sensitive": false}),
            )
            .unwrap();
        assert_eq!(reply["locations"].as_array().unwrap().len(), 1);
        assert_eq!(reply["instrumentations"].as_array().unwrap().len(), 1);
        assert_eq!(reply["assets"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_statistics_tool() {
        let mut tools = sample_tools();
        let reply = tools.invoke("get_detailed_statistics", &json!({})).unwrap();
        assert_eq!(reply["total"], 6);
        assert_eq!(reply["threshold_coverage"], 50.0);
    }

    #[test]
    fn test_rendering_tools_return_strings() {
        let mut tools = sample_tools();
        for name in [
            "pprint_hierarchy",
            "pprint_hierarchy_md",
            "get_summary",
            "get_md_summary",
        ] {
            let reply = tools.invoke(name, &json!({})).unwrap();
            assert!(reply.is_string(), "{name} must return a string");
        }
    }

    #[test]
    fn test_call_tracking() {
        let mut tools = sample_tools();
        tools.invoke("get_all_locations", &json!({})).unwrap();
        tools.invoke("get_summary", &json!({})).unwrap();
        tools.invoke("get_all_locations", &json!({})).unwrap();

        assert_eq!(tools.called_tools(), ["get_all_locations", "get_summary"]);

        tools.reset_tracking();
        assert!(tools.called_tools().is_empty());
    }

    #[test]
    fn test_unknown_tool_is_error() {
        let mut tools = sample_tools();
        let err = tools.invoke("bogus_tool", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
        // Unknown names never enter the tracking list.
        assert!(tools.called_tools().is_empty());
    }
}
