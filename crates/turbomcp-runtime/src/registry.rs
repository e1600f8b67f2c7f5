//! Fuses the tools, prompts, and resources exposed by every connected
//! server into one namespace, prefixing names that collide across servers.

use dashmap::{DashMap, DashSet};

use turbomcp_client::Client;
use turbomcp_core::Error;
use turbomcp_core::types::{Prompt, Resource, ResourceTemplate, Tool};
use turbomcp_transport::Transport;

use crate::descriptor::ToolFilter;

/// A capability plus the server it was discovered on and the key it is
/// registered under (which may be prefixed if its bare name collided).
#[derive(Debug, Clone)]
pub struct Registered<V> {
    /// The server that exposes this capability.
    pub server_name: String,
    /// The capability's own name, as reported by the server.
    pub original_name: String,
    /// The key this capability is registered under in the fused namespace.
    pub registered_key: String,
    /// The capability itself.
    pub value: V,
}

fn prefixed_key(server_name: &str, name: &str) -> String {
    format!("{server_name}__{name}")
}

/// Inserts `value` under `name`'s bare key if nothing else owns it yet;
/// otherwise inserts both the new entry and (if not already done) the
/// existing entry under their server-prefixed keys. Returns the key the
/// new entry ended up under.
fn insert_collision_aware<V: Clone>(
    map: &DashMap<String, Registered<V>>,
    reverse: &DashMap<String, DashSet<String>>,
    server_name: &str,
    name: &str,
    value: V,
) -> String {
    reverse.entry(server_name.to_string()).or_default();

    match map.get(name) {
        None => {
            map.insert(
                name.to_string(),
                Registered {
                    server_name: server_name.to_string(),
                    original_name: name.to_string(),
                    registered_key: name.to_string(),
                    value,
                },
            );
            reverse.get(server_name).unwrap().insert(name.to_string());
            name.to_string()
        }
        Some(existing) if existing.server_name == server_name => {
            // Same server re-registering (e.g. reconnect): overwrite in place.
            let key = existing.registered_key.clone();
            drop(existing);
            map.insert(
                name.to_string(),
                Registered {
                    server_name: server_name.to_string(),
                    original_name: name.to_string(),
                    registered_key: key.clone(),
                    value,
                },
            );
            key
        }
        Some(existing) => {
            // Collision with a different server: demote the incumbent to its
            // prefixed key (if not already demoted) and register the newcomer
            // under its own prefixed key.
            let incumbent_server = existing.server_name.clone();
            let incumbent_value = existing.value.clone();
            let incumbent_original = existing.original_name.clone();
            drop(existing);

            if !map.contains_key(&prefixed_key(&incumbent_server, &incumbent_original)) {
                let incumbent_key = prefixed_key(&incumbent_server, &incumbent_original);
                map.insert(
                    incumbent_key.clone(),
                    Registered {
                        server_name: incumbent_server.clone(),
                        original_name: incumbent_original.clone(),
                        registered_key: incumbent_key.clone(),
                        value: incumbent_value,
                    },
                );
                reverse.get(&incumbent_server).unwrap().insert(incumbent_key);
            }

            let new_key = prefixed_key(server_name, name);
            map.insert(
                new_key.clone(),
                Registered {
                    server_name: server_name.to_string(),
                    original_name: name.to_string(),
                    registered_key: new_key.clone(),
                    value,
                },
            );
            reverse.get(server_name).unwrap().insert(new_key.clone());
            new_key
        }
    }
}

/// The fused tool/prompt/resource namespace across every connected server.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tools: DashMap<String, Registered<Tool>>,
    prompts: DashMap<String, Registered<Prompt>>,
    resources: DashMap<String, Registered<Resource>>,
    resource_templates: DashMap<String, Registered<ResourceTemplate>>,

    tools_by_server: DashMap<String, DashSet<String>>,
    prompts_by_server: DashMap<String, DashSet<String>>,
    resources_by_server: DashMap<String, DashSet<String>>,
    resource_templates_by_server: DashMap<String, DashSet<String>>,
}

impl CapabilityRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query `server_name`'s capabilities over `client` and register them,
    /// resolving any name collisions against capabilities already known
    /// from other servers. `tool_filter`, if given, restricts which of the
    /// server's tools are admitted to the registry at all (`include` beats
    /// `exclude`; `None`/empty admits everything) — a tool this filter
    /// rejects is never registered, bare or prefixed.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the server's `list_*` calls fail.
    pub async fn discover<T: Transport>(
        &self,
        server_name: &str,
        client: &Client<T>,
        tool_filter: Option<&ToolFilter>,
    ) -> Result<(), Error> {
        for tool in client.list_tools().await? {
            if tool_filter.is_some_and(|f| !f.admits(&tool.name)) {
                continue;
            }
            insert_collision_aware(&self.tools, &self.tools_by_server, server_name, &tool.name.clone(), tool);
        }
        for prompt in client.list_prompts().await? {
            insert_collision_aware(
                &self.prompts,
                &self.prompts_by_server,
                server_name,
                &prompt.name.clone(),
                prompt,
            );
        }
        for resource in client.list_resources().await? {
            insert_collision_aware(
                &self.resources,
                &self.resources_by_server,
                server_name,
                &resource.uri.clone(),
                resource,
            );
        }
        for template in client.list_resource_templates().await? {
            insert_collision_aware(
                &self.resource_templates,
                &self.resource_templates_by_server,
                server_name,
                &template.uri_template.clone(),
                template,
            );
        }
        Ok(())
    }

    /// Drop every capability that came from `server_name` (called on
    /// disconnect, so a stale tool list doesn't outlive its server).
    pub fn remove_server(&self, server_name: &str) {
        remove_owned_keys(&self.tools_by_server, &self.tools, server_name);
        remove_owned_keys(&self.prompts_by_server, &self.prompts, server_name);
        remove_owned_keys(&self.resources_by_server, &self.resources, server_name);
        remove_owned_keys(
            &self.resource_templates_by_server,
            &self.resource_templates,
            server_name,
        );
    }

    /// All registered tools, under their (possibly prefixed) registry keys.
    #[must_use]
    pub fn all_tools(&self) -> Vec<Registered<Tool>> {
        self.tools.iter().map(|e| e.value().clone()).collect()
    }

    /// All registered prompts.
    #[must_use]
    pub fn all_prompts(&self) -> Vec<Registered<Prompt>> {
        self.prompts.iter().map(|e| e.value().clone()).collect()
    }

    /// All registered resources.
    #[must_use]
    pub fn all_resources(&self) -> Vec<Registered<Resource>> {
        self.resources.iter().map(|e| e.value().clone()).collect()
    }

    /// All registered resource templates.
    #[must_use]
    pub fn all_resource_templates(&self) -> Vec<Registered<ResourceTemplate>> {
        self.resource_templates.iter().map(|e| e.value().clone()).collect()
    }

    /// Look up a tool by its registry key (bare or prefixed).
    #[must_use]
    pub fn tool_by_key(&self, key: &str) -> Option<Registered<Tool>> {
        self.tools.get(key).map(|e| e.value().clone())
    }

    /// Resolve `name` to a tool owned by `server_name`, trying the bare
    /// key first and falling back to the server-prefixed key. This is how
    /// `executeTool(serverName, { name })` finds a tool even when its bare
    /// name was lost to a same-named tool on another server.
    #[must_use]
    pub fn tool_for(&self, server_name: &str, name: &str) -> Option<Registered<Tool>> {
        if let Some(entry) = self.tools.get(name) {
            if entry.server_name == server_name {
                return Some(entry.value().clone());
            }
        }
        self.tools.get(&prefixed_key(server_name, name)).map(|e| e.value().clone())
    }
}

fn remove_owned_keys<V>(
    by_server: &DashMap<String, DashSet<String>>,
    map: &DashMap<String, Registered<V>>,
    server_name: &str,
) {
    if let Some((_, keys)) = by_server.remove(server_name) {
        for key in keys {
            map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbomcp_core::types::ToolInputSchema;

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: None,
            input_schema: ToolInputSchema::object(),
            title: None,
            annotations: None,
        }
    }

    #[test]
    fn bare_registration_when_no_collision() {
        let registry = CapabilityRegistry::new();
        let key = insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        assert_eq!(key, "read");
        assert!(registry.tool_by_key("read").is_some());
    }

    #[test]
    fn collision_prefixes_both_sides() {
        let registry = CapabilityRegistry::new();
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        let key = insert_collision_aware(&registry.tools, &registry.tools_by_server, "b", "read", tool("read"));

        assert_eq!(key, "b__read");
        assert!(registry.tool_by_key("a__read").is_some());
        assert!(registry.tool_by_key("b__read").is_some());
        // Bare key still resolves to whichever server registered first.
        assert_eq!(registry.tool_by_key("read").unwrap().server_name, "a");
    }

    #[test]
    fn tool_for_resolves_bare_then_prefixed() {
        let registry = CapabilityRegistry::new();
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "b", "read", tool("read"));

        assert!(registry.tool_for("a", "read").is_some());
        assert!(registry.tool_for("b", "read").is_some());
        assert!(registry.tool_for("c", "read").is_none());
    }

    #[test]
    fn remove_server_drops_only_its_keys() {
        let registry = CapabilityRegistry::new();
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "b", "write", tool("write"));

        registry.remove_server("a");

        assert!(registry.tool_by_key("read").is_none());
        assert!(registry.tool_by_key("write").is_some());
    }

    #[test]
    fn same_server_reregistration_overwrites_in_place() {
        let registry = CapabilityRegistry::new();
        insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        let key = insert_collision_aware(&registry.tools, &registry.tools_by_server, "a", "read", tool("read"));
        assert_eq!(key, "read");
        assert_eq!(registry.all_tools().len(), 1);
    }
}
