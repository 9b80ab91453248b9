// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recipe validation for dependency graph integrity.
//!
//! Checks run in a fixed order so that later checks can rely on earlier ones:
//!
//! 1. **Names**: every node has a non-empty name
//! 2. **Uniqueness**: runtime names are unique across preflights and modules
//! 3. **References**: every `wants` entry resolves to a runtime name in the recipe
//! 4. **Acyclicity**: DFS with a recursion stack; the first cycle found is reported
//!    with its full path
//!
//! Cycle detection is skipped when earlier checks fail, since it needs a graph in
//! which every edge resolves.
//!
//! A cyclic `wants` graph would leave every module on the cycle waiting forever on
//! its dependencies' completion signals, so recipes are rejected up front instead.
//! That includes a module listing itself in `wants`: self-visibility is implicit and
//! an explicit self-edge is a cycle.
//!
//! # Example
//! ```rust
//! use recipe_engine::config::{validate_recipe, ModuleNode, Recipe};
//! use recipe_engine::errors::ValidationError;
//!
//! let recipe = Recipe {
//!     name: "broken".into(),
//!     modules: vec![
//!         ModuleNode::new("a").wants(["b"]),
//!         ModuleNode::new("b").wants(["a"]),
//!     ],
//!     ..Recipe::default()
//! };
//!
//! let errors = validate_recipe(&recipe).unwrap_err();
//! assert!(matches!(errors[0], ValidationError::CyclicDependency { .. }));
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::Recipe;
use crate::errors::ValidationError;

/// Validates a recipe's dependency graph, accumulating as many errors as possible.
pub fn validate_recipe(recipe: &Recipe) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(name_errors) = validate_names(recipe) {
        errors.extend(name_errors);
    }

    if let Err(duplicate_errors) = validate_unique_runtime_names(recipe) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_dependency_references(recipe) {
        errors.extend(unresolved_errors);
    }

    // Cycle detection needs every edge to resolve
    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(recipe) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_names(recipe: &Recipe) -> Result<(), Vec<ValidationError>> {
    let missing = recipe
        .all_nodes()
        .filter(|node| node.runtime_name().trim().is_empty())
        .count();

    if missing == 0 {
        Ok(())
    } else {
        Err(vec![ValidationError::MissingName; missing])
    }
}

fn validate_unique_runtime_names(recipe: &Recipe) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for node in recipe.all_nodes() {
        if !seen.insert(node.runtime_name()) {
            errors.push(ValidationError::DuplicateRuntimeName {
                runtime_name: node.runtime_name().to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(recipe: &Recipe) -> Result<(), Vec<ValidationError>> {
    let runtime_names: HashSet<&str> = recipe.all_nodes().map(|n| n.runtime_name()).collect();
    let mut errors = Vec::new();

    for node in recipe.all_nodes() {
        for dependency in &node.wants {
            if !runtime_names.contains(dependency.as_str()) {
                errors.push(ValidationError::UnresolvedDependency {
                    module: node.runtime_name().to_string(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Three-colour DFS over the forward graph (dependency -> dependents).
///
/// Roots are visited in recipe order so the reported cycle is deterministic.
fn validate_acyclic_graph(recipe: &Recipe) -> Result<(), Vec<ValidationError>> {
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in recipe.all_nodes() {
        graph.entry(node.runtime_name()).or_default();
    }
    for node in recipe.all_nodes() {
        for dependency in &node.wants {
            graph
                .entry(dependency.as_str())
                .or_default()
                .push(node.runtime_name());
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for node in recipe.all_nodes() {
        let id = node.runtime_name();
        if visited.contains(id) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(id, &graph, &mut visited, &mut rec_stack, &mut path)
        {
            return Err(vec![ValidationError::CyclicDependency { cycle }]);
        }
    }

    Ok(())
}

/// Returns the cycle path (first node repeated at the end) if one is reachable from `node`.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if rec_stack.contains(neighbor) {
                let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
