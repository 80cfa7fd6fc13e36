//! Running several plugins over one tree.

use tracing::debug;
use weft_ast::{NodeArena, NodeIndex};
use weft_traverse::{NormalizedVisitor, Result, Tree, TreeOptions, Visitor};

/// A named visitor. The name only shows up in logs.
pub struct Plugin<S> {
    name: String,
    visitor: Visitor<S>,
}

impl<S: 'static> Plugin<S> {
    pub fn new(name: impl Into<String>, visitor: Visitor<S>) -> Self {
        Plugin {
            name: name.into(),
            visitor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Run `plugins` in a single merged pass. For every node the handlers of
/// earlier plugins run before those of later ones.
#[tracing::instrument(level = "debug", skip_all, fields(plugins = plugins.len()))]
pub fn run_plugins<S: 'static>(tree: &mut Tree, plugins: Vec<Plugin<S>>, state: &mut S) -> Result<()> {
    let names: Vec<String> = plugins.iter().map(|p| p.name.clone()).collect();
    let merged = plugins
        .into_iter()
        .fold(Visitor::new(), |merged, plugin| merged.merge(plugin.visitor));
    let visitor = NormalizedVisitor::new(merged)?;
    debug!(plugins = ?names, "merged pass");
    tree.traverse(&visitor, state)
}

/// Build a tree over `program`, run `plugins`, and hand the arena back.
pub fn transform<S: 'static>(
    arena: NodeArena,
    program: NodeIndex,
    options: TreeOptions,
    plugins: Vec<Plugin<S>>,
    state: &mut S,
) -> Result<(NodeArena, NodeIndex)> {
    let mut tree = Tree::with_options(arena, program, options);
    run_plugins(&mut tree, plugins, state)?;
    Ok(tree.into_arena())
}
